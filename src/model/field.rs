//! Fact table field definitions

use serde::Deserialize;
use super::types::FieldType;

/// A logical field of the fact table mapped to its physical column.
///
/// Group fields, measure fields and dimension fields are all addressed by
/// `name`; only the emitter ever sees `column`.
#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    pub name: String,
    pub column: String,
    pub label: Option<String>,
    /// Storage type. Defaults to text if not specified.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, column: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            label: None,
            field_type,
        }
    }

    /// Display label, falling back to the field name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
