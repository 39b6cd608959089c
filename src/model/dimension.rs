//! Dimension definitions

use serde::Deserialize;

/// How raw category values are collapsed into catalog options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Values that differ only by surrounding whitespace are one option
    #[default]
    Exact,
    /// Case, accents and inner whitespace runs are also ignored
    Folded,
}

/// An independent categorical filter axis over one fact field
#[derive(Debug, Clone, Deserialize)]
pub struct Dimension {
    pub name: String,
    /// Name of the fact field this dimension filters on
    pub field: String,
    pub label: Option<String>,
    #[serde(default)]
    pub normalize: Normalization,
}

impl Dimension {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            label: None,
            normalize: Normalization::Exact,
        }
    }

    pub fn with_normalization(mut self, normalize: Normalization) -> Self {
        self.normalize = normalize;
        self
    }

    /// Display label, falling back to the dimension name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}
