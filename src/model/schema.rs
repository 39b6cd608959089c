//! Root fact model and engine configuration

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use super::dimension::Dimension;
use super::field::Field;
use super::types::FieldType;
use crate::error::ParseError;

/// Label given to the sentinel option that stands for null or blank raw values
pub const DEFAULT_BLANK_LABEL: &str = "Unlabeled";

fn default_blank_label() -> String {
    DEFAULT_BLANK_LABEL.to_string()
}

/// The flat fact table: one row per billable procedure or visit.
///
/// Holds the fixed field map every query is validated against and the
/// dimensions a session can filter on.
#[derive(Debug, Clone, Deserialize)]
pub struct FactModel {
    /// Physical fact table name
    #[serde(rename = "factTable")]
    pub fact_table: String,
    /// Field used for date range restrictions
    #[serde(rename = "dateField")]
    pub date_field: Option<String>,
    #[serde(rename = "blankLabel", default = "default_blank_label")]
    pub blank_label: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

impl FactModel {
    pub fn new(fact_table: impl Into<String>) -> Self {
        Self {
            fact_table: fact_table.into(),
            date_field: None,
            blank_label: default_blank_label(),
            fields: Vec::new(),
            dimensions: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_date_field(mut self, name: impl Into<String>) -> Self {
        self.date_field = Some(name.into());
        self
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a dimension by name
    pub fn get_dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Get the field a dimension filters on
    pub fn dimension_field(&self, dimension: &Dimension) -> Option<&Field> {
        self.get_field(&dimension.field)
    }

    /// Get the field used for date range restrictions
    pub fn date_field(&self) -> Option<&Field> {
        self.date_field.as_deref().and_then(|name| self.get_field(name))
    }

    /// Dimension names in declaration order
    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Check internal consistency of the field map and dimensions
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.fact_table.trim().is_empty() {
            return Err(ParseError::Invalid("factTable must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ParseError::Invalid(format!("Duplicate field '{}'", field.name)));
            }
        }

        let mut seen = HashSet::new();
        for dimension in &self.dimensions {
            if !seen.insert(dimension.name.as_str()) {
                return Err(ParseError::Invalid(format!("Duplicate dimension '{}'", dimension.name)));
            }
            if self.get_field(&dimension.field).is_none() {
                return Err(ParseError::Invalid(format!(
                    "Dimension '{}' references unknown field '{}'",
                    dimension.name, dimension.field
                )));
            }
        }

        if let Some(name) = &self.date_field {
            match self.get_field(name) {
                Some(field) if field.field_type == FieldType::Date => {}
                Some(field) => {
                    return Err(ParseError::Invalid(format!(
                        "dateField '{}' must have type date, found {}",
                        name, field.field_type
                    )));
                }
                None => {
                    return Err(ParseError::Invalid(format!("dateField references unknown field '{}'", name)));
                }
            }
        }

        Ok(())
    }
}

fn default_pool_size() -> usize {
    4
}

fn default_checkout_timeout_ms() -> u64 {
    5_000
}

/// Connection settings for the fact store
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file holding the fact table
    pub path: PathBuf,
    #[serde(rename = "poolSize", default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(rename = "checkoutTimeoutMs", default = "default_checkout_timeout_ms")]
    pub checkout_timeout_ms: u64,
    /// Deadline applied to every query that does not bring its own token
    #[serde(rename = "queryTimeoutMs")]
    pub query_timeout_ms: Option<u64>,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool_size: default_pool_size(),
            checkout_timeout_ms: default_checkout_timeout_ms(),
            query_timeout_ms: None,
        }
    }

    pub fn checkout_timeout(&self) -> Duration {
        Duration::from_millis(self.checkout_timeout_ms)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

/// Top-level configuration file: the fact model plus where to find it
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub model: FactModel,
    pub store: StoreConfig,
}

impl EngineConfig {
    /// Load a configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        crate::parser::parse_file(path)
    }
}
