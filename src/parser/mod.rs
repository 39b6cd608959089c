//! Configuration parser (verb module)
//!
//! Transforms YAML files into model types. Every successful parse is
//! validated, so downstream compilers can rely on dimensions pointing at
//! real fields.

use std::path::Path;
use crate::error::ParseError;
use crate::model::{EngineConfig, FactModel};

/// Parse an engine configuration from a YAML file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ParseError> {
    let contents = read(path.as_ref())?;
    parse_str(&contents)
}

/// Parse an engine configuration from a YAML string
pub fn parse_str(yaml: &str) -> Result<EngineConfig, ParseError> {
    let config: EngineConfig = serde_yaml::from_str(yaml)?;
    config.model.validate()?;
    if config.store.pool_size == 0 {
        return Err(ParseError::Invalid("store.poolSize must be at least 1".to_string()));
    }
    Ok(config)
}

/// Parse a bare fact model from a YAML file
pub fn parse_model_file<P: AsRef<Path>>(path: P) -> Result<FactModel, ParseError> {
    let contents = read(path.as_ref())?;
    parse_model_str(&contents)
}

/// Parse a bare fact model from a YAML string
pub fn parse_model_str(yaml: &str) -> Result<FactModel, ParseError> {
    let model: FactModel = serde_yaml::from_str(yaml)?;
    model.validate()?;
    Ok(model)
}

fn read(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldType, Normalization, DEFAULT_BLANK_LABEL};

    const MINIMAL: &str = r#"
factTable: visits
fields:
  - name: year
    column: visit_year
    type: integer
  - name: segment
    column: segment
dimensions:
  - name: year
    field: year
  - name: segment
    field: segment
    normalize: folded
"#;

    #[test]
    fn test_parse_clinic_fixture() {
        let config = parse_file("tests/test_data/clinic.yaml").unwrap();

        let model = &config.model;
        assert_eq!(model.fact_table, "visits");
        assert_eq!(model.blank_label, "Unlabeled");
        assert_eq!(model.fields.len(), 11);
        assert_eq!(model.dimensions.len(), 7);

        let year = model.get_field("year").unwrap();
        assert_eq!(year.column, "visit_year");
        assert_eq!(year.field_type, FieldType::Integer);

        // Type defaults to text
        assert_eq!(model.get_field("professional").unwrap().field_type, FieldType::Text);

        let segment = model.get_dimension("segment").unwrap();
        assert_eq!(segment.normalize, Normalization::Folded);
        assert_eq!(model.get_dimension("specialty").unwrap().normalize, Normalization::Exact);

        assert_eq!(model.date_field().unwrap().column, "visit_date");

        assert_eq!(config.store.pool_size, 3);
        assert_eq!(config.store.checkout_timeout_ms, 2000);
        assert!(config.store.query_timeout().is_none());
    }

    #[test]
    fn test_parse_model_defaults() {
        let model = parse_model_str(MINIMAL).unwrap();
        assert_eq!(model.blank_label, DEFAULT_BLANK_LABEL);
        assert!(model.date_field.is_none());
        assert_eq!(model.dimension_names(), vec!["year", "segment"]);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_str("not: [valid: yaml");
        assert!(matches!(result, Err(ParseError::Yaml { .. })));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = parse_file("tests/test_data/does_not_exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does_not_exist.yaml"));
    }

    #[test]
    fn test_dimension_with_unknown_field_rejected() {
        let yaml = r#"
factTable: visits
fields:
  - name: year
    column: visit_year
dimensions:
  - name: professional
    field: professional
"#;
        let err = parse_model_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::Invalid(ref msg) if msg.contains("unknown field 'professional'")));
    }

    #[test]
    fn test_date_field_must_be_date() {
        let yaml = r#"
factTable: visits
dateField: year
fields:
  - name: year
    column: visit_year
    type: integer
"#;
        let err = parse_model_str(yaml).unwrap_err();
        assert!(err.to_string().contains("must have type date"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let yaml = r#"
factTable: visits
fields:
  - name: year
    column: a
  - name: year
    column: b
"#;
        assert!(parse_model_str(yaml).is_err());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let yaml = format!(
            "model:\n{}\nstore:\n  path: x.db\n  poolSize: 0\n",
            MINIMAL.lines().map(|l| format!("  {}", l)).collect::<Vec<_>>().join("\n")
        );
        let err = parse_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("poolSize"));
    }
}
