//! Inclusive date range restriction

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error when a date string is in neither accepted format
#[derive(Debug, Clone, PartialEq)]
pub struct ParseDateError {
    pub input: String,
}

impl fmt::Display for ParseDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid date '{}'. Expected YYYY-MM-DD or DD/MM/YYYY", self.input)
    }
}

impl std::error::Error for ParseDateError {}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseDateError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| ParseDateError { input: input.to_string() })
}

/// Date bounds, each independently optional and inclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Build a range from optional date strings; blank strings mean no bound
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ParseDateError> {
        let bound = |s: Option<&str>| -> Result<Option<NaiveDate>, ParseDateError> {
            match s.map(str::trim) {
                Some(s) if !s.is_empty() => parse_date(s).map(Some),
                _ => Ok(None),
            }
        };
        Ok(Self { start: bound(start)?, end: bound(end)? })
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "..".to_string());
        write!(f, "[{} .. {}]", show(self.start), show(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 9).unwrap();
        assert_eq!(parse_date("2023-03-09").unwrap(), expected);
        assert_eq!(parse_date("09/03/2023").unwrap(), expected);
        assert_eq!(parse_date(" 2023-03-09 ").unwrap(), expected);
        assert!(parse_date("2023/03/09").is_err());
        assert!(parse_date("31/02/2023").is_err());
    }

    #[test]
    fn test_range_blank_bounds() {
        let range = DateRange::parse(Some(""), Some("31/12/2023")).unwrap();
        assert_eq!(range.start, None);
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2023, 12, 31));
        assert!(DateRange::parse(None, None).unwrap().is_unbounded());
    }

    #[test]
    fn test_display() {
        let range = DateRange::parse(Some("2023-01-01"), None).unwrap();
        assert_eq!(range.to_string(), "[2023-01-01 .. ..]");
    }
}
