//! Tab-delimited record parsing

use crate::Layout;
use indexmap::IndexMap;

/// Column separator of the input record
pub const FIELD_DELIMITER: char = '\t';

/// Semantic key to value, in layout column order
///
/// Every column of the layout is present; columns past the end of the
/// record hold the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord(IndexMap<String, String>);

impl ParsedRecord {
    /// Value of a semantic key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Semantic keys in column order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a raw record into the layout's semantic keys
///
/// The input is split on every tab with no trimming, quoting or escaping.
/// Short records never fail: a column beyond the last part reads as "".
///
/// # Example
/// ```ignore
/// let record = parse_record("C01\t\t\tHV1", &Layout::default());
/// assert_eq!(record.get("id_hv"), Some("HV1"));
/// assert_eq!(record.get("ten_gs"), Some(""));
/// ```
pub fn parse_record(raw: &str, layout: &Layout) -> ParsedRecord {
    let parts: Vec<&str> = raw.split(FIELD_DELIMITER).collect();

    ParsedRecord(
        layout
            .columns
            .iter()
            .map(|column| {
                let value = parts.get(column.index).copied().unwrap_or_default();
                (column.key.clone(), value.to_string())
            })
            .collect(),
    )
}
