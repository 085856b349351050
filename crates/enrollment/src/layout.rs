//! Layout tables
//!
//! A layout pairs the two tables a deployer edits when the input columns or
//! the PDF template change: which column each semantic key is read from, and
//! which semantic key each PDF field is filled with.

use crate::{EnrollmentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Semantic key to column index of the enrollment record
pub const ENROLLMENT_COLUMNS: &[(&str, usize)] = &[
    ("id_class", 0),
    ("ten_hv", 4),
    ("id_hv", 3),
    ("ngay_bat_dau", 7),
    ("id_gs", 9),
    ("ten_gs", 10),
    ("san_pham", 13),
    ("quan_ly_lop", 17),
    ("cvcm_phu_trach", 18),
];

/// PDF field name to semantic key of the enrollment form
///
/// The tutor name is filled twice: once as data, once as the signature line.
pub const ENROLLMENT_FIELDS: &[(&str, &str)] = &[
    ("ma_lop", "id_class"),
    ("ma_hoc_vien", "id_hv"),
    ("ho_ten_hv", "ten_hv"),
    ("ngay_bat_dau_cong_tac", "ngay_bat_dau"),
    ("ma_gia_su", "id_gs"),
    ("ho_ten_gs", "ten_gs"),
    ("mon_lop", "san_pham"),
    ("quan_ly_lop_phu_trach", "quan_ly_lop"),
    ("co_van_chuyen_mon", "cvcm_phu_trach"),
    ("ten_gia_su_ky_ten", "ten_gs"),
];

/// A record column read into a semantic key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Semantic key
    pub key: String,
    /// Zero-based position in the tab-delimited record
    pub index: usize,
}

/// A PDF field filled from a semantic key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// PDF form field name
    pub name: String,
    /// Semantic key supplying the value
    pub source: String,
}

/// Column and field tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Columns, in output order
    pub columns: Vec<ColumnDef>,
    /// Form fields, in output order
    pub fields: Vec<FieldDef>,
}

impl Default for Layout {
    /// The enrollment layout
    fn default() -> Self {
        Self {
            columns: ENROLLMENT_COLUMNS
                .iter()
                .map(|&(key, index)| ColumnDef {
                    key: key.to_string(),
                    index,
                })
                .collect(),
            fields: ENROLLMENT_FIELDS
                .iter()
                .map(|&(name, source)| FieldDef {
                    name: name.to_string(),
                    source: source.to_string(),
                })
                .collect(),
        }
    }
}

impl Layout {
    /// Parse and validate a layout from JSON
    ///
    /// ```json
    /// {
    ///   "columns": [{ "key": "id_class", "index": 0 }],
    ///   "fields": [{ "name": "ma_lop", "source": "id_class" }]
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read, parse and validate a layout file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            EnrollmentError::LayoutError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let layout = Self::from_json(&json)?;
        log::debug!(
            "Loaded layout {} ({} columns, {} fields)",
            path.display(),
            layout.columns.len(),
            layout.fields.len()
        );
        Ok(layout)
    }

    /// Check that keys and names are unique and every field has a source column
    pub fn validate(&self) -> Result<()> {
        let mut keys = HashSet::new();
        for column in &self.columns {
            if !keys.insert(column.key.as_str()) {
                return Err(EnrollmentError::LayoutError(format!(
                    "duplicate column key '{}'",
                    column.key
                )));
            }
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(EnrollmentError::LayoutError(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
            if !keys.contains(field.source.as_str()) {
                return Err(EnrollmentError::LayoutError(format!(
                    "field '{}' reads unknown column key '{}'",
                    field.name, field.source
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = Layout::default();
        layout.validate().unwrap();
        assert_eq!(layout.columns.len(), 9);
        assert_eq!(layout.fields.len(), 10);
    }

    #[test]
    fn test_default_layout_columns() {
        let layout = Layout::default();
        let indices: Vec<(&str, usize)> = layout
            .columns
            .iter()
            .map(|c| (c.key.as_str(), c.index))
            .collect();
        assert_eq!(indices, ENROLLMENT_COLUMNS.to_vec());
    }

    #[test]
    fn test_layout_json_roundtrip() {
        let layout = Layout::default();
        let json = serde_json::to_string(&layout).unwrap();
        assert_eq!(Layout::from_json(&json).unwrap(), layout);
    }

    #[test]
    fn test_custom_layout() {
        let json = r#"{
            "columns": [
                { "key": "code", "index": 2 },
                { "key": "name", "index": 0 }
            ],
            "fields": [
                { "name": "student_code", "source": "code" },
                { "name": "student_name", "source": "name" },
                { "name": "signature", "source": "name" }
            ]
        }"#;

        let layout = Layout::from_json(json).unwrap();
        assert_eq!(layout.columns[0].index, 2);
        assert_eq!(layout.fields[2].source, "name");
    }

    #[test]
    fn test_unknown_source_rejected() {
        let json = r#"{
            "columns": [{ "key": "code", "index": 0 }],
            "fields": [{ "name": "student_code", "source": "missing" }]
        }"#;

        let err = Layout::from_json(json).unwrap_err();
        assert!(matches!(err, EnrollmentError::LayoutError(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let json = r#"{
            "columns": [{ "key": "code", "index": 0 }, { "key": "code", "index": 1 }],
            "fields": []
        }"#;
        assert!(matches!(
            Layout::from_json(json),
            Err(EnrollmentError::LayoutError(_))
        ));

        let json = r#"{
            "columns": [{ "key": "code", "index": 0 }],
            "fields": [
                { "name": "a", "source": "code" },
                { "name": "a", "source": "code" }
            ]
        }"#;
        assert!(matches!(
            Layout::from_json(json),
            Err(EnrollmentError::LayoutError(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Layout::from_json("{ \"columns\": 3 }"),
            Err(EnrollmentError::JsonError(_))
        ));
    }

    #[test]
    fn test_missing_layout_file() {
        let err = Layout::from_path("/nonexistent/layout.json").unwrap_err();
        assert!(matches!(err, EnrollmentError::LayoutError(_)));
    }
}
