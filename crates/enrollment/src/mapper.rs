//! Semantic keys to PDF field names

use crate::{Layout, ParsedRecord};
use pdf_core::FieldMap;

/// PDF field name to value, in layout field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(FieldMap);

impl FieldValues {
    /// Value of a PDF field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterate over `(field name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying map, as `pdf-core` expects it
    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Rename parsed values to the layout's PDF field names
///
/// Every field of the layout is present in the result. A source key missing
/// from the record yields "".
pub fn build_field_values(record: &ParsedRecord, layout: &Layout) -> FieldValues {
    layout
        .fields
        .iter()
        .map(|field| {
            let value = record.get(&field.source).unwrap_or_default();
            (field.name.as_str(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ENROLLMENT_FIELDS;
    use crate::parse_record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_map_sample_record() {
        let layout = Layout::default();
        let raw = "C01\t\t\tHV1\tNguyen Van A\t\t\t2024-01-01\t\tGS1\tTran Thi B";
        let values = build_field_values(&parse_record(raw, &layout), &layout);

        let expected: FieldValues = [
            ("ma_lop", "C01"),
            ("ma_hoc_vien", "HV1"),
            ("ho_ten_hv", "Nguyen Van A"),
            ("ngay_bat_dau_cong_tac", "2024-01-01"),
            ("ma_gia_su", "GS1"),
            ("ho_ten_gs", "Tran Thi B"),
            ("mon_lop", ""),
            ("quan_ly_lop_phu_trach", ""),
            ("co_van_chuyen_mon", ""),
            ("ten_gia_su_ky_ten", "Tran Thi B"),
        ]
        .into_iter()
        .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_empty_record_maps_all_fields() {
        let layout = Layout::default();
        let values = build_field_values(&parse_record("", &layout), &layout);

        let names: Vec<&str> = values.iter().map(|(name, _)| name).collect();
        let expected: Vec<&str> = ENROLLMENT_FIELDS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, expected);
        assert!(values.iter().all(|(_, value)| value.is_empty()));
    }

    #[test]
    fn test_signature_field_mirrors_tutor_name() {
        let layout = Layout::default();
        for raw in ["", "a\tb", "0\t1\t2\t3\t4\t5\t6\t7\t8\t9\tTutor Name\t11"] {
            let values = build_field_values(&parse_record(raw, &layout), &layout);
            assert_eq!(values.get("ten_gia_su_ky_ten"), values.get("ho_ten_gs"));
        }
    }

    #[test]
    fn test_missing_source_defaults_to_empty() {
        let layout = Layout::default();
        let values = build_field_values(&ParsedRecord::default(), &layout);
        assert_eq!(values.len(), 10);
        assert_eq!(values.get("ma_lop"), Some(""));
    }
}
