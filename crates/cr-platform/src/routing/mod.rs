//! Department Router
//!
//! Static keyword-to-department table plus a name/id reconciliation helper
//! against a live department list. Both operations are pure; a miss is
//! "unassigned", never an error.

use std::collections::HashMap;

/// Ordered keyword table; first match in declaration order wins, so this is
/// a slice rather than a map.
const KEYWORD_TABLE: &[(&str, &str)] = &[
    ("pothole", "Public Works"),
    ("sinkhole", "Public Works"),
    ("streetlight", "Public Works"),
    ("garbage", "Sanitation"),
    ("trash", "Sanitation"),
    ("overflow", "Sanitation"),
];

/// Infer a department name from free text.
pub fn infer_department(text: &str) -> Option<&'static str> {
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, department)| *department)
}

/// Find a department id given a name, against a mapping that may be either
/// id→name or name→id (both orientations are supported on purpose).
///
/// The name is first tried as a direct key; failing that, values are scanned
/// case-insensitively and the matching key is returned.
pub fn resolve_id(departments: &HashMap<String, String>, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    if let Some(id) = departments.get(name) {
        return Some(id.clone());
    }
    departments
        .iter()
        .find(|(_, value)| value.eq_ignore_ascii_case(name))
        .map(|(key, _)| key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_public_works_from_pothole() {
        assert_eq!(
            infer_department("Large pothole near 5th Ave"),
            Some("Public Works")
        );
    }

    #[test]
    fn infers_sanitation_from_garbage() {
        assert_eq!(
            infer_department("Garbage overflow on Elm"),
            Some("Sanitation")
        );
    }

    #[test]
    fn first_match_wins_in_table_order() {
        // Contains both "streetlight" (Public Works) and "trash" (Sanitation);
        // "streetlight" comes first in the table.
        assert_eq!(
            infer_department("trash piled under the broken streetlight"),
            Some("Public Works")
        );
    }

    #[test]
    fn no_keyword_means_none() {
        assert_eq!(infer_department("Loud music"), None);
        assert_eq!(infer_department(""), None);
    }

    #[test]
    fn resolves_id_to_name_orientation() {
        let mut departments = HashMap::new();
        departments.insert("d1".to_string(), "Sanitation".to_string());
        assert_eq!(resolve_id(&departments, "Sanitation"), Some("d1".to_string()));
    }

    #[test]
    fn resolves_name_to_id_orientation() {
        let mut departments = HashMap::new();
        departments.insert("Sanitation".to_string(), "d1".to_string());
        assert_eq!(resolve_id(&departments, "Sanitation"), Some("d1".to_string()));
    }

    #[test]
    fn value_scan_is_case_insensitive() {
        let mut departments = HashMap::new();
        departments.insert("d2".to_string(), "public works".to_string());
        assert_eq!(
            resolve_id(&departments, "Public Works"),
            Some("d2".to_string())
        );
    }

    #[test]
    fn missing_department_is_none() {
        let departments = HashMap::new();
        assert_eq!(resolve_id(&departments, "Sanitation"), None);
        assert_eq!(resolve_id(&departments, ""), None);
    }
}
