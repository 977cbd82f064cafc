//! Filename entity parsing.
//!
//! A BIDS filename is a run of `key-value` entities joined by `_`, followed by
//! a suffix and an extension:
//!
//! ```text
//! sub-01_ses-02_task-rest_bold.nii.gz
//! '----' '----' '-------' '--''-----'
//!       entities           suffix ext
//! ```
//!
//! Parsing is total. Segments that are not well-formed entities are folded,
//! together with everything after them, into the suffix, so the original
//! filename can always be reconstructed with [`FileEntities::to_filename`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Entities, suffix and extension decoded from a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntities {
    /// Entity values keyed by entity name, in filename order.
    pub entities: IndexMap<String, String>,
    /// Content kind preceding the extension, e.g. `bold`.
    pub suffix: String,
    /// Extension including the leading dot, possibly multi-part (`.nii.gz`).
    pub extension: String,
}

impl FileEntities {
    /// Parse a basename.
    pub fn parse(filename: &str) -> Self {
        let mut entities = IndexMap::new();
        let mut segments = filename.split('_').peekable();
        let mut tail: Vec<&str> = Vec::new();

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                tail.push(segment);
                break;
            }
            match segment.split_once('-') {
                Some((key, value)) if !key.is_empty() && !entities.contains_key(key) => {
                    entities.insert(key.to_string(), value.to_string());
                }
                _ => {
                    tail.push(segment);
                    tail.extend(segments.by_ref());
                    break;
                }
            }
        }

        let tail = tail.join("_");
        let (suffix, extension) = match tail.find('.') {
            Some(idx) => (tail[..idx].to_string(), tail[idx..].to_string()),
            None => (tail, String::new()),
        };

        Self {
            entities,
            suffix,
            extension,
        }
    }

    /// Value of an entity, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entities.get(key).map(String::as_str)
    }

    /// Whether every entity here appears in `other` with the same value.
    pub fn is_subset_of(&self, other: &IndexMap<String, String>) -> bool {
        self.entities
            .iter()
            .all(|(key, value)| other.get(key) == Some(value))
    }

    /// Rebuild the filename these parts were parsed from.
    pub fn to_filename(&self) -> String {
        let mut name = String::new();
        for (key, value) in &self.entities {
            name.push_str(key);
            name.push('-');
            name.push_str(value);
            name.push('_');
        }
        name.push_str(&self.suffix);
        name.push_str(&self.extension);
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bold() {
        let parsed = FileEntities::parse("sub-01_ses-02_task-rest_bold.nii.gz");
        assert_eq!(parsed.get("sub"), Some("01"));
        assert_eq!(parsed.get("ses"), Some("02"));
        assert_eq!(parsed.get("task"), Some("rest"));
        assert_eq!(parsed.suffix, "bold");
        assert_eq!(parsed.extension, ".nii.gz");

        let keys: Vec<&str> = parsed.entities.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["sub", "ses", "task"]);
    }

    #[test]
    fn test_parse_without_entities() {
        let parsed = FileEntities::parse("participants.tsv");
        assert!(parsed.entities.is_empty());
        assert_eq!(parsed.suffix, "participants");
        assert_eq!(parsed.extension, ".tsv");

        let parsed = FileEntities::parse("README");
        assert_eq!(parsed.suffix, "README");
        assert_eq!(parsed.extension, "");

        let parsed = FileEntities::parse(".bidsignore");
        assert_eq!(parsed.suffix, "");
        assert_eq!(parsed.extension, ".bidsignore");
    }

    #[test]
    fn test_malformed_segment_folds_into_suffix() {
        let parsed = FileEntities::parse("dataset_description.json");
        assert!(parsed.entities.is_empty());
        assert_eq!(parsed.suffix, "dataset_description");
        assert_eq!(parsed.extension, ".json");

        let parsed = FileEntities::parse("sub-01_junk_task-rest_bold.nii");
        assert_eq!(parsed.entities.len(), 1);
        assert_eq!(parsed.suffix, "junk_task-rest_bold");
        assert_eq!(parsed.extension, ".nii");
    }

    #[test]
    fn test_repeated_key_is_malformed() {
        let parsed = FileEntities::parse("sub-01_sub-02_T1w.nii");
        assert_eq!(parsed.get("sub"), Some("01"));
        assert_eq!(parsed.suffix, "sub-02_T1w");
    }

    #[test]
    fn test_value_keeps_extra_dashes() {
        let parsed = FileEntities::parse("sub-01_acq-a-b_T1w.nii");
        assert_eq!(parsed.get("acq"), Some("a-b"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = FileEntities::parse("sub-01_ses-02_bold.nii");
        let mut b = FileEntities::parse("ses-02_sub-01_bold.nii");
        assert_eq!(a, b);
        b.entities.insert("run".into(), "1".into());
        assert_ne!(a, b);
    }

    #[test]
    fn test_round_trip() {
        for name in [
            "sub-01_ses-02_task-rest_bold.nii.gz",
            "sub-01_task-rest_events.tsv",
            "task-rest_bold.json",
            "dataset_description.json",
            "sub-01_junk_T1w.nii",
            "sub-01_dwi.bval",
            "sub-01_",
            "_",
            "",
            "sub-_T1w.nii",
        ] {
            let parsed = FileEntities::parse(name);
            assert_eq!(parsed.to_filename(), name);
            assert_eq!(FileEntities::parse(&parsed.to_filename()), parsed);
        }
    }

    #[test]
    fn test_is_subset_of() {
        let source = FileEntities::parse("sub-01_ses-02_task-rest_bold.nii.gz");
        assert!(FileEntities::parse("sub-01_ses-02_events.tsv").is_subset_of(&source.entities));
        assert!(FileEntities::parse("task-rest_events.tsv").is_subset_of(&source.entities));
        assert!(!FileEntities::parse("sub-01_ses-03_events.tsv").is_subset_of(&source.entities));
        assert!(!FileEntities::parse("sub-01_run-1_events.tsv").is_subset_of(&source.entities));
    }
}
