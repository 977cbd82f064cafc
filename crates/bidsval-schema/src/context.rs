//! Per-file validation context.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use tracing::debug;

use bidsval_core::{BidsError, BidsFile, FileEntities, FileTree};

use crate::associations::{Associations, find_candidates, resolve_associations};
use crate::datatype::{Datatype, Modality};

/// Everything known about one file before rules are applied to it.
#[derive(Debug)]
pub struct Context<'a> {
    /// The file under validation.
    pub file: &'a dyn BidsFile,
    /// Entities, suffix and extension parsed from the filename.
    pub entities: FileEntities,
    pub datatype: Option<Datatype>,
    pub modality: Option<Modality>,
    /// Companion files found in the dataset.
    pub associations: Associations,
    /// Merged metadata from inherited JSON sidecars.
    pub sidecar: Map<String, Value>,
    json: OnceLock<Value>,
}

impl<'a> Context<'a> {
    /// Context with filename-derived fields only.
    pub fn new(file: &'a dyn BidsFile) -> Self {
        let datatype = Datatype::from_path(file.path());
        Self {
            file,
            entities: FileEntities::parse(file.name()),
            datatype,
            modality: datatype.map(Datatype::modality),
            associations: Associations::default(),
            sidecar: Map::new(),
            json: OnceLock::new(),
        }
    }

    /// Fully populated context for a file in `tree`.
    pub fn build(tree: &FileTree, file: &'a dyn BidsFile) -> Result<Self, BidsError> {
        let mut context = Self::new(file);
        context.load_sidecar(tree)?;
        context.load_associations(tree)?;
        debug!(
            path = file.path(),
            associations = context.associations.len(),
            sidecar_keys = context.sidecar.len(),
            "built context"
        );
        Ok(context)
    }

    pub fn path(&self) -> &str {
        self.file.path()
    }

    pub fn suffix(&self) -> &str {
        &self.entities.suffix
    }

    pub fn extension(&self) -> &str {
        &self.entities.extension
    }

    /// Resolve companion files.
    pub fn load_associations(&mut self, tree: &FileTree) -> Result<(), BidsError> {
        self.associations = resolve_associations(tree, self.file, &self.entities)?;
        Ok(())
    }

    /// Merge every applicable `.json` sidecar, shallowest first, so that
    /// deeper files override keys set higher in the hierarchy.
    pub fn load_sidecar(&mut self, tree: &FileTree) -> Result<(), BidsError> {
        let suffix = self.entities.suffix.as_str();
        let sidecars = find_candidates(tree, self.file.path(), &self.entities, true, |parsed| {
            parsed.suffix == suffix && parsed.extension == ".json"
        });

        let mut merged = Map::new();
        for sidecar in sidecars {
            match decode_json(sidecar)? {
                Value::Object(fields) => merged.extend(fields),
                _ => debug!(path = sidecar.path(), "sidecar is not an object, skipped"),
            }
        }
        self.sidecar = merged;
        Ok(())
    }

    /// Decoded contents of the file itself, if it is a `.json` file.
    ///
    /// Decoding happens on first call only.
    pub fn json(&self) -> Result<Option<&Value>, BidsError> {
        if self.extension() != ".json" {
            return Ok(None);
        }
        if let Some(value) = self.json.get() {
            return Ok(Some(value));
        }
        let value = decode_json(self.file)?;
        Ok(Some(self.json.get_or_init(|| value)))
    }
}

fn decode_json(file: &dyn BidsFile) -> Result<Value, BidsError> {
    serde_json::from_str(&file.text()?).map_err(|source| BidsError::Json {
        path: file.path().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bidsval_core::MemoryTreeBuilder;
    use serde_json::json;

    #[test]
    fn test_filename_fields() {
        let tree = MemoryTreeBuilder::new()
            .file("/sub-01/func/sub-01_task-rest_bold.nii.gz", "")
            .build()
            .unwrap();
        let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.nii.gz").unwrap();
        let context = Context::new(file);

        assert_eq!(context.suffix(), "bold");
        assert_eq!(context.extension(), ".nii.gz");
        assert_eq!(context.entities.get("task"), Some("rest"));
        assert_eq!(context.datatype, Some(Datatype::Func));
        assert_eq!(context.modality, Some(Modality::Mri));
    }

    #[test]
    fn test_sidecar_deeper_overrides() {
        let tree = MemoryTreeBuilder::new()
            .file("/task-rest_bold.json", r#"{"RepetitionTime": 2.0, "TaskName": "rest"}"#)
            .file("/sub-01/func/sub-01_task-rest_bold.json", r#"{"RepetitionTime": 1.5}"#)
            .file("/sub-01/func/sub-01_task-rest_bold.nii.gz", "")
            .build()
            .unwrap();
        let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.nii.gz").unwrap();
        let context = Context::build(&tree, file).unwrap();

        assert_eq!(context.sidecar["RepetitionTime"], json!(1.5));
        assert_eq!(context.sidecar["TaskName"], json!("rest"));
    }

    #[test]
    fn test_sidecar_excludes_self_and_other_suffixes() {
        let tree = MemoryTreeBuilder::new()
            .file("/task-rest_events.json", r#"{"onset": {}}"#)
            .file("/sub-01/func/sub-01_task-rest_bold.json", r#"{"RepetitionTime": 1.5}"#)
            .build()
            .unwrap();
        let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.json").unwrap();
        let context = Context::build(&tree, file).unwrap();

        assert!(context.sidecar.is_empty());
    }

    #[test]
    fn test_json_decoded_lazily() {
        let tree = MemoryTreeBuilder::new()
            .file("/dataset_description.json", r#"{"Name": "demo"}"#)
            .file("/README", "hello")
            .build()
            .unwrap();

        let description = Context::new(tree.find_file("/dataset_description.json").unwrap());
        let value = description.json().unwrap().unwrap();
        assert_eq!(value["Name"], json!("demo"));
        assert!(std::ptr::eq(value, description.json().unwrap().unwrap()));

        let readme = Context::new(tree.find_file("/README").unwrap());
        assert!(readme.json().unwrap().is_none());
    }

    #[test]
    fn test_invalid_sidecar_propagates() {
        let tree = MemoryTreeBuilder::new()
            .file("/task-rest_bold.json", "{not json")
            .file("/sub-01/func/sub-01_task-rest_bold.nii.gz", "")
            .build()
            .unwrap();
        let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.nii.gz").unwrap();

        let err = Context::build(&tree, file).unwrap_err();
        assert!(matches!(err, BidsError::Json { ref path, .. } if path == "/task-rest_bold.json"));
    }
}
