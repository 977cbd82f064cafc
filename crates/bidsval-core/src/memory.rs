//! In-memory tree construction.

use std::collections::HashMap;

use tracing::debug;

use crate::bidsignore::{BIDSIGNORE, FileIgnoreRules, read_bidsignore};
use crate::error::BidsError;
use crate::file::{BidsFile, MemoryFile};
use crate::tree::{DirId, FileTree};

/// Builds a [`FileTree`] from `(path, contents)` pairs.
///
/// Directories are created in the order their first file is added, and files
/// keep insertion order within a directory.
#[derive(Debug, Default)]
pub struct MemoryTreeBuilder {
    entries: Vec<(String, Vec<u8>)>,
    ignore_patterns: Vec<String>,
}

impl MemoryTreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at a dataset relative path.
    pub fn file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.entries.push((path.into(), contents.into()));
        self
    }

    /// Add extra exclusion patterns applied after the defaults.
    pub fn ignore_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.ignore_patterns
            .extend(patterns.iter().map(|p| p.as_ref().to_string()));
        self
    }

    /// Build the tree, loading every `.bidsignore` as it is reached.
    pub fn build(self) -> Result<FileTree, BidsError> {
        let ignore = FileIgnoreRules::new(&self.ignore_patterns)?;
        let mut tree = FileTree::new(ignore.clone());
        let mut dirs: HashMap<String, DirId> = HashMap::new();
        dirs.insert(String::new(), DirId::ROOT);

        for (path, contents) in self.entries {
            let path = path.trim_start_matches('/');
            let (parent, _) = path.rsplit_once('/').unwrap_or(("", path));
            let dir = ensure_directory(&mut tree, &mut dirs, parent);

            let file = MemoryFile::new(format!("/{path}"), contents, ignore.clone());
            if file.name() == BIDSIGNORE {
                let patterns = read_bidsignore(&file)?;
                debug!(path = file.path(), rules = patterns.len(), "loaded .bidsignore");
                ignore.add(&patterns)?;
            }
            tree.add_file(dir, Box::new(file));
        }

        Ok(tree)
    }
}

fn ensure_directory(tree: &mut FileTree, dirs: &mut HashMap<String, DirId>, path: &str) -> DirId {
    if let Some(id) = dirs.get(path) {
        return *id;
    }
    let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
    let parent_id = ensure_directory(tree, dirs, parent);
    let id = tree.add_directory(parent_id, name);
    dirs.insert(path.to_string(), id);
    id
}
