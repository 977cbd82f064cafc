//! JWalk-based dataset scanner.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use bidsval_core::{
    BIDSIGNORE, BidsError, DirId, FileIgnoreRules, FileTree, ValidatorConfig, read_bidsignore,
};

use crate::file::FsFile;

/// Builds a [`FileTree`] from a dataset directory on local disk.
///
/// The walk is serial and sorted by name, so traversal order is the same for
/// the same directory contents.
pub struct FsScanner;

impl FsScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Scan the dataset rooted at `config.root`.
    pub fn scan(&self, config: &ValidatorConfig) -> Result<FileTree, BidsError> {
        let start = Instant::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| BidsError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(BidsError::NotADirectory { path: root_path });
        }

        let root_path = Arc::new(root_path);
        let ignore = FileIgnoreRules::new(&config.ignore_patterns)?;

        let entries = self.collect_entries(config, &root_path, &ignore)?;
        let tree = self.build_tree(&root_path, entries, ignore);

        debug!(
            root = %root_path.display(),
            files = tree.file_count(),
            dirs = tree.dir_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dataset scan complete"
        );
        Ok(tree)
    }

    /// Collect all entries using jwalk, loading `.bidsignore` files as they
    /// are reached.
    fn collect_entries(
        &self,
        config: &ValidatorConfig,
        root_path: &Arc<PathBuf>,
        ignore: &FileIgnoreRules,
    ) -> Result<HashMap<PathBuf, Vec<EntryInfo>>, BidsError> {
        let walker = WalkDir::new(root_path.as_path())
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(config.follow_symlinks);

        // Map from parent path to children
        let mut entries_by_parent: HashMap<PathBuf, Vec<EntryInfo>> = HashMap::new();

        for entry_result in walker {
            let mut entry = match entry_result {
                Ok(e) => e,
                Err(err) => return Err(walk_error(err, root_path)),
            };
            // Directories that could not be listed still come back as entries.
            if let Some(err) = entry.read_children_error.take() {
                return Err(walk_error(err, root_path));
            }
            // The root itself only carries its listing error.
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();
            let is_dir = file_type.is_dir();
            if !is_dir && !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let name: CompactString = entry.file_name().to_string_lossy().as_ref().into();
            if !is_dir && name == BIDSIGNORE {
                let file = FsFile::new(
                    Arc::clone(root_path),
                    relative_path(root_path, &path),
                    ignore.clone(),
                );
                let patterns = read_bidsignore(&file)?;
                debug!(path = %path.display(), rules = patterns.len(), "loaded .bidsignore");
                ignore.add(&patterns)?;
            }

            if let Some(parent) = path.parent() {
                entries_by_parent
                    .entry(parent.to_path_buf())
                    .or_default()
                    .push(EntryInfo {
                        name,
                        path: path.clone(),
                        is_dir,
                    });
            }
        }

        Ok(entries_by_parent)
    }

    /// Build tree structure from collected entries.
    fn build_tree(
        &self,
        root_path: &Arc<PathBuf>,
        mut entries_by_parent: HashMap<PathBuf, Vec<EntryInfo>>,
        ignore: FileIgnoreRules,
    ) -> FileTree {
        let mut tree = FileTree::new(ignore);
        self.build_node(root_path, root_path, DirId::ROOT, &mut tree, &mut entries_by_parent);
        tree
    }

    /// Recursively populate a directory and its children.
    fn build_node(
        &self,
        root_path: &Arc<PathBuf>,
        path: &Path,
        dir: DirId,
        tree: &mut FileTree,
        entries_by_parent: &mut HashMap<PathBuf, Vec<EntryInfo>>,
    ) {
        let children_entries = entries_by_parent.remove(path).unwrap_or_default();

        for entry in children_entries {
            if entry.is_dir {
                let child = tree.add_directory(dir, entry.name);
                self.build_node(root_path, &entry.path, child, tree, entries_by_parent);
            } else {
                let Some(parent) = tree.get(dir) else { continue };
                let file_path = parent.child_path(&entry.name);
                let file = FsFile::new(Arc::clone(root_path), file_path, tree.ignore().clone());
                tree.add_file(dir, Box::new(file));
            }
        }
    }
}

impl Default for FsScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Temporary struct for collecting entry information.
struct EntryInfo {
    name: CompactString,
    path: PathBuf,
    is_dir: bool,
}

/// Convert a walk error, keeping the underlying I/O error kind.
fn walk_error(err: jwalk::Error, root: &Path) -> BidsError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let kind = err.io_error().map(io::Error::kind).unwrap_or(io::ErrorKind::Other);
    BidsError::io(path, io::Error::new(kind, err.to_string()))
}

/// Dataset relative form (`/a/b`) of an absolute path under `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut out = String::new();
    for component in relative.components() {
        out.push('/');
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
