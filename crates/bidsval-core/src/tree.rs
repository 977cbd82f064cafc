//! Dataset directory tree.

use compact_str::CompactString;

use crate::file::BidsFile;
use crate::bidsignore::FileIgnoreRules;

/// Index of a directory within a [`FileTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirId(pub usize);

impl DirId {
    /// The dataset root.
    pub const ROOT: DirId = DirId(0);
}

/// A single directory level.
#[derive(Debug)]
pub struct Directory {
    /// Index of this directory.
    pub id: DirId,
    /// Dataset relative path, `/` for the root.
    pub path: String,
    /// Name of this directory level, empty for the root.
    pub name: CompactString,
    /// Files in listing order.
    pub files: Vec<Box<dyn BidsFile>>,
    /// Child directories in listing order.
    pub directories: Vec<DirId>,
    /// Enclosing directory, `None` for the root.
    pub parent: Option<DirId>,
}

impl Directory {
    /// Whether `path` lies somewhere below this directory.
    pub fn contains(&self, path: &str) -> bool {
        if self.path == "/" {
            return path.starts_with('/');
        }
        path.strip_prefix(self.path.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Join a child name onto this directory's path.
    pub fn child_path(&self, name: &str) -> String {
        if self.path == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.path)
        }
    }
}

/// Complete dataset tree.
///
/// Directories live in an arena owned by the tree; parent and child links are
/// indices into it.
#[derive(Debug)]
pub struct FileTree {
    dirs: Vec<Directory>,
    ignore: FileIgnoreRules,
}

impl FileTree {
    /// Create a tree holding only the root directory.
    pub fn new(ignore: FileIgnoreRules) -> Self {
        let root = Directory {
            id: DirId::ROOT,
            path: "/".to_string(),
            name: CompactString::default(),
            files: Vec::new(),
            directories: Vec::new(),
            parent: None,
        };
        Self {
            dirs: vec![root],
            ignore,
        }
    }

    /// Exclusion rules shared by every file in the tree.
    pub fn ignore(&self) -> &FileIgnoreRules {
        &self.ignore
    }

    /// The root directory.
    pub fn root(&self) -> &Directory {
        &self.dirs[0]
    }

    /// Look up a directory by id.
    pub fn get(&self, id: DirId) -> Option<&Directory> {
        self.dirs.get(id.0)
    }

    /// Parent of a directory.
    pub fn parent(&self, dir: &Directory) -> Option<&Directory> {
        dir.parent.and_then(|id| self.get(id))
    }

    /// Child directories of `dir`, in listing order.
    pub fn subdirectories<'a>(&'a self, dir: &'a Directory) -> impl Iterator<Item = &'a Directory> + 'a {
        dir.directories.iter().filter_map(|id| self.get(*id))
    }

    /// Add a child directory under `parent`, returning its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_directory(&mut self, parent: DirId, name: impl Into<CompactString>) -> DirId {
        let name = name.into();
        let id = DirId(self.dirs.len());
        let path = self.dirs[parent.0].child_path(&name);
        self.dirs.push(Directory {
            id,
            path,
            name,
            files: Vec::new(),
            directories: Vec::new(),
            parent: Some(parent),
        });
        self.dirs[parent.0].directories.push(id);
        id
    }

    /// Add a file to a directory.
    ///
    /// # Panics
    ///
    /// Panics if `dir` does not belong to this tree.
    pub fn add_file(&mut self, dir: DirId, file: Box<dyn BidsFile>) {
        self.dirs[dir.0].files.push(file);
    }

    /// Number of directories, root included.
    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    /// Total number of files.
    pub fn file_count(&self) -> usize {
        self.dirs.iter().map(|d| d.files.len()).sum()
    }

    /// Find a directory by its dataset relative path.
    pub fn find_directory(&self, path: &str) -> Option<&Directory> {
        let path = path.trim_end_matches('/');
        let mut current = self.root();
        if path.is_empty() {
            return Some(current);
        }
        for segment in path.trim_start_matches('/').split('/') {
            current = self.subdirectories(current).find(|d| d.name == segment)?;
        }
        Some(current)
    }

    /// Find a file by its dataset relative path.
    pub fn find_file(&self, path: &str) -> Option<&dyn BidsFile> {
        let (dir, name) = path.rsplit_once('/')?;
        self.find_directory(dir)?
            .files
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    /// Iterate files depth-first, each directory's files before its
    /// subdirectories.
    pub fn files(&self) -> Files<'_> {
        Files {
            tree: self,
            stack: vec![(DirId::ROOT, 0)],
        }
    }
}

/// Depth-first file iterator over a [`FileTree`].
pub struct Files<'a> {
    tree: &'a FileTree,
    stack: Vec<(DirId, usize)>,
}

impl<'a> Iterator for Files<'a> {
    type Item = &'a dyn BidsFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, idx) = self.stack.pop()?;
            let dir = self.tree.get(id)?;
            if let Some(file) = dir.files.get(idx) {
                self.stack.push((id, idx + 1));
                return Some(file.as_ref());
            }
            // Files exhausted: queue children so the first listed is visited first.
            self.stack
                .extend(dir.directories.iter().rev().map(|child| (*child, 0)));
        }
    }
}
