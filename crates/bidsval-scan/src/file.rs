//! Files backed by the local filesystem.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use compact_str::CompactString;

use bidsval_core::{BidsError, BidsFile, FileIgnoreRules, basename};

/// A dataset file on local disk, stat'ed on first size access.
pub struct FsFile {
    dataset_root: Arc<PathBuf>,
    path: String,
    name: CompactString,
    size: OnceLock<u64>,
    ignore: FileIgnoreRules,
}

impl FsFile {
    /// Create a file for a dataset relative `path` (leading `/`).
    pub fn new(dataset_root: Arc<PathBuf>, path: impl Into<String>, ignore: FileIgnoreRules) -> Self {
        let path = path.into();
        Self {
            name: basename(&path).into(),
            dataset_root,
            path,
            size: OnceLock::new(),
            ignore,
        }
    }

    /// Absolute location on disk.
    pub fn absolute_path(&self) -> PathBuf {
        self.dataset_root.join(self.path.trim_start_matches('/'))
    }
}

impl fmt::Debug for FsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsFile")
            .field("root", &self.dataset_root)
            .field("path", &self.path)
            .finish()
    }
}

impl BidsFile for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> Result<u64, BidsError> {
        if let Some(size) = self.size.get() {
            return Ok(*size);
        }
        let abs = self.absolute_path();
        let size = std::fs::metadata(&abs)
            .map_err(|e| BidsError::io(&abs, e))?
            .len();
        Ok(*self.size.get_or_init(|| size))
    }

    fn ignored(&self) -> bool {
        self.ignore.test(&self.path)
    }

    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, BidsError> {
        let abs = self.absolute_path();
        let file = File::open(&abs).map_err(|e| BidsError::io(&abs, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
