//! Environment-neutral file capability.

use std::fmt;
use std::io::{Cursor, Read};

use compact_str::CompactString;

use crate::bidsignore::FileIgnoreRules;
use crate::error::BidsError;

/// A file in a dataset, independent of where its bytes live.
///
/// Implementations may resolve size and content lazily, but every accessor
/// must be safe to call repeatedly.
pub trait BidsFile: fmt::Debug + Send + Sync {
    /// Basename of the file.
    fn name(&self) -> &str;

    /// Dataset relative path, with a leading `/`.
    fn path(&self) -> &str;

    /// File size in bytes.
    fn size(&self) -> Result<u64, BidsError>;

    /// Whether the dataset's exclusion rules match this file.
    fn ignored(&self) -> bool;

    /// Open a fresh reader over the raw contents.
    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, BidsError>;

    /// Read the entire file and decode it as UTF-8 text.
    ///
    /// Invalid sequences are replaced and a leading byte order mark is dropped.
    fn text(&self) -> Result<String, BidsError> {
        let mut bytes = Vec::new();
        self.stream()?
            .read_to_end(&mut bytes)
            .map_err(|e| BidsError::io(self.path(), e))?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
    }
}

/// Basename of a dataset relative path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A file whose contents are held in memory.
pub struct MemoryFile {
    name: CompactString,
    path: String,
    contents: Vec<u8>,
    ignore: FileIgnoreRules,
}

impl MemoryFile {
    /// Create a new in-memory file at a dataset relative path.
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>, ignore: FileIgnoreRules) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            name: basename(&path).into(),
            path,
            contents: contents.into(),
            ignore,
        }
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("path", &self.path)
            .field("size", &self.contents.len())
            .finish()
    }
}

impl BidsFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> Result<u64, BidsError> {
        Ok(self.contents.len() as u64)
    }

    fn ignored(&self) -> bool {
        self.ignore.test(&self.path)
    }

    fn stream(&self) -> Result<Box<dyn Read + Send + '_>, BidsError> {
        Ok(Box::new(Cursor::new(self.contents.as_slice())))
    }
}
