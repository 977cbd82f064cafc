//! Local filesystem adapter for bids-validator.
//!
//! Walks a dataset directory with jwalk and produces a
//! [`FileTree`](bidsval_core::FileTree) of [`FsFile`]s. `.bidsignore` files
//! are read the moment the walk reaches them, and their rules apply to every
//! file in the tree.
//!
//! # Example
//!
//! ```rust,no_run
//! use bidsval_scan::{FsScanner, ValidatorConfig};
//!
//! let config = ValidatorConfig::new("/data/ds000001");
//! let tree = FsScanner::new().scan(&config).unwrap();
//!
//! for file in tree.files().filter(|f| !f.ignored()) {
//!     println!("{}", file.path());
//! }
//! ```

mod file;
mod scanner;

pub use file::FsFile;
pub use scanner::FsScanner;

// Re-export core types for convenience
pub use bidsval_core::{BidsError, BidsFile, FileTree, ValidatorConfig};
