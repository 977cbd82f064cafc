//! Core types for bids-validator.
//!
//! This crate holds the pieces every runtime shares: the [`BidsFile`]
//! capability and [`FileTree`] structure, `.bidsignore` exclusion rules, and
//! the filename entity parser. Concrete adapters (local filesystem, memory)
//! produce trees; the schema and summary crates consume them.

mod bidsignore;
mod config;
mod entities;
mod error;
mod file;
mod memory;
mod tree;

pub use bidsignore::{BIDSIGNORE, DEFAULT_IGNORES, FileIgnoreRules, read_bidsignore};
pub use config::{ValidatorConfig, ValidatorConfigBuilder};
pub use entities::FileEntities;
pub use error::BidsError;
pub use file::{BidsFile, MemoryFile, basename};
pub use memory::MemoryTreeBuilder;
pub use tree::{DirId, Directory, FileTree, Files};
