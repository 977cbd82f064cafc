//! Per-file validation context for BIDS datasets.
//!
//! Given a [`FileTree`](bidsval_core::FileTree), this crate works out for
//! each file what a rule engine needs to know about it: parsed entities,
//! datatype and modality, merged sidecar metadata and the companion files
//! it is associated with.
//!
//! # Example
//!
//! ```no_run
//! use bidsval_core::MemoryTreeBuilder;
//! use bidsval_schema::{AssociationKind, Context};
//!
//! let tree = MemoryTreeBuilder::new()
//!     .file("/sub-01/func/sub-01_task-rest_events.tsv", "onset\n0\n")
//!     .file("/sub-01/func/sub-01_task-rest_bold.nii.gz", "")
//!     .build()?;
//! let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.nii.gz").unwrap();
//! let context = Context::build(&tree, file)?;
//! assert!(context.associations.get(AssociationKind::Events).is_some());
//! # Ok::<(), bidsval_core::BidsError>(())
//! ```

mod associations;
mod context;
mod datatype;
pub mod dwi;
pub mod tsv;

pub use associations::{
    ASSOCIATIONS, AslContextAssociation, AssociationDescriptor, AssociationKind, AssociationLoader,
    AssociationMatch, AssociationPayload, Associations, ChannelsAssociation, EventsAssociation,
    GradientAssociation, PathAssociation, resolve_associations,
};
pub use context::Context;
pub use datatype::{Datatype, Modality};
