//! Dataset summary for bids-validator.
//!
//! A [`Summary`] folds one [`Context`] per file into subject, session and
//! task registries, modality tallies and size totals. [`summarize`] runs the
//! whole fold over a tree.

mod config;
mod output;
mod subjects;
mod summary;

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use output::{LEGACY_SUMMARY_FORMAT, SUMMARY_FORMAT_VERSION, SubjectMetadata, SummaryOutput};
pub use subjects::collect_subject_metadata;
pub use summary::{PRIMARY_MODALITIES, SecondaryModality, Summary};

use bidsval_core::{BidsError, FileTree};
use bidsval_schema::Context;
use tracing::{debug, trace};

/// Summarize every non-ignored file of a tree, in traversal order.
///
/// Stops at the first error; no partial summary is returned.
pub fn summarize(tree: &FileTree, config: &SummaryConfig) -> Result<SummaryOutput, BidsError> {
    let mut summary = Summary::new(config.clone());

    for file in tree.files() {
        if file.ignored() {
            trace!(path = file.path(), "ignored");
            continue;
        }
        let context = Context::build(tree, file)?;
        summary.update(&context)?;
    }

    let output = summary.format_output();
    debug!(
        total_files = output.total_files,
        subjects = output.subjects.len(),
        size = output.size,
        "summary complete"
    );
    Ok(output)
}
