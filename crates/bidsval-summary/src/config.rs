//! Summary configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::output::{LEGACY_SUMMARY_FORMAT, SUMMARY_FORMAT_VERSION};

/// Options controlling how a summary is accumulated.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct SummaryConfig {
    /// Report `totalFiles` as one less than the number of files processed,
    /// as existing consumers of the summary format expect.
    #[serde(default = "default_legacy_file_count")]
    pub legacy_file_count: bool,
}

fn default_legacy_file_count() -> bool {
    true
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            legacy_file_count: default_legacy_file_count(),
        }
    }
}

impl SummaryConfig {
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder::default()
    }

    /// Summary format version produced under this config.
    pub fn format_version(&self) -> u32 {
        if self.legacy_file_count {
            LEGACY_SUMMARY_FORMAT
        } else {
            SUMMARY_FORMAT_VERSION
        }
    }

    /// Starting value of the file counter.
    pub(crate) fn initial_file_count(&self) -> i64 {
        if self.legacy_file_count { -1 } else { 0 }
    }
}
