//! Serializable summary records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Format version of summaries whose `totalFiles` is one less than the
/// number of files processed.
pub const LEGACY_SUMMARY_FORMAT: u32 = 1;

/// Format version of summaries whose `totalFiles` is the exact count.
pub const SUMMARY_FORMAT_VERSION: u32 = 2;

/// One row of `participants.tsv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetadata {
    /// Subject label without the `sub-` prefix.
    #[serde(rename = "PARTICIPANT_ID")]
    pub participant_id: String,
    pub age: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Dataset-wide statistics produced by a validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutput {
    pub sessions: Vec<String>,
    pub subjects: Vec<String>,
    pub subject_metadata: Vec<SubjectMetadata>,
    pub tasks: Vec<String>,
    pub modalities: Vec<String>,
    pub secondary_modalities: Vec<String>,
    pub total_files: i64,
    pub size: u64,
    pub data_processed: bool,
    pub pet: Map<String, Value>,
    pub datatypes: Vec<String>,
}
