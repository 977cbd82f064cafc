//! Dataset summary accumulator.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use tracing::trace;

use bidsval_core::BidsError;
use bidsval_schema::{Context, Datatype, Modality};

use crate::config::SummaryConfig;
use crate::output::{SubjectMetadata, SummaryOutput};
use crate::subjects::collect_subject_metadata;

/// Modalities with a file counter, in declaration order.
pub const PRIMARY_MODALITIES: [Modality; 6] = [
    Modality::Mri,
    Modality::Pet,
    Modality::Meg,
    Modality::Eeg,
    Modality::Ieeg,
    Modality::Microscopy,
];

const PET_STATIC_RECONSTRUCTIONS: [&str; 2] = ["acstat", "nacstat"];
const PET_DYNAMIC_RECONSTRUCTIONS: [&str; 2] = ["acdyn", "nacdyn"];

/// Finer-grained acquisition buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
pub enum SecondaryModality {
    #[strum(serialize = "MRI_Diffusion")]
    MriDiffusion,
    #[strum(serialize = "MRI_Structural")]
    MriStructural,
    #[strum(serialize = "MRI_Functional")]
    MriFunctional,
    #[strum(serialize = "MRI_Perfusion")]
    MriPerfusion,
    #[strum(serialize = "PET_Static")]
    PetStatic,
    #[strum(serialize = "PET_Dynamic")]
    PetDynamic,
    #[strum(serialize = "iEEG_ECoG")]
    IeegEcog,
    #[strum(serialize = "iEEG_SEEG")]
    IeegSeeg,
}

impl SecondaryModality {
    /// Bucket for a file, from its datatype and `rec` entity.
    pub fn classify(datatype: Datatype, rec: Option<&str>) -> Option<Self> {
        match datatype {
            Datatype::Dwi => Some(Self::MriDiffusion),
            Datatype::Anat => Some(Self::MriStructural),
            Datatype::Func => Some(Self::MriFunctional),
            Datatype::Perf => Some(Self::MriPerfusion),
            Datatype::Pet => match rec? {
                rec if PET_STATIC_RECONSTRUCTIONS.contains(&rec) => Some(Self::PetStatic),
                rec if PET_DYNAMIC_RECONSTRUCTIONS.contains(&rec) => Some(Self::PetDynamic),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Folds per-file contexts into dataset statistics.
///
/// Each file is passed to [`Summary::update`] once, in traversal order.
/// Counters only grow; [`Summary::reset`] starts over.
#[derive(Debug, Clone)]
pub struct Summary {
    config: SummaryConfig,
    sessions: IndexSet<String>,
    subjects: IndexSet<String>,
    subject_metadata: Vec<SubjectMetadata>,
    tasks: IndexSet<String>,
    datatypes: IndexSet<String>,
    total_files: i64,
    size: u64,
    data_processed: bool,
    pet: Map<String, Value>,
    modality_counts: IndexMap<Modality, u64>,
    secondary_counts: IndexMap<SecondaryModality, u64>,
}

impl Default for Summary {
    fn default() -> Self {
        Self::new(SummaryConfig::default())
    }
}

impl Summary {
    pub fn new(config: SummaryConfig) -> Self {
        Self {
            total_files: config.initial_file_count(),
            config,
            sessions: IndexSet::new(),
            subjects: IndexSet::new(),
            subject_metadata: Vec::new(),
            tasks: IndexSet::new(),
            datatypes: IndexSet::new(),
            size: 0,
            data_processed: false,
            pet: Map::new(),
            modality_counts: PRIMARY_MODALITIES.iter().map(|m| (*m, 0)).collect(),
            secondary_counts: SecondaryModality::iter().map(|m| (m, 0)).collect(),
        }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    /// Return to the freshly constructed state, keeping the config.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Fold one file's context into the summary.
    ///
    /// Files under `/derivatives` leave the summary untouched.
    pub fn update(&mut self, context: &Context<'_>) -> Result<(), BidsError> {
        let path = context.path();
        if path.starts_with("/derivatives") {
            trace!(path, "derivatives file skipped");
            return Ok(());
        }

        self.total_files += 1;
        self.size += context.file.size()?;

        if let Some(subject) = context.entities.get("sub") {
            self.subjects.insert(subject.to_string());
        }
        if let Some(session) = context.entities.get("ses") {
            self.sessions.insert(session.to_string());
        }

        if let Some(datatype) = context.datatype {
            self.datatypes.insert(datatype.to_string());
            if let Some(bucket) = SecondaryModality::classify(datatype, context.entities.get("rec")) {
                *self.secondary_counts.entry(bucket).or_default() += 1;
            }
        }

        if let Some(json) = context.json()? {
            if let Some(task) = json.get("TaskName").and_then(Value::as_str) {
                self.tasks.insert(task.to_string());
            }
        }

        if let Some(modality) = context.modality {
            if let Some(count) = self.modality_counts.get_mut(&modality) {
                *count += 1;
            }
        }

        if path.contains("participants.tsv") {
            self.subject_metadata = collect_subject_metadata(&context.file.text()?);
        }

        trace!(path, total_files = self.total_files, "summary updated");
        Ok(())
    }

    /// Primary modalities seen, most files first.
    ///
    /// On equal counts any other modality ranks ahead of MRI.
    pub fn modalities(&self) -> Vec<String> {
        let mut ranked: Vec<(Modality, u64)> = self
            .modality_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(modality, count)| (*modality, *count))
            .collect();
        ranked.sort_by(|(a, a_count), (b, b_count)| {
            b_count
                .cmp(a_count)
                .then_with(|| (*a == Modality::Mri).cmp(&(*b == Modality::Mri)))
        });
        ranked
            .into_iter()
            .map(|(modality, _)| modality.display_name().to_string())
            .collect()
    }

    /// Secondary buckets seen, most files first.
    pub fn secondary_modalities(&self) -> Vec<String> {
        let mut ranked: Vec<(SecondaryModality, u64)> = self
            .secondary_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(bucket, count)| (*bucket, *count))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| b.cmp(a));
        ranked.into_iter().map(|(bucket, _)| bucket.to_string()).collect()
    }

    /// Snapshot of the current state.
    pub fn format_output(&self) -> SummaryOutput {
        SummaryOutput {
            sessions: self.sessions.iter().cloned().collect(),
            subjects: self.subjects.iter().cloned().collect(),
            subject_metadata: self.subject_metadata.clone(),
            tasks: self.tasks.iter().cloned().collect(),
            modalities: self.modalities(),
            secondary_modalities: self.secondary_modalities(),
            total_files: self.total_files,
            size: self.size,
            data_processed: self.data_processed,
            pet: self.pet.clone(),
            datatypes: self.datatypes.iter().cloned().collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_modality_count(&mut self, modality: Modality, count: u64) {
        if let Some(slot) = self.modality_counts.get_mut(&modality) {
            *slot = count;
        }
    }
}
