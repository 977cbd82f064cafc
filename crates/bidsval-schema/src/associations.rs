//! Companion files associated with data files.
//!
//! For any given data file we check every entry of [`ASSOCIATIONS`]. A file
//! in the dataset is a candidate for an entry when:
//!
//! - its suffix matches the entry's suffix,
//! - its extension is one of the entry's extensions,
//! - every entity it carries is present on the data file with the same value.
//!
//! Entries that allow inheritance collect candidates at every directory level
//! from the root down to the data file's directory; the others only look in
//! the data file's own directory.

use indexmap::IndexMap;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};
use tracing::warn;

use bidsval_core::{BidsError, BidsFile, FileEntities, FileTree};

use crate::dwi::{parse_bval, parse_bvec};
use crate::tsv::{numeric_column, parse_tsv};

/// Kinds of companion file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    Events,
    Aslcontext,
    M0scan,
    Magnitude,
    Magnitude1,
    Bval,
    Bvec,
    Channels,
    Coordsystem,
}

impl AssociationKind {
    /// Static description of this kind.
    pub fn descriptor(self) -> &'static AssociationDescriptor {
        &ASSOCIATIONS[self as usize]
    }
}

/// `events.tsv` contents relevant to validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventsAssociation {
    pub path: String,
    pub n_rows: usize,
    pub onset: Vec<Option<f64>>,
}

/// `aslcontext.tsv` contents relevant to validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AslContextAssociation {
    pub path: String,
    pub n_rows: usize,
    pub volume_type: Vec<String>,
}

/// Gradient table dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientAssociation {
    pub path: String,
    pub n_cols: usize,
}

/// `channels.tsv` contents relevant to validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelsAssociation {
    pub path: String,
    #[serde(rename = "type")]
    pub channel_type: Vec<String>,
}

/// A bare reference to an associated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathAssociation {
    pub path: String,
}

/// Loaded data of an associated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssociationPayload {
    Events(EventsAssociation),
    AslContext(AslContextAssociation),
    Gradient(GradientAssociation),
    Channels(ChannelsAssociation),
    Path(PathAssociation),
}

impl AssociationPayload {
    /// Dataset relative path of the associated file.
    pub fn path(&self) -> &str {
        match self {
            AssociationPayload::Events(a) => &a.path,
            AssociationPayload::AslContext(a) => &a.path,
            AssociationPayload::Gradient(a) => &a.path,
            AssociationPayload::Channels(a) => &a.path,
            AssociationPayload::Path(a) => &a.path,
        }
    }
}

/// Outcome of resolving one association kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationMatch {
    /// Exactly one candidate, loaded.
    Resolved(AssociationPayload),
    /// Several candidates; paths in discovery order, shallowest first.
    Ambiguous { candidates: Vec<String> },
}

/// Loader turning a matched file into its payload.
pub type AssociationLoader = fn(&dyn BidsFile) -> Result<AssociationPayload, BidsError>;

/// Static description of an association kind.
#[derive(Debug)]
pub struct AssociationDescriptor {
    pub kind: AssociationKind,
    pub suffix: &'static str,
    pub extensions: &'static [&'static str],
    pub inherit: bool,
    pub load: AssociationLoader,
}

impl AssociationDescriptor {
    /// Whether a parsed filename has this kind's suffix and an accepted extension.
    pub fn accepts(&self, parsed: &FileEntities) -> bool {
        parsed.suffix == self.suffix && self.extensions.contains(&parsed.extension.as_str())
    }
}

const NIFTI: &[&str] = &[".nii", ".nii.gz"];

/// One entry per [`AssociationKind`], in declaration order.
pub static ASSOCIATIONS: [AssociationDescriptor; 9] = [
    AssociationDescriptor {
        kind: AssociationKind::Events,
        suffix: "events",
        extensions: &[".tsv"],
        inherit: true,
        load: load_events,
    },
    AssociationDescriptor {
        kind: AssociationKind::Aslcontext,
        suffix: "aslcontext",
        extensions: &[".tsv"],
        inherit: true,
        load: load_aslcontext,
    },
    AssociationDescriptor {
        kind: AssociationKind::M0scan,
        suffix: "m0scan",
        extensions: NIFTI,
        inherit: false,
        load: load_path,
    },
    AssociationDescriptor {
        kind: AssociationKind::Magnitude,
        suffix: "magnitude",
        extensions: NIFTI,
        inherit: false,
        load: load_path,
    },
    AssociationDescriptor {
        kind: AssociationKind::Magnitude1,
        suffix: "magnitude1",
        extensions: NIFTI,
        inherit: false,
        load: load_path,
    },
    AssociationDescriptor {
        kind: AssociationKind::Bval,
        suffix: "dwi",
        extensions: &[".bval"],
        inherit: true,
        load: load_bval,
    },
    AssociationDescriptor {
        kind: AssociationKind::Bvec,
        suffix: "dwi",
        extensions: &[".bvec"],
        inherit: true,
        load: load_bvec,
    },
    AssociationDescriptor {
        kind: AssociationKind::Channels,
        suffix: "channels",
        extensions: &[".tsv"],
        inherit: true,
        load: load_channels,
    },
    AssociationDescriptor {
        kind: AssociationKind::Coordsystem,
        suffix: "coordsystem",
        extensions: &[".json"],
        inherit: true,
        load: load_path,
    },
];

fn load_events(file: &dyn BidsFile) -> Result<AssociationPayload, BidsError> {
    let columns = parse_tsv(&file.text()?);
    let onset = numeric_column(&columns, "onset");
    Ok(AssociationPayload::Events(EventsAssociation {
        path: file.path().to_string(),
        n_rows: onset.len(),
        onset,
    }))
}

fn load_aslcontext(file: &dyn BidsFile) -> Result<AssociationPayload, BidsError> {
    let mut columns = parse_tsv(&file.text()?);
    let volume_type = columns.swap_remove("volume_type").unwrap_or_default();
    Ok(AssociationPayload::AslContext(AslContextAssociation {
        path: file.path().to_string(),
        n_rows: volume_type.len(),
        volume_type,
    }))
}

fn load_bval(file: &dyn BidsFile) -> Result<AssociationPayload, BidsError> {
    let values = parse_bval(&file.text()?).map_err(|m| BidsError::parse(file.path(), m))?;
    Ok(AssociationPayload::Gradient(GradientAssociation {
        path: file.path().to_string(),
        n_cols: values.len(),
    }))
}

fn load_bvec(file: &dyn BidsFile) -> Result<AssociationPayload, BidsError> {
    let rows = parse_bvec(&file.text()?).map_err(|m| BidsError::parse(file.path(), m))?;
    Ok(AssociationPayload::Gradient(GradientAssociation {
        path: file.path().to_string(),
        n_cols: rows.first().map_or(0, Vec::len),
    }))
}

fn load_channels(file: &dyn BidsFile) -> Result<AssociationPayload, BidsError> {
    let mut columns = parse_tsv(&file.text()?);
    Ok(AssociationPayload::Channels(ChannelsAssociation {
        path: file.path().to_string(),
        channel_type: columns.swap_remove("type").unwrap_or_default(),
    }))
}

fn load_path(file: &dyn BidsFile) -> Result<AssociationPayload, BidsError> {
    Ok(AssociationPayload::Path(PathAssociation {
        path: file.path().to_string(),
    }))
}

/// Resolved associations of one data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Associations(IndexMap<AssociationKind, AssociationMatch>);

impl Associations {
    /// Loaded payload for a kind, if exactly one candidate was found.
    pub fn get(&self, kind: AssociationKind) -> Option<&AssociationPayload> {
        match self.0.get(&kind)? {
            AssociationMatch::Resolved(payload) => Some(payload),
            AssociationMatch::Ambiguous { .. } => None,
        }
    }

    /// Raw match for a kind.
    pub fn get_match(&self, kind: AssociationKind) -> Option<&AssociationMatch> {
        self.0.get(&kind)
    }

    /// Kinds with more than one candidate, and those candidates.
    pub fn ambiguous(&self) -> impl Iterator<Item = (AssociationKind, &[String])> {
        self.0.iter().filter_map(|(kind, m)| match m {
            AssociationMatch::Ambiguous { candidates } => Some((*kind, candidates.as_slice())),
            AssociationMatch::Resolved(_) => None,
        })
    }

    /// Iterate all kinds found, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssociationKind, &AssociationMatch)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Directory part of a dataset relative file path.
fn parent_path(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((dir, _)) => dir,
    }
}

/// Files whose entities are a consistent subset of `source`'s, walking from
/// the root toward `source_path`.
///
/// Ignored files and the source file itself are never candidates.
pub(crate) fn find_candidates<'t>(
    tree: &'t FileTree,
    source_path: &str,
    source: &FileEntities,
    inherit: bool,
    accept: impl Fn(&FileEntities) -> bool,
) -> Vec<&'t dyn BidsFile> {
    let source_dir = parent_path(source_path);
    let mut found = Vec::new();
    let mut level = Some(tree.root());

    while let Some(dir) = level {
        if inherit || dir.path == source_dir {
            for file in &dir.files {
                if file.path() == source_path || file.ignored() {
                    continue;
                }
                let parsed = FileEntities::parse(file.name());
                if accept(&parsed) && parsed.is_subset_of(&source.entities) {
                    found.push(file.as_ref());
                }
            }
        }
        level = tree.subdirectories(dir).find(|d| d.contains(source_path));
    }
    found
}

/// Resolve every association kind for a file.
pub fn resolve_associations(
    tree: &FileTree,
    file: &dyn BidsFile,
    entities: &FileEntities,
) -> Result<Associations, BidsError> {
    let mut associations = Associations::default();

    for descriptor in &ASSOCIATIONS {
        let candidates = find_candidates(tree, file.path(), entities, descriptor.inherit, |parsed| {
            descriptor.accepts(parsed)
        });

        let resolved = match candidates.as_slice() {
            [] => continue,
            [only] => AssociationMatch::Resolved((descriptor.load)(*only)?),
            many => {
                let candidates: Vec<String> = many.iter().map(|f| f.path().to_string()).collect();
                warn!(
                    file = file.path(),
                    kind = descriptor.kind.as_ref(),
                    ?candidates,
                    "ambiguous association"
                );
                AssociationMatch::Ambiguous { candidates }
            }
        };
        associations.0.insert(descriptor.kind, resolved);
    }

    Ok(associations)
}
