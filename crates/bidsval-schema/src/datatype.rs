//! Datatype and modality classification.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Datatype directories recognized by the convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Anat,
    Beh,
    Dwi,
    Eeg,
    Fmap,
    Func,
    Ieeg,
    Meg,
    Micr,
    Motion,
    Nirs,
    Perf,
    Pet,
}

impl Datatype {
    /// Datatype of a file, taken from the name of its parent directory.
    pub fn from_path(path: &str) -> Option<Self> {
        let mut parts = path.rsplit('/');
        parts.next()?;
        parts.next()?.parse().ok()
    }

    /// Primary modality this datatype belongs to.
    pub fn modality(self) -> Modality {
        match self {
            Datatype::Anat | Datatype::Dwi | Datatype::Fmap | Datatype::Func | Datatype::Perf => {
                Modality::Mri
            }
            Datatype::Beh => Modality::Beh,
            Datatype::Eeg => Modality::Eeg,
            Datatype::Ieeg => Modality::Ieeg,
            Datatype::Meg => Modality::Meg,
            Datatype::Micr => Modality::Microscopy,
            Datatype::Motion => Modality::Motion,
            Datatype::Nirs => Modality::Nirs,
            Datatype::Pet => Modality::Pet,
        }
    }
}

/// Primary data acquisition category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Mri,
    Pet,
    Meg,
    Eeg,
    Ieeg,
    Microscopy,
    Beh,
    Nirs,
    Motion,
}

impl Modality {
    /// Name used in reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Modality::Mri => "MRI",
            Modality::Pet => "PET",
            Modality::Meg => "MEG",
            Modality::Eeg => "EEG",
            Modality::Ieeg => "iEEG",
            Modality::Microscopy => "Microscopy",
            Modality::Beh => "beh",
            Modality::Nirs => "nirs",
            Modality::Motion => "motion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_from_path() {
        assert_eq!(
            Datatype::from_path("/sub-01/func/sub-01_task-rest_bold.nii.gz"),
            Some(Datatype::Func)
        );
        assert_eq!(
            Datatype::from_path("/sub-01/ses-01/pet/sub-01_ses-01_pet.nii.gz"),
            Some(Datatype::Pet)
        );
        assert_eq!(Datatype::from_path("/sub-01/sub-01_scans.tsv"), None);
        assert_eq!(Datatype::from_path("/participants.tsv"), None);
        assert_eq!(Datatype::from_path("participants.tsv"), None);
    }

    #[test]
    fn test_modality_mapping() {
        assert_eq!(Datatype::Dwi.modality(), Modality::Mri);
        assert_eq!(Datatype::Micr.modality(), Modality::Microscopy);
        assert_eq!(Datatype::Ieeg.modality(), Modality::Ieeg);
        assert_eq!(Modality::Ieeg.display_name(), "iEEG");
        assert_eq!(Modality::Microscopy.as_ref(), "microscopy");
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(Datatype::Anat.to_string(), "anat");
        assert_eq!("meg".parse::<Datatype>().unwrap(), Datatype::Meg);
        assert!("Anat".parse::<Datatype>().is_err());
        assert_eq!(serde_json::to_string(&Modality::Mri).unwrap(), r#""mri""#);
    }
}
