use std::fs;

use bidsval_core::{BidsError, MemoryTreeBuilder};
use bidsval_scan::{FsScanner, ValidatorConfig};
use bidsval_summary::{SummaryConfig, summarize};
use serde_json::json;
use tempfile::TempDir;

const BOLD_JSON: &str = r#"{"TaskName": "rest", "RepetitionTime": 1.2}"#;
const EVENTS_TSV: &str = "onset\tduration\n0\t1\n";

#[test]
fn test_three_file_dataset() {
    let tree = MemoryTreeBuilder::new()
        .file("/sub-01/func/sub-01_task-rest_bold.nii.gz", "0123456789")
        .file("/sub-01/func/sub-01_task-rest_events.tsv", EVENTS_TSV)
        .file("/sub-01/func/sub-01_task-rest_bold.json", BOLD_JSON)
        .build()
        .unwrap();

    let output = summarize(&tree, &SummaryConfig::default()).unwrap();
    assert_eq!(output.subjects, vec!["01"]);
    assert_eq!(output.tasks, vec!["rest"]);
    assert_eq!(output.total_files, 2);
    assert_eq!(output.modalities, vec!["MRI"]);
    assert_eq!(output.secondary_modalities, vec!["MRI_Functional"]);
    assert_eq!(output.datatypes, vec!["func"]);
    assert_eq!(output.size, (10 + EVENTS_TSV.len() + BOLD_JSON.len()) as u64);
}

#[test]
fn test_exact_file_count() {
    let tree = MemoryTreeBuilder::new()
        .file("/sub-01/anat/sub-01_T1w.nii.gz", "")
        .file("/sub-01/anat/sub-01_T2w.nii.gz", "")
        .build()
        .unwrap();
    let config = SummaryConfig::builder().legacy_file_count(false).build().unwrap();

    assert_eq!(summarize(&tree, &config).unwrap().total_files, 2);
    assert_eq!(summarize(&tree, &SummaryConfig::default()).unwrap().total_files, 1);
}

#[test]
fn test_ignored_files_not_summarized() {
    let tree = MemoryTreeBuilder::new()
        .file("/.bidsignore", "extra/\n")
        .file("/extra/sub-99_T1w.nii.gz", "")
        .file("/code/run.py", "print()")
        .file("/sub-01/anat/sub-01_T1w.nii.gz", "")
        .build()
        .unwrap();

    let output = summarize(&tree, &SummaryConfig::default()).unwrap();
    assert_eq!(output.subjects, vec!["01"]);
    assert_eq!(output.total_files, 0);
}

#[test]
fn test_unreadable_companion_aborts() {
    let tree = MemoryTreeBuilder::new()
        .file("/sub-01/dwi/sub-01_dwi.nii.gz", "")
        .file("/sub-01/dwi/sub-01_dwi.bval", "0 abc\n")
        .build()
        .unwrap();

    let err = summarize(&tree, &SummaryConfig::default()).unwrap_err();
    assert!(matches!(err, BidsError::Parse { .. }));
}

#[test]
fn test_output_wire_format() {
    let tree = MemoryTreeBuilder::new()
        .file("/participants.tsv", "participant_id\tage\tsex\nsub-01\t89+\tF\n")
        .file("/sub-01/ses-01/pet/sub-01_ses-01_rec-acstat_pet.nii.gz", "")
        .file("/sub-01/ses-01/eeg/sub-01_ses-01_task-oddball_eeg.edf", "")
        .build()
        .unwrap();

    let output = summarize(&tree, &SummaryConfig::default()).unwrap();
    let value = serde_json::to_value(&output).unwrap();

    assert_eq!(value["sessions"], json!(["01"]));
    assert_eq!(
        value["subjectMetadata"],
        json!([{"PARTICIPANT_ID": "01", "age": 89, "sex": "F"}])
    );
    assert_eq!(value["modalities"], json!(["PET", "EEG"]));
    assert_eq!(value["secondaryModalities"], json!(["PET_Static"]));
    assert_eq!(value["totalFiles"], json!(2));
    assert_eq!(value["dataProcessed"], json!(false));
    assert_eq!(value["pet"], json!({}));
}

#[test]
fn test_summarize_scanned_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for (rel, contents) in [
        ("dataset_description.json", r#"{"Name": "demo", "BIDSVersion": "1.9.0"}"#),
        ("sub-01/func/sub-01_task-rest_bold.nii.gz", "abcd"),
        ("sub-01/func/sub-01_task-rest_bold.json", BOLD_JSON),
        ("sub-02/func/sub-02_task-rest_bold.nii.gz", "abcd"),
        ("derivatives/pipeline/sub-01/func/sub-01_task-rest_desc-x_bold.json", r#"{"TaskName": "x"}"#),
        (".git/HEAD", "ref: refs/heads/main"),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    let tree = FsScanner::new().scan(&ValidatorConfig::new(root)).unwrap();
    let output = summarize(&tree, &SummaryConfig::default()).unwrap();

    assert_eq!(output.subjects, vec!["01", "02"]);
    assert_eq!(output.tasks, vec!["rest"]);
    assert_eq!(output.total_files, 3);
}
