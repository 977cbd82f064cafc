use bidsval_core::{FileTree, MemoryTreeBuilder};
use bidsval_schema::{
    AssociationKind, AssociationMatch, AssociationPayload, Context, Datatype, Modality,
};

fn build(files: &[(&str, &str)]) -> FileTree {
    files
        .iter()
        .fold(MemoryTreeBuilder::new(), |builder, (path, contents)| builder.file(*path, *contents))
        .build()
        .unwrap()
}

#[test]
fn test_events_counted_end_to_end() {
    let tree = build(&[
        ("/sub-01/func/sub-01_task-rest_bold.nii.gz", ""),
        ("/sub-01/func/sub-01_task-rest_events.tsv", "onset\tduration\n0\t1\n5\t1\n"),
    ]);
    let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.nii.gz").unwrap();
    let context = Context::build(&tree, file).unwrap();

    let Some(AssociationPayload::Events(events)) = context.associations.get(AssociationKind::Events)
    else {
        panic!("events not associated");
    };
    assert_eq!(events.n_rows, 2);
    assert_eq!(events.onset, vec![Some(0.0), Some(5.0)]);
    assert_eq!(events.path, "/sub-01/func/sub-01_task-rest_events.tsv");
}

#[test]
fn test_top_level_events_are_inherited() {
    let tree = build(&[
        ("/task-rest_events.tsv", "onset\n0\n10\n20\n"),
        ("/sub-01/func/sub-01_task-rest_bold.nii.gz", ""),
        ("/sub-02/func/sub-02_task-rest_bold.nii.gz", ""),
    ]);

    for path in [
        "/sub-01/func/sub-01_task-rest_bold.nii.gz",
        "/sub-02/func/sub-02_task-rest_bold.nii.gz",
    ] {
        let context = Context::build(&tree, tree.find_file(path).unwrap()).unwrap();
        let events = context.associations.get(AssociationKind::Events).unwrap();
        assert_eq!(events.path(), "/task-rest_events.tsv");
    }
}

#[test]
fn test_other_task_not_associated() {
    let tree = build(&[
        ("/task-nback_events.tsv", "onset\n0\n"),
        ("/sub-01/func/sub-01_task-rest_bold.nii.gz", ""),
    ]);
    let file = tree.find_file("/sub-01/func/sub-01_task-rest_bold.nii.gz").unwrap();
    let context = Context::build(&tree, file).unwrap();
    assert!(context.associations.is_empty());
}

#[test]
fn test_ambiguous_match_is_reported_not_loaded() {
    let tree = build(&[
        ("/sub-01/func/sub-01_task-rest_events.tsv", "onset\n0\n"),
        ("/sub-01/func/sub-01_task-rest_run-1_bold.nii.gz", ""),
        ("/sub-01/sub-01_task-rest_events.tsv", "not\ta\tnumber\n"),
    ]);
    let file = tree
        .find_file("/sub-01/func/sub-01_task-rest_run-1_bold.nii.gz")
        .unwrap();
    let context = Context::build(&tree, file).unwrap();

    match context.associations.get_match(AssociationKind::Events) {
        Some(AssociationMatch::Ambiguous { candidates }) => {
            assert_eq!(
                candidates,
                &vec![
                    "/sub-01/sub-01_task-rest_events.tsv".to_string(),
                    "/sub-01/func/sub-01_task-rest_events.tsv".to_string(),
                ]
            );
        }
        other => panic!("expected ambiguous events, got {other:?}"),
    }
}

#[test]
fn test_magnitude_requires_same_directory() {
    let tree = build(&[
        ("/sub-01/fmap/sub-01_magnitude1.nii.gz", ""),
        ("/sub-01/fmap/sub-01_phasediff.nii.gz", ""),
        ("/sub-01/sub-01_magnitude.nii.gz", ""),
    ]);
    let file = tree.find_file("/sub-01/fmap/sub-01_phasediff.nii.gz").unwrap();
    let context = Context::build(&tree, file).unwrap();

    assert!(context.associations.get(AssociationKind::Magnitude1).is_some());
    assert!(context.associations.get_match(AssociationKind::Magnitude).is_none());
}

#[test]
fn test_coordsystem_json_associated() {
    let tree = build(&[
        ("/sub-01/ieeg/sub-01_coordsystem.json", r#"{"iEEGCoordinateSystem": "ACPC"}"#),
        ("/sub-01/ieeg/sub-01_task-rest_ieeg.edf", ""),
    ]);
    let file = tree.find_file("/sub-01/ieeg/sub-01_task-rest_ieeg.edf").unwrap();
    let context = Context::build(&tree, file).unwrap();

    let coordsystem = context.associations.get(AssociationKind::Coordsystem).unwrap();
    assert_eq!(coordsystem.path(), "/sub-01/ieeg/sub-01_coordsystem.json");
    assert_eq!(context.datatype, Some(Datatype::Ieeg));
    assert_eq!(context.modality, Some(Modality::Ieeg));
}

#[test]
fn test_ignored_file_context_still_builds() {
    let tree = MemoryTreeBuilder::new()
        .file("/.bidsignore", "extra/\n")
        .file("/extra/notes_bold.nii.gz", "")
        .build()
        .unwrap();
    let file = tree.find_file("/extra/notes_bold.nii.gz").unwrap();
    assert!(file.ignored());

    let context = Context::build(&tree, file).unwrap();
    assert_eq!(context.datatype, None);
    assert!(context.sidecar.is_empty());
}

#[test]
fn test_associations_serialize_by_kind() {
    let tree = build(&[
        ("/sub-01/dwi/sub-01_dwi.nii.gz", ""),
        ("/sub-01/dwi/sub-01_dwi.bval", "0 1000\n"),
    ]);
    let file = tree.find_file("/sub-01/dwi/sub-01_dwi.nii.gz").unwrap();
    let context = Context::build(&tree, file).unwrap();

    let value = serde_json::to_value(&context.associations).unwrap();
    assert_eq!(value["bval"]["resolved"]["n_cols"], 2);
    assert_eq!(value["bval"]["resolved"]["path"], "/sub-01/dwi/sub-01_dwi.bval");
}
