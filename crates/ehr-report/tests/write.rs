use std::fs;

use polars::prelude::*;

use ehr_model::CollectionKind;
use ehr_report::{WriteOptions, write_collections, write_report};

fn tables() -> Vec<(CollectionKind, DataFrame)> {
    CollectionKind::ALL
        .into_iter()
        .map(|kind| {
            let df = DataFrame::new(vec![
                Series::new("id".into(), [Some("A"), None]).into(),
                Series::new("amount".into(), [1.5f64, 0.0]).into(),
            ])
            .unwrap();
            (kind, df)
        })
        .collect()
}

#[test]
fn staged_write_moves_every_file_into_place() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("cleaned");
    let mut tables = tables();

    let outputs = write_collections(&mut tables, &output_dir, &WriteOptions::default()).unwrap();

    let names: Vec<String> = outputs
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "patients_clean.csv",
            "visits_clean.csv",
            "labs_clean.csv",
            "icd_clean.csv"
        ]
    );
    assert!(!output_dir.join(".staging").exists());
    let text = fs::read_to_string(output_dir.join("labs_clean.csv")).unwrap();
    assert_eq!(text, "id,amount\nA,1.5\nnull,0.0\n");
}

#[test]
fn staged_write_replaces_previous_outputs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("patients_clean.csv"), "stale\n").unwrap();
    fs::create_dir_all(dir.path().join(".staging")).unwrap();
    fs::write(dir.path().join(".staging").join("leftover.csv"), "x").unwrap();

    write_collections(&mut tables(), dir.path(), &WriteOptions::default()).unwrap();

    let text = fs::read_to_string(dir.path().join("patients_clean.csv")).unwrap();
    assert!(text.starts_with("id,amount\n"));
    assert!(!dir.path().join(".staging").exists());
}

#[test]
fn failed_staged_write_keeps_previous_outputs() {
    let dir = tempfile::tempdir().unwrap();
    for kind in CollectionKind::ALL {
        fs::write(dir.path().join(kind.output_file_name()), "previous\n").unwrap();
    }
    let mut tables = tables();
    // CSV cannot hold a list column, so staging fails on the second table.
    tables[1].1 = DataFrame::new(vec![
        Series::new(
            "tags".into(),
            &[
                Series::new("".into(), [1i32, 2]),
                Series::new("".into(), [3i32]),
            ],
        )
        .into(),
    ])
    .unwrap();

    let result = write_collections(&mut tables, dir.path(), &WriteOptions::default());

    assert!(result.is_err());
    for kind in CollectionKind::ALL {
        let text = fs::read_to_string(dir.path().join(kind.output_file_name())).unwrap();
        assert_eq!(text, "previous\n", "{kind} was replaced");
    }
    assert!(!dir.path().join(".staging").exists());
}

#[test]
fn direct_write_uses_custom_marker() {
    let dir = tempfile::tempdir().unwrap();
    let options = WriteOptions {
        null_marker: "NULL".to_string(),
        staged: false,
    };

    write_collections(&mut tables(), dir.path(), &options).unwrap();

    let text = fs::read_to_string(dir.path().join("icd_clean.csv")).unwrap();
    assert_eq!(text, "id,amount\nA,1.5\nNULL,0.0\n");
}

#[test]
fn report_creates_parents_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitoring").join("report.txt");

    write_report(&path, "first\n").unwrap();
    write_report(&path, "No orphaned insurance IDs found.\n").unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "No orphaned insurance IDs found.\n"
    );
}
