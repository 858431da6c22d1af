//! Table-driven tests running the cleaning pipeline over every collection.

use polars::prelude::*;

use ehr_model::{CollectionKind, CollectionRules, PipelineConfig};
use ehr_transform::{CleaningOptions, CleaningStats, TablePipeline};

fn frame(columns: &[(&str, &[Option<&str>])]) -> DataFrame {
    let cols: Vec<Column> = columns
        .iter()
        .map(|(name, values)| Series::new((*name).into(), values.to_vec()).into_column())
        .collect();
    DataFrame::new(cols).unwrap()
}

fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(String::from))
        .collect()
}

fn raw_frame(kind: CollectionKind) -> DataFrame {
    match kind {
        CollectionKind::Patients => frame(&[
            ("patient_id", &[Some("P1"), Some("P2")]),
            ("first_name", &[Some("Ann"), Some("unknown")]),
            ("last_name", &[Some("Lee"), Some("N/A")]),
            ("date_of_birth", &[Some("03/14/1980"), Some("DOB")]),
            ("insurance_id", &[Some("INS1"), Some("INS9")]),
            ("insurance_effective_date", &[Some("2020.01.15"), Some("15-01-2020")]),
        ]),
        CollectionKind::Visits => frame(&[
            ("visit_id", &[Some("V1"), Some("V2")]),
            ("patient_id", &[Some("P1"), Some("P2")]),
            ("visit_date", &[Some("2021/06/30"), Some("yesterday")]),
            ("follow_up_date", &[None, Some("07-15-2021")]),
            ("billable_amount", &[Some(" 42.50 "), Some("??")]),
        ]),
        CollectionKind::LabResults => frame(&[
            ("lab_id", &[Some("L1"), Some("L2")]),
            ("visit_id", &[Some("V1"), Some("V2")]),
            ("date_performed", &[Some("30/06/2021"), Some("2021-06-30")]),
            ("date_resulted", &[Some("none"), Some("2021-07-02")]),
        ]),
        CollectionKind::IcdCodes => frame(&[
            ("code", &[Some("E11.9"), Some("I10")]),
            ("effective_date", &[Some("10.01.2015"), Some("")]),
            ("status", &[Some("Active"), Some("Inactive")]),
        ]),
    }
}

fn expected_stats(kind: CollectionKind) -> CleaningStats {
    let (placeholders_nulled, dates_parsed, dates_dropped, amounts_defaulted) = match kind {
        CollectionKind::Patients => (3, 3, 0, 0),
        CollectionKind::Visits => (1, 2, 1, 1),
        CollectionKind::LabResults => (1, 3, 0, 0),
        CollectionKind::IcdCodes => (1, 1, 0, 0),
    };
    CleaningStats {
        rows: 2,
        placeholders_nulled,
        dates_parsed,
        dates_dropped,
        amounts_defaulted,
    }
}

#[test]
fn cleans_every_default_collection() {
    let pipeline = TablePipeline::standard(CleaningOptions::from_config(&PipelineConfig::default()));
    for kind in CollectionKind::ALL {
        let rules = CollectionRules::for_kind(kind);
        let mut df = raw_frame(kind);

        let stats = pipeline.execute(&mut df, &rules).unwrap();

        assert_eq!(stats, expected_stats(kind), "stats for {kind}");
        assert_eq!(df.height(), 2, "row count for {kind}");
        for field in &rules.date_fields {
            for value in strings(&df, field).into_iter().flatten() {
                assert_eq!(value.len(), 10, "{kind}.{field} = {value}");
                assert_eq!(&value[4..5], "-");
                assert_eq!(&value[7..8], "-");
            }
        }
    }
}

#[test]
fn patient_fields_are_normalized() {
    let mut df = raw_frame(CollectionKind::Patients);
    TablePipeline::default()
        .execute(&mut df, &CollectionRules::for_kind(CollectionKind::Patients))
        .unwrap();

    assert_eq!(
        strings(&df, "date_of_birth"),
        vec![Some("1980-03-14".to_string()), None]
    );
    assert_eq!(
        strings(&df, "insurance_effective_date"),
        vec![Some("2020-01-15".to_string()), Some("2020-01-15".to_string())]
    );
    assert_eq!(strings(&df, "first_name"), vec![Some("Ann".to_string()), None]);
    assert_eq!(strings(&df, "insurance_id")[1].as_deref(), Some("INS9"));
}

#[test]
fn visit_amounts_become_floats() {
    let mut df = raw_frame(CollectionKind::Visits);
    TablePipeline::default()
        .execute(&mut df, &CollectionRules::for_kind(CollectionKind::Visits))
        .unwrap();

    let amounts = df.column("billable_amount").unwrap();
    assert_eq!(amounts.dtype(), &DataType::Float64);
    let values: Vec<Option<f64>> = amounts.f64().unwrap().into_iter().collect();
    assert_eq!(values, vec![Some(42.5), Some(0.0)]);
    assert_eq!(
        strings(&df, "visit_date"),
        vec![Some("2021-06-30".to_string()), None]
    );
    assert_eq!(
        strings(&df, "follow_up_date"),
        vec![None, Some("2021-07-15".to_string())]
    );
}

#[test]
fn second_pass_changes_nothing() {
    let pipeline = TablePipeline::default();
    for kind in CollectionKind::ALL {
        let rules = CollectionRules::for_kind(kind);
        let mut df = raw_frame(kind);
        pipeline.execute(&mut df, &rules).unwrap();
        let once = df.clone();

        let stats = pipeline.execute(&mut df, &rules).unwrap();

        assert!(df.equals_missing(&once), "second pass changed {kind}");
        assert_eq!(stats.placeholders_nulled, 0);
        assert_eq!(stats.dates_dropped, 0);
    }
}

#[test]
fn missing_date_field_fails() {
    let mut df = frame(&[("lab_id", &[Some("L1")]), ("visit_id", &[Some("V1")])]);
    let result = TablePipeline::default()
        .execute(&mut df, &CollectionRules::for_kind(CollectionKind::LabResults));
    assert!(result.is_err());
}

#[test]
fn standard_step_order() {
    assert_eq!(
        TablePipeline::default().step_names(),
        vec!["sentinels", "dates", "amounts"]
    );
}
