//! Presence-rule anomaly detection.
//!
//! A [`PresenceRule`] selects rows where every `present` field is non-null
//! and every `absent` field is null. Findings never fail a run; they are
//! rendered into a plain-text report for manual review.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Table};
use polars::prelude::{BooleanChunked, DataFrame, DataType, NewChunkedArray};

use ehr_model::{CollectionKind, CollectionRules, PresenceRule};

use crate::error::{Result, ValidationError};

/// Rows of one collection matched by one presence rule.
#[derive(Debug, Clone)]
pub struct AnomalyFinding {
    pub collection: CollectionKind,
    pub rule: PresenceRule,
    /// Matching rows with every column, in table order.
    pub rows: DataFrame,
}

impl AnomalyFinding {
    pub fn row_count(&self) -> usize {
        self.rows.height()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.height() == 0
    }

    /// First line of the report section, e.g. `No orphaned insurance IDs found.`
    pub fn headline(&self) -> String {
        if self.is_empty() {
            format!("No {} found.", self.rule.label)
        } else {
            format!(
                "{} found ({} rows):",
                capitalize(&self.rule.label),
                self.row_count()
            )
        }
    }

    /// The report section: the headline, then a dump of every matching row.
    pub fn render(&self, null_marker: &str) -> Result<String> {
        let mut out = self.headline();
        out.push('\n');
        if !self.is_empty() {
            out.push_str(&dump_rows(&self.rows, null_marker)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Values of `field` for every matching row, nulls as `None`.
    pub fn values(&self, field: &str) -> Result<Vec<Option<String>>> {
        let column = self
            .rows
            .column(field)
            .map_err(|_| ValidationError::MissingColumn {
                collection: self.collection,
                field: field.to_string(),
            })?
            .cast(&DataType::String)?;
        Ok(column
            .str()?
            .into_iter()
            .map(|value| value.map(String::from))
            .collect())
    }
}

/// Findings from every collection of a run.
#[derive(Debug, Clone, Default)]
pub struct AnomalyReport {
    findings: Vec<AnomalyFinding>,
}

impl AnomalyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = AnomalyFinding>) {
        self.findings.extend(findings);
    }

    pub fn findings(&self) -> &[AnomalyFinding] {
        &self.findings
    }

    /// Total matching rows across every rule.
    pub fn total_rows(&self) -> usize {
        self.findings.iter().map(AnomalyFinding::row_count).sum()
    }

    /// Report text; one section per rule, in evaluation order.
    pub fn render(&self, null_marker: &str) -> Result<String> {
        let mut out = String::new();
        for finding in &self.findings {
            out.push_str(&finding.render(null_marker)?);
        }
        Ok(out)
    }
}

/// Evaluate every presence rule of `rules` against the cleaned table.
pub fn detect_anomalies(rules: &CollectionRules, df: &DataFrame) -> Result<Vec<AnomalyFinding>> {
    rules
        .anomaly_rules
        .iter()
        .map(|rule| {
            Ok(AnomalyFinding {
                collection: rules.kind,
                rule: rule.clone(),
                rows: matching_rows(df, rules.kind, rule)?,
            })
        })
        .collect()
}

/// Rows of `df` matched by `rule`.
pub fn matching_rows(
    df: &DataFrame,
    collection: CollectionKind,
    rule: &PresenceRule,
) -> Result<DataFrame> {
    let mut mask = vec![true; df.height()];
    let checks = rule
        .present
        .iter()
        .map(|field| (field, false))
        .chain(rule.absent.iter().map(|field| (field, true)));
    for (field, want_null) in checks {
        let column = df
            .column(field)
            .map_err(|_| ValidationError::MissingColumn {
                collection,
                field: field.clone(),
            })?;
        let nulls = column.as_materialized_series().is_null();
        for (keep, is_null) in mask.iter_mut().zip(nulls.into_iter()) {
            *keep &= is_null == Some(want_null);
        }
    }
    let mask = BooleanChunked::from_slice("anomaly_mask".into(), &mask);
    Ok(df.filter(&mask)?)
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Plain column dump: header of column names, no row index, no borders.
fn dump_rows(df: &DataFrame, null_marker: &str) -> Result<String> {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(
        df.get_column_names()
            .into_iter()
            .map(|name| Cell::new(name.as_str())),
    );

    let columns = df
        .get_columns()
        .iter()
        .map(|column| column.cast(&DataType::String))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let columns = columns
        .iter()
        .map(|column| column.str())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for idx in 0..df.height() {
        table.add_row(
            columns
                .iter()
                .map(|values| Cell::new(values.get(idx).unwrap_or(null_marker))),
        );
    }

    let rendered = table
        .lines()
        .map(|line| {
            let line = line.strip_prefix(' ').unwrap_or(&line);
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>();
    Ok(rendered.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    fn patients() -> DataFrame {
        DataFrame::new(vec![
            Series::new("patient_id".into(), ["P1", "P2", "P3"]).into(),
            Series::new("first_name".into(), [Some("Ann"), None, None]).into(),
            Series::new("last_name".into(), [Some("Lee"), None, Some("Roe")]).into(),
            Series::new("insurance_id".into(), [Some("INS1"), Some("INS9"), None]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn selects_present_and_absent_combination() {
        let rows = matching_rows(
            &patients(),
            CollectionKind::Patients,
            &PresenceRule::orphaned_insurance_ids(),
        )
        .unwrap();
        assert_eq!(rows.height(), 1);
        let ids = rows.column("patient_id").unwrap().str().unwrap();
        assert_eq!(ids.get(0), Some("P2"));
    }

    #[test]
    fn missing_rule_field_is_an_error() {
        let df = patients().drop("last_name").unwrap();
        let err = matching_rows(
            &df,
            CollectionKind::Patients,
            &PresenceRule::orphaned_insurance_ids(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::MissingColumn { ref field, .. } if field == "last_name"));
    }

    #[test]
    fn headline_reflects_match_count() {
        let rules = CollectionRules::for_kind(CollectionKind::Patients);
        let findings = detect_anomalies(&rules, &patients()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].headline(), "Orphaned insurance IDs found (1 rows):");

        let clean = patients().head(Some(1));
        let findings = detect_anomalies(&rules, &clean).unwrap();
        assert_eq!(findings[0].headline(), "No orphaned insurance IDs found.");
        assert_eq!(
            findings[0].render("null").unwrap(),
            "No orphaned insurance IDs found.\n"
        );
    }

    #[test]
    fn render_dumps_rows_with_null_marker() {
        let rules = CollectionRules::for_kind(CollectionKind::Patients);
        let findings = detect_anomalies(&rules, &patients()).unwrap();
        let text = findings[0].render("null").unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Orphaned insurance IDs found (1 rows):");
        assert!(lines[1].starts_with("patient_id"));
        for name in ["first_name", "last_name", "insurance_id"] {
            assert!(lines[1].contains(name), "header {:?}", lines[1]);
        }
        let cells: Vec<&str> = lines[2].split_whitespace().collect();
        assert_eq!(cells, vec!["P2", "null", "null", "INS9"]);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn rules_without_anomalies_yield_no_findings() {
        let rules = CollectionRules::for_kind(CollectionKind::Visits);
        let df = DataFrame::new(vec![Series::new("visit_id".into(), ["V1"]).into()]).unwrap();
        assert!(detect_anomalies(&rules, &df).unwrap().is_empty());
    }
}
