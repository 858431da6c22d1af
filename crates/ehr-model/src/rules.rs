//! Per-collection cleaning rules.
//!
//! Every collection runs through the same cleaning routine; the differences
//! between patients, visits, lab results, and ICD codes live entirely in the
//! [`CollectionRules`] value attached to each one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::CollectionKind;

/// A structural rule that must hold after normalization. Any failure aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Invariant {
    /// Non-null values in the field are pairwise distinct.
    Unique { field: String },
    /// No value in the field is null.
    NotNull { field: String },
    /// Every value in the field is exactly one of `allowed` (null fails).
    OneOf { field: String, allowed: Vec<String> },
}

impl Invariant {
    pub fn unique(field: impl Into<String>) -> Self {
        Self::Unique {
            field: field.into(),
        }
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull {
            field: field.into(),
        }
    }

    pub fn one_of<I, S>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// The column this invariant inspects.
    pub fn field(&self) -> &str {
        match self {
            Invariant::Unique { field }
            | Invariant::NotNull { field }
            | Invariant::OneOf { field, .. } => field,
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::Unique { field } => write!(f, "unique({field})"),
            Invariant::NotNull { field } => write!(f, "not_null({field})"),
            Invariant::OneOf { field, allowed } => {
                write!(f, "one_of({field}: {})", allowed.join("|"))
            }
        }
    }
}

/// An advisory rule matching rows where some fields are present and others absent.
///
/// The built-in instance flags patients that carry an insurance identifier
/// but no name, but any presence/absence combination can be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRule {
    /// Identifier used in logs and JSON summaries.
    pub name: String,
    /// Plural noun phrase used in the report, e.g. "orphaned insurance IDs".
    pub label: String,
    /// Fields that must be non-null for a row to match.
    #[serde(default)]
    pub present: Vec<String>,
    /// Fields that must be null for a row to match.
    #[serde(default)]
    pub absent: Vec<String>,
}

impl PresenceRule {
    pub fn orphaned_insurance_ids() -> Self {
        Self {
            name: "orphaned_insurance_ids".to_string(),
            label: "orphaned insurance IDs".to_string(),
            present: vec!["insurance_id".to_string()],
            absent: vec!["first_name".to_string(), "last_name".to_string()],
        }
    }

    /// Fields referenced by the rule, present fields first.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.present
            .iter()
            .chain(self.absent.iter())
            .map(String::as_str)
    }
}

/// Everything the cleaning routine needs to know about one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRules {
    pub kind: CollectionKind,
    #[serde(default)]
    pub date_fields: Vec<String>,
    #[serde(default)]
    pub amount_fields: Vec<String>,
    #[serde(default)]
    pub invariants: Vec<Invariant>,
    #[serde(default)]
    pub anomaly_rules: Vec<PresenceRule>,
}

impl CollectionRules {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            date_fields: Vec::new(),
            amount_fields: Vec::new(),
            invariants: Vec::new(),
            anomaly_rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_date_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_amount_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amount_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_invariant(mut self, invariant: Invariant) -> Self {
        self.invariants.push(invariant);
        self
    }

    #[must_use]
    pub fn with_anomaly_rule(mut self, rule: PresenceRule) -> Self {
        self.anomaly_rules.push(rule);
        self
    }

    /// Built-in rules for one collection.
    pub fn for_kind(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Patients => Self::new(kind)
                .with_date_fields(["date_of_birth", "insurance_effective_date"])
                .with_invariant(Invariant::unique("patient_id"))
                .with_invariant(Invariant::not_null("patient_id"))
                .with_anomaly_rule(PresenceRule::orphaned_insurance_ids()),
            CollectionKind::Visits => Self::new(kind)
                .with_date_fields(["visit_date", "follow_up_date"])
                .with_amount_fields(["billable_amount"])
                .with_invariant(Invariant::unique("visit_id"))
                .with_invariant(Invariant::not_null("visit_id"))
                .with_invariant(Invariant::not_null("patient_id")),
            CollectionKind::LabResults => Self::new(kind)
                .with_date_fields(["date_performed", "date_resulted"])
                .with_invariant(Invariant::unique("lab_id"))
                .with_invariant(Invariant::not_null("lab_id"))
                .with_invariant(Invariant::not_null("visit_id")),
            CollectionKind::IcdCodes => Self::new(kind)
                .with_date_fields(["effective_date"])
                .with_invariant(Invariant::one_of("status", ["Active", "Inactive"])),
        }
    }

    /// Built-in rules for all four collections, in processing order.
    pub fn defaults() -> Vec<Self> {
        CollectionKind::ALL.into_iter().map(Self::for_kind).collect()
    }

    /// Columns the source file must provide, in first-mention order.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        let mentioned = self
            .date_fields
            .iter()
            .map(String::as_str)
            .chain(self.amount_fields.iter().map(String::as_str))
            .chain(self.invariants.iter().map(Invariant::field))
            .chain(self.anomaly_rules.iter().flat_map(PresenceRule::fields));
        for column in mentioned {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}
