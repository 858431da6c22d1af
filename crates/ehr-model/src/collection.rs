use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four record collections in a healthcare extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Patients,
    Visits,
    LabResults,
    IcdCodes,
}

impl CollectionKind {
    /// All collections in processing order.
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Patients,
        CollectionKind::Visits,
        CollectionKind::LabResults,
        CollectionKind::IcdCodes,
    ];

    /// Stable identifier used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Patients => "patients",
            CollectionKind::Visits => "visits",
            CollectionKind::LabResults => "lab_results",
            CollectionKind::IcdCodes => "icd_codes",
        }
    }

    /// File name of the raw extract inside the input directory.
    pub fn source_file_name(self) -> &'static str {
        match self {
            CollectionKind::Patients => "patient_data.csv",
            CollectionKind::Visits => "visit_data.csv",
            CollectionKind::LabResults => "lab_results.csv",
            CollectionKind::IcdCodes => "icd_reference.csv",
        }
    }

    /// File name of the cleaned output inside the output directory.
    pub fn output_file_name(self) -> &'static str {
        match self {
            CollectionKind::Patients => "patients_clean.csv",
            CollectionKind::Visits => "visits_clean.csv",
            CollectionKind::LabResults => "labs_clean.csv",
            CollectionKind::IcdCodes => "icd_clean.csv",
        }
    }

    /// Human-readable label for summaries.
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Patients => "Patients",
            CollectionKind::Visits => "Visits",
            CollectionKind::LabResults => "Lab results",
            CollectionKind::IcdCodes => "ICD reference codes",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
