use serde::{Deserialize, Serialize};

/// A single NIST SP 800-171 security requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Control {
    pub key: String,
    pub category: String,
    #[serde(rename = "type")]
    pub control_type: String,
    pub description: String,
    pub discussion: String,
}

/// One row of the SP 800-171A assessment procedures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assessment {
    pub key: String,
    pub parent_key: String,
    pub requirement: String,
    pub objective: String,
    pub examine: Vec<String>,
    pub interview: Vec<String>,
    pub test: Vec<String>,
}

impl Assessment {
    pub fn is_parent(&self) -> bool {
        self.key == self.parent_key
    }
}

/// DoD assessment methodology scoring row. `points` is empty for NA, a single
/// value for a flat penalty, or a `[low, high]` band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    pub key: String,
    pub description: String,
    pub points: Vec<i32>,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Objective {
    pub key: String,
    pub objective: String,
    pub penalty: i32,
    pub noncompliance: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompiledAssessment {
    pub examine: String,
    pub interview: String,
    pub test: String,
    pub objectives: Vec<Objective>,
}

/// Output record: control fields followed by the reconciled assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompiledControl {
    pub key: String,
    pub category: String,
    #[serde(rename = "type")]
    pub control_type: String,
    pub description: String,
    pub discussion: String,
    pub assessment: CompiledAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CmmcMapping {
    pub key: String,
    pub name: String,
    pub description: String,
    pub references: Vec<String>,
    pub nist_key: String,
    pub domain: String,
    pub domain_short: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CsfMapping {
    pub nist_key: String,
    pub csf_key: String,
    pub description: String,
}

/// A flattened SP 800-53 control or enhancement from an OSCAL catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogControl {
    pub id: String,
    pub title: String,
    pub family: String,
    pub parent: Option<String>,
}
