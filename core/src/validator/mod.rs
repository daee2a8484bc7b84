use crate::compliance::model::CompiledControl;
use crate::compliance::reconciler::OBJECTIVE_PREFIX;
use crate::error::CoreResult;
use crate::extract::{compile_pattern, CONTROL_KEY_PATTERN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub result: String, // PASS|FAIL
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub overall: String, // PASS|FAIL
    pub control_count: usize,
    pub checks: Vec<CheckResult>,
}

impl ValidationSummary {
    pub fn result_for_check(&self, check_id: &str) -> (String, String) {
        for c in &self.checks {
            if c.check_id == check_id {
                return (c.result.clone(), c.message.clone());
            }
        }
        (
            "FAIL".to_string(),
            format!("missing check result for {}", check_id),
        )
    }

    pub fn passed(&self) -> bool {
        self.overall == "PASS"
    }
}

/// Re-checks the invariants of a written compiled-controls artifact.
#[derive(Debug, Default)]
pub struct OutputValidator;

impl OutputValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_file(&self, path: &Path) -> CoreResult<ValidationSummary> {
        let text = std::fs::read_to_string(path)?;
        self.validate_str(&text)
    }

    pub fn validate_str(&self, text: &str) -> CoreResult<ValidationSummary> {
        let controls: Vec<CompiledControl> = match serde_json::from_str(text) {
            Ok(c) => c,
            Err(e) => {
                return Ok(summarize(
                    0,
                    vec![fail("CHK.OUTPUT.PARSES", format!("not a compiled control array: {}", e))],
                ))
            }
        };

        let checks = vec![
            pass("CHK.OUTPUT.PARSES"),
            check_key_format(&controls)?,
            check_unique_keys(&controls),
            check_objectives_present(&controls),
            check_objective_prefix(&controls),
            check_penalties(&controls),
        ];
        Ok(summarize(controls.len(), checks))
    }
}

fn summarize(control_count: usize, checks: Vec<CheckResult>) -> ValidationSummary {
    let overall = if checks.iter().all(|c| c.result == "PASS") {
        "PASS"
    } else {
        "FAIL"
    };
    ValidationSummary {
        overall: overall.to_string(),
        control_count,
        checks,
    }
}

fn pass(check_id: &str) -> CheckResult {
    CheckResult {
        check_id: check_id.to_string(),
        result: "PASS".to_string(),
        message: "ok".to_string(),
    }
}

fn fail(check_id: &str, message: String) -> CheckResult {
    CheckResult {
        check_id: check_id.to_string(),
        result: "FAIL".to_string(),
        message,
    }
}

fn from_offenders(check_id: &str, what: &str, offenders: Vec<String>) -> CheckResult {
    if offenders.is_empty() {
        pass(check_id)
    } else {
        fail(check_id, format!("{}: {}", what, offenders.join(", ")))
    }
}

fn check_key_format(controls: &[CompiledControl]) -> CoreResult<CheckResult> {
    let key_pattern = compile_pattern(CONTROL_KEY_PATTERN)?;
    let bad = controls
        .iter()
        .filter(|c| !key_pattern.is_match(&c.key))
        .map(|c| c.key.clone())
        .collect();
    Ok(from_offenders("CHK.CONTROLS.KEY_FORMAT", "malformed control keys", bad))
}

fn check_unique_keys(controls: &[CompiledControl]) -> CheckResult {
    let mut seen = BTreeSet::new();
    let dupes = controls
        .iter()
        .filter(|c| !seen.insert(c.key.as_str()))
        .map(|c| c.key.clone())
        .collect();
    from_offenders("CHK.CONTROLS.UNIQUE_KEYS", "duplicate control keys", dupes)
}

fn check_objectives_present(controls: &[CompiledControl]) -> CheckResult {
    let empty = controls
        .iter()
        .filter(|c| c.assessment.objectives.is_empty())
        .map(|c| c.key.clone())
        .collect();
    from_offenders("CHK.OBJECTIVES.PRESENT", "controls without objectives", empty)
}

fn check_objective_prefix(controls: &[CompiledControl]) -> CheckResult {
    let bad = controls
        .iter()
        .flat_map(|c| c.assessment.objectives.iter())
        .filter(|o| match o.objective.strip_prefix(OBJECTIVE_PREFIX) {
            Some(rest) => rest.trim_start().starts_with(OBJECTIVE_PREFIX),
            None => true,
        })
        .map(|o| o.key.clone())
        .collect();
    from_offenders("CHK.OBJECTIVES.PREFIX", "objectives with a bad prefix", bad)
}

fn check_penalties(controls: &[CompiledControl]) -> CheckResult {
    let bad = controls
        .iter()
        .flat_map(|c| c.assessment.objectives.iter())
        .filter(|o| o.penalty < 0 || (o.noncompliance && o.penalty != 0))
        .map(|o| o.key.clone())
        .collect();
    from_offenders("CHK.OBJECTIVES.PENALTY", "objectives with invalid penalties", bad)
}
