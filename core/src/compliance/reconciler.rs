use crate::compliance::model::{Assessment, CompiledAssessment, Control, Objective, Score};
use crate::compliance::scoring::{ScoringExceptions, ScoringStrategy};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;

pub const OBJECTIVE_PREFIX: &str = "Determine if";

/// Prepends "Determine if" unless the text already starts with it.
pub fn normalize_objective_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with(OBJECTIVE_PREFIX) {
        return trimmed.to_string();
    }
    if trimmed.is_empty() {
        return OBJECTIVE_PREFIX.to_string();
    }
    format!("{} {}", OBJECTIVE_PREFIX, trimmed)
}

pub fn join_methods(items: &[String]) -> String {
    items.join("; ")
}

/// Assessments grouped by parent key, source order kept inside each group.
pub struct AssessmentIndex<'a> {
    by_parent: BTreeMap<&'a str, Vec<&'a Assessment>>,
}

impl<'a> AssessmentIndex<'a> {
    pub fn new(assessments: &'a [Assessment]) -> Self {
        let mut by_parent: BTreeMap<&str, Vec<&Assessment>> = BTreeMap::new();
        for a in assessments {
            by_parent.entry(a.parent_key.as_str()).or_default().push(a);
        }
        Self { by_parent }
    }

    pub fn for_control(&self, control_key: &str) -> &[&'a Assessment] {
        self.by_parent
            .get(control_key)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

pub struct ScoreIndex<'a> {
    by_key: BTreeMap<&'a str, Vec<&'a Score>>,
}

impl<'a> ScoreIndex<'a> {
    pub fn new(scores: &'a [Score]) -> Self {
        let mut by_key: BTreeMap<&str, Vec<&Score>> = BTreeMap::new();
        for s in scores {
            by_key.entry(s.key.as_str()).or_default().push(s);
        }
        Self { by_key }
    }

    pub fn single(&self, control_key: &str) -> CoreResult<&'a Score> {
        match self.by_key.get(control_key).map(|v| v.as_slice()) {
            Some([score]) => Ok(*score),
            Some(rows) if rows.len() > 1 => Err(CoreError::Reconciliation(format!(
                "control {} has {} score rows, expected exactly one",
                control_key,
                rows.len()
            ))),
            _ => Err(CoreError::Reconciliation(format!(
                "control {} has no score entry",
                control_key
            ))),
        }
    }
}

/// Splits a control's assessments into its single parent record and children.
fn split_parent<'a>(
    control_key: &str,
    group: &[&'a Assessment],
) -> CoreResult<(&'a Assessment, Vec<&'a Assessment>)> {
    let parents: Vec<&Assessment> = group.iter().copied().filter(|a| a.is_parent()).collect();
    let parent = match parents.as_slice() {
        [p] => *p,
        [] => {
            return Err(CoreError::Reconciliation(format!(
                "control {} has no parent assessment",
                control_key
            )))
        }
        many => {
            return Err(CoreError::Reconciliation(format!(
                "control {} has {} parent assessments, expected exactly one",
                control_key,
                many.len()
            )))
        }
    };
    let children = group.iter().copied().filter(|a| !a.is_parent()).collect();
    Ok((parent, children))
}

pub struct Reconciler {
    exceptions: ScoringExceptions,
}

impl Reconciler {
    pub fn new(exceptions: ScoringExceptions) -> Self {
        Self { exceptions }
    }

    pub fn reconcile(
        &self,
        control: &Control,
        assessments: &AssessmentIndex<'_>,
        scores: &ScoreIndex<'_>,
    ) -> CoreResult<CompiledAssessment> {
        let (parent, children) = split_parent(&control.key, assessments.for_control(&control.key))?;
        let score = scores.single(&control.key)?;
        let strategy = self.exceptions.resolve(score)?;
        let objectives = build_objectives(parent, &children, &strategy);

        tracing::debug!(
            control = %control.key,
            children = children.len(),
            objectives = objectives.len(),
            "reconciled control"
        );

        Ok(CompiledAssessment {
            examine: join_methods(&parent.examine),
            interview: join_methods(&parent.interview),
            test: join_methods(&parent.test),
            objectives,
        })
    }
}

fn build_objectives(
    parent: &Assessment,
    children: &[&Assessment],
    strategy: &ScoringStrategy,
) -> Vec<Objective> {
    if let ScoringStrategy::FixedObjectiveList(fixed) = strategy {
        return fixed
            .iter()
            .map(|f| Objective {
                key: f.key.clone(),
                objective: normalize_objective_text(&f.objective),
                penalty: f.penalty,
                noncompliance: false,
            })
            .collect();
    }

    let flagged = matches!(strategy, ScoringStrategy::ZeroPenaltyFlagged);
    let sources: Vec<&Assessment> = if children.is_empty() {
        vec![parent]
    } else {
        children.to_vec()
    };

    sources
        .into_iter()
        .map(|a| {
            let suffix = a.key.strip_prefix(a.parent_key.as_str()).unwrap_or("");
            Objective {
                key: a.key.clone(),
                objective: normalize_objective_text(&a.objective),
                penalty: strategy.penalty_for_suffix(suffix).unwrap_or(0),
                noncompliance: flagged,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_added_once() {
        assert_eq!(
            normalize_objective_text("authorized users are identified."),
            "Determine if authorized users are identified."
        );
        assert_eq!(
            normalize_objective_text("Determine if the system is hardened."),
            "Determine if the system is hardened."
        );
    }

    #[test]
    fn prefix_check_is_case_sensitive() {
        assert_eq!(
            normalize_objective_text("determine if x"),
            "Determine if determine if x"
        );
    }

    #[test]
    fn methods_join_with_semicolons() {
        let items = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(join_methods(&items), "a; b; a");
        assert_eq!(join_methods(&[]), "");
    }
}
