use crate::compliance::model::Score;
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedObjective {
    pub key: String,
    pub objective: String,
    pub penalty: i32,
}

/// How a control's objectives receive penalties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringStrategy {
    /// Every objective carries the same penalty.
    UniformPenalty(i32),
    /// Penalty chosen per child by key suffix (e.g. "[b]"), `default` otherwise.
    SuffixPenalty {
        default: i32,
        overrides: Vec<(String, i32)>,
    },
    /// Extracted objectives are replaced by a hand-authored list.
    FixedObjectiveList(Vec<FixedObjective>),
    /// No numeric penalty; every objective is flagged as a plan-document finding.
    ZeroPenaltyFlagged,
}

impl ScoringStrategy {
    pub fn penalty_for_suffix(&self, suffix: &str) -> Option<i32> {
        match self {
            ScoringStrategy::UniformPenalty(p) => Some(*p),
            ScoringStrategy::SuffixPenalty { default, overrides } => Some(
                overrides
                    .iter()
                    .find(|(s, _)| s == suffix)
                    .map(|(_, p)| *p)
                    .unwrap_or(*default),
            ),
            ScoringStrategy::ZeroPenaltyFlagged => Some(0),
            ScoringStrategy::FixedObjectiveList(_) => None,
        }
    }
}

/// Named exceptions for controls whose DoD score is not a single flat value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringExceptions {
    entries: BTreeMap<String, ScoringStrategy>,
}

impl ScoringExceptions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, control_key: &str, strategy: ScoringStrategy) -> Self {
        self.entries.insert(control_key.to_string(), strategy);
        self
    }

    pub fn get(&self, control_key: &str) -> Option<&ScoringStrategy> {
        self.entries.get(control_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks the strategy for a score row. A single point value always means
    /// REGULAR mode; anything else must be covered by a named exception.
    pub fn resolve(&self, score: &Score) -> CoreResult<ScoringStrategy> {
        match score.points.as_slice() {
            [single] => {
                if self.entries.contains_key(&score.key) {
                    tracing::warn!(
                        control = %score.key,
                        points = *single,
                        "scoring exception ignored for flat-scored control"
                    );
                }
                Ok(ScoringStrategy::UniformPenalty(*single))
            }
            points => match self.entries.get(&score.key) {
                Some(strategy) => Ok(strategy.clone()),
                None if points.is_empty() => Err(CoreError::Reconciliation(format!(
                    "control {} is scored NA and has no scoring exception",
                    score.key
                ))),
                None => Err(CoreError::Reconciliation(format!(
                    "control {} has ambiguous points {:?} and no scoring exception",
                    score.key, points
                ))),
            },
        }
    }
}

pub fn default_scoring_exceptions() -> ScoringExceptions {
    ScoringExceptions::empty()
        // Multifactor authentication: 5 when absent, 3 when only general users lack it.
        .with(
            "3.5.3",
            ScoringStrategy::SuffixPenalty {
                default: 5,
                overrides: vec![("[b]".to_string(), 3)],
            },
        )
        // System security plan: no points, its absence blocks the assessment.
        .with("3.12.4", ScoringStrategy::ZeroPenaltyFlagged)
        // FIPS-validated cryptography: 5 when none is employed, 3 when not validated.
        .with(
            "3.13.11",
            ScoringStrategy::FixedObjectiveList(vec![
                FixedObjective {
                    key: "3.13.11[a]".to_string(),
                    objective: "Determine if cryptography is employed to protect the confidentiality of CUI.".to_string(),
                    penalty: 5,
                },
                FixedObjective {
                    key: "3.13.11[b]".to_string(),
                    objective: "Determine if the cryptography employed to protect the confidentiality of CUI is FIPS-validated.".to_string(),
                    penalty: 3,
                },
            ]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(key: &str, points: Vec<i32>) -> Score {
        Score {
            key: key.to_string(),
            description: String::new(),
            points,
            comment: String::new(),
        }
    }

    #[test]
    fn single_point_is_uniform_even_with_exception() {
        let ex = default_scoring_exceptions();
        let s = ex.resolve(&score("3.5.3", vec![5])).unwrap();
        assert_eq!(s, ScoringStrategy::UniformPenalty(5));
    }

    #[test]
    fn band_uses_named_exception() {
        let ex = default_scoring_exceptions();
        let s = ex.resolve(&score("3.5.3", vec![3, 5])).unwrap();
        assert_eq!(s.penalty_for_suffix("[a]"), Some(5));
        assert_eq!(s.penalty_for_suffix("[b]"), Some(3));
    }

    #[test]
    fn na_without_exception_is_rejected() {
        let ex = default_scoring_exceptions();
        let err = ex.resolve(&score("3.1.1", vec![])).unwrap_err();
        assert!(matches!(err, CoreError::Reconciliation(_)));
    }

    #[test]
    fn unknown_band_is_rejected() {
        let err = ScoringExceptions::empty()
            .resolve(&score("3.1.2", vec![1, 5]))
            .unwrap_err();
        assert!(err.to_string().contains("3.1.2"));
    }

    #[test]
    fn default_table_names_three_controls() {
        let ex = default_scoring_exceptions();
        assert_eq!(ex.len(), 3);
        assert_eq!(ex.get("3.12.4"), Some(&ScoringStrategy::ZeroPenaltyFlagged));
    }
}
