use crate::compliance::model::{Assessment, CompiledAssessment, CompiledControl, Control, Score};
use crate::compliance::reconciler::{AssessmentIndex, Reconciler, ScoreIndex};
use crate::error::CoreResult;
use serde::Serialize;

pub fn compile_control(control: &Control, assessment: CompiledAssessment) -> CompiledControl {
    CompiledControl {
        key: control.key.clone(),
        category: control.category.clone(),
        control_type: control.control_type.clone(),
        description: control.description.clone(),
        discussion: control.discussion.clone(),
        assessment,
    }
}

/// Builds one compiled record per control, in control order. The first
/// reconciliation failure aborts the whole compilation.
pub fn compile_controls(
    reconciler: &Reconciler,
    controls: &[Control],
    assessments: &[Assessment],
    scores: &[Score],
) -> CoreResult<Vec<CompiledControl>> {
    let assessment_index = AssessmentIndex::new(assessments);
    let score_index = ScoreIndex::new(scores);

    let mut compiled = Vec::with_capacity(controls.len());
    for control in controls {
        let assessment = reconciler.reconcile(control, &assessment_index, &score_index)?;
        compiled.push(compile_control(control, assessment));
    }
    Ok(compiled)
}

/// Pretty JSON with two-space indentation and a trailing newline.
pub fn render_pretty_json<T: Serialize + ?Sized>(value: &T) -> CoreResult<String> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    Ok(s)
}
