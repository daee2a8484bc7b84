use controls_core::compliance::compiler::{compile_controls, render_pretty_json};
use controls_core::compliance::model::{Assessment, CompiledControl, Control, Score};
use controls_core::compliance::reconciler::Reconciler;
use controls_core::compliance::scoring::default_scoring_exceptions;
use std::collections::BTreeSet;

fn fixture() -> (Vec<Control>, Vec<Assessment>, Vec<Score>) {
    // Deliberately not in numeric order; output must keep this order.
    let keys = ["3.1.2", "3.1.1", "3.14.7"];
    let controls = keys
        .iter()
        .map(|k| Control {
            key: k.to_string(),
            category: "System and Information Integrity".to_string(),
            control_type: "Derived".to_string(),
            description: format!("Requirement {}", k),
            discussion: "Discussion text.".to_string(),
        })
        .collect();
    let assessments = keys
        .iter()
        .flat_map(|k| {
            vec![
                Assessment {
                    key: k.to_string(),
                    parent_key: k.to_string(),
                    requirement: String::new(),
                    objective: "Determine if:".to_string(),
                    examine: vec!["policy".to_string()],
                    interview: vec![],
                    test: vec!["mechanisms".to_string()],
                },
                Assessment {
                    key: format!("{}[a]", k),
                    parent_key: k.to_string(),
                    requirement: String::new(),
                    objective: "the requirement is met.".to_string(),
                    examine: vec![],
                    interview: vec![],
                    test: vec![],
                },
            ]
        })
        .collect();
    let scores = keys
        .iter()
        .map(|k| Score {
            key: k.to_string(),
            description: String::new(),
            points: vec![3],
            comment: String::new(),
        })
        .collect();
    (controls, assessments, scores)
}

fn compiled() -> Vec<CompiledControl> {
    let (controls, assessments, scores) = fixture();
    let reconciler = Reconciler::new(default_scoring_exceptions());
    compile_controls(&reconciler, &controls, &assessments, &scores).unwrap()
}

#[test]
fn output_keeps_control_order() {
    let keys: Vec<String> = compiled().into_iter().map(|c| c.key).collect();
    assert_eq!(keys, vec!["3.1.2", "3.1.1", "3.14.7"]);
}

#[test]
fn json_round_trip_preserves_control_set() {
    let (controls, _, _) = fixture();
    let out = compiled();
    let json = render_pretty_json(&out).unwrap();
    let parsed: Vec<CompiledControl> = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.len(), controls.len());
    let expected: BTreeSet<&str> = controls.iter().map(|c| c.key.as_str()).collect();
    let actual: BTreeSet<&str> = parsed.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(expected, actual);
    assert_eq!(parsed, out);
}

#[test]
fn json_uses_consumer_field_names() {
    let json = render_pretty_json(&compiled()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &v[0];
    for field in ["key", "category", "type", "description", "discussion", "assessment"] {
        assert!(first.get(field).is_some(), "missing field {}", field);
    }
    let assessment = &first["assessment"];
    assert_eq!(assessment["examine"], "policy");
    assert_eq!(assessment["test"], "mechanisms");
    let objective = &assessment["objectives"][0];
    assert_eq!(objective["key"], "3.1.2[a]");
    assert_eq!(objective["objective"], "Determine if the requirement is met.");
    assert_eq!(objective["penalty"], 3);
    assert_eq!(objective["noncompliance"], false);
}

#[test]
fn json_is_indented_with_stable_field_order() {
    let json = render_pretty_json(&compiled()).unwrap();
    assert!(json.starts_with("[\n  {\n    \"key\": \"3.1.2\",\n    \"category\""));
    assert!(json.ends_with("]\n"));
    let type_pos = json.find("\"type\"").unwrap();
    let assessment_pos = json.find("\"assessment\"").unwrap();
    assert!(type_pos < assessment_pos);
}
