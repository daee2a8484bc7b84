use crate::compliance::model::CatalogControl;
use crate::error::{CoreError, CoreResult};
use serde_json::Value;

/// Flatten an OSCAL catalog into its controls and enhancements, in document
/// order. Enhancements carry the id of the control they extend.
pub fn parse_oscal_catalog(bytes: &[u8]) -> CoreResult<Vec<CatalogControl>> {
    let raw: Value = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::Parse(format!("OSCAL catalog is not JSON: {}", e)))?;
    let catalog = raw
        .get("catalog")
        .and_then(|v| v.as_object())
        .ok_or_else(|| CoreError::Parse("OSCAL document has no catalog object".to_string()))?;

    let mut out = Vec::new();
    let groups = catalog
        .get("groups")
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[]);
    for group in groups {
        let family = group
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::Parse("OSCAL group missing id".to_string()))?;
        walk_controls(group, family, None, &mut out)?;
    }

    if out.is_empty() {
        return Err(CoreError::Parse(
            "OSCAL catalog contains no controls".to_string(),
        ));
    }
    Ok(out)
}

fn walk_controls(
    node: &Value,
    family: &str,
    parent: Option<&str>,
    out: &mut Vec<CatalogControl>,
) -> CoreResult<()> {
    let controls = match node.get("controls").and_then(|v| v.as_array()) {
        Some(c) => c,
        None => return Ok(()),
    };
    for control in controls {
        let id = control
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::Parse(format!("OSCAL control in {} missing id", family)))?;
        let title = control
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        out.push(CatalogControl {
            id: id.to_string(),
            title,
            family: family.to_string(),
            parent: parent.map(|p| p.to_string()),
        });
        walk_controls(control, family, Some(id), out)?;
    }
    Ok(())
}
