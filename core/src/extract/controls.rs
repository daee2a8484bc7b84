use crate::compliance::model::Control;
use crate::error::{CoreError, CoreResult};
use crate::extract::{compile_pattern, decode_text, CONTROL_KEY_PATTERN};

const COLUMN_COUNT: usize = 6;

/// Parse the SP 800-171 security requirements CSV.
///
/// Columns: family, requirement type, identifier, sort-as, requirement,
/// discussion. Rows whose identifier is not a `D.D.D` control id (title rows,
/// headers, family banners) are skipped.
pub fn parse_controls_csv(bytes: &[u8]) -> CoreResult<Vec<Control>> {
    let key_pattern = compile_pattern(CONTROL_KEY_PATTERN)?;
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut controls = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.len() != COLUMN_COUNT {
            return Err(CoreError::Parse(format!(
                "controls row {} has {} columns, expected {}",
                idx + 1,
                record.len(),
                COLUMN_COUNT
            )));
        }
        let key = record[2].trim();
        if !key_pattern.is_match(key) {
            continue;
        }
        controls.push(Control {
            key: key.to_string(),
            category: record[0].trim().to_string(),
            control_type: record[1].trim().to_string(),
            description: record[4].trim().to_string(),
            discussion: record[5].trim().to_string(),
        });
    }

    if controls.is_empty() {
        return Err(CoreError::Parse(
            "controls document contains no D.D.D identifiers".to_string(),
        ));
    }
    Ok(controls)
}
