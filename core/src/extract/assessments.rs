use crate::compliance::model::Assessment;
use crate::error::{CoreError, CoreResult};
use crate::extract::{compile_pattern, decode_text, CONTROL_KEY_PREFIX_PATTERN};
use regex::Regex;

const COLUMN_COUNT: usize = 8;
const SELECT_FROM_PATTERN: &str = r"select from:\s*([\w;\s\-+,/]*)\]?\.?";

/// Parse the SP 800-171A assessment procedures CSV.
///
/// The first row is a header. Each following row holds one objective:
/// `_, key, _, requirement, objective, examine, interview, test`. The parent
/// key is the leading control id of `key`.
pub fn parse_assessments_csv(bytes: &[u8]) -> CoreResult<Vec<Assessment>> {
    let parent_pattern = compile_pattern(CONTROL_KEY_PREFIX_PATTERN)?;
    let select_from = select_from_pattern()?;

    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut assessments = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 2;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.len() != COLUMN_COUNT {
            return Err(CoreError::Parse(format!(
                "assessment row {} has {} columns, expected {}",
                row,
                record.len(),
                COLUMN_COUNT
            )));
        }

        let key = record[1].trim();
        let parent_key = parent_pattern
            .captures(key)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                CoreError::Parse(format!(
                    "assessment row {}: no control id prefix in key '{}'",
                    row, key
                ))
            })?;

        assessments.push(Assessment {
            key: key.to_string(),
            parent_key,
            requirement: record[3].trim().to_string(),
            objective: record[4].trim().to_string(),
            examine: split_select_from(&select_from, &record[5])
                .map_err(|e| with_row(e, row, "examine"))?,
            interview: split_select_from(&select_from, &record[6])
                .map_err(|e| with_row(e, row, "interview"))?,
            test: split_select_from(&select_from, &record[7])
                .map_err(|e| with_row(e, row, "test"))?,
        });
    }

    if assessments.is_empty() {
        return Err(CoreError::Parse(
            "assessment document contains no rows".to_string(),
        ));
    }
    Ok(assessments)
}

fn with_row(err: CoreError, row: usize, column: &str) -> CoreError {
    match err {
        CoreError::Parse(msg) => CoreError::Parse(format!("assessment row {} {}: {}", row, column, msg)),
        other => other,
    }
}

/// Extracts the `[SELECT FROM: a; b; c]` list of an assessment-method cell.
/// The text is lowercased; items keep their source order.
pub fn split_select_from(pattern: &Regex, text: &str) -> CoreResult<Vec<String>> {
    let lowered = text.to_lowercase();
    match pattern.captures(&lowered).and_then(|c| c.get(1)) {
        Some(list) => Ok(list
            .as_str()
            .split(';')
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(|item| item.to_string())
            .collect()),
        None if text.trim().is_empty() => Ok(Vec::new()),
        None => Err(CoreError::Parse(format!(
            "unrecognized method cell format: '{}'",
            text.trim()
        ))),
    }
}

pub fn select_from_pattern() -> CoreResult<Regex> {
    compile_pattern(SELECT_FROM_PATTERN)
}
