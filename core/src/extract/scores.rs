use crate::compliance::model::Score;
use crate::error::{CoreError, CoreResult};
use crate::extract::compile_pattern;

/// The table's column-header row, alone or followed by the remaining headings.
const HEADER_PATTERN: &str = r"(?i)^\s*security\s+requirement\s*(value\b.*)?$";
/// A heading cell that the text layer put on its own line.
const HEADING_CELL_PATTERN: &str = r"(?i)^\s*(value|comment|value\s+comment)\s*$";
const ROW_START_PATTERN: &str = r"^\s*(\d+\.\d+\.\d+)\S*\s*(.*)$";
const ROW_BODY_PATTERN: &str = r"^(?P<desc>.*?)\s*\b(?P<value>NA|\d+\s+to\s+\d+|\d+)\b\s*(?P<comment>.*)$";

/// Parse a scoring value cell: "NA" → [], "3" → [3], "3 to 5" → [3, 5].
pub fn parse_points(cell: &str) -> CoreResult<Vec<i32>> {
    let value = cell.trim().to_lowercase();
    if value == "na" {
        return Ok(Vec::new());
    }
    if value.contains("to") {
        let parts: Vec<&str> = value.split("to").map(|p| p.trim()).collect();
        if parts.len() != 2 {
            return Err(CoreError::Parse(format!(
                "malformed point range '{}'",
                cell.trim()
            )));
        }
        return parts.into_iter().map(|p| parse_int(p, cell)).collect();
    }
    Ok(vec![parse_int(&value, cell)?])
}

fn parse_int(part: &str, cell: &str) -> CoreResult<i32> {
    part.parse::<i32>().map_err(|_| {
        CoreError::Parse(format!("malformed point value '{}'", cell.trim()))
    })
}

/// Parse the DoD assessment methodology PDF.
pub fn parse_scores_pdf(bytes: &[u8]) -> CoreResult<Vec<Score>> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| CoreError::Parse(format!("scoring PDF text extraction failed: {}", e)))?;
    parse_scores_text(&text)
}

/// Parse the scoring table from the text layer of the methodology document.
///
/// Rows are collected after the first column-header line ("Security
/// Requirement Value Comment"). Every row starts with a control id; cell text
/// may wrap over several lines and is joined before the value cell is located.
/// Header lines repeated on later pages are dropped.
pub fn parse_scores_text(text: &str) -> CoreResult<Vec<Score>> {
    let header = compile_pattern(HEADER_PATTERN)?;
    let heading_cell = compile_pattern(HEADING_CELL_PATTERN)?;
    let row_start = compile_pattern(ROW_START_PATTERN)?;
    let row_body = compile_pattern(ROW_BODY_PATTERN)?;

    let mut lines = text.lines();
    if !lines.by_ref().any(|line| header.is_match(line)) {
        return Err(CoreError::Parse(
            "scoring document has no 'Security Requirement' table header".to_string(),
        ));
    }

    let mut rows: Vec<(String, String)> = Vec::new();
    for line in lines {
        if let Some(caps) = row_start.captures(line) {
            rows.push((caps[1].to_string(), caps[2].trim().to_string()));
        } else if line.trim().is_empty() || header.is_match(line) || heading_cell.is_match(line) {
            continue;
        } else if let Some((_, body)) = rows.last_mut() {
            body.push(' ');
            body.push_str(line.trim());
        }
    }

    if rows.is_empty() {
        return Err(CoreError::Parse(
            "scoring table contains no control rows".to_string(),
        ));
    }

    let mut scores = Vec::with_capacity(rows.len());
    for (key, body) in rows {
        let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
        let caps = row_body.captures(&body).ok_or_else(|| {
            CoreError::Parse(format!("score row {} has no value cell: '{}'", key, body))
        })?;
        scores.push(Score {
            points: parse_points(&caps["value"])?,
            description: caps["desc"].trim().to_string(),
            comment: caps["comment"].trim().to_string(),
            key,
        });
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_cells() {
        assert_eq!(parse_points("1 to 5").unwrap(), vec![1, 5]);
        assert_eq!(parse_points("NA").unwrap(), Vec::<i32>::new());
        assert_eq!(parse_points(" na ").unwrap(), Vec::<i32>::new());
        assert_eq!(parse_points("3").unwrap(), vec![3]);
    }

    #[test]
    fn malformed_points_are_rejected() {
        assert!(parse_points("five").is_err());
        assert!(parse_points("1 to").is_err());
        assert!(parse_points("").is_err());
    }

    #[test]
    fn reads_wrapped_rows() {
        let text = "NIST SP 800-171 DoD Assessment Scoring Template\n\
                    Security Requirement Value Comment\n\
                    3.1.1* Limit system access to authorized users. 5\n\
                    3.5.3 Use multifactor authentication for local and network\n\
                    access to privileged accounts.\n\
                    3 to 5 Subtract 5 points if MFA is not implemented.\n\
                    Security Requirement Value Comment\n\
                    3.12.4 System Security Plan NA The absence of a plan precludes assessment.\n";
        let scores = parse_scores_text(text).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].key, "3.1.1");
        assert_eq!(scores[0].points, vec![5]);
        assert_eq!(scores[0].comment, "");
        assert_eq!(
            scores[1].description,
            "Use multifactor authentication for local and network access to privileged accounts."
        );
        assert_eq!(scores[1].points, vec![3, 5]);
        assert_eq!(scores[1].comment, "Subtract 5 points if MFA is not implemented.");
        assert!(scores[2].points.is_empty());
    }

    #[test]
    fn wrapped_line_mentioning_requirements_is_kept() {
        let text = "Security Requirement Value Comment\n\
                    3.12.4 Develop system security plans that describe how\n\
                    security requirements are implemented. NA Absence precludes assessment.\n";
        let scores = parse_scores_text(text).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(
            scores[0].description,
            "Develop system security plans that describe how security requirements are implemented."
        );
        assert!(scores[0].points.is_empty());
        assert_eq!(scores[0].comment, "Absence precludes assessment.");
    }

    #[test]
    fn prose_before_the_table_is_ignored() {
        let text = "Each NIST SP 800-171 security requirement is scored.\n\
                    3.5.3 is scored 3 to 5 as described in the table below.\n\
                    Security Requirement\n\
                    Value\n\
                    Comment\n\
                    3.5.3 Use multifactor authentication. 3 to 5\n\
                    Security Requirement\n\
                    Value\n\
                    Comment\n\
                    3.5.4 Employ replay-resistant authentication. 1\n";
        let scores = parse_scores_text(text).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[1].key, "3.5.4");
        assert_eq!(scores[1].points, vec![1]);
        assert_eq!(scores[0].key, "3.5.3");
        assert_eq!(scores[0].description, "Use multifactor authentication.");
        assert_eq!(scores[0].points, vec![3, 5]);
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = parse_scores_text("3.1.1 Limit access 5\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }
}
