use crate::compliance::model::CmmcMapping;
use crate::error::{CoreError, CoreResult};
use crate::extract::compile_pattern;
use crate::extract::workbook::read_sheets;
use regex::Regex;

const DOMAIN_PATTERN: &str = r"^DOMAIN: ([\w\s]+)\s\((\w+)\)$";
const NIST_REFERENCE_PATTERN: &str = r"^NIST.*\s(\d+\.\d+\.\d+)$";
const FIRST_PRACTICE_ROW: u32 = 3;
const PRACTICE_COLUMNS: [u32; 3] = [0, 1, 2];

/// Parse the CMMC model mapping workbook.
///
/// Every two-letter sheet is a domain. A1 names the domain, and columns A-C
/// list one practice per cell from row 4 down.
pub fn parse_cmmc_workbook(bytes: &[u8]) -> CoreResult<Vec<CmmcMapping>> {
    let domain_pattern = compile_pattern(DOMAIN_PATTERN)?;
    let nist_pattern = compile_pattern(NIST_REFERENCE_PATTERN)?;

    let mut mappings = Vec::new();
    for sheet in read_sheets(bytes)?
        .into_iter()
        .filter(|s| s.name.chars().count() == 2)
    {
        let header = sheet.text(0, 0).unwrap_or_default();
        let caps = domain_pattern.captures(header.trim()).ok_or_else(|| {
            CoreError::Parse(format!(
                "sheet {} has no DOMAIN header (found '{}')",
                sheet.name, header
            ))
        })?;
        let domain = caps[1].trim().to_string();
        let domain_short = caps[2].to_string();

        for col in PRACTICE_COLUMNS {
            for cell in sheet.column_run(FIRST_PRACTICE_ROW, col) {
                mappings.push(parse_practice(&nist_pattern, &domain, &domain_short, &cell)?);
            }
        }
    }

    if mappings.is_empty() {
        return Err(CoreError::Parse(
            "CMMC workbook contains no domain sheets".to_string(),
        ));
    }
    Ok(mappings)
}

/// One practice cell: level line, key, name, description, then references.
pub fn parse_practice(
    nist_pattern: &Regex,
    domain: &str,
    domain_short: &str,
    text: &str,
) -> CoreResult<CmmcMapping> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 4 {
        return Err(CoreError::Parse(format!(
            "practice cell has {} lines, expected at least 4: '{}'",
            lines.len(),
            text
        )));
    }

    let mut references = Vec::new();
    let mut nist_key = None;
    for raw in &lines[4..] {
        let reference = raw.trim().trim_matches('•').trim();
        if reference.is_empty() {
            continue;
        }
        if let Some(caps) = nist_pattern.captures(reference) {
            nist_key = Some(caps[1].to_string());
        }
        references.push(reference.to_string());
    }

    let key = lines[1].trim().to_string();
    let nist_key = nist_key.ok_or_else(|| {
        CoreError::Parse(format!("practice {} has no NIST SP 800-171 reference", key))
    })?;

    Ok(CmmcMapping {
        key,
        name: lines[2].trim().to_string(),
        description: lines[3].trim().to_string(),
        references,
        nist_key,
        domain: domain.to_string(),
        domain_short: domain_short.to_string(),
    })
}
