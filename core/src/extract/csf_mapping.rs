use crate::compliance::model::CsfMapping;
use crate::error::{CoreError, CoreResult};
use crate::extract::workbook::read_sheets;

const FIRST_ROW: u32 = 4;
const CSF_COLUMN: u32 = 1;
const NIST_COLUMN: u32 = 2;
const DESCRIPTION_COLUMN: u32 = 3;

/// Parse the CSF v1.0 to SP 800-171 mapping workbook (first sheet only).
pub fn parse_csf_workbook(bytes: &[u8]) -> CoreResult<Vec<CsfMapping>> {
    let sheet = read_sheets(bytes)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::Parse("CSF mapping workbook has no sheets".to_string()))?;

    let mut mappings = Vec::new();
    let mut row = FIRST_ROW;
    while let Some(csf_key) = sheet.text(row, CSF_COLUMN) {
        let nist_key = sheet.text(row, NIST_COLUMN).unwrap_or_default();
        if !nist_key.trim().is_empty() {
            mappings.push(CsfMapping {
                nist_key: nist_key.trim().to_string(),
                csf_key: csf_key.trim().to_string(),
                description: sheet
                    .text(row, DESCRIPTION_COLUMN)
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
            });
        }
        row += 1;
    }

    if mappings.is_empty() {
        return Err(CoreError::Parse(format!(
            "CSF mapping sheet {} has no rows from row {}",
            sheet.name,
            FIRST_ROW + 1
        )));
    }
    Ok(mappings)
}
