use crate::error::{CoreError, CoreResult};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::io::Cursor;

pub(crate) struct Sheet {
    pub name: String,
    range: Range<Data>,
}

impl Sheet {
    /// Cell text at a zero-based (row, column); `None` for empty cells.
    /// Whitespace-only text still counts as a value.
    pub fn text(&self, row: u32, col: u32) -> Option<String> {
        match self.range.get_value((row, col)) {
            None | Some(Data::Empty) => None,
            Some(Data::String(s)) if s.is_empty() => None,
            Some(Data::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Consecutive non-empty cells of one column starting at `first_row`.
    pub fn column_run(&self, first_row: u32, col: u32) -> Vec<String> {
        let mut out = Vec::new();
        let mut row = first_row;
        while let Some(value) = self.text(row, col) {
            out.push(value);
            row += 1;
        }
        out
    }
}

/// Loads every worksheet of an xlsx document, in workbook order.
pub(crate) fn read_sheets(bytes: &[u8]) -> CoreResult<Vec<Sheet>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| CoreError::Parse(format!("workbook could not be opened: {}", e)))?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| CoreError::Parse(format!("worksheet {} unreadable: {}", name, e)))?;
        sheets.push(Sheet { name, range });
    }
    Ok(sheets)
}
