//! One extractor per fixed document shape. Every extractor is a pure function
//! from the raw document bytes to a typed record sequence and fails with
//! `CoreError::Parse` when the document does not have the expected layout.

pub mod assessments;
pub mod cmmc_mapping;
pub mod controls;
pub mod csf_mapping;
pub mod oscal;
pub mod scores;
mod workbook;

use crate::compliance::model::{
    Assessment, CatalogControl, CmmcMapping, Control, CsfMapping, Score,
};
use crate::error::CoreResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Controls(Vec<Control>),
    Assessments(Vec<Assessment>),
    Scores(Vec<Score>),
    CmmcMappings(Vec<CmmcMapping>),
    CsfMappings(Vec<CsfMapping>),
    Catalog(Vec<CatalogControl>),
}

impl Extracted {
    pub fn record_count(&self) -> usize {
        match self {
            Extracted::Controls(v) => v.len(),
            Extracted::Assessments(v) => v.len(),
            Extracted::Scores(v) => v.len(),
            Extracted::CmmcMappings(v) => v.len(),
            Extracted::CsfMappings(v) => v.len(),
            Extracted::Catalog(v) => v.len(),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Extracted::Controls(_) => "controls",
            Extracted::Assessments(_) => "assessments",
            Extracted::Scores(_) => "scores",
            Extracted::CmmcMappings(_) => "cmmc_mappings",
            Extracted::CsfMappings(_) => "csf_mappings",
            Extracted::Catalog(_) => "catalog",
        }
    }
}

pub type Extractor = fn(&[u8]) -> CoreResult<Extracted>;

pub fn controls_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    controls::parse_controls_csv(bytes).map(Extracted::Controls)
}

pub fn assessments_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    assessments::parse_assessments_csv(bytes).map(Extracted::Assessments)
}

pub fn scores_pdf_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    scores::parse_scores_pdf(bytes).map(Extracted::Scores)
}

/// Reads the scoring table from already extracted UTF-8 text.
pub fn scores_text_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    scores::parse_scores_text(&decode_text(bytes)).map(Extracted::Scores)
}

pub fn cmmc_mapping_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    cmmc_mapping::parse_cmmc_workbook(bytes).map(Extracted::CmmcMappings)
}

pub fn csf_mapping_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    csf_mapping::parse_csf_workbook(bytes).map(Extracted::CsfMappings)
}

pub fn oscal_extractor(bytes: &[u8]) -> CoreResult<Extracted> {
    oscal::parse_oscal_catalog(bytes).map(Extracted::Catalog)
}

/// Lossy UTF-8 decode with any byte-order mark removed.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

pub(crate) fn compile_pattern(pattern: &str) -> CoreResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|e| {
        crate::error::CoreError::InvalidInput(format!("pattern {} failed to compile: {}", pattern, e))
    })
}

/// Three-level dotted control id, e.g. "3.5.3".
pub const CONTROL_KEY_PATTERN: &str = r"^\d+\.\d+\.\d+$";
/// Leading control id of a possibly suffixed key, e.g. "3.5.3" in "3.5.3[b]".
pub const CONTROL_KEY_PREFIX_PATTERN: &str = r"^(\d+\.\d+\.\d+)";
