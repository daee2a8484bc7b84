use crate::error::{CoreError, CoreResult};
use crate::extract::{self, Extractor};
use std::collections::BTreeSet;

pub const CMMC_MAPPING_URL: &str = "https://www.acq.osd.mil/cmmc/docs/CMMCModel_V2_Mapping.xlsx";
pub const NIST_CONTROLS_URL: &str = "https://csrc.nist.gov/csrc/media/Publications/sp/800-171/rev-2/final/documents/sp800-171r2-security-reqs.csv";
pub const NIST_ASSESSMENTS_URL: &str = "https://csrc.nist.gov/csrc/media/Publications/sp/800-171a/final/documents/sp800-171A-assessment-procedures.csv";
pub const NIST_MAPPING_URL: &str = "https://csrc.nist.gov/CSRC/media/Publications/sp/800-171/rev-2/final/documents/csf-v1-0-to-sp800-171rev2-mapping.xlsx";
pub const DOD_SCORES_URL: &str = "https://www.acq.osd.mil/asda/dpc/cp/cyber/docs/safeguarding/NIST-SP-800-171-Assessment-Methodology-Version-1.2.1-6.24.2020.pdf";
pub const NIST_800_53_R4_URL: &str = "https://raw.githubusercontent.com/usnistgov/oscal-content/main/nist.gov/SP800-53/rev4/json/NIST_SP-800-53_rev4_catalog.json";
pub const NIST_800_53_R5_URL: &str = "https://raw.githubusercontent.com/usnistgov/oscal-content/main/nist.gov/SP800-53/rev5/json/NIST_SP-800-53_rev5_catalog.json";

/// One source document: where it is published and how it is read.
#[derive(Clone)]
pub struct SourceSpec {
    pub source_id: String,
    pub url: String,
    pub extractor: Extractor,
}

impl std::fmt::Debug for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSpec")
            .field("source_id", &self.source_id)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl SourceSpec {
    pub fn new(source_id: &str, url: &str, extractor: Extractor) -> Self {
        Self {
            source_id: source_id.to_string(),
            url: url.to_string(),
            extractor,
        }
    }

    /// Cache file name: the last path segment of the URL.
    pub fn file_name(&self) -> CoreResult<&str> {
        match self.url.rsplit('/').next() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(CoreError::InvalidInput(format!(
                "source {} url has no file name: {}",
                self.source_id, self.url
            ))),
        }
    }
}

/// Ordered, immutable list of sources with unique ids.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    sources: Vec<SourceSpec>,
}

impl SourceCatalog {
    pub fn new(sources: Vec<SourceSpec>) -> CoreResult<Self> {
        let mut seen = BTreeSet::new();
        for s in &sources {
            if !seen.insert(s.source_id.as_str()) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate source id: {}",
                    s.source_id
                )));
            }
            s.file_name()?;
        }
        Ok(Self { sources })
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    pub fn get(&self, source_id: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.source_id == source_id)
    }
}

pub fn default_catalog() -> CoreResult<SourceCatalog> {
    SourceCatalog::new(vec![
        SourceSpec::new("cmmc_mapping", CMMC_MAPPING_URL, extract::cmmc_mapping_extractor),
        SourceSpec::new("nist_controls", NIST_CONTROLS_URL, extract::controls_extractor),
        SourceSpec::new("nist_assessments", NIST_ASSESSMENTS_URL, extract::assessments_extractor),
        SourceSpec::new("nist_mapping", NIST_MAPPING_URL, extract::csf_mapping_extractor),
        SourceSpec::new("dod_scores", DOD_SCORES_URL, extract::scores_pdf_extractor),
        SourceSpec::new("nist_800_53_r4", NIST_800_53_R4_URL, extract::oscal_extractor),
        SourceSpec::new("nist_800_53_r5", NIST_800_53_R5_URL, extract::oscal_extractor),
    ])
}
