use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentOrigin {
    CACHE,
    NETWORK,
}

impl DocumentOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentOrigin::CACHE => "CACHE",
            DocumentOrigin::NETWORK => "NETWORK",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceHashRow {
    pub source_id: String,
    pub file_name: String,
    pub sha256: String,
    pub bytes: u64,
    pub origin: DocumentOrigin,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

pub fn render_source_hashes_csv(mut rows: Vec<SourceHashRow>) -> CoreResult<String> {
    rows.sort_by(|a, b| a.source_id.cmp(&b.source_id));

    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["source_id", "file_name", "sha256", "bytes", "origin"])?;
    for r in rows {
        wtr.write_record([
            r.source_id,
            r.file_name,
            r.sha256,
            r.bytes.to_string(),
            r.origin.as_str().to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}
