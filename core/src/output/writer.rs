use crate::compliance::compiler::render_pretty_json;
use crate::compliance::model::{CatalogControl, CmmcMapping, CompiledControl, CsfMapping};
use crate::error::CoreResult;
use std::fs;
use std::path::{Path, PathBuf};

pub const CMMC_MAPPING_FILE: &str = "cmmc_mapping.json";
pub const CSF_MAPPING_FILE: &str = "csf_mapping.json";
pub const SOURCE_HASHES_FILE: &str = "source_hashes.csv";

/// Everything a successful run persists.
#[derive(Debug, Clone, Default)]
pub struct BuildArtifacts {
    pub compiled: Vec<CompiledControl>,
    pub cmmc_mappings: Option<Vec<CmmcMapping>>,
    pub csf_mappings: Option<Vec<CsfMapping>>,
    pub catalogs: Vec<(String, Vec<CatalogControl>)>,
    pub source_hashes_csv: String,
}

pub struct ArtifactWriter;

impl ArtifactWriter {
    /// Renders every artifact, stages each as a `.part` sibling, then renames
    /// them into place with the compiled controls file last. Returns the path
    /// of the compiled controls file.
    pub fn write_all(
        build_dir: &Path,
        output_file: &str,
        artifacts: &BuildArtifacts,
    ) -> CoreResult<PathBuf> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();
        if let Some(m) = &artifacts.cmmc_mappings {
            files.push((build_dir.join(CMMC_MAPPING_FILE), render_pretty_json(m)?));
        }
        if let Some(m) = &artifacts.csf_mappings {
            files.push((build_dir.join(CSF_MAPPING_FILE), render_pretty_json(m)?));
        }
        for (source_id, controls) in &artifacts.catalogs {
            files.push((
                build_dir.join(format!("{}.json", source_id)),
                render_pretty_json(controls)?,
            ));
        }
        files.push((
            build_dir.join(SOURCE_HASHES_FILE),
            normalize_newlines(&artifacts.source_hashes_csv),
        ));
        let output_path = build_dir.join(output_file);
        files.push((output_path.clone(), render_pretty_json(&artifacts.compiled)?));

        fs::create_dir_all(build_dir)?;
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
        for (path, content) in &files {
            let tmp = part_path(path);
            if let Err(e) = fs::write(&tmp, content.as_bytes()) {
                discard(&staged);
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
            staged.push((tmp, path.clone()));
        }

        for (idx, (tmp, path)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, path) {
                tracing::warn!(path = %path.display(), error = %e, "artifact rename failed");
                discard(&staged[idx..]);
                return Err(e.into());
            }
        }
        Ok(output_path)
    }
}

fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

fn part_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    PathBuf::from(tmp)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}
