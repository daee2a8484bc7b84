use crate::compliance::compiler::compile_controls;
use crate::compliance::model::{
    Assessment, CatalogControl, CmmcMapping, CompiledControl, Control, CsfMapping, Score,
};
use crate::compliance::reconciler::Reconciler;
use crate::error::{CoreError, CoreResult};
use crate::extract::Extracted;
use crate::output::writer::{ArtifactWriter, BuildArtifacts};
use crate::pipeline::config::PipelineConfig;
use crate::sources::fetcher::DocumentFetcher;
use crate::sources::manifest::{render_source_hashes_csv, sha256_hex, SourceHashRow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineReport {
    pub generated_utc: String,
    pub output_path: PathBuf,
    pub control_count: usize,
    pub objective_count: usize,
    pub flagged_objective_count: usize,
    pub sources: Vec<SourceHashRow>,
}

#[derive(Debug, Default)]
struct RecordSets {
    controls: Option<Vec<Control>>,
    assessments: Option<Vec<Assessment>>,
    scores: Option<Vec<Score>>,
    cmmc_mappings: Option<Vec<CmmcMapping>>,
    csf_mappings: Option<Vec<CsfMapping>>,
    catalogs: Vec<(String, Vec<CatalogControl>)>,
}

impl RecordSets {
    fn absorb(&mut self, source_id: &str, extracted: Extracted) -> CoreResult<()> {
        match extracted {
            Extracted::Controls(v) => set_once(&mut self.controls, v, source_id, "controls"),
            Extracted::Assessments(v) => {
                set_once(&mut self.assessments, v, source_id, "assessments")
            }
            Extracted::Scores(v) => set_once(&mut self.scores, v, source_id, "scores"),
            Extracted::CmmcMappings(v) => {
                set_once(&mut self.cmmc_mappings, v, source_id, "CMMC mappings")
            }
            Extracted::CsfMappings(v) => {
                set_once(&mut self.csf_mappings, v, source_id, "CSF mappings")
            }
            Extracted::Catalog(v) => {
                self.catalogs.push((source_id.to_string(), v));
                Ok(())
            }
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, source_id: &str, what: &str) -> CoreResult<()> {
    if slot.is_some() {
        return Err(CoreError::InvalidInput(format!(
            "source {} provides {} a second time",
            source_id, what
        )));
    }
    *slot = Some(value);
    Ok(())
}

fn required<T>(slot: Option<T>, what: &str) -> CoreResult<T> {
    slot.ok_or_else(|| {
        CoreError::InvalidInput(format!("no configured source provides {}", what))
    })
}

/// Fetch and extract every configured source in order, reconcile, and
/// write the artifacts. Nothing is written unless every stage succeeds.
pub fn run_pipeline(
    config: &PipelineConfig,
    fetcher: &dyn DocumentFetcher,
) -> CoreResult<PipelineReport> {
    let mut sets = RecordSets::default();
    let mut hashes = Vec::new();

    for source in config.catalog.sources() {
        let doc = fetcher.fetch(source)?;
        let extracted = (source.extractor)(&doc.bytes).map_err(|e| match e {
            CoreError::Parse(msg) => CoreError::Parse(format!("{}: {}", source.source_id, msg)),
            other => other,
        })?;
        tracing::info!(
            source = %source.source_id,
            kind = extracted.kind_label(),
            records = extracted.record_count(),
            origin = doc.origin.as_str(),
            "extracted source document"
        );
        hashes.push(SourceHashRow {
            source_id: source.source_id.clone(),
            file_name: source.file_name()?.to_string(),
            sha256: sha256_hex(&doc.bytes),
            bytes: doc.bytes.len() as u64,
            origin: doc.origin,
        });
        sets.absorb(&source.source_id, extracted)?;
    }

    let controls = required(sets.controls, "controls")?;
    let assessments = required(sets.assessments, "assessments")?;
    let scores = required(sets.scores, "scores")?;

    let reconciler = Reconciler::new(config.exceptions.clone());
    let compiled = compile_controls(&reconciler, &controls, &assessments, &scores)?;

    let artifacts = BuildArtifacts {
        compiled,
        cmmc_mappings: sets.cmmc_mappings,
        csf_mappings: sets.csf_mappings,
        catalogs: sets.catalogs,
        source_hashes_csv: render_source_hashes_csv(hashes.clone())?,
    };
    let output_path = ArtifactWriter::write_all(&config.build_dir, &config.output_file, &artifacts)?;

    let report = summarize(&artifacts.compiled, output_path, hashes)?;
    tracing::info!(
        controls = report.control_count,
        objectives = report.objective_count,
        flagged = report.flagged_objective_count,
        output = %report.output_path.display(),
        "compiled control dataset written"
    );
    Ok(report)
}

fn summarize(
    compiled: &[CompiledControl],
    output_path: PathBuf,
    sources: Vec<SourceHashRow>,
) -> CoreResult<PipelineReport> {
    let objectives = compiled.iter().flat_map(|c| c.assessment.objectives.iter());
    let (objective_count, flagged_objective_count) =
        objectives.fold((0, 0), |(all, flagged), o| {
            (all + 1, flagged + usize::from(o.noncompliance))
        });
    let generated_utc = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| CoreError::InvalidInput(format!("timestamp formatting failed: {}", e)))?;

    Ok(PipelineReport {
        generated_utc,
        output_path,
        control_count: compiled.len(),
        objective_count,
        flagged_objective_count,
        sources,
    })
}
