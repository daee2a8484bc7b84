use controls_core::compliance::model::CompiledControl;
use controls_core::error::{CoreError, CoreResult};
use controls_core::extract;
use controls_core::pipeline::config::PipelineConfig;
use controls_core::pipeline::run::run_pipeline;
use controls_core::sources::catalog::{SourceCatalog, SourceSpec};
use controls_core::sources::fetcher::{DocumentFetcher, FetchedDocument};
use controls_core::sources::manifest::DocumentOrigin;
use controls_core::validator::OutputValidator;
use std::collections::BTreeMap;

const CONTROLS_CSV: &str = "Family,Requirement Type,Identifier,Sort-As,Requirement,Discussion\n\
Access Control,Basic,3.1.1,03.01.01,Limit system access to authorized users.,Access control policies.\n\
Identification and Authentication,Derived,3.5.3,03.05.03,Use multifactor authentication.,MFA discussion.\n\
Security Assessment,Derived,3.12.4,03.12.04,Develop system security plans.,SSP discussion.\n";

const ASSESSMENTS_CSV: &str = "Family,Security Requirement,Type,Requirement,Objective,Examine,Interview,Test\n\
AC,3.1.1,Basic,Limit system access.,Determine if:,[SELECT FROM: Access control policy; system security plan],[SELECT FROM: Personnel with access control responsibilities],\n\
AC,3.1.1[a],Basic,,authorized users are identified.,,,\n\
AC,3.1.1[b],Basic,,processes acting on behalf of authorized users are identified.,,,\n\
IA,3.5.3,Derived,Use MFA.,Determine if:,[SELECT FROM: Identification and authentication policy],,[SELECT FROM: Mechanisms supporting multifactor authentication]\n\
IA,3.5.3[a],Derived,,privileged accounts are identified.,,,\n\
IA,3.5.3[b],Derived,,non-privileged accounts are identified.,,,\n\
CA,3.12.4,Derived,Develop SSPs.,Determine if:,[SELECT FROM: System security plan],,\n\
CA,3.12.4[a],Derived,,a system security plan is developed.,,,\n";

const SCORES_TEXT: &str = "DoD Assessment Scoring Template\n\
Security Requirement Value Comment\n\
3.1.1 Limit system access to authorized users. 5\n\
3.5.3 Use multifactor authentication. 3 to 5 Subtract 3 if only general users lack MFA.\n\
3.12.4 System Security Plan NA Absence of an SSP precludes assessment.\n";

struct MemoryFetcher {
    docs: BTreeMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    fn standard() -> Self {
        let mut docs = BTreeMap::new();
        docs.insert("nist_controls".to_string(), CONTROLS_CSV.as_bytes().to_vec());
        docs.insert("nist_assessments".to_string(), ASSESSMENTS_CSV.as_bytes().to_vec());
        docs.insert("dod_scores".to_string(), SCORES_TEXT.as_bytes().to_vec());
        Self { docs }
    }
}

impl DocumentFetcher for MemoryFetcher {
    fn fetch(&self, source: &SourceSpec) -> CoreResult<FetchedDocument> {
        let bytes = self
            .docs
            .get(&source.source_id)
            .cloned()
            .ok_or_else(|| CoreError::Fetch(format!("no document for {}", source.source_id)))?;
        Ok(FetchedDocument {
            bytes,
            origin: DocumentOrigin::CACHE,
        })
    }
}

fn core_catalog() -> SourceCatalog {
    SourceCatalog::new(vec![
        SourceSpec::new(
            "nist_controls",
            "https://csrc.nist.gov/docs/security-reqs.csv",
            extract::controls_extractor,
        ),
        SourceSpec::new(
            "nist_assessments",
            "https://csrc.nist.gov/docs/assessment-procedures.csv",
            extract::assessments_extractor,
        ),
        SourceSpec::new(
            "dod_scores",
            "https://www.acq.osd.mil/docs/methodology.txt",
            extract::scores_text_extractor,
        ),
    ])
    .unwrap()
}

fn config(build_dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig::standard()
        .unwrap()
        .with_build_dir(build_dir)
        .with_catalog(core_catalog())
}

#[test]
fn pipeline_writes_compiled_controls_and_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(tmp.path());
    let report = run_pipeline(&cfg, &MemoryFetcher::standard()).unwrap();

    assert_eq!(report.control_count, 3);
    assert_eq!(report.objective_count, 5);
    assert_eq!(report.flagged_objective_count, 1);
    assert_eq!(report.output_path, cfg.output_path());

    let text = std::fs::read_to_string(cfg.output_path()).unwrap();
    let compiled: Vec<CompiledControl> = serde_json::from_str(&text).unwrap();
    let keys: Vec<&str> = compiled.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["3.1.1", "3.5.3", "3.12.4"]);

    let mfa = &compiled[1].assessment;
    let penalties: Vec<i32> = mfa.objectives.iter().map(|o| o.penalty).collect();
    assert_eq!(penalties, vec![5, 3]);
    assert_eq!(mfa.test, "mechanisms supporting multifactor authentication");
    assert_eq!(
        compiled[0].assessment.examine,
        "access control policy; system security plan"
    );

    let hashes = std::fs::read_to_string(tmp.path().join("source_hashes.csv")).unwrap();
    let lines: Vec<&str> = hashes.lines().collect();
    assert_eq!(lines[0], "source_id,file_name,sha256,bytes,origin");
    assert!(lines[1].starts_with("dod_scores,methodology.txt,"));
    assert!(lines[1].ends_with(",CACHE"));
    assert_eq!(lines.len(), 4);

    let summary = OutputValidator::new().validate_file(&cfg.output_path()).unwrap();
    assert!(summary.passed(), "{:?}", summary.checks);
}

#[test]
fn unresolved_special_control_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut fetcher = MemoryFetcher::standard();
    fetcher.docs.insert(
        "dod_scores".to_string(),
        SCORES_TEXT
            .replace("3.1.1 Limit system access to authorized users. 5", "3.1.1 Limit system access. 1 to 5")
            .into_bytes(),
    );
    let cfg = config(tmp.path());

    let err = run_pipeline(&cfg, &fetcher).unwrap_err();
    assert!(matches!(err, CoreError::Reconciliation(_)));
    assert!(!cfg.output_path().exists());
    assert!(!tmp.path().join("source_hashes.csv").exists());
}

#[test]
fn malformed_document_is_reported_with_source_id() {
    let tmp = tempfile::tempdir().unwrap();
    let mut fetcher = MemoryFetcher::standard();
    fetcher
        .docs
        .insert("nist_assessments".to_string(), b"h1,h2,h3,h4,h5,h6,h7,h8\nAC,AC-1,x,y,z,,,\n".to_vec());

    let err = run_pipeline(&config(tmp.path()), &fetcher).unwrap_err();
    match err {
        CoreError::Parse(msg) => assert!(msg.starts_with("nist_assessments:"), "{}", msg),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn missing_score_source_is_a_configuration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = SourceCatalog::new(
        core_catalog()
            .sources()
            .iter()
            .filter(|s| s.source_id != "dod_scores")
            .cloned()
            .collect(),
    )
    .unwrap();
    let cfg = config(tmp.path()).with_catalog(catalog);

    let err = run_pipeline(&cfg, &MemoryFetcher::standard()).unwrap_err();
    assert!(err.to_string().contains("provides scores"));
}
