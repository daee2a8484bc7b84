use crate::compliance::scoring::{default_scoring_exceptions, ScoringExceptions};
use crate::error::CoreResult;
use crate::sources::allowlist::{default_allowlist, Allowlist};
use crate::sources::catalog::{default_catalog, SourceCatalog};
use std::path::PathBuf;

pub const BUILD_DIR_ENV: &str = "CONTROLS_BUILD_DIR";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_OUTPUT_FILE: &str = "output.json";

/// Immutable run configuration handed to `run_pipeline`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Holds both the source document cache and the written artifacts.
    pub build_dir: PathBuf,
    pub output_file: String,
    pub catalog: SourceCatalog,
    pub allowlist: Allowlist,
    pub exceptions: ScoringExceptions,
}

impl PipelineConfig {
    pub fn standard() -> CoreResult<Self> {
        Ok(Self {
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            catalog: default_catalog()?,
            allowlist: default_allowlist()?,
            exceptions: default_scoring_exceptions(),
        })
    }

    /// Standard configuration; `CONTROLS_BUILD_DIR` overrides the build directory.
    pub fn from_env() -> CoreResult<Self> {
        let config = Self::standard()?;
        Ok(match std::env::var(BUILD_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => config.with_build_dir(dir.trim()),
            _ => config,
        })
    }

    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = build_dir.into();
        self
    }

    pub fn with_catalog(mut self, catalog: SourceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_exceptions(mut self, exceptions: ScoringExceptions) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        self.build_dir.join(&self.output_file)
    }
}
