use crate::error::{CoreError, CoreResult};
use crate::sources::allowlist::Allowlist;
use crate::sources::catalog::SourceSpec;
use crate::sources::manifest::DocumentOrigin;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub origin: DocumentOrigin,
}

pub trait DocumentFetcher {
    fn fetch(&self, source: &SourceSpec) -> CoreResult<FetchedDocument>;
}

/// One-shot blocking HTTP retrieval, restricted to allowlisted hosts.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    allowlist: Allowlist,
}

const MAX_REDIRECTS: usize = 10;

/// Every redirect hop must stay on the allowlist.
pub fn check_redirect(allowlist: &Allowlist, target: &Url, hops: usize) -> Result<(), String> {
    if hops > MAX_REDIRECTS {
        return Err(format!("too many redirects ({})", hops));
    }
    allowlist
        .check(target.as_str())
        .map(|_| ())
        .map_err(|e| format!("redirect refused: {}", e))
}

impl HttpFetcher {
    pub fn new(allowlist: Allowlist) -> CoreResult<Self> {
        let redirect_allowlist = allowlist.clone();
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            match check_redirect(&redirect_allowlist, attempt.url(), attempt.previous().len()) {
                Ok(()) => attempt.follow(),
                Err(reason) => attempt.error(reason),
            }
        });
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("controls-compiler/", env!("CARGO_PKG_VERSION")))
            .redirect(policy)
            .build()
            .map_err(|e| CoreError::Fetch(format!("http client setup failed: {}", e)))?;
        Ok(Self { client, allowlist })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, source: &SourceSpec) -> CoreResult<FetchedDocument> {
        let url = self.allowlist.check(&source.url)?;
        tracing::info!(source = %source.source_id, url = %url, "downloading source document");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| CoreError::Fetch(format!("{}: request failed: {}", source.source_id, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Fetch(format!(
                "{}: server answered {}",
                source.source_id, status
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| CoreError::Fetch(format!("{}: body read failed: {}", source.source_id, e)))?;
        Ok(FetchedDocument {
            bytes: bytes.to_vec(),
            origin: DocumentOrigin::NETWORK,
        })
    }
}

/// Serves documents from `cache_dir/<file name>`, fetching and persisting
/// them through `inner` on a miss.
pub struct CachedFetcher<F: DocumentFetcher> {
    cache_dir: PathBuf,
    inner: F,
}

impl<F: DocumentFetcher> CachedFetcher<F> {
    pub fn new(cache_dir: impl AsRef<Path>, inner: F) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
            inner,
        }
    }

    pub fn cache_path(&self, source: &SourceSpec) -> CoreResult<PathBuf> {
        Ok(self.cache_dir.join(source.file_name()?))
    }
}

impl<F: DocumentFetcher> DocumentFetcher for CachedFetcher<F> {
    fn fetch(&self, source: &SourceSpec) -> CoreResult<FetchedDocument> {
        let path = self.cache_path(source)?;
        if path.exists() {
            tracing::info!(source = %source.source_id, path = %path.display(), "using cached source document");
            let bytes = fs::read(&path)
                .map_err(|e| CoreError::Fetch(format!("{}: cache read failed: {}", path.display(), e)))?;
            return Ok(FetchedDocument {
                bytes,
                origin: DocumentOrigin::CACHE,
            });
        }

        let doc = self.inner.fetch(source)?;
        persist(&path, &doc.bytes)
            .map_err(|e| CoreError::Fetch(format!("{}: cache write failed: {}", path.display(), e)))?;
        Ok(doc)
    }
}

fn persist(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
