use crate::error::{CoreError, CoreResult};
use idna::domain_to_ascii;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowlistEntry {
    pub scheme: String, // http|https
    pub host: String,   // ASCII; punycode normalized
    pub port: u16,      // 0 means the scheme default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
    pub purpose: String,
}

impl AllowlistEntry {
    pub fn https(host: &str, path_prefix: Option<&str>, purpose: &str) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.to_string(),
            port: 0,
            path_prefix: path_prefix.map(|p| p.to_string()),
            purpose: purpose.to_string(),
        }
    }

    pub fn canonicalize(mut self) -> CoreResult<Self> {
        let scheme = self.scheme.to_ascii_lowercase();
        if scheme != "https" && scheme != "http" {
            return Err(CoreError::InvalidInput(
                "allowlist scheme must be http or https".to_string(),
            ));
        }
        self.scheme = scheme;

        let host_ascii = domain_to_ascii(&self.host)
            .map_err(|_| CoreError::InvalidInput("invalid allowlist host".to_string()))?;
        self.host = host_ascii.to_ascii_lowercase();

        if self.port == 0 {
            self.port = if self.scheme == "https" { 443 } else { 80 };
        }

        if let Some(pp) = &self.path_prefix {
            let mut p = pp.replace('\\', "/");
            if !p.starts_with('/') {
                p = format!("/{}", p);
            }
            if p.contains("..") {
                return Err(CoreError::InvalidInput(
                    "allowlist path_prefix must not contain ..".to_string(),
                ));
            }
            self.path_prefix = Some(p);
        }

        Ok(self)
    }

    pub fn matches_url(&self, url: &Url) -> bool {
        let scheme = url.scheme().to_ascii_lowercase();
        let host = match url.host_str() {
            Some(h) => match domain_to_ascii(h) {
                Ok(x) => x.to_ascii_lowercase(),
                Err(_) => return false,
            },
            None => return false,
        };
        let port = url
            .port_or_known_default()
            .unwrap_or(if scheme == "https" { 443 } else { 80 });
        if scheme != self.scheme || host != self.host || port != self.port {
            return false;
        }
        if let Some(pp) = &self.path_prefix {
            return url.path().starts_with(pp);
        }
        true
    }
}

/// Canonical set of hosts the fetcher may contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    entries: Vec<AllowlistEntry>,
}

impl Allowlist {
    pub fn new(entries: Vec<AllowlistEntry>) -> CoreResult<Self> {
        let entries = entries
            .into_iter()
            .map(|e| e.canonicalize())
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[AllowlistEntry] {
        &self.entries
    }

    pub fn check(&self, raw_url: &str) -> CoreResult<Url> {
        let url = Url::parse(raw_url)
            .map_err(|e| CoreError::Fetch(format!("invalid source url {}: {}", raw_url, e)))?;
        if self.entries.iter().any(|e| e.matches_url(&url)) {
            Ok(url)
        } else {
            Err(CoreError::Fetch(format!(
                "source url {} is not allowlisted",
                raw_url
            )))
        }
    }
}

/// Publishing hosts of the default source catalog.
pub fn default_allowlist() -> CoreResult<Allowlist> {
    Allowlist::new(vec![
        AllowlistEntry::https("www.acq.osd.mil", None, "CMMC model and DoD scoring methodology"),
        AllowlistEntry::https("csrc.nist.gov", None, "NIST SP 800-171 and 800-171A documents"),
        AllowlistEntry::https(
            "raw.githubusercontent.com",
            Some("/usnistgov/oscal-content/"),
            "NIST SP 800-53 OSCAL catalogs",
        ),
    ])
}
