//! Template container acquisition.
//!
//! The template `.fra` is fetched over HTTP (or read from disk) at most once
//! per loader. A failed attempt is never cached, so the next call retries.

use once_cell::sync::OnceCell;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Published palette editor template.
pub const DEFAULT_TEMPLATE_URL: &str =
    "https://raw.githubusercontent.com/PsnDth/FMPaletteEditor/main/build/paletteeditor.fra";

/// Failure acquiring the template. Always safe to retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Server answered with something other than 200
    #[error("template fetch failed: {code} w/ {text}")]
    Status { code: u16, text: String },
    /// Request never produced a response
    #[error("template fetch failed: {0}")]
    Transport(String),
    /// Local template could not be read
    #[error("failed to read template '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// Fetch failures are transient.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

/// Where the template container comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Url(String),
    File(PathBuf),
}

impl Default for TemplateSource {
    fn default() -> Self {
        TemplateSource::Url(DEFAULT_TEMPLATE_URL.to_string())
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Url(url) => f.write_str(url),
            TemplateSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads a template once and hands out the cached bytes afterwards.
#[derive(Debug, Default)]
pub struct TemplateLoader {
    source: TemplateSource,
    cached: OnceCell<Arc<[u8]>>,
}

impl TemplateLoader {
    pub fn new(source: TemplateSource) -> Self {
        Self { source, cached: OnceCell::new() }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Whether a successful load has been cached.
    pub fn is_loaded(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Template bytes, fetching them on first use.
    pub fn load(&self) -> Result<Arc<[u8]>, FetchError> {
        self.cached
            .get_or_try_init(|| {
                info!(source = %self.source, "loading template project");
                fetch(&self.source).map(Arc::from)
            })
            .cloned()
    }
}

fn fetch(source: &TemplateSource) -> Result<Vec<u8>, FetchError> {
    match source {
        TemplateSource::File(path) => {
            std::fs::read(path).map_err(|source| FetchError::Io { path: path.clone(), source })
        }
        TemplateSource::Url(url) => fetch_url(url),
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let response = ureq::get(url).call().map_err(convert_error)?;
    if response.status() != 200 {
        return Err(FetchError::Status {
            code: response.status(),
            text: response.status_text().to_string(),
        });
    }

    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    debug!(url, bytes = bytes.len(), "template fetched");
    Ok(bytes)
}

/// Convert ureq error to FetchError
fn convert_error(e: ureq::Error) -> FetchError {
    match e {
        ureq::Error::Status(code, response) => {
            FetchError::Status { code, text: response.status_text().to_string() }
        }
        other => FetchError::Transport(other.to_string()),
    }
}
