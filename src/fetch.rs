//! Package page retrieval.
//!
//! The resolver only sees the [`PageSource`] trait. [`HttpSource`] is the
//! real implementation; tests plug in in-memory pages.

use log::{debug, trace};
use std::time::Duration;
use url::Url;

/// Fragment appended to every package page URL.
pub const PAGE_FRAGMENT: &str = "dependencies-body-tab";

const USER_AGENT: &str = concat!("pkgviz/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a package page URL into markup.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Error type for page retrieval
#[derive(Debug)]
pub enum FetchError {
    /// The server answered with something other than 200
    Status { url: String, status: u16 },
    /// The request never produced a usable response
    Transport { url: String, source: ureq::Error },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status { url, status } => {
                write!(f, "GET {} returned HTTP {}", url, status)
            }
            FetchError::Transport { url, .. } => write!(f, "GET {} failed", url),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Status { .. } => None,
            FetchError::Transport { source, .. } => Some(source),
        }
    }
}

/// Blocking HTTP page source backed by a single `ureq` agent.
pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        // Fragments never go on the wire.
        let target = url.split('#').next().unwrap_or(url);
        debug!("GET {}", target);

        let response = self
            .agent
            .get(target)
            .header("User-Agent", USER_AGENT)
            .call();

        let mut response = match response {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }
            Err(source) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        };

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        trace!("{} bytes from {}", body.len(), target);
        Ok(body)
    }
}

/// URL actually requested for a package location: the location plus the
/// dependencies tab fragment, unless the location already names a fragment.
pub fn page_url(location: &str) -> String {
    let location = location.trim();
    if location.contains('#') {
        location.to_string()
    } else {
        format!("{}#{}", location, PAGE_FRAGMENT)
    }
}

/// Resolve a dependency link found on the page at `base` to an absolute URL.
///
/// Relative links such as `/packages/System.Memory/4.5.5` resolve against the
/// host that served the page.
pub fn resolve_link(base: &str, href: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(base)?;
    let mut resolved = base.join(href)?;
    resolved.set_fragment(None);
    Ok(resolved.into())
}
