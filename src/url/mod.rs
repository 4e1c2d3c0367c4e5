//! URL handling module for Site-Mirror
//!
//! This module provides reference resolution, canonicalization, the
//! same-host check, and the URL to local path mapping.

mod normalize;
mod paths;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use normalize::{canonicalize, is_non_fetchable, parse_seed, resolve};
pub use paths::{relative_reference, to_local_path};

/// The host a run is confined to
///
/// Two URLs are on the same host when their host and explicit port match.
/// Default ports are already dropped by the URL parser, so
/// `http://x.test:80/` and `http://x.test/` compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostScope {
    authority: String,
}

impl HostScope {
    /// Creates the scope from the seed URL
    pub fn from_url(url: &Url) -> UrlResult<Self> {
        authority(url)
            .map(|authority| Self { authority })
            .ok_or(UrlError::MissingHost)
    }

    /// Returns the `host[:port]` string this scope matches
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns true if the URL is on the scope's host
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::url::HostScope;
    /// use url::Url;
    ///
    /// let scope = HostScope::from_url(&Url::parse("http://x.test/").unwrap()).unwrap();
    /// assert!(scope.contains(&Url::parse("http://x.test/about").unwrap()));
    /// assert!(!scope.contains(&Url::parse("http://cdn.x.test/a.js").unwrap()));
    /// ```
    pub fn contains(&self, url: &Url) -> bool {
        authority(url).map_or(false, |authority| authority == self.authority)
    }
}

/// Returns `host[:port]` for a URL with a host
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|host| !host.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
