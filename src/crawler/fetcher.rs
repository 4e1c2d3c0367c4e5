//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirrorer:
//! - Building the HTTP client with a user agent and timeouts
//! - A single GET per resource, no retries
//! - Classifying the response by its Content-Type

use crate::config::MirrorConfig;
use crate::rewrite::ContentHint;
use crate::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::Url;

/// What a response declares itself to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `text/html`: rewritten with the HTML rewriter
    Page,
    /// `text/css`: rewritten with the CSS rewriter
    Stylesheet,
    /// Anything else: stored byte-for-byte
    Opaque,
}

impl ResourceKind {
    /// Classifies a `Content-Type` header value
    ///
    /// Parameters such as `; charset=utf-8` are ignored and the media type
    /// is compared case-insensitively.
    pub fn from_content_type(content_type: &str) -> Self {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "text/html" => Self::Page,
            "text/css" => Self::Stylesheet,
            _ => Self::Opaque,
        }
    }

    /// The kind assumed when the response carries no Content-Type
    pub fn from_hint(hint: ContentHint) -> Self {
        match hint {
            ContentHint::Page => Self::Page,
            ContentHint::Asset => Self::Opaque,
        }
    }

    /// Returns the kind a task is processed as
    ///
    /// A declared Content-Type always wins over the discovery hint.
    pub fn resolve(declared: Option<Self>, hint: ContentHint) -> Self {
        declared.unwrap_or_else(|| Self::from_hint(hint))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Page => "page",
            Self::Stylesheet => "stylesheet",
            Self::Opaque => "opaque",
        };
        write!(f, "{}", name)
    }
}

/// A successfully fetched resource
#[derive(Debug)]
pub struct FetchedResource {
    /// HTTP status code (always 2xx)
    pub status_code: u16,
    /// Content-Type header value, if present
    pub content_type: Option<String>,
    /// Classification derived from `content_type`
    pub declared_kind: Option<ResourceKind>,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The mirror configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::MirrorConfig;
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&MirrorConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &MirrorConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.mirror.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.mirror.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single bounded-timeout GET
///
/// Redirects are followed transparently by the client. There are no
/// retries: a transport failure or any non-2xx status is final for the URL.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// * `Ok(FetchedResource)` - The body and its declared kind
/// * `Err(FetchError)` - Timeout, transport failure, or non-2xx status
pub async fn fetch_url(client: &Client, url: &Url) -> Result<FetchedResource, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?
        .to_vec();

    Ok(FetchedResource {
        status_code: status.as_u16(),
        declared_kind: content_type.as_deref().map(ResourceKind::from_content_type),
        content_type,
        body,
    })
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
