//! Content rewriters
//!
//! The HTML and CSS rewriters share one contract: for every outbound
//! reference they find, resolve it against the page URL, hand same-host hits
//! to a [`LinkSink`], and substitute the relative local path in place.
//! Cross-host and non-fetchable references are left untouched.

mod css;
mod html;

pub use css::{rewrite_css, rewrite_css_text};
pub use html::rewrite_html;

use crate::url::{relative_reference, resolve, HostScope};
use url::Url;

/// How a discovered reference is expected to be handled once fetched
///
/// This is only a hint: a `Content-Type` header on the response wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentHint {
    /// Expected to be HTML and parsed for further references
    Page,
    /// Stored as-is unless the response says otherwise
    Asset,
}

/// Receiver for references discovered while rewriting
pub trait LinkSink {
    /// Schedules a same-host URL for fetching
    ///
    /// Implementations must tolerate the same URL arriving many times.
    fn enqueue(&self, url: Url, hint: ContentHint);
}

/// Per-document rewriting context
pub struct Rewriter<'a> {
    page_url: &'a Url,
    scope: &'a HostScope,
    sink: &'a dyn LinkSink,
}

impl<'a> Rewriter<'a> {
    /// Creates a rewriter for content fetched from `page_url`
    pub fn new(page_url: &'a Url, scope: &'a HostScope, sink: &'a dyn LinkSink) -> Self {
        Self {
            page_url,
            scope,
            sink,
        }
    }

    /// The URL relative references are resolved against
    pub fn page_url(&self) -> &Url {
        self.page_url
    }

    /// Rewrites a single reference
    ///
    /// Returns the replacement text when the reference resolves to a
    /// same-host URL (after enqueuing it), or `None` when the original text
    /// must be kept.
    pub fn rewrite_reference(&self, reference: &str, hint: ContentHint) -> Option<String> {
        let target = match resolve(self.page_url, reference) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Keeping reference {:?} on {}: {}", reference, self.page_url, e);
                return None;
            }
        };

        if !self.scope.contains(&target) {
            tracing::trace!("Keeping cross-host reference {}", target);
            return None;
        }

        let mut replacement = relative_reference(self.page_url, &target);
        if let Some(fragment) = fragment_of(reference) {
            replacement.push('#');
            replacement.push_str(fragment);
        }

        self.sink.enqueue(target, hint);
        Some(replacement)
    }
}

/// Returns the fragment of a raw reference, if it has a non-empty one
fn fragment_of(reference: &str) -> Option<&str> {
    reference
        .trim()
        .split_once('#')
        .map(|(_, fragment)| fragment)
        .filter(|fragment| !fragment.is_empty())
}

/// The text of a fetched body, remembering how it was decoded
///
/// Bodies that are not valid UTF-8 are read one byte per character
/// (ISO-8859-1), which is lossless. Re-encoding maps those characters back to
/// their original bytes so legacy-encoded pages keep their content while
/// their references are still discovered and rewritten.
pub(crate) enum BodyText<'a> {
    Utf8(&'a str),
    Latin1(String),
}

impl<'a> BodyText<'a> {
    /// Decodes a raw body
    pub(crate) fn decode(body: &'a [u8]) -> Self {
        match std::str::from_utf8(body) {
            Ok(text) => Self::Utf8(text),
            Err(_) => Self::Latin1(body.iter().map(|&b| char::from(b)).collect()),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Self::Utf8(text) => text,
            Self::Latin1(text) => text,
        }
    }

    pub(crate) fn is_utf8(&self) -> bool {
        matches!(self, Self::Utf8(_))
    }

    /// Turns rewritten text back into bytes in the body's original encoding
    ///
    /// Characters above U+00FF can only come from rewriting and are written
    /// as UTF-8.
    pub(crate) fn encode(&self, text: String) -> Vec<u8> {
        match self {
            Self::Utf8(_) => text.into_bytes(),
            Self::Latin1(_) => {
                let mut bytes = Vec::with_capacity(text.len());
                for c in text.chars() {
                    match u8::try_from(u32::from(c)) {
                        Ok(byte) => bytes.push(byte),
                        Err(_) => {
                            let mut buf = [0u8; 4];
                            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                        }
                    }
                }
                bytes
            }
        }
    }
}
