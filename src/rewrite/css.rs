//! CSS text rewriting
//!
//! Matching is lexical: `url(...)` tokens and quoted `@import` statements are
//! found with regular expressions, everything else passes through verbatim.

use super::{BodyText, ContentHint, Rewriter};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn url_token() -> &'static Regex {
    static URL_TOKEN: OnceLock<Regex> = OnceLock::new();
    URL_TOKEN.get_or_init(|| {
        Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'")\s]+))\s*\)"#)
            .expect("url() pattern is valid")
    })
}

fn import_statement() -> &'static Regex {
    static IMPORT: OnceLock<Regex> = OnceLock::new();
    IMPORT.get_or_init(|| {
        Regex::new(r#"@import\s+(?:"([^"]+)"|'([^']+)')"#).expect("@import pattern is valid")
    })
}

/// Returns whichever alternative of a quoted-or-bare pattern matched
fn reference<'t>(caps: &Captures<'t>) -> &'t str {
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map_or("", |m| m.as_str())
}

/// Quotes a rewritten path, using double quotes if it contains an apostrophe
fn quoted(local: &str) -> String {
    if local.contains('\'') {
        format!("\"{}\"", local.replace('"', "%22"))
    } else {
        format!("'{}'", local)
    }
}

/// Rewrites a fetched stylesheet
///
/// Bodies that are not valid UTF-8 are read as Latin-1 so their references
/// are still followed; their other bytes are written back unchanged.
pub fn rewrite_css(body: &[u8], rewriter: &Rewriter<'_>) -> Vec<u8> {
    let text = BodyText::decode(body);
    if !text.is_utf8() {
        tracing::debug!(
            "Stylesheet {} is not UTF-8, rewriting it byte-for-byte as Latin-1",
            rewriter.page_url()
        );
    }

    text.encode(rewrite_css_text(text.as_str(), rewriter))
}

/// Rewrites `url(...)` and `@import '...'` references in CSS text
///
/// Used for stylesheets, `<style>` element contents and `style=""`
/// attributes alike. Every same-host reference is enqueued as an asset and
/// replaced with a quoted relative path; `data:` URIs, cross-host
/// references and anything unmatched are left as they were.
pub fn rewrite_css_text(css: &str, rewriter: &Rewriter<'_>) -> String {
    let with_urls = url_token().replace_all(css, |caps: &Captures| {
        match rewriter.rewrite_reference(reference(caps), ContentHint::Asset) {
            Some(local) => format!("url({})", quoted(&local)),
            None => caps[0].to_string(),
        }
    });

    import_statement()
        .replace_all(&with_urls, |caps: &Captures| {
            match rewriter.rewrite_reference(reference(caps), ContentHint::Asset) {
                Some(local) => format!("@import {}", quoted(&local)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
