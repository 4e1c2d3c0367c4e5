//! HTML tree rewriting
//!
//! The document is parsed into an owned tree, every element is visited once
//! in document order, and reference-bearing attributes plus `<style>` text
//! are rewritten in place before the tree is serialized again.

use super::css::rewrite_css_text;
use super::{BodyText, ContentHint, Rewriter};
use scraper::node::Element;
use scraper::{Html, Node};

/// Elements whose `src` attribute names a fetchable asset
const SRC_ELEMENTS: &[&str] = &["img", "script", "source", "video", "audio"];

/// Rewrites an HTML document
///
/// # Rewrite Rules
///
/// | Element | Attribute | Hint |
/// |---------|-----------|------|
/// | `<a>` | `href` | Page |
/// | `<link>` | `href` | Asset if `rel` mentions `stylesheet` or `icon`, else Page |
/// | `<img>`, `<script>`, `<source>`, `<video>`, `<audio>` | `src` | Asset |
/// | `<form>` | `action` | Asset |
/// | any | `srcset` | Asset, per candidate |
/// | any | `style` | Asset, via the CSS rewriter |
/// | `<style>` | text content | Asset, via the CSS rewriter |
///
/// A body that is not valid UTF-8 is read as Latin-1 so its references are
/// still followed; its other bytes are written back unchanged.
///
/// # Arguments
///
/// * `body` - The raw response body
/// * `rewriter` - Context carrying the page URL, host scope and link sink
///
/// # Returns
///
/// The serialized, rewritten document
pub fn rewrite_html(body: &[u8], rewriter: &Rewriter<'_>) -> Vec<u8> {
    let text = BodyText::decode(body);
    if !text.is_utf8() {
        tracing::debug!(
            "Page {} is not UTF-8, rewriting it byte-for-byte as Latin-1",
            rewriter.page_url()
        );
    }

    let mut document = Html::parse_document(text.as_str());

    // Node ids are collected up front so the tree can be borrowed mutably below
    let targets: Vec<_> = document
        .tree
        .root()
        .descendants()
        .map(|node| {
            let style_text = node.value().is_text()
                && node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .map_or(false, |element| element.name() == "style");
            (node.id(), style_text)
        })
        .collect();

    for (id, style_text) in targets {
        let Some(mut node) = document.tree.get_mut(id) else {
            continue;
        };

        match node.value() {
            Node::Element(element) => rewrite_element(element, rewriter),
            Node::Text(text) if style_text => {
                let rewritten = rewrite_css_text(&text.text, rewriter);
                if rewritten != *text.text {
                    text.text = rewritten.into();
                }
            }
            _ => {}
        }
    }

    text.encode(document.html())
}

/// Rewrites the reference-bearing attributes of one element
fn rewrite_element(element: &mut Element, rewriter: &Rewriter<'_>) {
    let tag = element.name().to_string();
    let link_hint = link_hint(element.attr("rel"));

    for (name, value) in element.attrs.iter_mut() {
        let attr: &str = &name.local;
        let current: &str = &**value;

        let replacement = match (tag.as_str(), attr) {
            ("a", "href") => rewriter.rewrite_reference(current, ContentHint::Page),
            ("link", "href") => rewriter.rewrite_reference(current, link_hint),
            ("form", "action") => rewriter.rewrite_reference(current, ContentHint::Asset),
            (tag, "src") if SRC_ELEMENTS.contains(&tag) => {
                rewriter.rewrite_reference(current, ContentHint::Asset)
            }
            (_, "srcset") => rewrite_srcset(current, rewriter),
            (_, "style") => {
                let rewritten = rewrite_css_text(current, rewriter);
                (rewritten != current).then_some(rewritten)
            }
            _ => None,
        };

        if let Some(replacement) = replacement {
            tracing::trace!("Rewrote <{} {}> {:?} -> {:?}", tag, attr, current, replacement);
            *value = replacement.into();
        }
    }
}

/// Classifies a `<link href>` by its `rel` attribute
fn link_hint(rel: Option<&str>) -> ContentHint {
    let rel = rel.unwrap_or_default().to_ascii_lowercase();
    if rel.contains("stylesheet") || rel.contains("icon") {
        ContentHint::Asset
    } else {
        ContentHint::Page
    }
}

/// Rewrites each candidate URL of a `srcset`, keeping its descriptor
///
/// Returns `None` when no candidate changed so the attribute keeps its
/// original text.
fn rewrite_srcset(srcset: &str, rewriter: &Rewriter<'_>) -> Option<String> {
    let mut changed = false;

    let candidates: Vec<String> = srcset
        .split(',')
        .filter_map(|candidate| {
            let mut fields = candidate.split_whitespace();
            let url = fields.next()?;
            let descriptor: Vec<&str> = fields.collect();

            let url = match rewriter.rewrite_reference(url, ContentHint::Asset) {
                Some(local) => {
                    changed = true;
                    local
                }
                None => url.to_string(),
            };

            let mut candidate = url;
            for field in descriptor {
                candidate.push(' ');
                candidate.push_str(field);
            }
            Some(candidate)
        })
        .collect();

    changed.then(|| candidates.join(", "))
}
