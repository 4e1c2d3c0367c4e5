use crate::{UrlError, UrlResult};
use url::Url;

/// Reference prefixes that never name a fetchable resource
const NON_FETCHABLE_PREFIXES: &[&str] = &["#", "data:", "javascript:", "mailto:", "tel:"];

/// Returns true if a raw reference must be left alone by the rewriters
///
/// Fragment-only references and the `data:`, `javascript:`, `mailto:` and
/// `tel:` schemes are matched case-insensitively after trimming whitespace.
pub fn is_non_fetchable(reference: &str) -> bool {
    let reference = reference.trim();
    NON_FETCHABLE_PREFIXES.iter().any(|prefix| {
        reference.len() >= prefix.len()
            && reference.is_char_boundary(prefix.len())
            && reference[..prefix.len()].eq_ignore_ascii_case(prefix)
    })
}

/// Resolves a possibly-relative reference against the page it was found on
///
/// Relative paths, protocol-relative (`//host/path`) and absolute references
/// all follow standard URL resolution. The result is canonical: fragment
/// removed, scheme restricted to HTTP(S), host required.
///
/// # Arguments
///
/// * `base` - The URL of the page containing the reference
/// * `reference` - The raw attribute or CSS value
///
/// # Returns
///
/// * `Ok(Url)` - The canonical absolute URL
/// * `Err(UrlError)` - The reference is empty, not fetchable, or malformed
///
/// # Examples
///
/// ```
/// use site_mirror::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("http://x.test/docs/intro").unwrap();
/// let url = resolve(&base, "../img/a.png#top").unwrap();
/// assert_eq!(url.as_str(), "http://x.test/img/a.png");
/// ```
pub fn resolve(base: &Url, reference: &str) -> UrlResult<Url> {
    let reference = reference.trim();

    if reference.is_empty() {
        return Err(UrlError::NotFetchable("empty reference".to_string()));
    }

    if is_non_fetchable(reference) {
        return Err(UrlError::NotFetchable(reference.to_string()));
    }

    let joined = base
        .join(reference)
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?;

    canonicalize(joined)
}

/// Puts an absolute URL into the form used as the deduplication key
///
/// The url crate already lowercases the host, drops default ports and
/// removes dot segments; this adds the scheme and host checks and strips the
/// fragment.
pub fn canonicalize(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Parses the seed URL given on the command line
///
/// A seed without a scheme defaults to `https`.
pub fn parse_seed(seed: &str) -> UrlResult<Url> {
    let seed = seed.trim();
    let with_scheme = if seed.contains("://") {
        seed.to_string()
    } else {
        format!("https://{}", seed)
    };

    let url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;
    canonicalize(url)
}
