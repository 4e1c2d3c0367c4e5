//! URL to local path mapping
//!
//! Both the engine (deciding where to write a resource) and the rewriters
//! (computing the link that points at it) go through [`to_local_path`], so a
//! rewritten reference always lands on the file the engine wrote.

use sha2::{Digest, Sha256};
use url::Url;

/// File name used for directory-like paths
const INDEX_FILE: &str = "index.html";

/// Extension appended to extensionless paths
const PAGE_EXTENSION: &str = ".html";

/// Number of hex characters of the query digest kept in the file name
const QUERY_DIGEST_LEN: usize = 8;

/// Maps a URL to its forward-slash path relative to the output root
///
/// # Mapping Rules
///
/// 1. Empty path or `/` becomes `index.html`
/// 2. A path ending in `/` gets `index.html` appended
/// 3. A path with no extension in its last segment gets `.html` appended
/// 4. Leading and repeated separators are dropped
/// 5. A query string adds `-<digest>` before the extension so
///    `/list?page=1` and `/list?page=2` stay distinct
///
/// The host is not part of the path; a run only ever stores one host.
///
/// # Examples
///
/// ```
/// use site_mirror::url::to_local_path;
/// use url::Url;
///
/// let url = Url::parse("http://x.test/docs/").unwrap();
/// assert_eq!(to_local_path(&url), "docs/index.html");
/// ```
pub fn to_local_path(url: &Url) -> String {
    let raw = url.path();

    let mut path = if raw.is_empty() || raw == "/" {
        format!("/{}", INDEX_FILE)
    } else if raw.ends_with('/') {
        format!("{}{}", raw, INDEX_FILE)
    } else {
        raw.to_string()
    };

    if extension(&path).is_none() {
        path.push_str(PAGE_EXTENSION);
    }

    let mut segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    if let (Some(query), Some(file_name)) = (url.query(), segments.last_mut()) {
        *file_name = with_query_suffix(file_name, query);
    }

    segments.join("/")
}

/// Computes the reference from one mirrored resource to another
///
/// The result is relative to the directory holding `to_local_path(from)`,
/// always uses forward slashes, and escapes `%` so that a browser decoding
/// the link arrives at the literal on-disk file name.
///
/// # Examples
///
/// ```
/// use site_mirror::url::relative_reference;
/// use url::Url;
///
/// let from = Url::parse("http://x.test/blog/post").unwrap();
/// let to = Url::parse("http://x.test/").unwrap();
/// assert_eq!(relative_reference(&from, &to), "../index.html");
/// ```
pub fn relative_reference(from: &Url, to: &Url) -> String {
    let from_path = to_local_path(from);
    let to_path = to_local_path(to);

    let mut from_dir: Vec<&str> = from_path.split('/').collect();
    from_dir.pop();
    let to_segments: Vec<&str> = to_path.split('/').collect();

    // The target's file name is never part of the shared prefix
    let limit = from_dir.len().min(to_segments.len() - 1);
    let common = from_dir
        .iter()
        .zip(&to_segments)
        .take(limit)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
    parts.extend_from_slice(&to_segments[common..]);

    parts.join("/").replace('%', "%25")
}

/// Returns the extension of the last path segment, if any
fn extension(path: &str) -> Option<&str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

/// Inserts a short digest of the query before the file extension
fn with_query_suffix(file_name: &str, query: &str) -> String {
    let digest = hex::encode(Sha256::digest(query.as_bytes()));
    let digest = &digest[..QUERY_DIGEST_LEN];

    match file_name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}-{}{}", &file_name[..idx], digest, &file_name[idx..]),
        _ => format!("{}-{}", file_name, digest),
    }
}
