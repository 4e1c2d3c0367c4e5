//! Storage module for persisting mirrored resources
//!
//! This module handles writing output for the mirrorer, including:
//! - Directory creation under the output root
//! - Writing resource bodies at their mapped local paths

mod fs;
mod traits;

pub use fs::FsStore;
pub use traits::{Store, StoreError, StoreResult};

use std::path::Path;
use std::sync::Arc;

/// Opens the default filesystem store rooted at `path`
///
/// # Arguments
///
/// * `path` - The output directory
///
/// # Returns
///
/// A shareable store handle
pub fn open_store(path: &Path) -> Arc<dyn Store> {
    Arc::new(FsStore::new(path))
}
