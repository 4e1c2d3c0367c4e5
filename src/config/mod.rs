//! Configuration module for Site-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A run needs no file at all: [`MirrorConfig::default`] is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirror will use {} workers", config.mirror.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{MirrorConfig, MirrorSettings, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
