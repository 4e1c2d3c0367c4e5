use crate::crawler::DEFAULT_POOL_SIZE;
use serde::Deserialize;

/// Main configuration structure for Site-Mirror
///
/// Every section and field is optional in the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub mirror: MirrorSettings,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Mirror behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorSettings {
    /// Maximum number of simultaneous fetches
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Total timeout for a single request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Directory the mirror is written under
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name sent in the User-Agent header
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Version sent in the User-Agent header
    #[serde(default = "default_agent_version")]
    pub version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value as `name/version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            version: default_agent_version(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_output_dir() -> String {
    "mirror".to_string()
}

fn default_agent_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_agent_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
