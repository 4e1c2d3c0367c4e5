use crate::config::types::{MirrorConfig, MirrorSettings, UserAgentConfig};
use crate::ConfigError;

/// Upper bound on simultaneous fetches
const MAX_CONCURRENCY: usize = 100;

/// Upper bound on the per-request timeout (seconds)
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &MirrorConfig) -> Result<(), ConfigError> {
    validate_mirror_settings(&config.mirror)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates mirror settings
fn validate_mirror_settings(settings: &MirrorSettings) -> Result<(), ConfigError> {
    if settings.concurrency < 1 || settings.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, settings.concurrency
        )));
    }

    if settings.request_timeout_secs < 1 || settings.request_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, settings.request_timeout_secs
        )));
    }

    if settings.connect_timeout_secs < 1 || settings.connect_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, settings.connect_timeout_secs
        )));
    }

    if settings.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    let valid_token = |s: &str| {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };

    if !valid_token(&config.name) {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters, '-', '_' or '.', got '{}'",
            config.name
        )));
    }

    if !valid_token(&config.version) {
        return Err(ConfigError::Validation(format!(
            "user-agent version must contain only alphanumeric characters, '-', '_' or '.', got '{}'",
            config.version
        )));
    }

    Ok(())
}
