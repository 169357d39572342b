use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Transmission URL looks like an HTTP endpoint when configured
/// - Library prefix/mount are set when file deletion is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(ref transmission) = config.transmission {
        if !transmission.url.starts_with("http://") && !transmission.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "transmission.url must be an http(s) URL, got: {}",
                transmission.url
            )));
        }
    }

    if config.library.file_deletion_enabled {
        if config.library.stored_path_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "library.stored_path_prefix cannot be empty when file deletion is enabled"
                    .to_string(),
            ));
        }
        if config.library.mount_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "library.mount_path cannot be empty when file deletion is enabled".to_string(),
            ));
        }
    }

    Ok(())
}
