use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Transmission daemon connection (optional; absent means torrent
    /// teardown is reported as unavailable rather than attempted).
    #[serde(default)]
    pub transmission: Option<TransmissionConfig>,
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("rear-diff.db")
}

/// Transmission RPC daemon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransmissionConfig {
    /// Daemon URL (e.g., "http://localhost:9091")
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    15
}

/// Media library filesystem configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// When false, file teardown is skipped entirely and reported as disabled.
    #[serde(default)]
    pub file_deletion_enabled: bool,
    /// Prefix under which media paths are stored in the database.
    #[serde(default = "default_stored_prefix")]
    pub stored_path_prefix: String,
    /// Mount point the stored prefix maps to on this host.
    #[serde(default = "default_mount_path")]
    pub mount_path: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            file_deletion_enabled: false,
            stored_path_prefix: default_stored_prefix(),
            mount_path: default_mount_path(),
        }
    }
}

fn default_stored_prefix() -> String {
    "/data/media".to_string()
}

fn default_mount_path() -> PathBuf {
    PathBuf::from("/mnt/media")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<SanitizedTransmissionConfig>,
    pub library: LibraryConfig,
}

/// Sanitized Transmission config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTransmissionConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            transmission: config
                .transmission
                .as_ref()
                .map(|t| SanitizedTransmissionConfig {
                    url: t.url.clone(),
                    username: t.username.clone(),
                    password_configured: !t.password.is_empty(),
                    timeout_secs: t.timeout_secs,
                }),
            library: config.library.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.transmission.is_none());
        assert!(!config.library.file_deletion_enabled);
        assert_eq!(config.database.path, PathBuf::from("rear-diff.db"));
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[database]
path = "/var/lib/rear-diff/rear-diff.db"

[transmission]
url = "http://localhost:9091"
username = "admin"
password = "hunter2"

[library]
file_deletion_enabled = true
stored_path_prefix = "/data/media"
mount_path = "/mnt/media"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let transmission = config.transmission.unwrap();
        assert_eq!(transmission.url, "http://localhost:9091");
        assert_eq!(transmission.timeout_secs, 15);
        assert!(config.library.file_deletion_enabled);
        assert_eq!(config.library.stored_path_prefix, "/data/media");
    }

    #[test]
    fn test_sanitized_config_redacts_password() {
        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            transmission: Some(TransmissionConfig {
                url: "http://localhost:9091".to_string(),
                username: "admin".to_string(),
                password: "hunter2".to_string(),
                timeout_secs: 15,
            }),
            library: LibraryConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("password_configured"));
    }

    #[test]
    fn test_sanitized_config_skips_absent_transmission() {
        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            transmission: None,
            library: LibraryConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("transmission"));
    }
}
