use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::SimilarityParams;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub similarity: SimilaritySettings,
    #[serde(default)]
    pub roster: RosterSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilaritySettings {
    #[serde(default = "default_invert_agreeableness")]
    pub invert_agreeableness: bool,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self {
            invert_agreeableness: default_invert_agreeableness(),
        }
    }
}

impl From<&SimilaritySettings> for SimilarityParams {
    fn from(settings: &SimilaritySettings) -> Self {
        SimilarityParams {
            invert_agreeableness: settings.invert_agreeableness,
        }
    }
}

fn default_invert_agreeableness() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct RosterSettings {
    #[serde(default = "default_roster_path")]
    pub path: String,
    #[serde(default)]
    pub has_header: bool,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
            has_header: false,
        }
    }
}

fn default_roster_path() -> String { "data/roster.csv".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_domain: default_email_domain(),
            enabled: default_notifications_enabled(),
        }
    }
}

fn default_email_domain() -> String { "stanford.edu".to_string() }
fn default_notifications_enabled() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ROOMMATE_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ROOMMATE__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ROOMMATE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_similarity() {
        let settings = SimilaritySettings::default();
        assert!(settings.invert_agreeableness);
        assert!(SimilarityParams::from(&settings).invert_agreeableness);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_sections_fall_back_to_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                "[server]\nhost = \"127.0.0.1\"\nport = 8080\n\n[roster]\nhas_header = true\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert!(settings.roster.has_header);
        assert_eq!(settings.roster.path, "data/roster.csv");
        assert_eq!(settings.notifications.email_domain, "stanford.edu");
        assert!(settings.similarity.invert_agreeableness);
    }
}
