/*
 *     Copyright 2025 The Bandwatch Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use bandwatch_core::{
    error::{ErrorType, OrErr},
    Result,
};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::instrument;
use validator::{Validate, ValidationError};

/// NAME is the name of bwdaemon.
pub const NAME: &str = "bwdaemon";

/// Returns the default config path for bandwatch.
#[inline]
pub fn default_bandwatch_config_path() -> PathBuf {
    crate::default_config_dir().join("bandwatch.yaml")
}

/// Returns the default log directory for bwdaemon.
#[inline]
pub fn default_bwdaemon_log_dir() -> PathBuf {
    crate::default_log_dir().join(NAME)
}

/// Returns the default interface to monitor.
#[inline]
fn default_monitor_interface() -> String {
    "eth0".to_string()
}

/// Returns the default path of the persisted accounting state.
#[inline]
fn default_stats_file_path() -> PathBuf {
    crate::default_storage_dir().join("stats.json")
}

/// Returns the default display name of the notification bot.
#[inline]
fn default_notifier_bot_name() -> String {
    crate::SERVICE_NAME.to_string()
}

/// validate_timezone validates the timezone is a known IANA name.
fn validate_timezone(timezone: &str) -> std::result::Result<(), ValidationError> {
    timezone
        .parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown timezone"))
}

/// Notifier is the notification configuration for bwdaemon.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notifier {
    /// Discord webhook URL is the endpoint the monthly usage report is
    /// delivered to. Required.
    #[validate(url)]
    pub discord_webhook_url: String,

    /// Bot name is the display identity the report is posted under.
    pub bot_name: String,
}

/// Notifier implements Default.
impl Default for Notifier {
    fn default() -> Self {
        Notifier {
            discord_webhook_url: String::new(),
            bot_name: default_notifier_bot_name(),
        }
    }
}

/// Config is the configuration for bwdaemon.
#[derive(Debug, Clone, Validate, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Interface is the name of the network interface whose cumulative
    /// counters are accounted.
    #[validate(length(min = 1))]
    pub interface: String,

    /// Stats file is the path of the persisted accounting state. A leading
    /// `~` is expanded against the home directory.
    pub stats_file: PathBuf,

    /// Timezone is the IANA timezone the accounting period is derived in.
    /// It only affects when the period rolls over, default is UTC.
    #[validate(custom = "validate_timezone")]
    pub timezone: Option<String>,

    /// Notifier is the notification configuration.
    #[validate]
    pub notifier: Notifier,
}

/// Config implements Default.
impl Default for Config {
    fn default() -> Self {
        Config {
            interface: default_monitor_interface(),
            stats_file: default_stats_file_path(),
            timezone: None,
            notifier: Notifier::default(),
        }
    }
}

/// Config is the implementation of Config.
impl Config {
    /// Load the configuration from file.
    #[instrument(skip_all)]
    pub async fn load(path: &PathBuf) -> Result<Config> {
        // Load configuration from file.
        let content = fs::read_to_string(path)
            .await
            .or_context(ErrorType::ConfigError, "read config file")?;
        let mut config: Config =
            serde_yaml::from_str(&content).or_err(ErrorType::ConfigError)?;

        // Convert configuration.
        config.convert();

        // Validate configuration.
        config.validate().or_err(ErrorType::ConfigError)?;
        Ok(config)
    }

    /// Convert converts the configuration.
    fn convert(&mut self) {
        // Expand the leading `~` in the stats file path.
        if let Ok(stripped) = self.stats_file.strip_prefix("~") {
            if let Some(home_dir) = home::home_dir() {
                self.stats_file = home_dir.join(stripped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn deserialize_config_correctly() {
        let yaml_data = r#"
interface: "wan0"
statsFile: "/var/lib/bandwatch/stats.json"
timezone: "Asia/Tokyo"
notifier:
  discordWebhookUrl: "https://discord.com/api/webhooks/123/abc"
  botName: "traffic-bot"
"#;

        let config: Config = serde_yaml::from_str(yaml_data).unwrap();
        assert_eq!(config.interface, "wan0");
        assert_eq!(
            config.stats_file,
            PathBuf::from("/var/lib/bandwatch/stats.json")
        );
        assert_eq!(config.timezone, Some("Asia/Tokyo".to_string()));
        assert_eq!(
            config.notifier.discord_webhook_url,
            "https://discord.com/api/webhooks/123/abc"
        );
        assert_eq!(config.notifier.bot_name, "traffic-bot");
    }

    #[test]
    fn deserialize_config_with_defaults() {
        let yaml_data = r#"
notifier:
  discordWebhookUrl: "https://discord.com/api/webhooks/123/abc"
"#;

        let config: Config = serde_yaml::from_str(yaml_data).unwrap();
        assert_eq!(config.interface, "eth0");
        assert_eq!(config.stats_file, default_stats_file_path());
        assert_eq!(config.timezone, None);
        assert_eq!(config.notifier.bot_name, "bandwatch");
    }

    #[test]
    fn validate_rejects_missing_webhook_url() {
        let config = Config {
            notifier: Notifier {
                discord_webhook_url: String::new(),
                bot_name: default_notifier_bot_name(),
            },
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_timezone() {
        let config = Config {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            notifier: Notifier {
                discord_webhook_url: "https://discord.com/api/webhooks/123/abc".to_string(),
                bot_name: default_notifier_bot_name(),
            },
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn convert_expands_home_directory() {
        let mut config = Config {
            stats_file: PathBuf::from("~/stats.json"),
            ..Default::default()
        };
        config.convert();

        let home_dir = home::home_dir().unwrap();
        assert_eq!(config.stats_file, home_dir.join("stats.json"));
    }

    #[tokio::test]
    async fn load_config_correctly() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(
            config_file,
            r#"
interface: "eno1"
notifier:
  discordWebhookUrl: "https://discord.com/api/webhooks/123/abc"
"#
        )
        .unwrap();

        let config = Config::load(&config_file.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(config.interface, "eno1");
    }

    #[tokio::test]
    async fn load_rejects_invalid_config() {
        let mut config_file = NamedTempFile::new().unwrap();
        writeln!(
            config_file,
            r#"
interface: ""
notifier:
  discordWebhookUrl: "not a url"
"#
        )
        .unwrap();

        assert!(Config::load(&config_file.path().to_path_buf())
            .await
            .is_err());
    }
}
