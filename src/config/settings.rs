//! Bot settings loaded from config.toml
//!
//! Every section is optional and falls back to sensible defaults, so the bot can start
//! with an empty (or missing) config file. Secrets such as the Discord token and the
//! encryption passphrase come from the environment instead.

use crate::core::dashboard::DashboardKind;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// General bot behaviour
    pub bot: BotSettings,
    /// Command rate limiting
    pub rate_limit: RateLimitSettings,
    /// System and service monitoring
    pub monitoring: MonitoringSettings,
    /// Game servers shown on the game hub dashboard
    pub game_servers: Vec<GameServerConfig>,
    /// Welcome flow
    pub welcome: WelcomeSettings,
    /// Channel and category names the bot provisions
    pub provisioning: ProvisioningSettings,
}

/// Upper bound for configured hour counts (one year).
pub const MAX_HOURS: i64 = 24 * 365;
/// Upper bound for the game server connect timeout.
pub const MAX_CONNECT_TIMEOUT_MS: u64 = 60_000;

/// `[bot]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Seconds between background refreshes of metrics and dashboards
    pub refresh_interval_secs: u64,
    /// Lifetime of tokens issued by `/session start`
    pub session_ttl_hours: i64,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            session_ttl_hours: 24,
        }
    }
}

impl BotSettings {
    /// Session lifetime as a chrono duration; `None` if it does not fit one.
    #[must_use]
    pub fn session_ttl(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_hours(self.session_ttl_hours)
    }
}

/// `[rate_limit]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Commands a user may run inside one window
    pub max_commands: u32,
    /// Sliding window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_commands: 5,
            window_secs: 10,
        }
    }
}

/// `[monitoring]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    /// CPU usage that raises a warning alert
    pub cpu_alert_percent: f64,
    /// Memory usage that raises a warning alert
    pub memory_alert_percent: f64,
    /// Disk usage that raises a critical alert
    pub disk_alert_percent: f64,
    /// Mount point reported by `df`
    pub disk_path: String,
    /// How long metric samples are kept
    pub metric_retention_hours: i64,
    /// Docker container names to watch
    pub services: Vec<String>,
    /// TCP probe timeout for game servers, in milliseconds
    pub probe_timeout_ms: u64,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            cpu_alert_percent: 90.0,
            memory_alert_percent: 90.0,
            disk_alert_percent: 90.0,
            disk_path: "/".to_string(),
            metric_retention_hours: 24,
            services: Vec::new(),
            probe_timeout_ms: 2000,
        }
    }
}

impl MonitoringSettings {
    /// Game server probe timeout.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Metric retention as a chrono duration, for pruning; `None` if it does not fit one.
    #[must_use]
    pub fn metric_retention(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_hours(self.metric_retention_hours)
    }
}

/// One `[[game_servers]]` entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GameServerConfig {
    /// Display name, also used in metric names
    pub name: String,
    /// Game title shown on the dashboard (e.g. "Minecraft")
    #[serde(default)]
    pub game: String,
    /// Hostname or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl GameServerConfig {
    /// `host:port` string used for probing and display.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[welcome]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WelcomeSettings {
    /// Greeting template; `{user}` is replaced with a mention of the new member
    pub message: String,
    /// Server rules shown by the welcome dashboard's Rules button
    pub rules: Vec<String>,
}

impl Default for WelcomeSettings {
    fn default() -> Self {
        Self {
            message: "Welcome to the homelab, {user}! Check the dashboards to see what's running."
                .to_string(),
            rules: vec![
                "Be nice.".to_string(),
                "Don't restart anything you didn't start.".to_string(),
            ],
        }
    }
}

impl WelcomeSettings {
    /// Fills the `{user}` placeholder in the greeting template.
    #[must_use]
    pub fn render_message(&self, user_mention: &str) -> String {
        self.message.replace("{user}", user_mention)
    }
}

/// `[provisioning]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisioningSettings {
    /// Category that holds all dashboard channels
    pub category: String,
    /// Channel for the welcome dashboard and join greetings
    pub welcome_channel: String,
    /// Channel for the monitoring dashboard
    pub monitoring_channel: String,
    /// Channel for the project dashboard
    pub projects_channel: String,
    /// Channel for the game hub dashboard
    pub gamehub_channel: String,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            category: "Homelab".to_string(),
            welcome_channel: "welcome".to_string(),
            monitoring_channel: "monitoring".to_string(),
            projects_channel: "projects".to_string(),
            gamehub_channel: "game-servers".to_string(),
        }
    }
}

impl Settings {
    /// Name of the channel a dashboard kind lives in.
    #[must_use]
    pub fn channel_for(&self, kind: DashboardKind) -> &str {
        match kind {
            DashboardKind::Welcome => &self.provisioning.welcome_channel,
            DashboardKind::Monitoring => &self.provisioning.monitoring_channel,
            DashboardKind::Project => &self.provisioning.projects_channel,
            DashboardKind::GameHub => &self.provisioning.gamehub_channel,
        }
    }

    /// Interval between background refreshes.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.bot.refresh_interval_secs)
    }

    /// Rejects values that would make the bot misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.bot.refresh_interval_secs == 0 {
            return Err(config_error("bot.refresh_interval_secs must be greater than 0"));
        }
        check_hours("bot.session_ttl_hours", self.bot.session_ttl_hours)?;
        if self.rate_limit.max_commands == 0 || self.rate_limit.window_secs == 0 {
            return Err(config_error(
                "rate_limit.max_commands and rate_limit.window_secs must be greater than 0",
            ));
        }

        for (name, value) in [
            ("cpu_alert_percent", self.monitoring.cpu_alert_percent),
            ("memory_alert_percent", self.monitoring.memory_alert_percent),
            ("disk_alert_percent", self.monitoring.disk_alert_percent),
        ] {
            if !(value > 0.0 && value <= 100.0) {
                return Err(config_error(format!(
                    "monitoring.{name} must be in (0, 100], got {value}"
                )));
            }
        }
        check_hours(
            "monitoring.metric_retention_hours",
            self.monitoring.metric_retention_hours,
        )?;
        if !(1..=MAX_CONNECT_TIMEOUT_MS).contains(&self.monitoring.probe_timeout_ms) {
            return Err(config_error(format!(
                "monitoring.probe_timeout_ms must be between 1 and {MAX_CONNECT_TIMEOUT_MS}"
            )));
        }

        let mut seen = HashSet::new();
        for server in &self.game_servers {
            if server.name.trim().is_empty() {
                return Err(config_error("game_servers entries need a name"));
            }
            if server.port == 0 {
                return Err(config_error(format!(
                    "game server '{}' has port 0",
                    server.name
                )));
            }
            if !seen.insert(server.name.to_lowercase()) {
                return Err(config_error(format!(
                    "duplicate game server name '{}'",
                    server.name
                )));
            }
        }

        Ok(())
    }
}

fn check_hours(name: &str, hours: i64) -> Result<()> {
    if (1..=MAX_HOURS).contains(&hours) {
        Ok(())
    } else {
        Err(config_error(format!(
            "{name} must be between 1 and {MAX_HOURS}, got {hours}"
        )))
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}

/// Parses and validates settings from a TOML string.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `CONFIG_PATH` (default `./config.toml`).
///
/// A missing file is not an error: the defaults are used and a warning is logged.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("Config file {path} not found, using default settings");
        return Ok(Settings::default());
    }
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [bot]
            refresh_interval_secs = 30

            [rate_limit]
            max_commands = 3
            window_secs = 5

            [monitoring]
            cpu_alert_percent = 80.0
            services = ["nginx", "postgres"]

            [[game_servers]]
            name = "survival"
            game = "Minecraft"
            host = "10.0.0.5"
            port = 25565

            [welcome]
            message = "Hi {user}!"
            rules = ["No spam"]

            [provisioning]
            category = "Lab"
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.bot.refresh_interval_secs, 30);
        assert_eq!(settings.bot.session_ttl_hours, 24);
        assert_eq!(settings.rate_limit.max_commands, 3);
        assert_eq!(settings.monitoring.cpu_alert_percent, 80.0);
        assert_eq!(settings.monitoring.memory_alert_percent, 90.0);
        assert_eq!(settings.monitoring.services, vec!["nginx", "postgres"]);
        assert_eq!(settings.game_servers.len(), 1);
        assert_eq!(settings.game_servers[0].address(), "10.0.0.5:25565");
        assert_eq!(settings.welcome.render_message("<@1>"), "Hi <@1>!");
        assert_eq!(settings.provisioning.category, "Lab");
        assert_eq!(settings.provisioning.monitoring_channel, "monitoring");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.bot.refresh_interval_secs, 60);
        assert_eq!(settings.rate_limit.window_secs, 10);
        assert!(settings.game_servers.is_empty());
        assert_eq!(settings.channel_for(DashboardKind::GameHub), "game-servers");
    }

    #[test]
    fn test_rejects_zero_refresh_interval() {
        let result = parse_settings("[bot]\nrefresh_interval_secs = 0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let result = parse_settings("[monitoring]\ndisk_alert_percent = 150.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_unbounded_durations() {
        for toml_str in [
            "[bot]\nsession_ttl_hours = 0\n",
            "[bot]\nsession_ttl_hours = 9223372036854775807\n",
            "[monitoring]\nmetric_retention_hours = 9223372036854775807\n",
            "[monitoring]\nmetric_retention_hours = 8761\n",
            "[monitoring]\nprobe_timeout_ms = 0\n",
            "[monitoring]\nprobe_timeout_ms = 60001\n",
        ] {
            let result = parse_settings(toml_str);
            assert!(matches!(result, Err(Error::Config { .. })), "{toml_str}");
        }

        let settings = parse_settings(
            "[bot]\nsession_ttl_hours = 8760\n[monitoring]\nmetric_retention_hours = 8760\n",
        )
        .unwrap();
        assert_eq!(settings.bot.session_ttl(), Some(chrono::Duration::days(365)));
        assert_eq!(
            settings.monitoring.metric_retention(),
            Some(chrono::Duration::days(365))
        );
    }

    #[test]
    fn test_rejects_duplicate_game_servers() {
        let toml_str = r#"
            [[game_servers]]
            name = "a"
            host = "localhost"
            port = 1

            [[game_servers]]
            name = "A"
            host = "localhost"
            port = 2
        "#;
        let result = parse_settings(toml_str);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = parse_settings("[bot\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
