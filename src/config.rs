use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::job::Category;

/// Process-wide configuration, loaded once at startup and immutable for
/// the life of the daemon. Command-line flags override file values, which
/// override the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_powershell_module")]
    pub powershell_module: String,
    #[serde(default)]
    pub server_address: String,
    /// Minutes between poll cycles. Values below 1 are reset to the
    /// default during normalize().
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: i64,
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub email_from: String,
    #[serde(default)]
    pub email_to: Vec<String>,
    #[serde(default)]
    pub email_password: String,
    #[serde(default = "default_monitor_failed")]
    pub monitor_failed_jobs: bool,
    #[serde(default)]
    pub monitor_warning_jobs: bool,
    #[serde(default)]
    pub monitor_running_jobs: bool,
    /// Minutes a running job may take before it is reported. Values below
    /// 1 are reset to the default during normalize().
    #[serde(default = "default_long_running_threshold")]
    pub long_running_threshold: i64,
}

fn default_powershell_module() -> String {
    "Veeam.Backup.PowerShell".to_string()
}
fn default_check_interval() -> i64 {
    15
}
fn default_smtp_port() -> u16 {
    25
}
fn default_monitor_failed() -> bool {
    true
}
fn default_long_running_threshold() -> i64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            powershell_module: default_powershell_module(),
            server_address: String::new(),
            check_interval_minutes: default_check_interval(),
            smtp_server: String::new(),
            smtp_port: default_smtp_port(),
            email_from: String::new(),
            email_to: Vec::new(),
            email_password: String::new(),
            monitor_failed_jobs: default_monitor_failed(),
            monitor_warning_jobs: false,
            monitor_running_jobs: false,
            long_running_threshold: default_long_running_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Clamp out-of-range values and enforce the monitoring floor: at
    /// least one category must be enabled, so failed-job monitoring is
    /// forced on when every toggle is off.
    pub fn normalize(&mut self) {
        if self.check_interval_minutes < 1 {
            log::warn!(
                "Check interval is less than 1 minute, setting to default of {} minutes",
                default_check_interval()
            );
            self.check_interval_minutes = default_check_interval();
        }

        if !self.monitor_failed_jobs && !self.monitor_warning_jobs && !self.monitor_running_jobs {
            log::warn!("No monitoring options enabled, enabling failed job monitoring by default");
            self.monitor_failed_jobs = true;
        }

        if self.long_running_threshold < 1 {
            log::warn!(
                "Long running threshold not set, defaulting to {} minutes",
                default_long_running_threshold()
            );
            self.long_running_threshold = default_long_running_threshold();
        }
    }

    pub fn category_enabled(&self, category: Category) -> bool {
        match category {
            Category::Failed => self.monitor_failed_jobs,
            Category::Warning => self.monitor_warning_jobs,
            Category::LongRunning => self.monitor_running_jobs,
        }
    }

    /// Whether enough mail settings are present for dispatch to have a
    /// chance of succeeding.
    pub fn mail_settings_complete(&self) -> bool {
        !self.email_from.is_empty() && !self.email_to.is_empty() && !self.smtp_server.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_values() {
        let config = Config::default();
        assert_eq!(config.powershell_module, "Veeam.Backup.PowerShell");
        assert_eq!(config.check_interval_minutes, 15);
        assert_eq!(config.smtp_port, 25);
        assert!(config.monitor_failed_jobs);
        assert!(!config.monitor_warning_jobs);
        assert_eq!(config.long_running_threshold, 120);
    }

    #[test]
    fn normalize_clamps_zero_interval() {
        let mut config = Config {
            check_interval_minutes: 0,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.check_interval_minutes, 15);
    }

    #[test]
    fn normalize_clamps_negative_threshold() {
        let mut config = Config {
            long_running_threshold: -5,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.long_running_threshold, 120);
    }

    #[test]
    fn normalize_forces_failed_monitoring_floor() {
        let mut config = Config {
            monitor_failed_jobs: false,
            monitor_warning_jobs: false,
            monitor_running_jobs: false,
            ..Config::default()
        };
        config.normalize();
        assert!(config.monitor_failed_jobs);
        assert!(!config.monitor_warning_jobs);
        assert!(!config.monitor_running_jobs);
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "serverAddress": "vbr01.example.com",
            "checkIntervalMinutes": 0,
            "smtpServer": "mail.example.com",
            "emailFrom": "monitor@example.com",
            "emailTo": ["ops@example.com"],
            "monitorWarningJobs": true,
            "longRunningThreshold": -5
        }"#;
        let mut config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.server_address, "vbr01.example.com");
        assert!(config.monitor_warning_jobs);
        // Missing keys fall back to field defaults.
        assert_eq!(config.powershell_module, "Veeam.Backup.PowerShell");
        assert_eq!(config.smtp_port, 25);

        config.normalize();
        assert_eq!(config.check_interval_minutes, 15);
        assert_eq!(config.long_running_threshold, 120);
    }

    #[test]
    fn mail_settings_complete_requires_all_three() {
        let mut config = Config::default();
        assert!(!config.mail_settings_complete());
        config.email_from = "monitor@example.com".to_string();
        config.email_to = vec!["ops@example.com".to_string()];
        config.smtp_server = "mail.example.com".to_string();
        assert!(config.mail_settings_complete());
    }
}
