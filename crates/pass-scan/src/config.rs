use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use crate::scan_types::{ConfigError, TARGET_STATUS};

/// Branches watched when `TARGET_BRANCHES` is unset
pub const DEFAULT_TARGET_BRANCHES: [&str; 2] = ["Main", "Beaverbrook"];

/// Seconds between checks while nothing is found (5 minutes)
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60 * 5;

/// Seconds to wait after an alert before checking again (1 day)
pub const DEFAULT_FOUND_RECHECK_INTERVAL_SECS: u64 = 60 * 60 * 24;

/// Credentials and recipients for alert emails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// Sender address, also the SMTP login
    pub sender: String,
    /// App-specific password for the sender account
    pub app_password: String,
    /// Recipient addresses
    pub recipients: Vec<String>,
}

/// Immutable runtime configuration, resolved once at startup
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Branch names whose copies are reported
    pub target_branches: BTreeSet<String>,
    /// Status value that counts as a match
    pub target_status: String,
    /// Sleep after a cycle with no matches
    pub check_interval: Duration,
    /// Sleep after a cycle that raised an alert
    pub found_recheck_interval: Duration,
    /// `None` disables email delivery
    pub mail: Option<MailConfig>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target_branches: DEFAULT_TARGET_BRANCHES
                .iter()
                .map(|b| b.to_string())
                .collect(),
            target_status: TARGET_STATUS.to_string(),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            found_recheck_interval: Duration::from_secs(DEFAULT_FOUND_RECHECK_INTERVAL_SECS),
            mail: None,
        }
    }
}

impl ScanConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let target_branches = match get("TARGET_BRANCHES") {
            Some(raw) => split_list(&raw).into_iter().collect(),
            None => defaults.target_branches,
        };

        let check_interval = match get("CHECK_INTERVAL") {
            Some(raw) => parse_interval("CHECK_INTERVAL", &raw)?,
            None => defaults.check_interval,
        };

        let found_recheck_interval = match get("FOUND_RECHECK_INTERVAL") {
            Some(raw) => parse_interval("FOUND_RECHECK_INTERVAL", &raw)?,
            None => defaults.found_recheck_interval,
        };

        let mail = match (
            get("GMAIL_USER"),
            get("GMAIL_APP_PASSWORD"),
            get("EMAIL_TO"),
        ) {
            (Some(sender), Some(app_password), Some(to)) => {
                let recipients = split_list(&to);
                (!recipients.is_empty()).then(|| MailConfig {
                    sender: sender.trim().to_string(),
                    app_password,
                    recipients,
                })
            }
            _ => None,
        };

        Ok(Self {
            target_branches,
            target_status: defaults.target_status,
            check_interval,
            found_recheck_interval,
            mail,
        })
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_interval(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidInterval {
            key,
            value: raw.to_string(),
        }),
    }
}
