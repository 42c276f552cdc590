use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Library status of a copy that is on the shelf but cannot be held remotely
pub const TARGET_STATUS: &str = "AVAILABLE_NOT_HOLDABLE";

/// Branch name -> number of matching copies, rebuilt on every fetch
pub type BranchCounts = BTreeMap<String, u32>;

/// A museum pass monitored for availability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPass {
    /// Display title used in alert lines
    pub title: String,
    /// Catalog availability endpoint for this pass
    pub url: String,
    /// Venues the pass grants access to
    pub description: String,
}

impl TrackedPass {
    /// Create a tracked pass
    pub fn new(title: &str, url: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
        }
    }

    /// Human readable alert line for `count` copies found at `branch`
    pub fn alert_line(&self, branch: &str, count: u32) -> String {
        format!(
            "Found {} {} at {} library, you can use it to access {}.",
            count, self.title, branch, self.description
        )
    }
}

/// Passes watched by default
pub fn default_tracked_passes() -> Vec<TrackedPass> {
    vec![
        TrackedPass::new(
            "Science Museum Pass",
            "https://gateway.bibliocommons.com/v2/libraries/ottawa/bibs/S26C1082166/availability?locale=en-CA",
            "Canadian Aviation and Space Museum, Canada Agriculture and Food Museum, \
             Canada Science and Technology Museum",
        ),
        TrackedPass::new(
            "Nature Museum Pass",
            "https://gateway.bibliocommons.com/v2/libraries/ottawa/bibs/S26C369552/availability?locale=en-CA",
            "Canadian Museum of Nature",
        ),
    ]
}

/// Result of checking a single pass
#[derive(Debug, Clone)]
pub struct PassAvailability {
    /// Title of the checked pass
    pub title: String,
    /// Matching copies per branch, empty when nothing matched or the fetch failed
    pub branch_counts: BranchCounts,
    /// When the check finished
    pub checked_at: DateTime<Utc>,
}

/// Errors raised while fetching availability
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// API error
    #[error("API error: {0}")]
    ApiError(String),

    /// Rate limited by external API
    #[error("Rate limited by external API")]
    RateLimited,

    /// Endpoint not found
    #[error("Availability endpoint not found")]
    NotFound,

    /// Response body could not be decoded
    #[error("Data format error: {0}")]
    DataFormat(String),
}

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Interval value is not a positive whole number of seconds
    #[error("{key} must be a positive number of seconds, got {value:?}")]
    InvalidInterval {
        /// Environment variable name
        key: &'static str,
        /// Raw value that failed to parse
        value: String,
    },
}
