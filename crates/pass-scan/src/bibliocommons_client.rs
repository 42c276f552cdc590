use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::scan_types::{BranchCounts, ScanError};

/// Timeout applied to every availability request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can produce an availability response for an endpoint
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetch and decode the availability document at `url`
    async fn fetch_availability(&self, url: &str) -> Result<AvailabilityResponse, ScanError>;
}

/// Client for the BiblioCommons availability gateway
pub struct BiblioCommonsClient {
    client: Client,
}

/// Response structure from the BiblioCommons availability API
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityResponse {
    /// Entity collections, empty when absent
    #[serde(default)]
    pub entities: AvailabilityEntities,
}

/// Entity collections inside an availability response
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityEntities {
    /// Physical copies keyed by item id, fields read leniently per item
    #[serde(rename = "bibItems", default)]
    pub bib_items: HashMap<String, Value>,
}

/// Branch name of a copy, if present and a string
fn item_branch(item: &Value) -> Option<&str> {
    item.get("branchName").and_then(Value::as_str)
}

/// Library status of a copy, if present and a string
fn item_status(item: &Value) -> Option<&str> {
    item.get("availability")
        .and_then(|a| a.get("libraryStatus"))
        .and_then(Value::as_str)
}

impl BiblioCommonsClient {
    /// Create a new BiblioCommons API client
    pub fn new() -> Result<Self, ScanError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36")
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ScanError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl AvailabilitySource for BiblioCommonsClient {
    async fn fetch_availability(&self, url: &str) -> Result<AvailabilityResponse, ScanError> {
        debug!("Fetching availability from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScanError::ApiError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            match status.as_u16() {
                429 => return Err(ScanError::RateLimited),
                404 => return Err(ScanError::NotFound),
                _ => return Err(ScanError::ApiError(format!("HTTP {}", status))),
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScanError::ApiError(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| ScanError::DataFormat(format!("Failed to parse response: {}", e)))
    }
}

/// Count copies per branch that sit in `target_branches` with `target_status`.
///
/// `None` (a failed fetch) yields an empty map. Copies missing a branch or
/// status, or carrying them with the wrong type, never match.
pub fn count_matching_branches(
    response: Option<&AvailabilityResponse>,
    target_branches: &BTreeSet<String>,
    target_status: &str,
) -> BranchCounts {
    let mut counts = BranchCounts::new();

    let Some(response) = response else {
        return counts;
    };

    for item in response.entities.bib_items.values() {
        let (Some(branch), Some(status)) = (item_branch(item), item_status(item)) else {
            continue;
        };

        if target_branches.contains(branch) && status == target_status {
            *counts.entry(branch.to_string()).or_insert(0) += 1;
        }
    }

    counts
}
