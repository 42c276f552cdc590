use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::bibliocommons_client::{AvailabilitySource, count_matching_branches};
use crate::config::ScanConfig;
use crate::notification_service::{AlertNotifier, NotifyOutcome};
use crate::scan_types::{PassAvailability, TrackedPass};

/// Result of one fetch-match-notify pass over every tracked pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing matched; check again after the short interval
    Searching,
    /// At least one match; an alert was attempted
    Found {
        /// Alert lines raised this cycle
        lines: Vec<String>,
        /// Result of handing the lines to the notifier
        notification: NotifyOutcome,
    },
}

impl CycleOutcome {
    /// How long to sleep before the next cycle
    pub fn delay(&self, config: &ScanConfig) -> Duration {
        match self {
            CycleOutcome::Searching => config.check_interval,
            CycleOutcome::Found { .. } => config.found_recheck_interval,
        }
    }
}

/// Main scan execution loop
pub struct PassScanExecutor {
    source: Arc<dyn AvailabilitySource>,
    notifier: AlertNotifier,
    passes: Vec<TrackedPass>,
    config: ScanConfig,
}

impl PassScanExecutor {
    /// Create an executor over `passes`
    pub fn new(
        source: Arc<dyn AvailabilitySource>,
        notifier: AlertNotifier,
        passes: Vec<TrackedPass>,
        config: ScanConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            passes,
            config,
        }
    }

    /// Run cycles forever, sleeping the interval each outcome calls for
    pub async fn start(&self) {
        info!(
            "Monitoring {} passes for '{}' at {:?}...",
            self.passes.len(),
            self.config.target_status,
            self.config.target_branches
        );

        if !self.notifier.is_enabled() {
            warn!("Email delivery disabled, alerts will only be logged");
        }

        loop {
            let outcome = self.run_cycle().await;
            let delay = outcome.delay(&self.config);

            debug!("Next check in {}s", delay.as_secs());
            sleep(delay).await;
        }
    }

    /// Check every tracked pass once and notify if anything matched
    pub async fn run_cycle(&self) -> CycleOutcome {
        let mut alert_lines = Vec::new();

        for pass in &self.passes {
            let availability = self.check_pass(pass).await;
            debug!(
                "{}: {} matching branches",
                availability.title,
                availability.branch_counts.len()
            );

            for (branch, count) in &availability.branch_counts {
                let line = pass.alert_line(branch, *count);
                info!("[{}] {}", availability.checked_at, line);
                alert_lines.push(line);
            }
        }

        if alert_lines.is_empty() {
            debug!("No matching copies found");
            return CycleOutcome::Searching;
        }

        info!("ALERT! Copies are {}!", self.config.target_status);
        let notification = self.notifier.notify(&alert_lines).await;

        CycleOutcome::Found {
            lines: alert_lines,
            notification,
        }
    }

    /// Fetch and match a single pass. Fetch failures count as no matches.
    pub async fn check_pass(&self, pass: &TrackedPass) -> PassAvailability {
        let response = match self.source.fetch_availability(&pass.url).await {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("[{}] Error fetching {}: {}", Utc::now(), pass.url, e);
                None
            }
        };

        let branch_counts = count_matching_branches(
            response.as_ref(),
            &self.config.target_branches,
            &self.config.target_status,
        );

        PassAvailability {
            title: pass.title.clone(),
            branch_counts,
            checked_at: Utc::now(),
        }
    }
}
