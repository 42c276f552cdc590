//! Main entry point for the museum pass watcher.
//! Loads configuration from the environment and polls pass availability forever.

use std::sync::Arc;

use pass_scan::{
    AlertNotifier, BiblioCommonsClient, EmailService, PassScanExecutor, ScanConfig,
    SmtpEmailService, default_tracked_passes,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting museum pass watcher...");

    let config = match ScanConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = match BiblioCommonsClient::new() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("❌ Failed to create availability client: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = AlertNotifier::from_config(config.mail.as_ref(), |mail| {
        let service: Arc<dyn EmailService> = Arc::new(SmtpEmailService::new(mail)?);
        Ok(service)
    });

    if notifier.is_enabled() {
        log::info!("📧 Email alerts enabled");
    }

    let executor = PassScanExecutor::new(client, notifier, default_tracked_passes(), config);
    executor.start().await;
}
