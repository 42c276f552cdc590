use std::sync::Arc;

use tracing::{error, info};

use crate::config::MailConfig;

/// Subject line of every alert email
pub const ALERT_SUBJECT: &str = "Ottawa Library Museum Pass Alert";

/// Appended to every alert body
pub const ALERT_FOOTER: &str = "
More info at https://collections.biblioottawalibrary.ca/en/access-passes-including-museum-passes

Library Hours:
    Monday: 10:00 am - 9:00 pm
    Tuesday: 10:00 am - 9:00 pm
    Wednesday: 10:00 am - 9:00 pm
    Thursday: 10:00 am - 9:00 pm
    Friday: 10:00 am - 6:00 pm
    Saturday: 10:00 am - 5:00 pm
    Sunday: 10:00 am - 5:00 pm
";

/// Trait for email service implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Send a plain text email, returning a provider message id
    async fn send_email(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<String, NotificationError>;
}

/// Errors raised while delivering an alert
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Message building or SMTP submission failed
    #[error("Email error: {0}")]
    Email(String),

    /// Sender or recipient is not a valid address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// What happened when an alert was handed to the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Delivered; carries the provider id
    Sent(String),
    /// Mail settings are absent, nothing was sent
    Skipped,
    /// Delivery failed; the error has already been logged
    Failed(String),
}

/// Join alert lines and append the static footer
pub fn compose_alert_body(lines: &[String]) -> String {
    let mut parts: Vec<&str> = lines.iter().map(String::as_str).collect();
    parts.push(ALERT_FOOTER);
    parts.join("\n")
}

/// Delivers alert summaries by email when mail settings are present
pub struct AlertNotifier {
    delivery: Option<(Arc<dyn EmailService>, Vec<String>)>,
}

impl AlertNotifier {
    /// Notifier that sends to `recipients` through `email_service`
    pub fn new(email_service: Arc<dyn EmailService>, recipients: Vec<String>) -> Self {
        Self {
            delivery: Some((email_service, recipients)),
        }
    }

    /// Notifier that only logs
    pub fn disabled() -> Self {
        Self { delivery: None }
    }

    /// Build from optional mail settings, using `build` to create the email service.
    ///
    /// Falls back to a log-only notifier when settings are missing or the
    /// service cannot be created.
    pub fn from_config<F>(mail: Option<&MailConfig>, build: F) -> Self
    where
        F: FnOnce(&MailConfig) -> Result<Arc<dyn EmailService>, NotificationError>,
    {
        let Some(mail) = mail else {
            return Self::disabled();
        };

        match build(mail) {
            Ok(service) => Self::new(service, mail.recipients.clone()),
            Err(e) => {
                error!("Failed to initialize email service: {}", e);
                Self::disabled()
            }
        }
    }

    /// Whether alerts will actually be emailed
    pub fn is_enabled(&self) -> bool {
        self.delivery.is_some()
    }

    /// Send the alert summary. Never fails; the outcome says what happened.
    pub async fn notify(&self, lines: &[String]) -> NotifyOutcome {
        let Some((email_service, recipients)) = &self.delivery else {
            info!(
                "Missing environment variables for email. Please set GMAIL_USER, GMAIL_APP_PASSWORD, EMAIL_TO."
            );
            return NotifyOutcome::Skipped;
        };

        let body = compose_alert_body(lines);

        info!("Sending email alert...");

        match email_service
            .send_email(recipients, ALERT_SUBJECT, &body)
            .await
        {
            Ok(external_id) => {
                info!("Email sent! ({})", external_id);
                NotifyOutcome::Sent(external_id)
            }
            Err(e) => {
                error!("Email sending failed: {}", e);
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmailService {
        sent: Mutex<Vec<(Vec<String>, String, String)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_email(
            &self,
            to: &[String],
            subject: &str,
            body: &str,
        ) -> Result<String, NotificationError> {
            if self.fail {
                return Err(NotificationError::Email("535 authentication rejected".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_vec(), subject.to_string(), body.to_string()));
            Ok("250".to_string())
        }
    }

    fn lines() -> Vec<String> {
        vec![
            "Found 1 Nature Museum Pass at Main library, you can use it to access Canadian Museum of Nature.".to_string(),
            "Found 2 Science Museum Pass at Beaverbrook library, you can use it to access X.".to_string(),
        ]
    }

    #[test]
    fn test_compose_alert_body() {
        let body = compose_alert_body(&lines());

        assert!(body.starts_with(
            "Found 1 Nature Museum Pass at Main library, you can use it to access Canadian Museum of Nature.\nFound 2"
        ));
        assert!(body.ends_with(ALERT_FOOTER));
        assert!(body.contains("Friday: 10:00 am - 6:00 pm"));
    }

    #[tokio::test]
    async fn test_notify_sends_to_all_recipients() {
        let service = Arc::new(RecordingEmailService::default());
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let notifier = AlertNotifier::new(service.clone(), recipients.clone());

        let outcome = notifier.notify(&lines()).await;

        assert_eq!(outcome, NotifyOutcome::Sent("250".to_string()));
        let sent = service.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, recipients);
        assert_eq!(sent[0].1, ALERT_SUBJECT);
        assert_eq!(sent[0].2, compose_alert_body(&lines()));
    }

    #[tokio::test]
    async fn test_notify_without_mail_config_skips() {
        let notifier = AlertNotifier::from_config(None, |_| {
            panic!("email service must not be built without mail settings")
        });

        assert!(!notifier.is_enabled());
        assert_eq!(notifier.notify(&lines()).await, NotifyOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_notify_failure_is_contained() {
        let service = Arc::new(RecordingEmailService {
            fail: true,
            ..Default::default()
        });
        let notifier = AlertNotifier::new(service, vec!["a@example.com".to_string()]);

        let outcome = notifier.notify(&lines()).await;

        assert!(matches!(outcome, NotifyOutcome::Failed(msg) if msg.contains("535")));
    }

    #[tokio::test]
    async fn test_from_config_falls_back_when_service_fails_to_build() {
        let mail = MailConfig {
            sender: "me@gmail.com".to_string(),
            app_password: "secret".to_string(),
            recipients: vec!["you@example.com".to_string()],
        };

        let notifier = AlertNotifier::from_config(Some(&mail), |_| {
            Err(NotificationError::Email("no transport".to_string()))
        });

        assert!(!notifier.is_enabled());
    }
}
