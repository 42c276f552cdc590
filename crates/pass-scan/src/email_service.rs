use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::MailConfig;
use crate::notification_service::{EmailService, NotificationError};

/// Mail provider submission host
pub const SMTP_HOST: &str = "smtp.gmail.com";

/// Implicit TLS submission port
pub const SMTP_PORT: u16 = 465;

/// Upper bound on a single SMTP exchange
pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Gmail SMTP email service, authenticating with an app password
pub struct SmtpEmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailService {
    /// Create a new SMTP email service from mail settings
    pub fn new(mail: &MailConfig) -> Result<Self, NotificationError> {
        let from = parse_mailbox(&mail.sender)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)
            .map_err(|e| NotificationError::Email(format!("Failed to create transport: {}", e)))?
            .port(SMTP_PORT)
            .credentials(Credentials::new(
                mail.sender.clone(),
                mail.app_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<String, NotificationError> {
        info!("Sending email to {} with subject: {}", to.join(","), subject);

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in to {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let message = builder
            .body(body.to_string())
            .map_err(|e| NotificationError::Email(format!("Failed to build message: {}", e)))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotificationError::Email(format!("SMTP submission failed: {}", e)))?;

        Ok(response.code().to_string())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .trim()
        .parse()
        .map_err(|_| NotificationError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config(sender: &str) -> MailConfig {
        MailConfig {
            sender: sender.to_string(),
            app_password: "app-password".to_string(),
            recipients: vec!["you@example.com".to_string()],
        }
    }

    #[test]
    fn test_parse_mailbox() {
        assert!(parse_mailbox(" someone@example.com ").is_ok());
        assert!(matches!(
            parse_mailbox("not an address"),
            Err(NotificationError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_smtp_service_rejects_bad_sender() {
        let result = SmtpEmailService::new(&mail_config("nope"));
        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_smtp_service_rejects_bad_recipient_before_connecting() {
        let service = SmtpEmailService::new(&mail_config("me@gmail.com")).unwrap();

        let result = service
            .send_email(&["bad recipient".to_string()], "subject", "body")
            .await;

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }
}
