//! SMTP notifier. Outbound mail is best-effort throughout the service:
//! callers log and swallow failures.

use anyhow::Context as _;
use lettre::message::{SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::domain::repository::Notifier;

/// SMTP relay settings. Absent entirely when mail is disabled.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct SmtpNotifier {
    settings: Option<SmtpSettings>,
    from: String,
}

impl SmtpNotifier {
    pub fn new(settings: Option<SmtpSettings>, from: String) -> Self {
        Self { settings, from }
    }

    /// A notifier that drops every message. Used when `SMTP_HOST` is unset.
    pub fn disabled(from: String) -> Self {
        Self {
            settings: None,
            from,
        }
    }

    fn build_transport(settings: &SmtpSettings) -> Result<SmtpTransport, anyhow::Error> {
        let mut builder =
            SmtpTransport::starttls_relay(&settings.host).context("create SMTP transport")?;
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(builder.build())
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), anyhow::Error> {
        let Some(settings) = &self.settings else {
            tracing::debug!(to, subject, "smtp disabled, dropping notification");
            return Ok(());
        };
        let message = Message::builder()
            .from(self.from.parse().context("invalid from address")?)
            .to(to.parse().context("invalid to address")?)
            .subject(subject)
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(body.to_owned()),
            )
            .context("build message")?;
        let transport = Self::build_transport(settings)?;
        // lettre's blocking transport; keep the runtime threads free.
        tokio::task::spawn_blocking(move || transport.send(&message).context("send mail"))
            .await
            .context("join smtp send")??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_notifier_accepts_and_drops() {
        let notifier = SmtpNotifier::disabled("no-reply@agora.local".to_owned());
        notifier
            .send("user@example.com", "subject", "body")
            .await
            .unwrap();
    }
}
