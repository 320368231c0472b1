use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;
use crate::report::Digest;

/// Delivery channel for rendered digests. The production implementation
/// speaks SMTP; tests substitute a recording mock so the poll cycle's
/// dispatch decision can be exercised without a mail server.
pub trait Dispatch {
    fn send(&self, config: &Config, digest: &Digest) -> Result<()>;
}

/// Delivers digests over SMTP. Failures are reported to the caller and
/// never kill the process; the loop retries on the next interval.
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }
}

impl Dispatch for Notifier {
    /// Send the digest as one message with every recipient on a single To
    /// header. With an empty password the connection is unauthenticated,
    /// which supports local port-25 relays.
    fn send(&self, config: &Config, digest: &Digest) -> Result<()> {
        let mut builder = Message::builder()
            .from(
                config
                    .email_from
                    .parse()
                    .with_context(|| format!("Invalid sender address: {}", config.email_from))?,
            )
            .subject(&digest.subject)
            .header(ContentType::TEXT_PLAIN);

        for recipient in &config.email_to {
            builder = builder.to(recipient
                .parse()
                .with_context(|| format!("Invalid recipient address: {}", recipient))?);
        }

        let email = builder.body(digest.body.clone())?;

        // builder_dangerous: the relays targeted here speak plaintext SMTP.
        let mut transport = SmtpTransport::builder_dangerous(&config.smtp_server)
            .port(config.smtp_port);
        if !config.email_password.is_empty() {
            transport = transport.credentials(Credentials::new(
                config.email_from.clone(),
                config.email_password.clone(),
            ));
        }

        transport
            .build()
            .send(&email)
            .context("SMTP delivery failed")?;

        Ok(())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
