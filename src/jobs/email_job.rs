//! Email background job.
//!
//! Messages go out over SMTP through `lettre`. Without `SMTP_HOST` the
//! message is written to the log instead of sent.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use std::env;

use crate::domain::User;
use crate::errors::AppError;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const DEFAULT_SMTP_PORT: u16 = 587;
/// Implicit TLS; any other port upgrades with STARTTLS
const SMTPS_PORT: u16 = 465;
const DEFAULT_SMTP_FROM: &str = "noreply@example.com";

/// Email job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Sender override; `SMTP_FROM` when absent
    #[serde(default)]
    pub from: Option<String>,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            from: None,
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Greeting sent after signup.
    pub fn welcome(user: &User, project_name: &str) -> Self {
        Self::new(
            user.email.clone(),
            format!("Welcome to {}", project_name),
            format!(
                "Hi {},\n\nYour account has been created. You can now sign in with {}.\n",
                user.username, user.email
            ),
        )
    }
}

/// SMTP settings read from `SMTP_*` variables.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    smtp_pass: Option<String>,
    pub smtp_from: String,
    pub smtp_tls: bool,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "[REDACTED]"))
            .field("smtp_from", &self.smtp_from)
            .field("smtp_tls", &self.smtp_tls)
            .finish()
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            smtp_host: lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()),
            smtp_port: lookup("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: lookup("SMTP_USER"),
            smtp_pass: lookup("SMTP_PASS"),
            smtp_from: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_SMTP_FROM.to_string()),
            smtp_tls: lookup("SMTP_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }

    /// SMTP transport for these settings, `None` when no host is set.
    ///
    /// Connections are opened lazily on the first send.
    pub fn transport(&self) -> Result<Option<AsyncSmtpTransport<Tokio1Executor>>, AppError> {
        let Some(host) = self.smtp_host.as_deref() else {
            return Ok(None);
        };

        let builder = if !self.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        } else if self.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| AppError::Email(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| AppError::Email(e.to_string()))?
        };

        let mut builder = builder.port(self.smtp_port);
        if let (Some(user), Some(pass)) = (&self.smtp_user, &self.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Some(builder.build()))
    }
}

/// Outgoing mail seam; the SMTP transport in production, a mock in tests.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), AppError>;
}

#[async_trait]
impl Mailer for AsyncSmtpTransport<Tokio1Executor> {
    async fn send(&self, message: Message) -> Result<(), AppError> {
        AsyncTransport::send(self, message)
            .await
            .map(|_response| ())
            .map_err(|e| AppError::Email(e.to_string()))
    }
}

/// Process one email job.
///
/// Delivery failures are returned so the worker records them and retries.
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    let config = EmailConfig::from_env();
    let transport = config.transport()?;
    let mailer = transport.as_ref().map(|t| t as &dyn Mailer);

    deliver(&job, &config, mailer).await
}

fn build_message(job: &EmailJob, from: &str) -> Result<Message, AppError> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| AppError::Email(format!("invalid sender {:?}: {}", from, e)))?;
    let to: Mailbox = job
        .to
        .parse()
        .map_err(|e| AppError::Email(format!("invalid recipient {:?}: {}", job.to, e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(job.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(job.body.clone())
        .map_err(|e| AppError::Email(e.to_string()))
}

async fn deliver(
    job: &EmailJob,
    config: &EmailConfig,
    mailer: Option<&dyn Mailer>,
) -> Result<(), AppError> {
    let from = job.from.as_deref().unwrap_or(&config.smtp_from);

    tracing::info!(
        to = %job.to,
        from = %from,
        subject = %job.subject,
        "Processing email job"
    );

    let Some(mailer) = mailer else {
        tracing::warn!("SMTP not configured - logging email instead of sending");
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            from,
            job.to,
            job.subject,
            job.body
        );
        return Ok(());
    };

    let message = build_message(job, from)?;
    mailer.send(message).await?;

    tracing::info!(to = %job.to, "Email sent");
    Ok(())
}
