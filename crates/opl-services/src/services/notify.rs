//! Report delivery by email
//!
//! `ReportMailer` is the seam the pipeline sends through; `SmtpNotifier` is
//! the production implementation (implicit-TLS SMTP submission via lettre).

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use opl_core::MailConfig;
use thiserror::Error;

use crate::retry::RetryPolicy;

pub const REPORT_SUBJECT: &str = "Your OPL Report";
pub const REPORT_BODY: &str = "Attached is your One Point Lesson (OPL) report.";

const RETRY_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid email address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to read report {path}: {source}")]
    ReadReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid content type: {0}")]
    ContentType(String),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl NotifyError {
    /// Connection problems, timeouts and 4xx replies may clear on a retry.
    /// Permanent (5xx) replies such as rejected credentials do not.
    pub fn is_transient(&self) -> bool {
        match self {
            NotifyError::Smtp(e) => !e.is_permanent() && !e.is_client(),
            _ => false,
        }
    }
}

/// Sends a rendered report to its submitter.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_report(&self, to_email: &str, report_path: &Path) -> Result<(), NotifyError>;
}

/// Build the report email: fixed subject, short plain-text body and the PDF
/// attached under `file_name`.
pub fn build_report_message(
    from: &Mailbox,
    to_email: &str,
    file_name: &str,
    pdf: Vec<u8>,
) -> Result<Message, NotifyError> {
    let to: Mailbox = to_email.parse().map_err(|e: lettre::address::AddressError| {
        NotifyError::Address {
            address: to_email.to_string(),
            reason: e.to_string(),
        }
    })?;
    let pdf_type =
        ContentType::parse("application/pdf").map_err(|e| NotifyError::ContentType(e.to_string()))?;

    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(REPORT_SUBJECT)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(REPORT_BODY.to_string()))
                .singlepart(Attachment::new(file_name.to_string()).body(pdf, pdf_type)),
        )?;

    Ok(message)
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    retry: RetryPolicy,
}

impl SmtpNotifier {
    /// Build the transport from explicit configuration. No connection is made
    /// until the first message is sent.
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config.email_from.parse().map_err(
            |e: lettre::address::AddressError| NotifyError::Address {
                address: config.email_from.clone(),
                reason: e.to_string(),
            },
        )?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.email_from.clone(),
                config.email_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        tracing::info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            from = %config.email_from,
            "Email service initialized (SMTP with implicit TLS)"
        );

        Ok(Self {
            transport,
            from,
            retry: RetryPolicy::new(config.max_attempts, RETRY_BACKOFF),
        })
    }
}

#[async_trait]
impl ReportMailer for SmtpNotifier {
    async fn send_report(&self, to_email: &str, report_path: &Path) -> Result<(), NotifyError> {
        let pdf = tokio::fs::read(report_path)
            .await
            .map_err(|e| NotifyError::ReadReport {
                path: report_path.to_path_buf(),
                source: e,
            })?;
        let file_name = report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| opl_processing::REPORT_FILE_NAME.to_string());

        let message = build_report_message(&self.from, to_email, &file_name, pdf)?;

        self.retry
            .run(
                "report email",
                |_| {
                    let message = message.clone();
                    async move {
                        self.transport.send(message).await?;
                        Ok::<(), NotifyError>(())
                    }
                },
                NotifyError::is_transient,
            )
            .await?;

        tracing::info!(to = %to_email, file = %file_name, "Report email sent");
        Ok(())
    }
}
