//! Mail transport: submits one application email over SMTP with STARTTLS.
//!
//! The dispatch loop only sees `MailTransport`; the SMTP session lives here.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Code;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::debug;

/// SMTP reply code for rejected credentials.
const AUTH_FAILED_CODE: &str = "535";

#[derive(Debug, Error)]
pub enum SendError {
    #[error("SMTP authentication failed: verify the sender email and app password")]
    Authentication,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Who the mail comes from and how to log in as them. Held in memory only.
#[derive(Clone)]
pub struct SenderIdentity {
    pub email: String,
    pub app_password: String,
}

impl fmt::Debug for SenderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderIdentity")
            .field("email", &self.email)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

/// A file sent along with the mail.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A single-recipient message with a plain-text body and one attachment.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub sender: SenderIdentity,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment: MailAttachment,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), SendError>;
}

/// SMTP submission (`host:port`, STARTTLS, login, send) via lettre.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), SendError> {
        let message = build_message(mail)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| SendError::Delivery(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(
                mail.sender.email.clone(),
                mail.sender.app_password.clone(),
            ))
            .build();

        debug!("Submitting mail to {} via {}:{}", mail.recipient, self.host, self.port);
        transport
            .send(message)
            .await
            .map_err(|e| classify_send_error(e.status(), e.to_string()))?;
        Ok(())
    }
}

/// Maps an SMTP failure to a `SendError` by its reply code, when the server sent one.
fn classify_send_error(status: Option<Code>, detail: String) -> SendError {
    match status {
        Some(code) if code.to_string() == AUTH_FAILED_CODE => SendError::Authentication,
        _ => SendError::Delivery(detail),
    }
}

/// Builds the MIME message: multipart/mixed with the text body and the attachment.
pub fn build_message(mail: &OutgoingMail) -> Result<Message, SendError> {
    let from: Mailbox = mail
        .sender
        .email
        .parse()
        .map_err(|_| SendError::InvalidAddress(mail.sender.email.clone()))?;
    let to: Mailbox = mail
        .recipient
        .parse()
        .map_err(|_| SendError::InvalidAddress(mail.recipient.clone()))?;
    let content_type = ContentType::parse(&mail.attachment.content_type)
        .map_err(|e| SendError::Delivery(format!("bad attachment content type: {e}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.clone()))
                .singlepart(
                    Attachment::new(mail.attachment.filename.clone())
                        .body(mail.attachment.bytes.to_vec(), content_type),
                ),
        )
        .map_err(|e| SendError::Delivery(e.to_string()))
}
