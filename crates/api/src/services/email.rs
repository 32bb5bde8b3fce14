//! Outbound email.
//!
//! Supports two providers:
//! - `console`: logs messages (development)
//! - `relay`: JSON `POST {to, subject, text, html?}` to an HTTP mail relay
//!   authenticated with an API key
//!
//! Handlers depend on the [`Mailer`] trait so tests can record messages.

use async_trait::async_trait;
use domain::models::contact::ContactSubmission;
use domain::services::mail_template::{
    escape_html, render_template, reply_html, TemplateVars, DEFAULT_CONTACT_TEMPLATE,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{EmailConfig, EmailProvider};

const RELAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service disabled")]
    Disabled,

    #[error("Email service not configured: {0}")]
    NotConfigured(String),

    #[error("No recipients")]
    NoRecipients,

    #[error("Relay request failed: {0}")]
    Transport(String),

    #[error("Relay responded with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A message to one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

/// Sends email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    to: String,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

/// [`Mailer`] backed by configuration.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .map_err(|e| EmailError::NotConfigured(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = %message.to.join(", "),
            subject = %message.subject,
            from_name = %self.config.sender_name,
            "Email (console provider)"
        );
        info!(body_text = %message.body_text, "Email body (plain text)");
        if let Some(html) = &message.body_html {
            debug!(body_html_length = html.len(), "Email body (HTML)");
        }
    }

    async fn send_relay(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if self.config.relay_url.is_empty() || self.config.relay_api_key.is_empty() {
            return Err(EmailError::NotConfigured(
                "relay_url and relay_api_key are required".to_string(),
            ));
        }

        let payload = RelayPayload {
            to: message.to.join(","),
            subject: &message.subject,
            text: &message.body_text,
            html: message.body_html.as_deref(),
        };

        let response = self
            .client
            .post(&self.config.relay_url)
            .bearer_auth(&self.config.relay_api_key)
            .header("x-api-key", &self.config.relay_api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = %payload.to, subject = %message.subject, "Email sent via relay");
        Ok(())
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        if !self.config.enabled {
            debug!(subject = %message.subject, "Email service disabled, not sending");
            return Err(EmailError::Disabled);
        }

        match self.config.provider {
            EmailProvider::Console => {
                self.send_console(message);
                Ok(())
            }
            EmailProvider::Relay => self.send_relay(message).await,
        }
    }
}

/// Notifies staff of a new contact form submission. `template` is the
/// `email.notificationTemplate` setting, if any.
pub fn contact_notification(
    receivers: Vec<String>,
    submission: &ContactSubmission,
    template: Option<&str>,
) -> EmailMessage {
    let vars = TemplateVars {
        name: &submission.name,
        email: &submission.email,
        phone: &submission.phone,
        message: &submission.message,
    };

    EmailMessage {
        to: receivers,
        subject: format!("New contact form submission from {}", submission.name),
        body_text: render_template(template.unwrap_or(DEFAULT_CONTACT_TEMPLATE), &vars),
        body_html: None,
    }
}

/// Sends the staff reply to the person who submitted the form.
pub fn contact_reply(submission: &ContactSubmission, reply: &str, sender_name: &str) -> EmailMessage {
    let body_text = format!(
        "Dear {name},\n\nThank you for contacting {sender}. Our reply:\n\n{reply}\n\n\
         Your original message:\n{message}\n\nBest regards,\n{sender}",
        name = submission.name,
        sender = sender_name,
        reply = reply,
        message = submission.message,
    );

    let body_html = format!(
        "<p>Dear {name},</p>\
         <p>Thank you for contacting {sender}. Our reply:</p>\
         <blockquote>{reply}</blockquote>\
         <p>Your original message:</p>\
         <blockquote>{message}</blockquote>\
         <p>Best regards,<br>{sender}</p>",
        name = escape_html(&submission.name),
        sender = escape_html(sender_name),
        reply = reply_html(reply),
        message = reply_html(&submission.message),
    );

    EmailMessage {
        to: vec![submission.email.clone()],
        subject: format!("Re: your enquiry to {}", sender_name),
        body_text,
        body_html: Some(body_html),
    }
}

/// Invitation carrying the set-password link.
pub fn invitation(name: &str, email: &str, link: &str, sender_name: &str) -> EmailMessage {
    let body_text = format!(
        "Hi {name},\n\nAn account has been created for you on the {sender} site admin.\n\
         Set your password here (valid for 24 hours):\n\n{link}\n\n\
         If you were not expecting this, you can ignore this email.",
        name = name,
        sender = sender_name,
        link = link,
    );

    let body_html = format!(
        "<p>Hi {name},</p>\
         <p>An account has been created for you on the {sender} site admin.</p>\
         <p><a href=\"{link}\">Set your password</a> (valid for 24 hours).</p>\
         <p>If you were not expecting this, you can ignore this email.</p>",
        name = escape_html(name),
        sender = escape_html(sender_name),
        link = escape_html(link),
    );

    EmailMessage {
        to: vec![email.to_string()],
        subject: format!("Your {} admin account", sender_name),
        body_text,
        body_html: Some(body_html),
    }
}
