//! Notification service implementation
//!
//! Builds account mails (verification, password reset, email change) from
//! templates and hands them to a [`Mailer`]. Links point at the configured
//! frontend; tokens are URL-encoded.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MailConfig;
use crate::models::User;
use crate::utils::errors::{CampHubError, Result};

/// A fully rendered outgoing mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outgoing mail transport
pub trait Mailer: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Writes mails to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Mail queued"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct MessageTemplate {
    subject: &'static str,
    body: &'static str,
}

const VERIFY_EMAIL: &str = "verify_email";
const RESET_PASSWORD: &str = "reset_password";
const CHANGE_EMAIL: &str = "change_email";

#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    config: MailConfig,
    templates: HashMap<&'static str, MessageTemplate>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("from", &self.config.from_address)
            .field("frontend_url", &self.config.frontend_url)
            .finish_non_exhaustive()
    }
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, config: MailConfig) -> Self {
        Self {
            mailer,
            config,
            templates: Self::load_default_templates(),
        }
    }

    fn load_default_templates() -> HashMap<&'static str, MessageTemplate> {
        let mut templates = HashMap::new();
        templates.insert(
            VERIFY_EMAIL,
            MessageTemplate {
                subject: "Verify your CampHub account",
                body: "Hi {name},\n\nConfirm your email address by opening:\n{link}\n\nThe link expires in {hours} hours.",
            },
        );
        templates.insert(
            RESET_PASSWORD,
            MessageTemplate {
                subject: "Reset your CampHub password",
                body: "Hi {name},\n\nChoose a new password here:\n{link}\n\nThe link expires in {hours} hours. If you did not ask for this, ignore this mail.",
            },
        );
        templates.insert(
            CHANGE_EMAIL,
            MessageTemplate {
                subject: "Confirm your new CampHub email address",
                body: "Hi {name},\n\nConfirm {email} as your new address:\n{link}\n\nThe link expires in {hours} hours.",
            },
        );
        templates
    }

    fn link(&self, path: &str, token: &str) -> String {
        format!(
            "{}/{}?token={}",
            self.config.frontend_url.trim_end_matches('/'),
            path,
            urlencoding::encode(token)
        )
    }

    fn render(&self, key: &str, to: &str, params: &[(&str, &str)]) -> Result<MailMessage> {
        let template = self
            .templates
            .get(key)
            .ok_or_else(|| CampHubError::Config(format!("Unknown mail template: {}", key)))?;

        let mut body = template.body.to_string();
        for (name, value) in params {
            body = body.replace(&format!("{{{}}}", name), value);
        }

        Ok(MailMessage {
            from: self.config.from_address.clone(),
            to: to.to_string(),
            subject: template.subject.to_string(),
            body,
        })
    }

    fn deliver(&self, key: &str, to: &str, params: &[(&str, &str)]) -> Result<MailMessage> {
        let message = self.render(key, to, params)?;
        self.mailer.send(&message)?;
        Ok(message)
    }

    pub fn send_verification(&self, user: &User, token: &str, ttl_hours: i64) -> Result<MailMessage> {
        let link = self.link("verify-email", token);
        self.deliver(
            VERIFY_EMAIL,
            &user.email,
            &[("name", &user.display_name()), ("link", &link), ("hours", &ttl_hours.to_string())],
        )
    }

    pub fn send_password_reset(&self, user: &User, token: &str, ttl_hours: i64) -> Result<MailMessage> {
        let link = self.link("reset-password", token);
        self.deliver(
            RESET_PASSWORD,
            &user.email,
            &[("name", &user.display_name()), ("link", &link), ("hours", &ttl_hours.to_string())],
        )
    }

    /// Sent to the new address, which is not yet the user's email
    pub fn send_email_change(&self, user: &User, new_email: &str, token: &str, ttl_hours: i64) -> Result<MailMessage> {
        let link = self.link("verify-email-change", token);
        self.deliver(
            CHANGE_EMAIL,
            new_email,
            &[
                ("name", &user.display_name()),
                ("email", new_email),
                ("link", &link),
                ("hours", &ttl_hours.to_string()),
            ],
        )
    }
}
