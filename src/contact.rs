//! Contact form
//!
//! Validates a name/email/message form and forwards it to a Formspree-style
//! relay endpoint. Completely independent of the chat responder.

use std::sync::OnceLock;

use anyhow::{Result, anyhow};
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

// Same pattern the contact form on the site enforces.
const EMAIL_PATTERN: &str = r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,4}$";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Name is required")]
    MissingName,
    #[error("Valid email is required")]
    InvalidEmail,
    #[error("Message is required")]
    MissingMessage,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Serialize)]
struct ContactSubmission<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
    #[serde(rename = "submittedAt")]
    submitted_at: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::MissingName);
        }
        if self.email.trim().is_empty() || !email_regex().is_match(self.email.trim()) {
            return Err(ContactError::InvalidEmail);
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::MissingMessage);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    /// Forward a validated form to the relay. One attempt; the caller
    /// decides how to present a failure.
    pub async fn submit(&self, client: &Client, endpoint: &str) -> Result<()> {
        self.validate()?;

        let body = ContactSubmission {
            name: self.name.trim(),
            email: self.email.trim(),
            message: self.message.trim(),
            submitted_at: Utc::now().to_rfc3339(),
        };

        let response = client.post(endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("contact relay returned {}", response.status()));
        }

        info!("contact form forwarded to relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "I'd like a portrait session.".to_string(),
        }
    }

    #[test]
    fn filled_form_validates() {
        assert_eq!(filled().validate(), Ok(()));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut form = filled();
        form.name = "  ".to_string();
        assert_eq!(form.validate(), Err(ContactError::MissingName));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        let mut form = filled();
        for bad in ["nope", "a@b", "a@b.toolongtld", "user@.com"] {
            form.email = bad.to_string();
            assert_eq!(form.validate(), Err(ContactError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn reasonable_emails_are_accepted() {
        let mut form = filled();
        for good in ["a@b.co", "first.last@mail.example.org", "user-name@host.io"] {
            form.email = good.to_string();
            assert_eq!(form.validate(), Ok(()), "{good}");
        }
    }

    #[test]
    fn blank_message_is_rejected() {
        let mut form = filled();
        form.message = String::new();
        assert_eq!(form.validate(), Err(ContactError::MissingMessage));
    }

    #[tokio::test]
    async fn submit_refuses_invalid_forms_without_touching_the_network() {
        let form = ContactForm::default();
        let client = Client::new();
        // Endpoint is unroutable; validation must fail first.
        let err = form.submit(&client, "http://127.0.0.1:9").await.unwrap_err();
        assert!(err.to_string().contains("Name is required"));
    }
}
