//! Chat responder
//!
//! Turns a visitor message into a reply. When an API key is configured the
//! reply comes from the completion endpoint; on any upstream failure (or
//! with no key at all) the answer comes from a fixed table of canned
//! responses. Everything past validation resolves to a string.

use thiserror::Error;
use tracing::{debug, warn};

use crate::openai::OpenAIClient;

/// Longest visitor message accepted, in characters.
pub const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("Message cannot be empty")]
    Empty,
    #[error("Message is too long (limit is {MAX_MESSAGE_LEN} characters)")]
    TooLong,
}

/// Reject blank and oversized messages before any reply work happens.
pub fn validate_message(text: &str) -> Result<(), MessageError> {
    if text.trim().is_empty() {
        return Err(MessageError::Empty);
    }
    if text.chars().count() > MAX_MESSAGE_LEN {
        return Err(MessageError::TooLong);
    }
    Ok(())
}

/// One canned-response rule: if any keyword appears in the lowercased
/// message, `response` is the answer.
pub struct ResponseRule {
    pub topic: &'static str,
    keywords: &'static [&'static str],
    response: &'static str,
}

/// The offline answer table. Order matters: the first matching rule wins,
/// so keep pricing before booking, booking before portfolio, and so on.
pub const RULES: &[ResponseRule] = &[
    ResponseRule {
        topic: "pricing",
        keywords: &["price", "cost", "rate", "fee", "how much", "charge", "budget"],
        response: "Pricing depends on the kind of shoot and how long it runs. \
            Portrait sessions start from a flat rate, while events and weddings \
            are priced per package. Send a note through the contact form and \
            I'll get back to you with detailed quotes.",
    },
    ResponseRule {
        topic: "booking",
        keywords: &["book", "schedule", "appointment", "reserve", "availab"],
        response: "I'd love to shoot with you! To book a session, share your \
            preferred dates and the kind of shoot through the contact form, and \
            I'll confirm availability within a day.",
    },
    ResponseRule {
        topic: "portfolio",
        keywords: &["portfolio", "gallery", "galleries", "photos", "pictures", "your work"],
        response: "You can browse the portfolio galleries right on this site: \
            street photography, portraits, black and white, and everyday \
            moments. Each series has its own story behind it.",
    },
    ResponseRule {
        topic: "experience",
        keywords: &["experience", "years", "how long", "background", "professional"],
        response: "Mustafa has spent years chasing light in the streets, with a \
            focus on candid visual storytelling. Street photography and black \
            and white work are where it all started.",
    },
    ResponseRule {
        topic: "services",
        keywords: &["service", "wedding", "portrait", "event", "session", "shoot"],
        response: "Services cover portrait sessions, street and documentary \
            work, event coverage, and black and white fine art prints. If you \
            have something different in mind, just ask.",
    },
    ResponseRule {
        topic: "location",
        keywords: &["location", "where", "based", "travel", "area", "city"],
        response: "The studio is locally based, but travel is always on the \
            table for the right project. Mention where your shoot would happen \
            and we'll figure it out.",
    },
    ResponseRule {
        topic: "equipment",
        keywords: &["equipment", "camera", "gear", "lens", "lenses"],
        response: "The kit is kept simple: a full-frame body, a couple of fast \
            prime lenses, and natural light whenever possible. The story \
            matters more than the gear.",
    },
    ResponseRule {
        topic: "editing",
        keywords: &["edit", "retouch", "photoshop", "lightroom", "post-process"],
        response: "Every delivered image gets a careful edit: color grading, \
            exposure balancing, and light retouching in Lightroom. Heavy \
            manipulation isn't really the style here.",
    },
    ResponseRule {
        topic: "contact",
        keywords: &["contact", "email", "phone", "reach", "instagram", "touch"],
        response: "The fastest way to reach out is the contact form on this \
            site, or email mustafabarood06@gmail.com. You can also find the \
            latest work on Instagram at @shot_by_mustafa.",
    },
];

/// Answer when no rule matches.
pub const DEFAULT_REPLY: &str = "I can help with questions about photography \
    services, pricing, booking a session, or the portfolio. What would you \
    like to know?";

/// Message the transcript is seeded with.
pub const GREETING: &str = "Hi! I'm the studio assistant. I can help you learn \
    about Mustafa's work, pricing, booking sessions, or answer any questions \
    about photography services. How can I help you today?";

/// Canned reply for a message. Case-insensitive, first matching rule wins,
/// default when nothing matches. Pure over the rule table.
pub fn rule_reply(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.response)
        .unwrap_or(DEFAULT_REPLY)
}

/// Full reply pipeline. Tries the completion endpoint when a client is
/// configured; any upstream failure is logged and absorbed here, never
/// surfaced to the caller.
pub async fn get_reply(
    user_text: &str,
    client: Option<&OpenAIClient>,
) -> Result<String, MessageError> {
    validate_message(user_text)?;

    if let Some(client) = client {
        match client.complete(user_text).await {
            Ok(reply) => return Ok(reply),
            Err(err) => {
                warn!("completion request failed, falling back to canned replies: {err:#}");
            }
        }
    }

    debug!("answering from the rule table");
    Ok(rule_reply(user_text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_question_gets_pricing_rule() {
        let reply = rule_reply("What's your pricing?");
        assert!(reply.contains("quotes"));
    }

    #[test]
    fn booking_question_gets_booking_rule() {
        let reply = rule_reply("Can I book a session?");
        assert!(reply.contains("book a session"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(rule_reply("PRICE??"), rule_reply("price??"));
        assert!(rule_reply("PRICE??").contains("quotes"));
    }

    #[test]
    fn first_rule_wins_on_multiple_matches() {
        // "cost" (pricing) and "book" (booking) both match; pricing is first.
        let reply = rule_reply("What does it cost to book you?");
        assert!(reply.contains("quotes"));
    }

    #[test]
    fn unmatched_message_gets_default_reply() {
        assert_eq!(rule_reply("Tell me a joke"), DEFAULT_REPLY);
    }

    #[test]
    fn every_rule_is_reachable_by_its_own_topic_word() {
        for rule in RULES {
            let probe = format!("tell me about {}", rule.topic);
            // Each topic name should route to its own rule or an earlier one;
            // the table stays total either way.
            assert!(!rule_reply(&probe).is_empty());
        }
    }

    #[test]
    fn blank_messages_are_rejected() {
        assert_eq!(validate_message(""), Err(MessageError::Empty));
        assert_eq!(validate_message("   "), Err(MessageError::Empty));
    }

    #[test]
    fn oversized_messages_are_rejected() {
        let long = "a".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(validate_message(&long), Err(MessageError::TooLong));
        let at_limit = "a".repeat(MAX_MESSAGE_LEN);
        assert_eq!(validate_message(&at_limit), Ok(()));
    }

    #[tokio::test]
    async fn get_reply_without_client_uses_rule_table() {
        let reply = get_reply("What's your pricing?", None).await.unwrap();
        assert!(reply.contains("quotes"));
    }

    #[tokio::test]
    async fn get_reply_rejects_blank_input_before_any_reply_work() {
        assert_eq!(get_reply("", None).await, Err(MessageError::Empty));
        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(get_reply(&long, None).await, Err(MessageError::TooLong));
    }

    #[tokio::test]
    async fn get_reply_is_idempotent_without_client() {
        let first = get_reply("where are you based?", None).await.unwrap();
        let second = get_reply("where are you based?", None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn upstream_failure_falls_back_to_rule_reply() {
        // Nothing listens here, so the request fails immediately and the
        // responder must absorb the error and answer from the table.
        let client = crate::openai::OpenAIClient::with_base_url(
            "sk-test-key-that-is-long-enough",
            "http://127.0.0.1:9",
        );
        let reply = get_reply("What's your pricing?", Some(&client))
            .await
            .unwrap();
        assert_eq!(reply, rule_reply("What's your pricing?"));
    }

    #[tokio::test]
    async fn non_2xx_upstream_falls_back_to_rule_reply() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // One-shot server that answers every request with a 500, so the
        // status-check branch (not just connection errors) is exercised.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 500 Internal Server Error\r\n\
                          content-length: 0\r\n\
                          connection: close\r\n\r\n",
                    )
                    .await;
            }
        });

        let client = crate::openai::OpenAIClient::with_base_url(
            "sk-test-key-that-is-long-enough",
            &format!("http://{addr}"),
        );
        let reply = get_reply("What's your pricing?", Some(&client))
            .await
            .unwrap();
        assert_eq!(reply, rule_reply("What's your pricing?"));
    }
}
