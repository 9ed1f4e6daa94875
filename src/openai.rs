use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const MODEL: &str = "gpt-4o-mini";

/// Persona prompt sent with every completion request.
const SYSTEM_PROMPT: &str = "You are an assistant for Mustafa Barood's photography studio. \
You help visitors with information about:\n\
- Photography services and specialties\n\
- Booking sessions and pricing inquiries\n\
- Portfolio and past work\n\
- Photography tips and advice\n\
- Contact information\n\n\
Be friendly, professional, and knowledgeable about photography. If asked about \
specific pricing or booking, encourage visitors to use the contact form or email \
directly for detailed quotes.\n\n\
Keep responses concise but helpful. You represent a professional photographer's brand.";

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// One completion call for one visitor message. Single attempt, no retry.
    pub async fn complete(&self, user_text: &str) -> Result<String> {
        let request = CompletionRequest {
            model: MODEL.to_string(),
            messages: vec![
                ApiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ApiMessage {
                    role: "user".to_string(),
                    content: user_text.to_string(),
                },
            ],
            max_tokens: 300,
            temperature: 0.7,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("completion endpoint returned {}: {}", status, text));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("completion response contained no choices"))
    }
}

/// Format check for a captured API key: the expected prefix plus a
/// reasonable minimum length. The key itself is never persisted.
pub fn looks_like_api_key(key: &str) -> bool {
    key.starts_with("sk-") && key.len() >= 20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_keys_of_plausible_length() {
        assert!(looks_like_api_key("sk-abcdefghijklmnopqrstuvwx"));
    }

    #[test]
    fn rejects_short_or_unprefixed_keys() {
        assert!(!looks_like_api_key("sk-short"));
        assert!(!looks_like_api_key("pk-abcdefghijklmnopqrstuvwx"));
        assert!(!looks_like_api_key(""));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = OpenAIClient::with_base_url("sk-test", "http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
