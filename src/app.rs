use tokio::task::JoinHandle;
use tracing::warn;

use crate::assistant;
use crate::config::Config;
use crate::contact::ContactForm;
use crate::openai::{self, OpenAIClient};
use crate::transcript::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub fn next(self) -> Self {
        match self {
            ContactField::Name => ContactField::Email,
            ContactField::Email => ContactField::Message,
            ContactField::Message => ContactField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ContactField::Name => ContactField::Message,
            ContactField::Email => ContactField::Name,
            ContactField::Message => ContactField::Email,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub config: Config,

    // Chat state
    pub transcript: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_cursor: usize,
    pub reply_loading: bool,
    pub reply_task: Option<JoinHandle<String>>,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub animation_frame: u8,

    // Credential state (memory only, never written to disk)
    pub client: Option<OpenAIClient>,
    pub show_key_input: bool,
    pub key_input: String,
    pub key_cursor: usize,

    // Contact form state
    pub contact: ContactForm,
    pub contact_field: ContactField,
    pub contact_sending: bool,
    pub contact_task: Option<JoinHandle<anyhow::Result<()>>>,

    // One-line status message (validation errors, confirmations)
    pub notice: Option<String>,

    pub http: reqwest::Client,
}

impl App {
    pub fn new(config: Config) -> Self {
        // A key from the environment seeds the session; a malformed one is
        // ignored rather than sent upstream.
        let client = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| {
                let ok = openai::looks_like_api_key(key);
                if !ok {
                    warn!("ignoring OPENAI_API_KEY with unexpected format");
                }
                ok
            })
            .map(|key| OpenAIClient::new(&key));

        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Normal,
            config,

            transcript: vec![ChatMessage::assistant(assistant::GREETING)],
            chat_input: String::new(),
            chat_cursor: 0,
            reply_loading: false,
            reply_task: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,

            client,
            show_key_input: false,
            key_input: String::new(),
            key_cursor: 0,

            contact: ContactForm::default(),
            contact_field: ContactField::Name,
            contact_sending: false,
            contact_task: None,

            notice: None,

            http: reqwest::Client::new(),
        }
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Submit the current chat input. Ignored while a reply is already
    /// pending; validation failures become a status-line notice and the
    /// reply pipeline is not invoked.
    pub fn submit_message(&mut self) {
        if self.reply_task.is_some() {
            return;
        }

        if let Err(err) = assistant::validate_message(&self.chat_input) {
            self.set_notice(err.to_string());
            return;
        }

        let text = std::mem::take(&mut self.chat_input);
        self.chat_cursor = 0;
        self.transcript.push(ChatMessage::user(text.clone()));
        self.reply_loading = true;
        self.scroll_chat_to_bottom();

        let client = self.client.clone();
        self.reply_task = Some(tokio::spawn(async move {
            // Input was validated above, so the pipeline cannot reject it;
            // every remaining path resolves to a string.
            match assistant::get_reply(&text, client.as_ref()).await {
                Ok(reply) => reply,
                Err(err) => err.to_string(),
            }
        }));
    }

    /// Reap finished background tasks. Cheap to call every tick: only
    /// already-finished handles are awaited.
    pub async fn poll_tasks(&mut self) {
        let reply_done = self
            .reply_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if reply_done {
            if let Some(task) = self.reply_task.take() {
                let reply = match task.await {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!("reply task panicked or was cancelled: {err}");
                        assistant::DEFAULT_REPLY.to_string()
                    }
                };
                self.transcript.push(ChatMessage::assistant(reply));
                self.reply_loading = false;
                self.scroll_chat_to_bottom();
            }
        }

        let contact_done = self
            .contact_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if contact_done {
            if let Some(task) = self.contact_task.take() {
                self.contact_sending = false;
                match task.await {
                    Ok(Ok(())) => {
                        self.contact.clear();
                        self.contact_field = ContactField::Name;
                        self.set_notice("Message sent! Thank you for reaching out.");
                    }
                    Ok(Err(err)) => {
                        warn!("contact submission failed: {err:#}");
                        self.set_notice("Error sending message. Please try again, or reach out on Instagram.");
                    }
                    Err(err) => {
                        warn!("contact task panicked or was cancelled: {err}");
                        self.set_notice("Error sending message. Please try again.");
                    }
                }
            }
        }
    }

    /// Accept a captured API key for this session only.
    pub fn set_api_key(&mut self, key: &str) {
        if !openai::looks_like_api_key(key) {
            self.set_notice("That doesn't look like an API key (expected sk-... and at least 20 characters).");
            return;
        }
        self.client = Some(OpenAIClient::new(key));
        self.set_notice("API key saved for this session. It is never written to disk.");
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Submit the contact form to the relay endpoint.
    pub fn submit_contact(&mut self) {
        if self.contact_task.is_some() {
            return;
        }

        if let Err(err) = self.contact.validate() {
            self.set_notice(err.to_string());
            return;
        }

        let form = self.contact.clone();
        let client = self.http.clone();
        let endpoint = self.config.contact_endpoint().to_string();
        self.contact_sending = true;
        self.contact_task = Some(tokio::spawn(async move {
            form.submit(&client, &endpoint).await
        }));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.reply_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        let max = self.transcript_line_count().saturating_sub(self.chat_height);
        if self.chat_scroll < max {
            self.chat_scroll += 1;
        }
    }

    /// Scroll so the newest message (and the typing indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total = self.transcript_line_count();
        let visible = if self.chat_height > 0 { self.chat_height } else { 20 };
        if total > visible {
            self.chat_scroll = total - visible;
        } else {
            self.chat_scroll = 0;
        }
    }

    fn transcript_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in &self.transcript {
            total_lines += 1; // Author line ("You:" or "Assistant:")
            for line in msg.text.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.reply_loading {
            total_lines += 2; // "Assistant:" + "Typing..."
        }

        total_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::new())
    }

    #[tokio::test]
    async fn transcript_starts_with_the_greeting() {
        let app = app();
        assert_eq!(app.transcript.len(), 1);
        assert_eq!(app.transcript[0].text, assistant::GREETING);
    }

    #[tokio::test]
    async fn blank_input_becomes_a_notice_not_a_message() {
        let mut app = app();
        app.chat_input = "   ".to_string();
        app.submit_message();
        assert!(app.reply_task.is_none());
        assert_eq!(app.transcript.len(), 1);
        assert!(app.notice.is_some());
    }

    #[tokio::test]
    async fn submit_then_poll_appends_a_rule_reply() {
        let mut app = app();
        app.client = None;
        app.chat_input = "What's your pricing?".to_string();
        app.submit_message();
        assert!(app.reply_loading);
        assert!(app.chat_input.is_empty());

        while app.reply_task.is_some() {
            app.poll_tasks().await;
            tokio::task::yield_now().await;
        }

        assert!(!app.reply_loading);
        let last = app.transcript.last().unwrap();
        assert!(last.text.contains("quotes"));
    }

    #[tokio::test]
    async fn submission_is_disabled_while_a_reply_is_pending() {
        let mut app = app();
        app.chat_input = "Can I book a session?".to_string();
        app.submit_message();
        let after_first = app.transcript.len();

        app.chat_input = "another question".to_string();
        app.submit_message();
        assert_eq!(app.transcript.len(), after_first);

        while app.reply_task.is_some() {
            app.poll_tasks().await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn malformed_key_is_rejected_and_no_client_is_configured() {
        let mut app = app();
        app.client = None;
        app.set_api_key("not-a-key");
        assert!(!app.has_client());
        assert!(app.notice.is_some());

        app.set_api_key("sk-abcdefghijklmnopqrstuvwx");
        assert!(app.has_client());
    }

    #[tokio::test]
    async fn invalid_contact_form_never_spawns_a_task() {
        let mut app = app();
        app.contact.email = "not-an-email".to_string();
        app.contact.name = "Ada".to_string();
        app.contact.message = "hello".to_string();
        app.submit_contact();
        assert!(app.contact_task.is_none());
        assert!(app.notice.is_some());
    }
}
