use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, ContactField, InputMode, Screen};
use crate::openai;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A notice stays visible until the next keypress
    app.clear_notice();

    if app.show_key_input {
        handle_key_input_popup(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_key_input_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_key_input = false;
            app.key_input.clear();
            app.key_cursor = 0;
        }
        KeyCode::Enter => {
            if openai::looks_like_api_key(&app.key_input) {
                let entered = std::mem::take(&mut app.key_input);
                app.key_cursor = 0;
                app.show_key_input = false;
                app.set_api_key(&entered);
            } else {
                app.set_notice(
                    "That doesn't look like an API key (expected sk-... and at least 20 characters).",
                );
            }
        }
        KeyCode::Backspace => {
            if app.key_cursor > 0 {
                app.key_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.key_input, app.key_cursor);
                app.key_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.key_cursor = app.key_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.key_input.chars().count();
            app.key_cursor = (app.key_cursor + 1).min(char_count);
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.key_input, app.key_cursor);
            app.key_input.insert(byte_pos, c);
            app.key_cursor += 1;
        }
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        // Switch between the chat pane and the contact form
        KeyCode::Tab => {
            app.screen = match app.screen {
                Screen::Chat => Screen::Contact,
                Screen::Contact => Screen::Chat,
            };
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            if app.screen == Screen::Chat {
                app.scroll_chat_down();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.screen == Screen::Chat {
                app.scroll_chat_up();
            }
        }
        KeyCode::Char('G') => {
            if app.screen == Screen::Chat {
                app.scroll_chat_to_bottom();
            }
        }

        // Capture an API key for this session
        KeyCode::Char('P') => {
            app.show_key_input = true;
            app.key_input.clear();
            app.key_cursor = 0;
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Chat => handle_chat_editing(app, key),
        Screen::Contact => handle_contact_editing(app, key),
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_message();
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_contact_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.contact_field = app.contact_field.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.contact_field = app.contact_field.prev();
        }
        // Enter advances through the form; on the message field it submits
        KeyCode::Enter => {
            if app.contact_field == ContactField::Message {
                app.submit_contact();
            } else {
                app.contact_field = app.contact_field.next();
            }
        }
        KeyCode::Backspace => {
            active_field_mut(app).pop();
        }
        KeyCode::Char(c) => {
            active_field_mut(app).push(c);
        }
        _ => {}
    }
}

fn active_field_mut(app: &mut App) -> &mut String {
    match app.contact_field {
        ContactField::Name => &mut app.contact.name,
        ContactField::Email => &mut app.contact.email,
        ContactField::Message => &mut app.contact.message,
    }
}
