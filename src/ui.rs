use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, ContactField, InputMode, Screen};
use crate::transcript::Author;

/// Wrap text to fit within a given width, returning multiple lines.
/// Uses word boundaries for wrapping (doesn't break mid-word).
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Cursor column for a single-line bordered input, clamped so long values
/// never walk the cursor past the right border.
fn input_cursor_x(area: Rect, cursor: usize) -> u16 {
    let inner_width = area.width.saturating_sub(2);
    let offset = (cursor as u16).min(inner_width.saturating_sub(1));
    area.x + 1 + offset
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title
        Constraint::Min(1),    // Body
        Constraint::Length(3), // Input (chat only)
        Constraint::Length(1), // Status line
    ])
    .split(frame.area());

    render_title(frame, app, chunks[0]);

    match app.screen {
        Screen::Chat => {
            render_transcript(frame, app, chunks[1]);
            render_chat_input(frame, app, chunks[2]);
        }
        Screen::Contact => {
            render_contact_form(frame, app, chunks[1].union(chunks[2]));
        }
    }

    render_status(frame, app, chunks[3]);

    if app.show_key_input {
        render_key_popup(frame, app);
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let mode = if app.has_client() {
        Span::styled(" AI replies on ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" offline replies ", Style::default().fg(Color::DarkGray))
    };
    let title = Line::from(vec![
        Span::styled(
            " Studio Assistant ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("| "),
        mode,
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_transcript(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Chat ");
    let inner = block.inner(area);

    // Record geometry so scroll math in App matches what is on screen
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let wrap_width = inner.width as usize;
    let mut lines: Vec<Line> = Vec::new();

    for msg in &app.transcript {
        let style = match msg.author {
            Author::User => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Author::Assistant => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", msg.author.label()),
            style,
        )));
        for raw_line in msg.text.lines() {
            for wrapped in wrap_text_to_width(raw_line, wrap_width) {
                lines.push(Line::from(wrapped));
            }
        }
        lines.push(Line::default());
    }

    if app.reply_loading {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Typing{dots}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let transcript = Paragraph::new(lines)
        .block(block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(transcript, area);
}

fn render_chat_input(frame: &mut Frame, app: &App, area: Rect) {
    let border_style = if app.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(app.chat_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Ask about photography services... "),
        );
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing && !app.show_key_input {
        frame.set_cursor_position((input_cursor_x(area, app.chat_cursor), area.y + 1));
    }
}

fn render_contact_form(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Let's Connect ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(3), // Name
        Constraint::Length(3), // Email
        Constraint::Min(3),    // Message
        Constraint::Length(1), // Footer
    ])
    .split(inner);

    let fields = [
        (ContactField::Name, " Your Name ", app.contact.name.as_str()),
        (ContactField::Email, " Your Email ", app.contact.email.as_str()),
        (
            ContactField::Message,
            " Tell me about your project... ",
            app.contact.message.as_str(),
        ),
    ];

    for (i, (field, title, value)) in fields.iter().enumerate() {
        let active = app.input_mode == InputMode::Editing && app.contact_field == *field;
        let border_style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(*value)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(*title),
            );
        frame.render_widget(widget, chunks[i]);
    }

    let footer = if app.contact_sending {
        Line::from(Span::styled("Sending...", Style::default().fg(Color::Yellow)))
    } else {
        let mut spans = vec![Span::raw("Ready to capture your story? Get in touch.")];
        if let Some(email) = &app.config.studio_email {
            spans.push(Span::styled(
                format!("  {email}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if let Some(instagram) = &app.config.instagram {
            spans.push(Span::styled(
                format!("  {instagram}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(footer), chunks[3]);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = &app.notice {
        Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let hint = match (app.screen, app.input_mode) {
            (Screen::Chat, InputMode::Normal) => {
                "i: type  Tab: contact form  P: API key  j/k: scroll  q: quit"
            }
            (Screen::Chat, InputMode::Editing) => "Enter: send  Esc: done",
            (Screen::Contact, InputMode::Normal) => "i: edit form  Tab: back to chat  q: quit",
            (Screen::Contact, InputMode::Editing) => "Tab: next field  Enter: next / send  Esc: done",
        };
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Centered popup for capturing an API key. The value is masked on screen
/// and only ever kept in memory.
fn render_key_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let masked = "\u{2022}".repeat(app.key_input.chars().count());
    let popup = Paragraph::new(masked)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Enter your OpenAI API key (sk-...) "),
        );
    frame.render_widget(popup, area);

    frame.set_cursor_position((input_cursor_x(area, app.key_cursor), area.y + 1));
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);
    let horizontal = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_word_boundaries() {
        let lines = wrap_text_to_width("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_handles_zero_width_and_empty_input() {
        assert_eq!(wrap_text_to_width("abc", 0), vec!["abc"]);
        assert_eq!(wrap_text_to_width("", 10), vec![""]);
    }

    #[test]
    fn cursor_stays_inside_the_input_box() {
        let area = Rect::new(0, 0, 20, 3);
        assert_eq!(input_cursor_x(area, 0), 1);
        assert_eq!(input_cursor_x(area, 5), 6);
        // A message near the length limit must not cross the right border
        assert_eq!(input_cursor_x(area, 500), area.right() - 2);
    }

    #[test]
    fn centered_rect_stays_inside_the_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 20, parent);
        assert!(popup.x >= parent.x && popup.right() <= parent.right());
        assert!(popup.y >= parent.y && popup.bottom() <= parent.bottom());
    }
}
