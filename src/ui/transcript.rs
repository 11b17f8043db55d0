use crate::core::message::{Message, Role};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

/// Builds transcript lines and answers the scroll questions that depend on them.
pub struct Transcript;

pub fn label_style(role: Role) -> Style {
    let color = match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn body_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Assistant => Style::default(),
    }
}

impl Transcript {
    pub fn build_display_lines(messages: &[Message]) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(messages.len() * 3);
        for msg in messages {
            Self::add_message_lines(&mut lines, msg);
        }
        lines
    }

    /// Label line with the local time, the body line by line, then a spacer.
    fn add_message_lines(lines: &mut Vec<Line<'static>>, msg: &Message) {
        lines.push(Line::from(vec![
            Span::styled(msg.role.display_name(), label_style(msg.role)),
            Span::styled(
                format!("  {}", msg.local_time_label()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        let style = body_style(msg.role);
        for content_line in msg.content.lines() {
            if content_line.trim().is_empty() {
                lines.push(Line::from(""));
            } else {
                lines.push(Line::from(Span::styled(content_line.to_string(), style)));
            }
        }
        lines.push(Line::from(""));
    }

    /// Rows the lines occupy once word-wrapped to `width` columns.
    pub fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
        lines.iter().fold(0u16, |total, line| {
            let text = line.to_string();
            // Matches Wrap { trim: true } in the renderer.
            let trimmed = text.trim();
            let rows = if trimmed.is_empty() || width == 0 {
                1
            } else {
                Self::word_wrapped_rows(trimmed, width)
            };
            total.saturating_add(rows)
        })
    }

    fn word_wrapped_rows(text: &str, width: u16) -> u16 {
        let width = width as usize;
        let mut current = 0usize;
        let mut rows = 1u16;

        for word in text.split_whitespace() {
            let mut word_width = UnicodeWidthStr::width(word);

            if current > 0 && current + 1 + word_width > width {
                rows = rows.saturating_add(1);
                current = 0;
            } else if current > 0 {
                current += 1;
            }

            // Words longer than the row are broken across rows.
            while current + word_width > width {
                let fits = width - current;
                word_width -= fits;
                rows = rows.saturating_add(1);
                current = 0;
            }
            current += word_width;
        }

        rows
    }

    /// Offset that shows the last row of the transcript at the bottom of the view.
    pub fn scroll_to_bottom(messages: &[Message], width: u16, available_height: u16) -> u16 {
        let lines = Self::build_display_lines(messages);
        Self::wrapped_line_count(&lines, width).saturating_sub(available_height)
    }
}
