//! The message draft.
//!
//! Enter submits the trimmed draft, Alt+Enter or Shift+Enter inserts a
//! newline, and everything else goes to the underlying `TextArea`. While the
//! conversation is busy the box accepts nothing at all.

use ratatui::{
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};
use tui_textarea::{Input, TextArea};

/// Text rows the box grows to before it starts scrolling.
pub const MAX_INPUT_ROWS: u16 = 8;

const PLACEHOLDER: &str = "Send a message...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The draft was sent and cleared; carries the trimmed text.
    Submitted(String),
    /// The key changed the draft or moved the cursor.
    Handled,
    /// Nothing happened.
    Ignored,
}

pub struct InputBox {
    textarea: TextArea<'static>,
    busy: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        let mut input = Self {
            textarea: TextArea::default(),
            busy: false,
        };
        input.configure();
        input
    }

    fn configure(&mut self) {
        let (border, title) = if self.busy {
            (Style::default().fg(Color::DarkGray), " Waiting for reply ")
        } else {
            (
                Style::default().fg(Color::Cyan),
                " Message (Enter to send, Alt+Enter for new line) ",
            )
        };
        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
        self.textarea.set_placeholder_text(PLACEHOLDER);
        self.textarea.set_cursor_line_style(Style::default());
        let cursor = if self.busy {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };
        self.textarea.set_cursor_style(cursor);
    }

    /// Reflect the conversation's busy flag in the box's frame and cursor.
    pub fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            self.busy = busy;
            self.configure();
        }
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn is_multiline(&self) -> bool {
        self.textarea.lines().len() > 1
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    /// Text rows to reserve, between one and [`MAX_INPUT_ROWS`].
    pub fn rows(&self) -> u16 {
        let lines = self.textarea.lines().len().max(1);
        (lines as u16).min(MAX_INPUT_ROWS)
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.configure();
    }

    /// Emit the trimmed draft and reset it. Blank drafts emit nothing and
    /// are left in place.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let submitted = trimmed.to_string();
        self.clear();
        Some(submitted)
    }

    pub fn handle_key(&mut self, key: KeyEvent, disabled: bool) -> InputOutcome {
        if disabled {
            return InputOutcome::Ignored;
        }

        if key.code == KeyCode::Enter {
            if key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT)
            {
                self.textarea.insert_newline();
                return InputOutcome::Handled;
            }
            if key.modifiers.is_empty() {
                return match self.submit() {
                    Some(text) => InputOutcome::Submitted(text),
                    None => InputOutcome::Ignored,
                };
            }
        }

        self.textarea.input(Input::from(key));
        InputOutcome::Handled
    }

    /// Insert pasted text verbatim, newlines included.
    pub fn handle_paste(&mut self, text: &str, disabled: bool) -> InputOutcome {
        if disabled || text.is_empty() {
            return InputOutcome::Ignored;
        }
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        self.textarea.insert_str(normalized);
        InputOutcome::Handled
    }
}
