use crate::core::store::ChatStore;
use crate::ui::state::ViewState;
use crate::ui::transcript::Transcript;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

pub const APP_TITLE: &str = "AI Chat Assistant";
pub const THINKING_TEXT: &str = "AI is thinking...";
const SIDEBAR_WIDTH: u16 = 24;
const HEADER_HEIGHT: u16 = 2;
const STATUS_HEIGHT: u16 = 1;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Areas of one frame, computed the same way for drawing and for scrolling.
pub struct ChatLayout {
    pub header: Rect,
    pub sidebar: Option<Rect>,
    pub transcript: Rect,
    pub status: Rect,
    pub input: Rect,
}

impl ChatLayout {
    pub fn compute(area: Rect, view: &ViewState) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(STATUS_HEIGHT),
                Constraint::Length(view.input.rows() + 2), // +2 for borders
            ])
            .split(area);

        let show_sidebar = view.sidebar_open && rows[1].width > SIDEBAR_WIDTH * 2;
        let (sidebar, transcript) = if show_sidebar {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .split(rows[1]);
            (Some(columns[0]), columns[1])
        } else {
            (None, rows[1])
        };

        Self {
            header: rows[0],
            sidebar,
            transcript,
            status: rows[2],
            input: rows[3],
        }
    }

    /// Width and height available to transcript text.
    pub fn transcript_text_size(&self) -> (u16, u16) {
        (
            self.transcript.width.saturating_sub(1),
            self.transcript.height,
        )
    }
}

/// Largest valid scroll offset for the transcript at the given terminal size.
pub fn max_scroll_offset(store: &ChatStore, view: &ViewState, area: Rect) -> u16 {
    let layout = ChatLayout::compute(area, view);
    let (width, height) = layout.transcript_text_size();
    store.read(|state| Transcript::scroll_to_bottom(state.messages, width, height))
}

pub fn ui(f: &mut Frame, store: &ChatStore, view: &mut ViewState) {
    let (lines, busy, revision) = store.read(|state| {
        (
            Transcript::build_display_lines(state.messages),
            state.busy,
            state.revision,
        )
    });
    view.observe_revision(revision);
    view.input.set_busy(busy);

    let layout = ChatLayout::compute(f.area(), view);

    render_header(f, layout.header, view);
    if let Some(area) = layout.sidebar {
        render_sidebar(f, area, store.len());
    }

    if lines.is_empty() {
        render_welcome(f, layout.transcript);
    } else {
        let (width, height) = layout.transcript_text_size();
        let total = Transcript::wrapped_line_count(&lines, width);
        let offset = view.settle_scroll(total.saturating_sub(height));
        let transcript = Paragraph::new(lines)
            .block(Block::default().padding(Padding::left(1)))
            .wrap(Wrap { trim: true })
            .scroll((offset, 0));
        f.render_widget(transcript, layout.transcript);
    }

    if busy {
        render_thinking(f, layout.status, view);
    }

    f.render_widget(view.input.textarea(), layout.input);
}

fn render_header(f: &mut Frame, area: Rect, view: &ViewState) {
    let title = Line::from(vec![
        Span::styled(
            APP_TITLE,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} • {}", view.model, view.datastore),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let hints = Line::from(Span::styled(
        "Ctrl+R refresh • Ctrl+L clear • Ctrl+B sidebar • Ctrl+C quit",
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Right);

    let header = Paragraph::new(vec![title, hints]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, message_count: usize) {
    let lines = vec![
        Line::from(Span::styled(
            "+ New chat",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "  Ctrl+N",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Current chat",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {message_count} messages"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(sidebar, area);
}

fn render_welcome(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Welcome to AI Chat Assistant",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Start a conversation with your AI assistant. Ask questions, get help, or just chat!",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let top_padding = area.height.saturating_sub(lines.len() as u16) / 2;
    let welcome = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().padding(Padding::top(top_padding)));
    f.render_widget(welcome, area);
}

fn render_thinking(f: &mut Frame, area: Rect, view: &ViewState) {
    let frame = (view.pulse_start.elapsed().as_millis() / 250) as usize % SPINNER.len();
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", SPINNER[frame]),
            Style::default().fg(Color::Green),
        ),
        Span::styled(THINKING_TEXT, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
