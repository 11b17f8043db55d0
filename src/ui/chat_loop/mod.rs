//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input is read on a background task and forwarded over a channel.
//! Fetch, send and clear run as spawned tasks against the shared
//! [`Conversation`]; they post [`UiEvent::RequestRedraw`] when done, and a
//! frame ticker keeps the view current while a reply is pending.

pub mod keybindings;
pub mod lifecycle;

use std::{error::Error, future::Future, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::conversation::Conversation;
use crate::ui::input::InputOutcome;
use crate::ui::renderer::{max_scroll_offset, ui, ChatLayout};
use crate::ui::state::{ViewState, MOUSE_SCROLL_LINES};

use keybindings::{action_for_key, ChatAction, ScrollMove};
use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    RequestRedraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Redraw,
    Exit,
}

const FRAME_DURATION: Duration = Duration::from_millis(1000 / 30);

/// Everything the loop mutates between frames.
pub struct ChatSession {
    pub conversation: Conversation,
    pub view: ViewState,
    event_tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChatSession {
    pub fn new(
        conversation: Conversation,
        view: ViewState,
        event_tx: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            conversation,
            view,
            event_tx,
        }
    }

    fn spawn<F, Fut>(&self, label: &'static str, job: F)
    where
        F: FnOnce(Conversation) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let conversation = self.conversation.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            job(conversation).await;
            debug!(task = label, "background task finished");
            let _ = event_tx.send(UiEvent::RequestRedraw);
        });
    }

    fn submit(&mut self, text: String) {
        // Claim the slot here so a second Enter can't race the spawned task.
        let Some(turn) = self.conversation.store().begin_turn() else {
            return;
        };
        self.view.auto_scroll = true;
        self.spawn("send", move |conversation| async move {
            let outcome = conversation.run_turn(turn, &text).await;
            debug!(?outcome, "turn finished");
        });
    }

    fn scroll(&mut self, movement: ScrollMove, area: Rect) {
        let store = self.conversation.store();
        let max_offset = max_scroll_offset(store, &self.view, area);
        let (_, height) = ChatLayout::compute(area, &self.view).transcript_text_size();
        let page = ViewState::page_size(height);

        match movement {
            ScrollMove::LineUp => self.view.scroll_up(1),
            ScrollMove::LineDown => self.view.scroll_down(1, max_offset),
            ScrollMove::PageUp => self.view.scroll_up(page),
            ScrollMove::PageDown => self.view.scroll_down(page, max_offset),
            ScrollMove::Top => self.view.scroll_home(),
            ScrollMove::Bottom => self.view.scroll_end(max_offset),
        }
    }

    fn apply_action(&mut self, action: ChatAction, area: Rect) -> LoopControl {
        match action {
            ChatAction::Quit => return LoopControl::Exit,
            ChatAction::Refresh => {
                self.spawn("refresh", |conversation| async move {
                    conversation.refresh().await
                });
            }
            ChatAction::ClearAll | ChatAction::NewChat => {
                // A pending reply would be appended to the emptied list.
                let Some(turn) = self.conversation.store().begin_turn() else {
                    debug!("clear ignored while a reply is pending");
                    return LoopControl::Continue;
                };
                self.spawn("clear", move |conversation| async move {
                    conversation.run_clear(turn).await;
                });
            }
            ChatAction::ToggleSidebar => self.view.toggle_sidebar(),
            ChatAction::Scroll(movement) => self.scroll(movement, area),
        }
        LoopControl::Redraw
    }

    /// Apply one event. `area` is the current terminal size.
    pub fn handle_event(&mut self, event: UiEvent, area: Rect) -> LoopControl {
        let busy = self.conversation.store().is_busy();

        match event {
            UiEvent::RequestRedraw => LoopControl::Redraw,
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if let Some(action) = action_for_key(&key, self.view.input.is_multiline()) {
                    return self.apply_action(action, area);
                }
                match self.view.input.handle_key(key, busy) {
                    InputOutcome::Submitted(text) => {
                        self.submit(text);
                        LoopControl::Redraw
                    }
                    InputOutcome::Handled => LoopControl::Redraw,
                    InputOutcome::Ignored => LoopControl::Continue,
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                match self.view.input.handle_paste(&text, busy) {
                    InputOutcome::Ignored => LoopControl::Continue,
                    _ => LoopControl::Redraw,
                }
            }
            UiEvent::Crossterm(Event::Mouse(mouse)) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    self.view.scroll_up(MOUSE_SCROLL_LINES);
                    LoopControl::Redraw
                }
                MouseEventKind::ScrollDown => {
                    let max_offset =
                        max_scroll_offset(self.conversation.store(), &self.view, area);
                    self.view.scroll_down(MOUSE_SCROLL_LINES, max_offset);
                    LoopControl::Redraw
                }
                _ => LoopControl::Continue,
            },
            UiEvent::Crossterm(Event::Resize(_, _)) => LoopControl::Redraw,
            UiEvent::Crossterm(_) => LoopControl::Continue,
        }
    }
}

fn spawn_event_reader(
    event_tx: mpsc::UnboundedSender<UiEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while !cancel.is_cancelled() {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn terminal_area(terminal: &ChatTerminal) -> Rect {
    terminal
        .size()
        .map(|size| Rect::new(0, 0, size.width, size.height))
        .unwrap_or_default()
}

async fn drive(
    terminal: &mut ChatTerminal,
    session: &mut ChatSession,
    mut event_rx: mpsc::UnboundedReceiver<UiEvent>,
) -> Result<(), Box<dyn Error>> {
    let mut ticker = tokio::time::interval(FRAME_DURATION);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut request_redraw = true;
    let mut drawn = (u64::MAX, false);

    loop {
        if request_redraw {
            let store = session.conversation.store().clone();
            terminal.draw(|f| ui(f, &store, &mut session.view))?;
            drawn = (store.revision(), store.is_busy());
            request_redraw = false;
        }

        tokio::select! {
            maybe_event = event_rx.recv() => {
                let Some(first) = maybe_event else {
                    return Ok(());
                };
                let area = terminal_area(terminal);
                let mut pending = Some(first);
                while let Some(event) = pending.take().or_else(|| event_rx.try_recv().ok()) {
                    match session.handle_event(event, area) {
                        LoopControl::Exit => return Ok(()),
                        LoopControl::Redraw => request_redraw = true,
                        LoopControl::Continue => {}
                    }
                }
            }
            _ = ticker.tick() => {
                let store = session.conversation.store();
                let now = (store.revision(), store.is_busy());
                // The spinner animates while busy.
                if now != drawn || now.1 {
                    request_redraw = true;
                }
            }
        }
    }
}

/// Run the interactive chat until the user quits.
pub async fn run_chat(conversation: Conversation, view: ViewState) -> Result<(), Box<dyn Error>> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let mut session = ChatSession::new(conversation, view, event_tx.clone());

    session.spawn("initial fetch", |conversation| async move {
        conversation.start().await
    });

    let mut terminal = setup_terminal()?;
    let cancel = CancellationToken::new();
    let reader = spawn_event_reader(event_tx, cancel.clone());

    let result = drive(&mut terminal, &mut session, event_rx).await;

    cancel.cancel();
    let _ = reader.await;
    restore_terminal(&mut terminal)?;
    info!("chat session ended");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datastore::MemoryDatastore;
    use crate::core::generation::{GenerateError, ReplyGenerator};
    use crate::core::message::Role;
    use crate::core::store::ChatStore;
    use async_trait::async_trait;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use std::sync::Arc;
    use tokio::sync::Notify;

    struct Echo;

    #[async_trait]
    impl ReplyGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            Ok(format!("echo: {prompt}"))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    fn session() -> (ChatSession, mpsc::UnboundedReceiver<UiEvent>) {
        let store = ChatStore::new(Arc::new(MemoryDatastore::new()));
        let conversation = Conversation::new(store, Arc::new(Echo));
        let view = ViewState::new("echo".into(), "in-memory".into(), true);
        let (tx, rx) = mpsc::unbounded_channel();
        (ChatSession::new(conversation, view, tx), rx)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> UiEvent {
        UiEvent::Crossterm(Event::Key(KeyEvent::new(code, modifiers)))
    }

    fn type_text(session: &mut ChatSession, text: &str) {
        for ch in text.chars() {
            session.handle_event(key(KeyCode::Char(ch), KeyModifiers::NONE), AREA);
        }
    }

    #[tokio::test]
    async fn enter_runs_a_turn_and_requests_redraw() {
        let (mut session, mut rx) = session();
        type_text(&mut session, "Hello");

        let control = session.handle_event(key(KeyCode::Enter, KeyModifiers::NONE), AREA);
        assert_eq!(control, LoopControl::Redraw);
        assert!(session.conversation.store().is_busy());

        assert!(matches!(rx.recv().await, Some(UiEvent::RequestRedraw)));
        let messages = session.conversation.store().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].content, "echo: Hello");
        assert!(!session.conversation.store().is_busy());
        assert_eq!(session.view.input.text(), "");
    }

    #[tokio::test]
    async fn typing_while_busy_is_ignored() {
        let (mut session, _rx) = session();
        let _turn = session.conversation.store().begin_turn().unwrap();

        let control = session.handle_event(key(KeyCode::Char('x'), KeyModifiers::NONE), AREA);
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(session.view.input.text(), "");
    }

    #[tokio::test]
    async fn quit_keys_exit() {
        let (mut session, _rx) = session();
        assert_eq!(
            session.handle_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL), AREA),
            LoopControl::Exit
        );
        assert_eq!(
            session.handle_event(key(KeyCode::Esc, KeyModifiers::NONE), AREA),
            LoopControl::Exit
        );
    }

    #[tokio::test]
    async fn new_chat_clears_the_store() {
        let (mut session, mut rx) = session();
        session.conversation.handle_send_message("Hello").await;
        assert_eq!(session.conversation.store().len(), 2);

        session.handle_event(key(KeyCode::Char('n'), KeyModifiers::CONTROL), AREA);
        assert!(matches!(rx.recv().await, Some(UiEvent::RequestRedraw)));
        assert!(session.conversation.store().is_empty());
    }

    /// Holds `generate` open until released.
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ReplyGenerator for Gate {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(format!("answer to {prompt}"))
        }

        fn model_name(&self) -> &str {
            "gate"
        }
    }

    #[tokio::test]
    async fn new_chat_waits_for_pending_reply() {
        let gate = Arc::new(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let store = ChatStore::new(Arc::new(MemoryDatastore::new()));
        let conversation = Conversation::new(store, gate.clone());
        let view = ViewState::new("gate".into(), "in-memory".into(), true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = ChatSession::new(conversation, view, tx);

        type_text(&mut session, "Hello");
        session.handle_event(key(KeyCode::Enter, KeyModifiers::NONE), AREA);
        gate.entered.notified().await;

        let control = session.handle_event(key(KeyCode::Char('n'), KeyModifiers::CONTROL), AREA);
        assert_eq!(control, LoopControl::Continue);

        gate.release.notify_one();
        assert!(matches!(rx.recv().await, Some(UiEvent::RequestRedraw)));

        let messages: Vec<_> = session
            .conversation
            .store()
            .messages()
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect();
        assert_eq!(
            messages,
            vec![
                (Role::User, "Hello".to_string()),
                (Role::Assistant, "answer to Hello".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn arrows_move_within_a_multiline_draft() {
        let (mut session, _rx) = session();
        let paste = UiEvent::Crossterm(Event::Paste("first\nsecond".into()));
        session.handle_event(paste, AREA);
        assert_eq!(session.view.input.textarea().cursor(), (1, 6));

        session.handle_event(key(KeyCode::Up, KeyModifiers::NONE), AREA);
        assert_eq!(session.view.input.textarea().cursor().0, 0);
        assert!(session.view.auto_scroll);
    }

    #[tokio::test]
    async fn sidebar_toggles() {
        let (mut session, _rx) = session();
        assert!(session.view.sidebar_open);
        session.handle_event(key(KeyCode::Char('b'), KeyModifiers::CONTROL), AREA);
        assert!(!session.view.sidebar_open);
    }

    #[tokio::test]
    async fn mouse_wheel_up_stops_following() {
        let (mut session, _rx) = session();
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        session.handle_event(UiEvent::Crossterm(Event::Mouse(wheel)), AREA);
        assert!(!session.view.auto_scroll);
    }

    #[tokio::test]
    async fn paste_lands_in_the_draft() {
        let (mut session, _rx) = session();
        let paste = UiEvent::Crossterm(Event::Paste("a\nb".into()));
        let control = session.handle_event(paste, AREA);
        assert_eq!(control, LoopControl::Redraw);
        assert_eq!(session.view.input.text(), "a\nb");
    }
}
