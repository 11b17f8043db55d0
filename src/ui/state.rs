use std::time::Instant;

use crate::ui::input::InputBox;

/// Screen-side state of a chat session. The transcript itself lives in the
/// [`crate::core::store::ChatStore`].
pub struct ViewState {
    pub input: InputBox,
    pub scroll_offset: u16,
    /// Follow the newest message. Cleared when the user scrolls up.
    pub auto_scroll: bool,
    pub sidebar_open: bool,
    pub model: String,
    pub datastore: String,
    pub pulse_start: Instant,
    last_revision: u64,
}

pub const SCROLL_PAGE_OVERLAP: u16 = 1;
pub const MOUSE_SCROLL_LINES: u16 = 3;

impl ViewState {
    pub fn new(model: String, datastore: String, sidebar_open: bool) -> Self {
        Self {
            input: InputBox::new(),
            scroll_offset: 0,
            auto_scroll: true,
            sidebar_open,
            model,
            datastore,
            pulse_start: Instant::now(),
            last_revision: 0,
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// A changed transcript snaps the view back to the newest message.
    pub fn observe_revision(&mut self, revision: u64) {
        if revision != self.last_revision {
            self.last_revision = revision;
            self.auto_scroll = true;
        }
    }

    /// Clamp the offset against the current layout, pinning it to the bottom
    /// while following.
    pub fn settle_scroll(&mut self, max_offset: u16) -> u16 {
        if self.auto_scroll {
            self.scroll_offset = max_offset;
        } else {
            self.scroll_offset = self.scroll_offset.min(max_offset);
        }
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max_offset);
        if self.scroll_offset >= max_offset {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_home(&mut self) {
        self.auto_scroll = false;
        self.scroll_offset = 0;
    }

    pub fn scroll_end(&mut self, max_offset: u16) {
        self.auto_scroll = true;
        self.scroll_offset = max_offset;
    }

    pub fn page_size(available_height: u16) -> u16 {
        available_height.saturating_sub(SCROLL_PAGE_OVERLAP).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        ViewState::new("gemini-1.5-flash".into(), "memory".into(), true)
    }

    #[test]
    fn follows_bottom_until_user_scrolls_up() {
        let mut view = view();
        assert_eq!(view.settle_scroll(10), 10);
        view.scroll_up(4);
        assert!(!view.auto_scroll);
        assert_eq!(view.settle_scroll(12), 6);
    }

    #[test]
    fn scrolling_back_down_resumes_following() {
        let mut view = view();
        view.settle_scroll(10);
        view.scroll_up(5);
        view.scroll_down(3, 10);
        assert!(!view.auto_scroll);
        view.scroll_down(30, 10);
        assert!(view.auto_scroll);
        assert_eq!(view.scroll_offset, 10);
    }

    #[test]
    fn new_revision_snaps_to_bottom() {
        let mut view = view();
        view.scroll_home();
        view.observe_revision(0);
        assert!(!view.auto_scroll);
        view.observe_revision(1);
        assert!(view.auto_scroll);
        assert_eq!(view.settle_scroll(7), 7);
    }

    #[test]
    fn offset_is_clamped_when_content_shrinks() {
        let mut view = view();
        view.settle_scroll(20);
        view.scroll_up(1);
        assert_eq!(view.settle_scroll(3), 3);
    }

    #[test]
    fn page_size_never_zero() {
        assert_eq!(ViewState::page_size(0), 1);
        assert_eq!(ViewState::page_size(10), 9);
    }
}
