use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMove {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// Keys handled by the chat loop itself. Anything else goes to the input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Quit,
    Refresh,
    ClearAll,
    NewChat,
    ToggleSidebar,
    Scroll(ScrollMove),
}

/// Map a key to a loop action. While the draft spans several lines, the
/// arrow keys plus Home and End move the cursor in the draft instead of
/// scrolling; PageUp and PageDown always scroll.
pub fn action_for_key(key: &KeyEvent, multiline_draft: bool) -> Option<ChatAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => Some(ChatAction::Quit),
        KeyCode::Esc => Some(ChatAction::Quit),
        KeyCode::Char('r') if ctrl => Some(ChatAction::Refresh),
        KeyCode::Char('l') if ctrl => Some(ChatAction::ClearAll),
        KeyCode::Char('n') if ctrl => Some(ChatAction::NewChat),
        KeyCode::Char('b') if ctrl => Some(ChatAction::ToggleSidebar),
        KeyCode::Up if !multiline_draft => Some(ChatAction::Scroll(ScrollMove::LineUp)),
        KeyCode::Down if !multiline_draft => Some(ChatAction::Scroll(ScrollMove::LineDown)),
        KeyCode::PageUp => Some(ChatAction::Scroll(ScrollMove::PageUp)),
        KeyCode::PageDown => Some(ChatAction::Scroll(ScrollMove::PageDown)),
        KeyCode::Home if !multiline_draft => Some(ChatAction::Scroll(ScrollMove::Top)),
        KeyCode::End if !multiline_draft => Some(ChatAction::Scroll(ScrollMove::Bottom)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn control_shortcuts() {
        assert_eq!(action_for_key(&ctrl('c'), false), Some(ChatAction::Quit));
        assert_eq!(action_for_key(&ctrl('r'), false), Some(ChatAction::Refresh));
        assert_eq!(action_for_key(&ctrl('l'), false), Some(ChatAction::ClearAll));
        assert_eq!(action_for_key(&ctrl('n'), false), Some(ChatAction::NewChat));
        assert_eq!(action_for_key(&ctrl('b'), false), Some(ChatAction::ToggleSidebar));
    }

    #[test]
    fn escape_quits() {
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(action_for_key(&esc, false), Some(ChatAction::Quit));
    }

    #[test]
    fn plain_letters_go_to_the_input() {
        let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(action_for_key(&r, false), None);
        assert_eq!(action_for_key(&enter, false), None);
    }

    #[test]
    fn home_and_end_jump_the_transcript() {
        let home = KeyEvent::new(KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(
            action_for_key(&home, false),
            Some(ChatAction::Scroll(ScrollMove::Top))
        );
        let end = KeyEvent::new(KeyCode::End, KeyModifiers::NONE);
        assert_eq!(
            action_for_key(&end, false),
            Some(ChatAction::Scroll(ScrollMove::Bottom))
        );
    }

    #[test]
    fn multiline_draft_keeps_cursor_keys() {
        for code in [KeyCode::Up, KeyCode::Down, KeyCode::Home, KeyCode::End] {
            let key = KeyEvent::new(code, KeyModifiers::NONE);
            assert_eq!(action_for_key(&key, true), None);
        }
        let page = KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(
            action_for_key(&page, true),
            Some(ChatAction::Scroll(ScrollMove::PageDown))
        );
    }

    #[test]
    fn paging_keys_scroll() {
        let up = KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(
            action_for_key(&up, false),
            Some(ChatAction::Scroll(ScrollMove::PageUp))
        );
    }
}
