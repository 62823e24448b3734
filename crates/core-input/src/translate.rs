use core_events::{
    InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::event::{
    Event as CEvent, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKind,
    KeyModifiers as CMods, MouseButton as CButton, MouseEvent as CMouseEvent,
    MouseEventKind as CMouseKind,
};

/// Translate one terminal event. Returns `None` for events the editor does
/// not consume (key releases, media keys, horizontal scrolling).
pub fn translate(event: CEvent) -> Option<InputEvent> {
    match event {
        CEvent::Key(key) => translate_key(&key),
        CEvent::Mouse(m) => translate_mouse(&m).map(InputEvent::Mouse),
        CEvent::Resize(w, h) => Some(InputEvent::Resize(w, h)),
        CEvent::Paste(data) => Some(InputEvent::Paste(data)),
        CEvent::FocusGained => Some(InputEvent::FocusGained),
        CEvent::FocusLost => Some(InputEvent::FocusLost),
    }
}

fn translate_key(key: &CKeyEvent) -> Option<InputEvent> {
    if !matches!(key.kind, CKind::Press | CKind::Repeat) {
        return None;
    }
    if key.code == CKeyCode::Char('c') && key.modifiers.contains(CMods::CONTROL) {
        return Some(InputEvent::CtrlC);
    }
    let mut mods = map_mods(key.modifiers);
    let code = match key.code {
        CKeyCode::Char(c) => {
            // Uppercase letters already carry the shift.
            if c.is_alphabetic() {
                mods.remove(KeyModifiers::SHIFT);
            }
            KeyCode::Char(c)
        }
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::BackTab => {
            mods |= KeyModifiers::SHIFT;
            KeyCode::Tab
        }
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(InputEvent::Key(KeyEvent::new(code, mods)))
}

fn translate_mouse(m: &CMouseEvent) -> Option<MouseEvent> {
    let kind = match m.kind {
        CMouseKind::Down(b) => MouseEventKind::Down(map_button(b)),
        CMouseKind::Up(b) => MouseEventKind::Up(map_button(b)),
        CMouseKind::Drag(b) => MouseEventKind::Drag(map_button(b)),
        CMouseKind::ScrollUp => MouseEventKind::ScrollUp,
        CMouseKind::ScrollDown => MouseEventKind::ScrollDown,
        CMouseKind::Moved => MouseEventKind::Moved,
        _ => return None,
    };
    Some(MouseEvent {
        kind,
        column: m.column,
        row: m.row,
        mods: map_mods(m.modifiers),
    })
}

fn map_button(b: CButton) -> MouseButton {
    match b {
        CButton::Left => MouseButton::Left,
        CButton::Middle => MouseButton::Middle,
        CButton::Right => MouseButton::Right,
    }
}

pub(crate) fn map_mods(m: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent as CMouse};

    fn press(code: CKeyCode, mods: CMods) -> CEvent {
        CEvent::Key(CKeyEvent::new(code, mods))
    }

    #[test]
    fn keys_map_with_modifiers() {
        assert!(matches!(
            translate(press(CKeyCode::Char(' '), CMods::CONTROL)),
            Some(InputEvent::Key(KeyEvent { code: KeyCode::Char(' '), mods })) if mods == KeyModifiers::CTRL
        ));
        assert!(matches!(
            translate(press(CKeyCode::Char('A'), CMods::SHIFT)),
            Some(InputEvent::Key(KeyEvent { code: KeyCode::Char('A'), mods })) if mods.is_empty()
        ));
        assert!(matches!(
            translate(press(CKeyCode::BackTab, CMods::SHIFT)),
            Some(InputEvent::Key(KeyEvent { code: KeyCode::Tab, mods })) if mods == KeyModifiers::SHIFT
        ));
        assert!(matches!(
            translate(press(CKeyCode::Char('c'), CMods::CONTROL)),
            Some(InputEvent::CtrlC)
        ));
    }

    #[test]
    fn releases_and_unsupported_keys_are_dropped() {
        let release = CKeyEvent::new_with_kind_and_state(
            CKeyCode::Tab,
            CMods::NONE,
            CKind::Release,
            KeyEventState::NONE,
        );
        assert!(translate(CEvent::Key(release)).is_none());
        assert!(translate(press(CKeyCode::CapsLock, CMods::NONE)).is_none());
    }

    #[test]
    fn mouse_press_keeps_position() {
        let ev = CEvent::Mouse(CMouse {
            kind: CMouseKind::Down(CButton::Left),
            column: 12,
            row: 3,
            modifiers: CMods::ALT,
        });
        match translate(ev) {
            Some(InputEvent::Mouse(m)) => {
                assert!(m.is_press());
                assert_eq!((m.column, m.row), (12, 3));
                assert_eq!(m.mods, KeyModifiers::ALT);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
