#![forbid(unsafe_code)]

//! DOM keyboard normalization.
//!
//! Maps the fields of a DOM `KeyboardEvent` (`key`, `code`, modifier flags)
//! to the canonical [`KeyEvent`] the page understands. Keys with no
//! canonical code (media keys, lone modifiers, IME processing) map to
//! `None` and are left to the browser.

use folio_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};

/// Build a modifier set from DOM flags.
#[must_use]
pub fn dom_modifiers(alt: bool, ctrl: bool, shift: bool, meta: bool) -> Modifiers {
    let mut mods = Modifiers::NONE;
    if alt {
        mods |= Modifiers::ALT;
    }
    if ctrl {
        mods |= Modifiers::CTRL;
    }
    if shift {
        mods |= Modifiers::SHIFT;
    }
    if meta {
        mods |= Modifiers::SUPER;
    }
    mods
}

/// Normalize a DOM `key` with its modifier flags.
///
/// Use [`normalize_dom_key_code`] when the physical `code` is available;
/// without it, Option-modified letters on macOS (`Alt+D` reports `"∂"`)
/// cannot be recovered.
#[must_use]
pub fn normalize_dom_key(
    key: &str,
    alt: bool,
    ctrl: bool,
    shift: bool,
    meta: bool,
) -> Option<KeyEvent> {
    let mods = dom_modifiers(alt, ctrl, shift, meta);
    normalize_dom_key_code(key, "", mods).map(|code| KeyEvent::new(code).with_modifiers(mods))
}

/// Full keydown normalization including auto-repeat.
#[must_use]
pub fn normalize_keydown(
    key: &str,
    code: &str,
    mods: Modifiers,
    repeat: bool,
) -> Option<KeyEvent> {
    let kind = if repeat {
        KeyEventKind::Repeat
    } else {
        KeyEventKind::Press
    };
    normalize_dom_key_code(key, code, mods)
        .map(|code| KeyEvent::new(code).with_modifiers(mods).with_kind(kind))
}

/// Map DOM `key`/`code` to a [`KeyCode`].
///
/// The logical `key` wins for printable characters, except under Alt where
/// the layout may have substituted a symbol; there the physical `code`
/// (`KeyD`, `Digit3`) is preferred.
#[must_use]
pub fn normalize_dom_key_code(dom_key: &str, dom_code: &str, mods: Modifiers) -> Option<KeyCode> {
    if dom_key == "Tab" && mods.contains(Modifiers::SHIFT) {
        return Some(KeyCode::BackTab);
    }

    let mut chars = dom_key.chars();
    if let Some(first) = chars.next()
        && chars.next().is_none()
    {
        if mods.contains(Modifiers::ALT)
            && !first.is_ascii_alphanumeric()
            && let Some(physical) = char_from_dom_code(dom_code)
        {
            return Some(KeyCode::Char(physical));
        }
        return Some(KeyCode::Char(first));
    }

    Some(match dom_key {
        "Enter" => KeyCode::Enter,
        "Escape" | "Esc" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "ArrowUp" => KeyCode::Up,
        "ArrowDown" => KeyCode::Down,
        "ArrowLeft" => KeyCode::Left,
        "ArrowRight" => KeyCode::Right,
        "Spacebar" => KeyCode::Char(' '),
        "Dead" => KeyCode::Char(char_from_dom_code(dom_code)?),
        _ => {
            if let Some(n) = parse_function_key(dom_key) {
                return Some(KeyCode::F(n));
            }
            return key_code_from_dom_code(dom_code);
        }
    })
}

fn parse_function_key(s: &str) -> Option<u8> {
    let rest = s.strip_prefix('F')?;
    rest.parse::<u8>().ok().filter(|n| (1..=24).contains(n))
}

/// `KeyA`..`KeyZ` and `Digit0`..`Digit9` as lowercase characters.
fn char_from_dom_code(dom_code: &str) -> Option<char> {
    let single = |rest: &str| {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    };
    if let Some(letter) = dom_code.strip_prefix("Key").and_then(single) {
        return letter
            .is_ascii_uppercase()
            .then(|| letter.to_ascii_lowercase());
    }
    dom_code
        .strip_prefix("Digit")
        .and_then(single)
        .filter(char::is_ascii_digit)
}

fn key_code_from_dom_code(dom_code: &str) -> Option<KeyCode> {
    Some(match dom_code {
        "Enter" | "NumpadEnter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "ArrowUp" => KeyCode::Up,
        "ArrowDown" => KeyCode::Down,
        "ArrowLeft" => KeyCode::Left,
        "ArrowRight" => KeyCode::Right,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn map_dom_key_specials() {
        let mods = Modifiers::NONE;
        assert_eq!(normalize_dom_key_code("Escape", "Escape", mods), Some(KeyCode::Escape));
        assert_eq!(normalize_dom_key_code("Esc", "", mods), Some(KeyCode::Escape));
        assert_eq!(normalize_dom_key_code("ArrowLeft", "ArrowLeft", mods), Some(KeyCode::Left));
        assert_eq!(normalize_dom_key_code("F12", "F12", mods), Some(KeyCode::F(12)));
    }

    #[test]
    fn shift_tab_is_backtab() {
        assert_eq!(
            normalize_dom_key_code("Tab", "Tab", Modifiers::SHIFT),
            Some(KeyCode::BackTab)
        );
    }

    #[test]
    fn unknown_keys_are_unmapped() {
        let mods = Modifiers::NONE;
        assert_eq!(normalize_dom_key_code("Shift", "ShiftLeft", mods), None);
        assert_eq!(normalize_dom_key_code("MediaPlayPause", "", mods), None);
        assert_eq!(normalize_dom_key_code("F25", "", mods), None);
    }

    #[test]
    fn alt_symbol_recovers_physical_letter() {
        assert_eq!(
            normalize_dom_key_code("∂", "KeyD", Modifiers::ALT),
            Some(KeyCode::Char('d'))
        );
        assert_eq!(
            normalize_dom_key_code("£", "Digit3", Modifiers::ALT),
            Some(KeyCode::Char('3'))
        );
        assert_eq!(
            normalize_dom_key_code("Dead", "KeyT", Modifiers::ALT),
            Some(KeyCode::Char('t'))
        );
    }

    #[test]
    fn without_alt_logical_key_wins() {
        assert_eq!(
            normalize_dom_key_code("£", "Digit3", Modifiers::SHIFT),
            Some(KeyCode::Char('£'))
        );
        assert_eq!(
            normalize_dom_key_code("d", "KeyD", Modifiers::ALT),
            Some(KeyCode::Char('d'))
        );
    }

    #[test]
    fn flags_become_modifiers() {
        let event = normalize_dom_key("d", true, false, false, true).unwrap();
        assert_eq!(event.code, KeyCode::Char('d'));
        assert_eq!(event.modifiers, Modifiers::ALT | Modifiers::SUPER);
        assert_eq!(event.kind, KeyEventKind::Press);
        assert_eq!(dom_modifiers(false, false, false, false), Modifiers::NONE);
    }

    #[test]
    fn repeat_flag_sets_kind() {
        let event = normalize_keydown("Escape", "Escape", Modifiers::NONE, true).unwrap();
        assert_eq!(event.kind, KeyEventKind::Repeat);
        assert!(event.is_down());
    }
}
