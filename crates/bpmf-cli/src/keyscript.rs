//! Key scripts: a compact way to write keystroke sequences on the command
//! line.
//!
//! Plain characters are typed as they are (a space is the Space key).
//! Special keys go in braces, with optional modifier prefixes:
//!
//! ```text
//! su3cl3{left}{S-left}{enter}
//! {C-D-enter}   Ctrl+Cmd+Enter
//! {A-`}         Option + symbol menu key
//! {kp5}         keypad 5
//! {{            a literal `{`
//! ```
//!
//! Modifiers: `S` shift, `C` control, `A` option, `D` command, `K` caps lock.

use bpmf_session::{key, KeyEvent};

use crate::CliError;

#[derive(Debug, Clone)]
pub struct ScriptKey {
    /// The key as written in the script.
    pub label: String,
    pub event: KeyEvent,
}

fn special_code(name: &str) -> Option<u16> {
    let code = match name {
        "enter" | "ret" => key::ENTER,
        "tab" => key::TAB,
        "space" => key::SPACE,
        "bs" | "backspace" => key::BACKSPACE,
        "esc" => key::ESCAPE,
        "del" | "delete" => key::DELETE,
        "home" => key::HOME,
        "end" => key::END,
        "pgup" => key::PAGE_UP,
        "pgdn" => key::PAGE_DOWN,
        "left" => key::LEFT,
        "right" => key::RIGHT,
        "up" => key::UP,
        "down" => key::DOWN,
        _ => return None,
    };
    Some(code)
}

#[derive(Default)]
struct Mods {
    shift: bool,
    control: bool,
    option: bool,
    command: bool,
    caps_lock: bool,
}

fn braced(token: &str, pos: usize) -> Result<KeyEvent, CliError> {
    let err = |reason: String| CliError::KeyScript { pos, reason };

    let mut mods = Mods::default();
    let mut rest = token;
    while let Some((prefix, tail)) = rest.split_once('-').filter(|(p, t)| p.len() == 1 && !t.is_empty()) {
        match prefix {
            "S" => mods.shift = true,
            "C" => mods.control = true,
            "A" => mods.option = true,
            "D" => mods.command = true,
            "K" => mods.caps_lock = true,
            other => return Err(err(format!("unknown modifier `{other}`"))),
        }
        rest = tail;
    }

    let mut event = if let Some(code) = special_code(rest) {
        KeyEvent::special(code)
    } else if let Some(digit) = rest.strip_prefix("kp").filter(|d| d.chars().count() == 1) {
        KeyEvent::numpad(digit.chars().next().unwrap_or_default())
    } else {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if mods.control && c.is_ascii_alphabetic() => {
                mods.control = false;
                KeyEvent::ctrl(c)
            }
            (Some(c), None) => KeyEvent::text(&c.to_string()),
            _ => return Err(err(format!("unknown key `{rest}`"))),
        }
    };

    if mods.shift {
        event = event.with_shift();
    }
    if mods.control {
        event = event.with_control();
    }
    if mods.option {
        event = event.with_option();
    }
    if mods.command {
        event = event.with_command();
    }
    if mods.caps_lock {
        event = event.with_caps_lock();
    }
    Ok(event)
}

pub fn parse(script: &str) -> Result<Vec<ScriptKey>, CliError> {
    let mut keys = Vec::new();
    let mut iter = script.char_indices().peekable();

    while let Some((pos, c)) = iter.next() {
        if c != '{' {
            let event = if c == ' ' {
                KeyEvent::special(key::SPACE)
            } else {
                KeyEvent::text(&c.to_string())
            };
            keys.push(ScriptKey {
                label: c.to_string(),
                event,
            });
            continue;
        }

        if iter.next_if(|&(_, next)| next == '{').is_some() {
            keys.push(ScriptKey {
                label: "{{".to_string(),
                event: KeyEvent::text("{"),
            });
            continue;
        }

        let start = pos + 1;
        let Some(end) = script[start..].find('}').map(|i| start + i) else {
            return Err(CliError::KeyScript {
                pos,
                reason: "unterminated `{`".to_string(),
            });
        };
        // Allow `{}}` for a literal closing brace.
        let end = if end == start && script[end + 1..].starts_with('}') {
            end + 1
        } else {
            end
        };
        let token = &script[start..end];
        if token.is_empty() {
            return Err(CliError::KeyScript {
                pos,
                reason: "empty `{}`".to_string(),
            });
        }
        keys.push(ScriptKey {
            label: format!("{{{token}}}"),
            event: braced(token, pos)?,
        });
        while iter.peek().is_some_and(|&(i, _)| i <= end) {
            iter.next();
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(script: &str) -> Vec<String> {
        parse(script).unwrap().into_iter().map(|k| k.label).collect()
    }

    #[test]
    fn plain_and_braced_keys() {
        assert_eq!(labels("su3{left}"), ["s", "u", "3", "{left}"]);
        let keys = parse("a b").unwrap();
        assert!(keys[1].event.is_space());
    }

    #[test]
    fn modifiers_apply() {
        let keys = parse("{S-left}{C-D-A-enter}{K-g}").unwrap();
        assert!(keys[0].event.is_left());
        assert!(keys[0].event.modifiers.shift);

        let m = keys[1].event.modifiers;
        assert!(keys[1].event.is_enter());
        assert!(m.control && m.command && m.option && !m.shift);

        assert!(keys[2].event.modifiers.caps_lock);
        assert_eq!(keys[2].event.text, "g");
    }

    #[test]
    fn control_letters_become_chords() {
        let keys = parse("{C-b}").unwrap();
        assert_eq!(keys[0].event.text, "\u{2}");
        assert!(keys[0].event.emacs_key().is_some());
    }

    #[test]
    fn keypad_and_literal_braces() {
        let keys = parse("{kp5}{{{}}").unwrap();
        assert!(keys[0].event.is_numeric_pad_key());
        assert_eq!(keys[1].event.text, "{");
        assert_eq!(keys[2].event.text, "}");
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn dash_key_with_modifier() {
        let keys = parse("{A--}").unwrap();
        assert_eq!(keys[0].event.text, "-");
        assert!(keys[0].event.modifiers.option);
    }

    #[test]
    fn errors_carry_offset() {
        match parse("ab{left") {
            Err(CliError::KeyScript { pos, .. }) => assert_eq!(pos, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse("{X-a}"), Err(CliError::KeyScript { .. })));
        assert!(matches!(parse("{nope}"), Err(CliError::KeyScript { .. })));
        assert!(matches!(parse("{}"), Err(CliError::KeyScript { .. })));
    }
}
