use super::key;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub option: bool,
    pub command: bool,
    pub caps_lock: bool,
    /// Set by the OS for keypad and dedicated navigation keys.
    pub numeric_pad: bool,
    pub function: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        option: false,
        command: false,
        caps_lock: false,
        numeric_pad: false,
        function: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
}

/// Control-chord navigation bindings, keyed by the control character the
/// chord produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmacsKey {
    /// Ctrl+F
    Forward,
    /// Ctrl+B
    Backward,
    /// Ctrl+A
    Home,
    /// Ctrl+E
    End,
    /// Ctrl+D
    Delete,
    /// Ctrl+V
    NextPage,
}

impl EmacsKey {
    fn from_char_code(code: u16) -> Option<Self> {
        match code {
            6 => Some(Self::Forward),
            2 => Some(Self::Backward),
            1 => Some(Self::Home),
            5 => Some(Self::End),
            4 => Some(Self::Delete),
            22 => Some(Self::NextPage),
            _ => None,
        }
    }
}

/// One key press as delivered by the host. Never mutated after construction;
/// every predicate below is a pure function of these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub text: String,
    pub text_ignoring_modifiers: String,
    pub key_code: u16,
    /// First UTF-16 unit of `text`.
    pub char_code: u16,
    pub modifiers: Modifiers,
    /// Typing direction of the client; rotates the arrow-key roles.
    pub vertical: bool,
}

/// US ANSI key code for a character typed on the main key area.
fn ansi_key_code(c: char) -> u16 {
    match c.to_ascii_lowercase() {
        'a' => 0,
        's' => 1,
        'd' => 2,
        'f' => 3,
        'h' => 4,
        'g' => 5,
        'z' => 6,
        'x' => 7,
        'c' => 8,
        'v' => 9,
        'b' => 11,
        'q' => 12,
        'w' => 13,
        'e' => 14,
        'r' => 15,
        'y' => 16,
        't' => 17,
        '1' | '!' => 18,
        '2' | '@' => 19,
        '3' | '#' => 20,
        '4' | '$' => 21,
        '6' | '^' => 22,
        '5' | '%' => 23,
        '=' | '+' => 24,
        '9' | '(' => 25,
        '7' | '&' => 26,
        '-' | '_' => 27,
        '8' | '*' => 28,
        '0' | ')' => 29,
        ']' | '}' => 30,
        'o' => 31,
        'u' => 32,
        '[' | '{' => 33,
        'i' => 34,
        'p' => 35,
        'l' => 37,
        'j' => 38,
        '\'' | '"' => 39,
        'k' => 40,
        ';' | ':' => 41,
        '\\' | '|' => 42,
        ',' | '<' => 43,
        '/' | '?' => 44,
        'n' => 45,
        'm' => 46,
        '.' | '>' => 47,
        ' ' => key::SPACE,
        '`' | '~' => key::SYMBOL_MENU,
        _ => key::UNKNOWN,
    }
}

fn keypad_key_code(c: char) -> Option<u16> {
    let code = match c {
        '.' => 65,
        '*' => 67,
        '+' => 69,
        '/' => 75,
        '-' => 78,
        '=' => 81,
        '0' => 82,
        '1' => 83,
        '2' => 84,
        '3' => 85,
        '4' => 86,
        '5' => 87,
        '6' => 88,
        '7' => 89,
        '8' => 91,
        '9' => 92,
        _ => return None,
    };
    Some(code)
}

/// The character the same key types without Shift.
fn unshifted(c: char) -> char {
    const SHIFTED: &str = "~!@#$%^&*()_+{}|:\"<>?";
    const PLAIN: &str = "`1234567890-=[]\\;',./";
    match SHIFTED.chars().position(|s| s == c) {
        Some(i) => PLAIN.chars().nth(i).unwrap_or(c),
        None => c.to_ascii_lowercase(),
    }
}

fn first_unit(text: &str) -> u16 {
    text.encode_utf16().next().unwrap_or(0)
}

impl KeyEvent {
    pub fn new(text: &str, key_code: u16, modifiers: Modifiers) -> Self {
        Self {
            text: text.to_string(),
            text_ignoring_modifiers: text.to_string(),
            key_code,
            char_code: first_unit(text),
            modifiers,
            vertical: false,
        }
    }

    /// A printable key on a US ANSI keyboard. Shift is implied for upper-case
    /// letters and shifted symbols.
    pub fn text(text: &str) -> Self {
        let first = text.chars().next().unwrap_or_default();
        let shifted = first.is_ascii_uppercase() || "~!@#$%^&*()_+{}|:\"<>?".contains(first);
        let modifiers = if shifted {
            Modifiers::SHIFT
        } else {
            Modifiers::NONE
        };
        let mut event = Self::new(text, ansi_key_code(first), modifiers);
        if shifted {
            event.text_ignoring_modifiers = text.chars().map(unshifted).collect();
        }
        event
    }

    /// A non-printing key, carrying the text macOS reports for it.
    pub fn special(key_code: u16) -> Self {
        let text = match key_code {
            key::ENTER | key::LINE_FEED => "\r",
            key::TAB => "\t",
            key::SPACE => " ",
            key::BACKSPACE => "\u{7f}",
            key::ESCAPE => "\u{1b}",
            key::UP => "\u{f700}",
            key::DOWN => "\u{f701}",
            key::LEFT => "\u{f702}",
            key::RIGHT => "\u{f703}",
            key::HOME => "\u{f729}",
            key::END => "\u{f72b}",
            key::PAGE_UP => "\u{f72c}",
            key::PAGE_DOWN => "\u{f72d}",
            key::DELETE => "\u{f728}",
            _ => "",
        };
        let mut event = Self::new(text, key_code, Modifiers::NONE);
        if matches!(
            key_code,
            key::UP | key::DOWN | key::LEFT | key::RIGHT | key::HOME | key::END
                | key::PAGE_UP | key::PAGE_DOWN | key::DELETE
        ) {
            event.modifiers.numeric_pad = true;
            event.modifiers.function = true;
        }
        event
    }

    /// Control chord on a letter, producing its control character.
    pub fn ctrl(letter: char) -> Self {
        let lower = letter.to_ascii_lowercase();
        let control_char = char::from((lower as u8).wrapping_sub(b'a' - 1) & 0x1f);
        let mut event = Self::new(
            &control_char.to_string(),
            ansi_key_code(lower),
            Modifiers {
                control: true,
                ..Modifiers::NONE
            },
        );
        event.text_ignoring_modifiers = lower.to_string();
        event
    }

    /// A key on the numeric keypad.
    pub fn numpad(c: char) -> Self {
        let mut event = Self::new(
            &c.to_string(),
            keypad_key_code(c).unwrap_or(key::UNKNOWN),
            Modifiers::NONE,
        );
        event.modifiers.numeric_pad = true;
        event
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_control(mut self) -> Self {
        self.modifiers.control = true;
        self
    }

    pub fn with_option(mut self) -> Self {
        self.modifiers.option = true;
        self
    }

    pub fn with_command(mut self) -> Self {
        self.modifiers.command = true;
        self
    }

    pub fn with_caps_lock(mut self) -> Self {
        self.modifiers.caps_lock = true;
        self
    }

    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    pub fn is_enter(&self) -> bool {
        matches!(self.key_code, key::ENTER | key::LINE_FEED)
    }

    pub fn is_tab(&self) -> bool {
        self.key_code == key::TAB
    }

    pub fn is_space(&self) -> bool {
        self.key_code == key::SPACE
    }

    pub fn is_backspace(&self) -> bool {
        self.key_code == key::BACKSPACE
    }

    pub fn is_esc(&self) -> bool {
        self.key_code == key::ESCAPE
    }

    /// Forward delete.
    pub fn is_delete(&self) -> bool {
        self.key_code == key::DELETE
    }

    pub fn is_home(&self) -> bool {
        self.key_code == key::HOME
    }

    pub fn is_end(&self) -> bool {
        self.key_code == key::END
    }

    pub fn is_page_up(&self) -> bool {
        self.key_code == key::PAGE_UP
    }

    pub fn is_page_down(&self) -> bool {
        self.key_code == key::PAGE_DOWN
    }

    pub fn is_up(&self) -> bool {
        self.key_code == key::UP
    }

    pub fn is_down(&self) -> bool {
        self.key_code == key::DOWN
    }

    pub fn is_left(&self) -> bool {
        self.key_code == key::LEFT
    }

    pub fn is_right(&self) -> bool {
        self.key_code == key::RIGHT
    }

    pub fn is_cursor_forward(&self) -> bool {
        self.key_code == if self.vertical { key::DOWN } else { key::RIGHT }
    }

    pub fn is_cursor_backward(&self) -> bool {
        self.key_code == if self.vertical { key::UP } else { key::LEFT }
    }

    /// Arrow perpendicular to the typing direction, pointing "up".
    pub fn is_cursor_clock_left(&self) -> bool {
        self.key_code == if self.vertical { key::RIGHT } else { key::UP }
    }

    /// Arrow perpendicular to the typing direction, pointing "down".
    pub fn is_cursor_clock_right(&self) -> bool {
        self.key_code == if self.vertical { key::LEFT } else { key::DOWN }
    }

    pub fn is_symbol_menu_key(&self) -> bool {
        matches!(self.key_code, key::SYMBOL_MENU | key::SYMBOL_MENU_JIS)
    }

    pub fn is_numeric_pad_key(&self) -> bool {
        key::NUMERIC_PAD.contains(&self.key_code)
    }

    /// Digit typed by a main-area number key, regardless of what the active
    /// keyboard layout puts on it.
    pub fn main_area_digit(&self) -> Option<char> {
        key::MAIN_AREA_DIGITS
            .iter()
            .find(|(code, _)| *code == self.key_code)
            .map(|(_, digit)| *digit)
    }

    /// Dedicated navigation keys (arrows, Home, End, ...) that are not
    /// part of the keypad.
    pub fn is_non_laptop_function_key(&self) -> bool {
        self.modifiers.numeric_pad && !self.is_numeric_pad_key()
    }

    pub fn is_control_hot_key(&self) -> bool {
        self.modifiers.control && self.first_char().is_some_and(char::is_alphabetic)
    }

    pub fn is_option_hot_key(&self) -> bool {
        self.modifiers.option && self.first_char().is_some_and(char::is_alphabetic)
    }

    /// `A`..=`Z` with Shift as the only modifier.
    pub fn is_upper_case_ascii_letter(&self) -> bool {
        (65..=90).contains(&self.char_code) && self.modifiers == Modifiers::SHIFT
    }

    pub fn is_reserved_key(&self) -> bool {
        key::is_reserved(self.key_code)
    }

    pub fn emacs_key(&self) -> Option<EmacsKey> {
        if !self.modifiers.control {
            return None;
        }
        EmacsKey::from_char_code(self.char_code)
    }

    /// Char code outside Latin-1 on a key the machine does not reserve.
    /// Emacs chords are exempt.
    pub fn is_invalid(&self) -> bool {
        if (0x20..=0xff).contains(&self.char_code) || self.emacs_key().is_some() {
            return false;
        }
        !self.is_reserved_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_event_fields() {
        let e = KeyEvent::text("u");
        assert_eq!(e.key_code, 32);
        assert_eq!(e.char_code, 'u' as u16);
        assert_eq!(e.modifiers, Modifiers::NONE);
        assert!(!e.is_invalid());

        let e = KeyEvent::text("A");
        assert!(e.is_upper_case_ascii_letter());
        assert_eq!(e.key_code, 0);
    }

    #[test]
    fn text_without_ansi_key_is_not_a_letter_key() {
        let e = KeyEvent::text("你");
        assert_eq!(e.key_code, key::UNKNOWN);
        assert_ne!(e.key_code, KeyEvent::text("a").key_code);
        assert!(!e.is_reserved_key());
        assert!(!e.is_numeric_pad_key());
        assert_eq!(e.main_area_digit(), None);
        assert!(e.is_invalid());
    }

    #[test]
    fn arrows_rotate_with_vertical_typing() {
        let right = KeyEvent::special(key::RIGHT);
        assert!(right.is_cursor_forward());
        assert!(!right.is_cursor_clock_left());

        let right = right.with_vertical(true);
        assert!(!right.is_cursor_forward());
        assert!(right.is_cursor_clock_left());

        let down = KeyEvent::special(key::DOWN).with_vertical(true);
        assert!(down.is_cursor_forward());
    }

    #[test]
    fn special_keys_are_reserved() {
        for code in [key::ENTER, key::BACKSPACE, key::LEFT, key::DELETE, key::HOME] {
            let e = KeyEvent::special(code);
            assert!(!e.text.is_empty());
            assert!(!e.is_invalid(), "{code}");
        }
        assert!(KeyEvent::special(key::LEFT).is_non_laptop_function_key());
    }

    #[test]
    fn emacs_bindings() {
        assert_eq!(KeyEvent::ctrl('f').emacs_key(), Some(EmacsKey::Forward));
        assert_eq!(KeyEvent::ctrl('B').emacs_key(), Some(EmacsKey::Backward));
        assert_eq!(KeyEvent::ctrl('v').emacs_key(), Some(EmacsKey::NextPage));
        assert_eq!(KeyEvent::ctrl('x').emacs_key(), None);
        assert!(!KeyEvent::ctrl('a').is_invalid());
        assert!(KeyEvent::ctrl('x').is_invalid());
        assert_eq!(KeyEvent::ctrl('f').text_ignoring_modifiers, "f");
    }

    #[test]
    fn keypad_and_main_digits() {
        assert!(KeyEvent::numpad('5').is_numeric_pad_key());
        assert!(!KeyEvent::numpad('5').is_non_laptop_function_key());
        assert_eq!(KeyEvent::text("7").main_area_digit(), Some('7'));
        assert_eq!(KeyEvent::text("&").main_area_digit(), Some('7'));
        assert_eq!(KeyEvent::text("q").main_area_digit(), None);
    }

    #[test]
    fn symbol_menu_key() {
        assert!(KeyEvent::text("`").is_symbol_menu_key());
        assert!(KeyEvent::text("~").modifiers.shift);
    }

    #[test]
    fn shifted_text_keeps_unshifted_form() {
        let e = KeyEvent::text("!");
        assert_eq!(e.text, "!");
        assert_eq!(e.text_ignoring_modifiers, "1");
        assert_eq!(KeyEvent::text("A").text_ignoring_modifiers, "a");
        assert_eq!(KeyEvent::text("a").text_ignoring_modifiers, "a");
    }
}
