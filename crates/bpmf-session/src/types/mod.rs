mod event;
mod state;
mod window;

pub use event::{EmacsKey, KeyEvent, Modifiers};
pub use state::{
    AssociatedPhrases, Candidate, ChoosingCandidate, InputState, Inputting, Marking,
    SymbolTable,
};
pub use window::CandidateWindow;

// macOS virtual key codes
pub mod key {
    pub const ENTER: u16 = 36;
    pub const TAB: u16 = 48;
    pub const SPACE: u16 = 49;
    pub const SYMBOL_MENU: u16 = 50;
    pub const BACKSPACE: u16 = 51;
    pub const ESCAPE: u16 = 53;
    pub const LINE_FEED: u16 = 76;
    pub const SYMBOL_MENU_JIS: u16 = 94;
    pub const HOME: u16 = 115;
    pub const PAGE_UP: u16 = 116;
    pub const DELETE: u16 = 117;
    pub const END: u16 = 119;
    pub const PAGE_DOWN: u16 = 121;
    pub const LEFT: u16 = 123;
    pub const RIGHT: u16 = 124;
    pub const DOWN: u16 = 125;
    pub const UP: u16 = 126;
    /// Text with no key of its own on a US ANSI keyboard.
    pub const UNKNOWN: u16 = 0xFFFF;

    /// Keypad keys; digits and operators alike.
    pub const NUMERIC_PAD: [u16; 18] = [
        65, 67, 69, 71, 75, 78, 81, 82, 83, 84, 85, 86, 87, 88, 89, 91, 92, 95,
    ];

    /// Main-area digit keys, with the digit each one types.
    pub const MAIN_AREA_DIGITS: [(u16, char); 10] = [
        (18, '1'),
        (19, '2'),
        (20, '3'),
        (21, '4'),
        (23, '5'),
        (22, '6'),
        (26, '7'),
        (28, '8'),
        (25, '9'),
        (29, '0'),
    ];

    /// Keys the machine understands even though their char code is not
    /// printable: editing, navigation and modifier keys.
    pub(crate) fn is_reserved(code: u16) -> bool {
        matches!(
            code,
            ENTER | TAB | SPACE | SYMBOL_MENU | BACKSPACE | ESCAPE | LINE_FEED
                | SYMBOL_MENU_JIS | HOME | PAGE_UP | DELETE | END | PAGE_DOWN
                | LEFT | RIGHT | DOWN | UP
        ) || (55..=63).contains(&code)
    }
}

/// Result of one dispatch.
///
/// `states` is the ordered list of transitions the host applies. A
/// `Committing` entry is always followed by `Empty` within the same
/// response; chained `AssociatedPhrases` come after that `Empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyResponse {
    pub consumed: bool,
    pub states: Vec<InputState>,
    /// Audible/visual bell; carries no detail.
    pub error: bool,
}

impl KeyResponse {
    pub(crate) fn not_consumed() -> Self {
        Self::default()
    }

    /// Last emitted state, if any.
    pub fn last_state(&self) -> Option<&InputState> {
        self.states.last()
    }

    /// Concatenated text of every `Committing` entry.
    pub fn committed_text(&self) -> String {
        self.states
            .iter()
            .filter_map(|s| match s {
                InputState::Committing { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub(crate) fn cyclic_index(current: usize, delta: i32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let c = current as i32;
    let n = count as i32;
    ((c + delta).rem_euclid(n)) as usize
}
