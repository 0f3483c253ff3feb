//! Phonetic reading accumulator.
//!
//! `Composer` collects one keystroke at a time into the four Zhuyin slots
//! (consonant, semivowel, vowel, intonation) and reports when a syllable is
//! complete. The standard layout maps keys straight onto phonabets; the
//! Hanyu Pinyin layout buffers romanization until a tone key converts it.

pub mod pinyin;

use serde::Deserialize;

pub use pinyin::{pinyin_to_zhuyin, to_textbook_reading, zhuyin_to_pinyin};

/// Keyboard layout feeding the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Dachen (standard Zhuyin) keyboard.
    #[default]
    Standard,
    HanyuPinyin,
}

impl Layout {
    /// Name used to qualify layout-specific punctuation keys.
    pub fn parser_name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::HanyuPinyin => "HanyuPinyin",
        }
    }
}

pub const CONSONANTS: &str = "ㄅㄆㄇㄈㄉㄊㄋㄌㄍㄎㄏㄐㄑㄒㄓㄔㄕㄖㄗㄘㄙ";
pub const SEMIVOWELS: &str = "ㄧㄨㄩ";
pub const VOWELS: &str = "ㄚㄛㄜㄝㄞㄟㄠㄡㄢㄣㄤㄥㄦ";
/// First tone is a space and never appears in a lookup key.
pub const INTONATIONS: &str = " ˊˇˋ˙";

const MAX_ROMANIZATION_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Consonant,
    Semivowel,
    Vowel,
    Intonation,
}

fn slot_of(phonabet: char) -> Option<Slot> {
    if CONSONANTS.contains(phonabet) {
        Some(Slot::Consonant)
    } else if SEMIVOWELS.contains(phonabet) {
        Some(Slot::Semivowel)
    } else if VOWELS.contains(phonabet) {
        Some(Slot::Vowel)
    } else if INTONATIONS.contains(phonabet) {
        Some(Slot::Intonation)
    } else {
        None
    }
}

/// Dachen keyboard: QWERTY key to phonabet.
fn dachen_phonabet(key: char) -> Option<char> {
    let p = match key {
        '1' => 'ㄅ',
        'q' => 'ㄆ',
        'a' => 'ㄇ',
        'z' => 'ㄈ',
        '2' => 'ㄉ',
        'w' => 'ㄊ',
        's' => 'ㄋ',
        'x' => 'ㄌ',
        'e' => 'ㄍ',
        'd' => 'ㄎ',
        'c' => 'ㄏ',
        'r' => 'ㄐ',
        'f' => 'ㄑ',
        'v' => 'ㄒ',
        '5' => 'ㄓ',
        't' => 'ㄔ',
        'g' => 'ㄕ',
        'b' => 'ㄖ',
        'y' => 'ㄗ',
        'h' => 'ㄘ',
        'n' => 'ㄙ',
        'u' => 'ㄧ',
        'j' => 'ㄨ',
        'm' => 'ㄩ',
        '8' => 'ㄚ',
        'i' => 'ㄛ',
        'k' => 'ㄜ',
        ',' => 'ㄝ',
        '9' => 'ㄞ',
        'o' => 'ㄟ',
        'l' => 'ㄠ',
        '.' => 'ㄡ',
        '0' => 'ㄢ',
        'p' => 'ㄣ',
        ';' => 'ㄤ',
        '/' => 'ㄥ',
        '-' => 'ㄦ',
        ' ' => ' ',
        '6' => 'ˊ',
        '3' => 'ˇ',
        '4' => 'ˋ',
        '7' => '˙',
        _ => return None,
    };
    Some(p)
}

fn pinyin_tone(key: char) -> Option<char> {
    match key {
        ' ' | '1' => Some(' '),
        '2' => Some('ˊ'),
        '3' => Some('ˇ'),
        '4' => Some('ˋ'),
        '5' => Some('˙'),
        _ => None,
    }
}

/// Syllable accumulator for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    layout: Layout,
    consonant: Option<char>,
    semivowel: Option<char>,
    vowel: Option<char>,
    intonation: Option<char>,
    /// Pending romanization (Hanyu Pinyin layout only).
    romanization: String,
}

impl Composer {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_empty(&self) -> bool {
        self.consonant.is_none()
            && self.semivowel.is_none()
            && self.vowel.is_none()
            && self.intonation.is_none()
            && self.romanization.is_empty()
    }

    /// Whether `key` is a phonetic key in the active layout.
    pub fn input_validity_check(&self, key: char) -> bool {
        match self.layout {
            Layout::Standard => dachen_phonabet(key).is_some(),
            Layout::HanyuPinyin => {
                key.is_ascii_lowercase()
                    || (('1'..='5').contains(&key) && !self.romanization.is_empty())
            }
        }
    }

    /// Feed a key. Keys failing `input_validity_check` are ignored.
    pub fn receive_key(&mut self, key: &str) {
        for c in key.chars() {
            self.receive_char(c);
        }
    }

    fn receive_char(&mut self, key: char) {
        match self.layout {
            Layout::Standard => {
                if let Some(p) = dachen_phonabet(key) {
                    self.receive_phonabet(p);
                }
            }
            Layout::HanyuPinyin => {
                if let Some(tone) = pinyin_tone(key).filter(|_| !self.romanization.is_empty()) {
                    if let Some(zhuyin) = pinyin_to_zhuyin(&self.romanization) {
                        self.clear();
                        zhuyin.chars().for_each(|p| self.receive_phonabet(p));
                        self.intonation = Some(tone);
                    }
                } else if key.is_ascii_lowercase() && self.romanization.len() < MAX_ROMANIZATION_LEN {
                    if self.has_tone_marker() {
                        self.clear();
                    }
                    self.romanization.push(key);
                }
            }
        }
    }

    /// Place a phonabet into its slot, replacing whatever the slot held.
    pub fn receive_phonabet(&mut self, phonabet: char) {
        match slot_of(phonabet) {
            Some(Slot::Consonant) => self.consonant = Some(phonabet),
            Some(Slot::Semivowel) => self.semivowel = Some(phonabet),
            Some(Slot::Vowel) => self.vowel = Some(phonabet),
            Some(Slot::Intonation) => self.intonation = Some(phonabet),
            None => {}
        }
    }

    /// Intonation produced by `key`, if it is a tone key in this layout.
    pub fn tone_for_key(&self, key: char) -> Option<char> {
        match self.layout {
            Layout::Standard => dachen_phonabet(key).filter(|p| INTONATIONS.contains(*p)),
            Layout::HanyuPinyin => pinyin_tone(key),
        }
    }

    pub fn has_tone_marker(&self) -> bool {
        self.intonation.is_some()
    }

    /// True when the intonation is the only occupied slot.
    pub fn has_tone_marker_only(&self) -> bool {
        self.intonation.is_some()
            && self.consonant.is_none()
            && self.semivowel.is_none()
            && self.vowel.is_none()
            && self.romanization.is_empty()
    }

    pub fn intonation(&self) -> Option<char> {
        self.intonation
    }

    pub fn clear_intonation(&mut self) {
        self.intonation = None;
    }

    /// Lookup key for the language model. First tone is omitted.
    pub fn composition(&self) -> String {
        let phonabets: String = [self.consonant, self.semivowel, self.vowel]
            .into_iter()
            .flatten()
            .chain(self.intonation.filter(|t| *t != ' '))
            .collect();
        if phonabets.is_empty() {
            self.romanization.clone()
        } else {
            phonabets
        }
    }

    /// What the composing buffer shows at the cursor while typing.
    pub fn inline_display(&self) -> String {
        if !self.romanization.is_empty() {
            return self.romanization.clone();
        }
        self.composition()
    }

    pub fn do_backspace(&mut self) {
        if !self.romanization.is_empty() {
            self.romanization.pop();
        } else if self.intonation.take().is_none()
            && self.vowel.take().is_none()
            && self.semivowel.take().is_none()
        {
            self.consonant = None;
        }
    }

    pub fn clear(&mut self) {
        self.consonant = None;
        self.semivowel = None;
        self.vowel = None;
        self.intonation = None;
        self.romanization.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(layout: Layout, keys: &str) -> Composer {
        let mut c = Composer::new(layout);
        for k in keys.chars() {
            if c.input_validity_check(k) {
                c.receive_key(&k.to_string());
            }
        }
        c
    }

    #[test]
    fn dachen_syllable_with_tone() {
        let c = typed(Layout::Standard, "su3");
        assert!(c.has_tone_marker());
        assert_eq!(c.composition(), "ㄋㄧˇ");
    }

    #[test]
    fn dachen_first_tone_omitted() {
        let mut c = typed(Layout::Standard, "ji");
        assert!(!c.has_tone_marker());
        assert_eq!(c.composition(), "ㄨㄛ");
        c.receive_key(" ");
        assert!(c.has_tone_marker());
        assert_eq!(c.composition(), "ㄨㄛ");
    }

    #[test]
    fn dachen_slot_replacement() {
        let c = typed(Layout::Standard, "1q");
        assert_eq!(c.composition(), "ㄆ");
    }

    #[test]
    fn dachen_rejects_unmapped_keys() {
        let c = Composer::new(Layout::Standard);
        assert!(!c.input_validity_check('['));
        assert!(!c.input_validity_check('A'));
        assert!(c.input_validity_check('3'));
    }

    #[test]
    fn backspace_order() {
        let mut c = typed(Layout::Standard, "2jp4");
        assert_eq!(c.composition(), "ㄉㄨㄣˋ");
        c.do_backspace();
        assert_eq!(c.composition(), "ㄉㄨㄣ");
        c.do_backspace();
        assert_eq!(c.composition(), "ㄉㄨ");
        c.do_backspace();
        assert_eq!(c.composition(), "ㄉ");
        c.do_backspace();
        assert!(c.is_empty());
    }

    #[test]
    fn tone_only() {
        let c = typed(Layout::Standard, "3");
        assert!(c.has_tone_marker_only());
        let c = typed(Layout::Standard, "u3");
        assert!(!c.has_tone_marker_only());
    }

    #[test]
    fn pinyin_buffer_then_tone() {
        let mut c = typed(Layout::HanyuPinyin, "ni");
        assert!(!c.has_tone_marker());
        assert_eq!(c.inline_display(), "ni");
        c.receive_key("3");
        assert!(c.has_tone_marker());
        assert_eq!(c.composition(), "ㄋㄧˇ");
    }

    #[test]
    fn pinyin_digit_needs_buffer() {
        let c = Composer::new(Layout::HanyuPinyin);
        assert!(!c.input_validity_check('3'));
        assert!(c.input_validity_check('h'));
    }

    #[test]
    fn pinyin_unconvertible_stays_toneless() {
        let mut c = typed(Layout::HanyuPinyin, "qqq");
        c.receive_key("2");
        assert!(!c.has_tone_marker());
        assert_eq!(c.inline_display(), "qqq");
    }

    #[test]
    fn pinyin_backspace_pops_romanization() {
        let mut c = typed(Layout::HanyuPinyin, "hao");
        c.do_backspace();
        assert_eq!(c.inline_display(), "ha");
    }

    #[test]
    fn tone_for_key_per_layout() {
        let std = Composer::new(Layout::Standard);
        assert_eq!(std.tone_for_key('3'), Some('ˇ'));
        assert_eq!(std.tone_for_key('u'), None);
        let py = Composer::new(Layout::HanyuPinyin);
        assert_eq!(py.tone_for_key('4'), Some('ˋ'));
    }
}
