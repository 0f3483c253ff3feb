//! Global engine settings loaded from TOML.
//!
//! `settings()` hands out one `&'static Settings` for the process. It is
//! parsed on first use from the TOML installed with `init_custom`, or from
//! the embedded `default_settings.toml` when none was installed.
//!
//! Sessions copy what they need out of the singleton, so per-session
//! overrides never touch the global value.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::phonetic::Layout;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();
static INSTANCE: OnceLock<Settings> = OnceLock::new();

/// Install a settings document. Fails once `settings()` has been read or a
/// document was already installed.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    if INSTANCE.get().is_some() {
        return Err(SettingsError::AlreadyInitialized);
    }
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

pub fn settings() -> &'static Settings {
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub composition: CompositionSettings,
    pub marking: MarkingSettings,
    pub candidates: CandidateSettings,
    pub user_override: UserOverrideSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompositionSettings {
    pub layout: Layout,
    pub composing_buffer_size: usize,
    pub max_span_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkingSettings {
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateSettings {
    /// Selection key labels, one per slot on a candidate page.
    pub keys: String,
}

impl CandidateSettings {
    pub fn page_size(&self) -> usize {
        self.keys.chars().count()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserOverrideSettings {
    pub enabled: bool,
    pub capacity: usize,
    pub decay_constant: f64,
}

/// Toggles read by the composition state machine.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub use_scpc_typing_mode: bool,
    pub choose_candidate_using_space: bool,
    pub use_rear_cursor_mode: bool,
    pub associated_phrases_enabled: bool,
    pub move_cursor_after_selecting_candidate: bool,
    pub half_width_punctuation_enabled: bool,
    pub specify_shift_tab_key_behavior: bool,
    pub specify_shift_space_key_behavior: bool,
    pub esc_to_clean_input_buffer: bool,
    pub phrase_replacement_enabled: bool,
    pub upper_case_letter_key_behavior: u8,
    pub keep_reading_upon_composition_error: bool,
    pub inline_dump_pinyin_in_lieu_of_zhuyin: bool,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_range_usize {
        ($section:ident . $field:ident, $lo:expr, $hi:expr) => {
            if !($lo..=$hi).contains(&s.$section.$field) {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: format!("must be within {}..={}", $lo, $hi),
                });
            }
        };
    }
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_range_usize!(composition.composing_buffer_size, 4, 100);
    check_range_usize!(composition.max_span_length, 1, 16);
    check_positive_usize!(marking.min_length);
    check_positive_usize!(user_override.capacity);

    if s.marking.max_length < s.marking.min_length {
        return Err(SettingsError::InvalidValue {
            field: "marking.max_length".to_string(),
            reason: "must not be below marking.min_length".to_string(),
        });
    }
    if s.user_override.decay_constant <= 0.0 {
        return Err(SettingsError::InvalidValue {
            field: "user_override.decay_constant".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if s.session.upper_case_letter_key_behavior > 2 {
        return Err(SettingsError::InvalidValue {
            field: "session.upper_case_letter_key_behavior".to_string(),
            reason: "must be 0, 1 or 2".to_string(),
        });
    }
    validate_candidate_keys(&s.candidates.keys)
}

fn validate_candidate_keys(keys: &str) -> Result<(), SettingsError> {
    let invalid = |reason: &str| SettingsError::InvalidValue {
        field: "candidates.keys".to_string(),
        reason: reason.to_string(),
    };
    let count = keys.chars().count();
    if !(4..=10).contains(&count) {
        return Err(invalid("must hold 4 to 10 keys"));
    }
    if !keys.chars().all(|c| c.is_ascii_graphic()) {
        return Err(invalid("must be printable ASCII without spaces"));
    }
    let unique: HashSet<char> = keys.chars().map(|c| c.to_ascii_lowercase()).collect();
    if unique.len() != count {
        return Err(invalid("must not repeat a key"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.composition.layout, Layout::Standard);
        assert_eq!(s.composition.composing_buffer_size, 20);
        assert_eq!(s.composition.max_span_length, 10);
        assert_eq!(s.marking.min_length, 2);
        assert_eq!(s.marking.max_length, 8);
        assert_eq!(s.candidates.keys, "123456789");
        assert_eq!(s.candidates.page_size(), 9);
        assert!(s.user_override.enabled);
        assert_eq!(s.user_override.capacity, 500);
        assert!((s.user_override.decay_constant - 5400.0).abs() < f64::EPSILON);
        assert!(!s.session.use_scpc_typing_mode);
        assert!(s.session.choose_candidate_using_space);
        assert!(s.session.esc_to_clean_input_buffer);
        assert_eq!(s.session.upper_case_letter_key_behavior, 0);
    }

    fn with_replacement(from: &str, to: &str) -> String {
        assert!(DEFAULT_SETTINGS_TOML.contains(from), "fixture drift: {from}");
        DEFAULT_SETTINGS_TOML.replacen(from, to, 1)
    }

    #[test]
    fn parse_pinyin_layout() {
        let toml = with_replacement("layout = \"standard\"", "layout = \"hanyu_pinyin\"");
        let s = parse_settings_toml(&toml).unwrap();
        assert_eq!(s.composition.layout, Layout::HanyuPinyin);
    }

    #[test]
    fn reject_unknown_layout() {
        let toml = with_replacement("layout = \"standard\"", "layout = \"eten26\"");
        assert!(matches!(
            parse_settings_toml(&toml),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn reject_small_buffer() {
        let toml = with_replacement("composing_buffer_size = 20", "composing_buffer_size = 2");
        match parse_settings_toml(&toml) {
            Err(SettingsError::InvalidValue { field, .. }) => {
                assert_eq!(field, "composition.composing_buffer_size")
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn reject_inverted_marking_bounds() {
        let toml = with_replacement("max_length = 8", "max_length = 1");
        match parse_settings_toml(&toml) {
            Err(SettingsError::InvalidValue { field, .. }) => {
                assert_eq!(field, "marking.max_length")
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn reject_zero_decay() {
        let toml = with_replacement("decay_constant = 5400.0", "decay_constant = 0.0");
        assert!(matches!(
            parse_settings_toml(&toml),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn reject_duplicate_candidate_keys() {
        let toml = with_replacement("keys = \"123456789\"", "keys = \"aAsdf\"");
        match parse_settings_toml(&toml) {
            Err(SettingsError::InvalidValue { field, reason }) => {
                assert_eq!(field, "candidates.keys");
                assert!(reason.contains("repeat"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn reject_short_candidate_keys() {
        let toml = with_replacement("keys = \"123456789\"", "keys = \"123\"");
        assert!(parse_settings_toml(&toml).is_err());
    }

    #[test]
    fn reject_bad_letter_behavior() {
        let toml = with_replacement(
            "upper_case_letter_key_behavior = 0",
            "upper_case_letter_key_behavior = 3",
        );
        assert!(parse_settings_toml(&toml).is_err());
    }

    #[test]
    fn reject_missing_section() {
        let toml = "[composition]\nlayout = \"standard\"\ncomposing_buffer_size = 20\nmax_span_length = 10\n";
        assert!(matches!(
            parse_settings_toml(toml),
            Err(SettingsError::Parse(_))
        ));
    }
}
