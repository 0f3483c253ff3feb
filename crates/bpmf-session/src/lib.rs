//! Keystroke-driven composition state machine for a Bopomofo input method.
//!
//! `InputSession` owns the reading accumulator and the composition lattice of
//! one input context. Each key event is dispatched against an `InputState`
//! and answered with a `KeyResponse`: whether the key was consumed, the
//! ordered list of states the host applies, and the error signal.

pub(crate) mod types;

mod candidates;
mod client;
mod commit;
mod composing;
mod key_handlers;
mod marking;
mod navigation;
mod punctuation;
mod response;

#[cfg(test)]
mod tests;

use std::sync::{Arc, PoisonError, RwLock};

use bpmf_core::compositor::Compositor;
use bpmf_core::lm::LanguageModel;
use bpmf_core::phonetic::{Composer, Layout};
use bpmf_core::settings::{settings, Settings};
use bpmf_core::symbols::SymbolNode;
use bpmf_core::user_override::UserOverrideModel;

pub use client::HeadlessClient;
pub use types::{
    key, AssociatedPhrases, Candidate, CandidateWindow, ChoosingCandidate, EmacsKey, InputState,
    Inputting, KeyEvent, KeyResponse, Marking, Modifiers, SymbolTable,
};

/// What an upper-case letter typed with Shift does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperCaseLetterBehavior {
    /// Look up `_letter_X` and insert it like punctuation.
    LetterTable,
    CommitLowercase,
    CommitUppercase,
}

impl From<u8> for UpperCaseLetterBehavior {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::CommitLowercase,
            2 => Self::CommitUppercase,
            _ => Self::LetterTable,
        }
    }
}

/// Per-session copy of the settings the machine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub layout: Layout,
    /// Lattice width above which the head span is evicted.
    pub composing_buffer_size: usize,
    pub max_span_length: usize,
    pub min_mark_length: usize,
    pub max_mark_length: usize,
    /// Selection labels; their count is the page size.
    pub candidate_keys: String,
    pub user_override_enabled: bool,
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
    pub upper_case_letter_behavior: UpperCaseLetterBehavior,
    pub keep_reading_upon_composition_error: bool,
    pub inline_dump_pinyin_in_lieu_of_zhuyin: bool,
}

impl SessionConfig {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            layout: s.composition.layout,
            composing_buffer_size: s.composition.composing_buffer_size,
            max_span_length: s.composition.max_span_length,
            min_mark_length: s.marking.min_length,
            max_mark_length: s.marking.max_length,
            candidate_keys: s.candidates.keys.clone(),
            user_override_enabled: s.user_override.enabled,
            use_scpc_typing_mode: s.session.use_scpc_typing_mode,
            choose_candidate_using_space: s.session.choose_candidate_using_space,
            use_rear_cursor_mode: s.session.use_rear_cursor_mode,
            associated_phrases_enabled: s.session.associated_phrases_enabled,
            move_cursor_after_selecting_candidate: s.session.move_cursor_after_selecting_candidate,
            half_width_punctuation_enabled: s.session.half_width_punctuation_enabled,
            specify_shift_tab_key_behavior: s.session.specify_shift_tab_key_behavior,
            specify_shift_space_key_behavior: s.session.specify_shift_space_key_behavior,
            esc_to_clean_input_buffer: s.session.esc_to_clean_input_buffer,
            phrase_replacement_enabled: s.session.phrase_replacement_enabled,
            upper_case_letter_behavior: s.session.upper_case_letter_key_behavior.into(),
            keep_reading_upon_composition_error: s.session.keep_reading_upon_composition_error,
            inline_dump_pinyin_in_lieu_of_zhuyin: s.session.inline_dump_pinyin_in_lieu_of_zhuyin,
        }
    }

    pub fn page_size(&self) -> usize {
        self.candidate_keys.chars().count()
    }

    /// Per-character selection only ever looks up single readings.
    fn lattice_span_length(&self) -> usize {
        if self.use_scpc_typing_mode {
            1
        } else {
            self.max_span_length
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(settings())
    }
}

/// Stateful IME session encapsulating all input processing logic.
pub struct InputSession {
    lm: Arc<dyn LanguageModel>,
    uom: Option<Arc<RwLock<UserOverrideModel>>>,

    composer: Composer,
    compositor: Compositor,
    /// Last emitted state other than `Committing`; used by `handle_key`.
    state: InputState,

    config: SessionConfig,
    symbol_root: SymbolNode,
}

impl InputSession {
    pub fn new(lm: Arc<dyn LanguageModel>, uom: Option<Arc<RwLock<UserOverrideModel>>>) -> Self {
        Self::with_config(lm, uom, SessionConfig::default())
    }

    pub fn with_config(
        lm: Arc<dyn LanguageModel>,
        uom: Option<Arc<RwLock<UserOverrideModel>>>,
        config: SessionConfig,
    ) -> Self {
        Self {
            composer: Composer::new(config.layout),
            compositor: Compositor::new(Arc::clone(&lm), config.lattice_span_length()),
            lm,
            uom,
            state: InputState::Empty,
            config,
            symbol_root: SymbolNode::default_root().clone(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration. Any composition in progress is dropped.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.composer = Composer::new(config.layout);
        self.compositor = Compositor::new(Arc::clone(&self.lm), config.lattice_span_length());
        self.config = config;
        if !matches!(self.state, InputState::Deactivated) {
            self.state = InputState::Empty;
        }
    }

    pub fn set_symbol_root(&mut self, root: SymbolNode) {
        self.symbol_root = root;
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn readings(&self) -> &[String] {
        self.compositor.readings()
    }

    pub fn user_override_model(&self) -> Option<&Arc<RwLock<UserOverrideModel>>> {
        self.uom.as_ref()
    }

    /// Number of contexts the override model remembers.
    pub fn observation_count(&self) -> usize {
        self.uom
            .as_ref()
            .map(|uom| uom.read().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    /// Tear the session down; every key is refused until `activate`.
    pub fn deactivate(&mut self) {
        self.clear();
        self.state = InputState::Deactivated;
    }

    pub fn activate(&mut self) {
        self.clear();
        self.state = InputState::Empty;
    }

    /// Drop the accumulator and the lattice.
    pub fn clear(&mut self) {
        self.composer.clear();
        self.compositor.clear();
    }
}
