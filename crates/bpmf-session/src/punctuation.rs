use tracing::debug;

use super::types::{InputState, KeyEvent, KeyResponse};
use super::InputSession;

impl InputSession {
    /// Lexicon key prefix for a punctuation typed with the event's
    /// modifiers.
    pub(super) fn punctuation_prefix(&self, event: &KeyEvent) -> &'static str {
        let m = event.modifiers;
        match (m.option, m.control) {
            (true, false) => "_alt_punctuation_",
            (false, true) => "_ctrl_punctuation_",
            (true, true) => "_alt_ctrl_punctuation_",
            (false, false) if self.config.half_width_punctuation_enabled => "_half_punctuation_",
            (false, false) => "_punctuation_",
        }
    }

    /// Insert the unit keyed `key` as a reading of its own. `false` when
    /// the model does not know the key.
    pub(super) fn handle_punctuation(
        &mut self,
        key: &str,
        state: &InputState,
        vertical: bool,
        out: &mut KeyResponse,
    ) -> bool {
        if !self.lm.has_unigrams_for(key) {
            return false;
        }
        if !self.composer.is_empty() {
            self.fail_and_reemit(out, state, "punctuation mid-reading");
            return true;
        }

        self.compositor.insert_reading_at_cursor(key);
        self.walk();
        let popped_text = self.pop_overflow_and_walk();
        debug!(key, popped = %popped_text, "punctuation inserted");
        let mut inputting = self.build_inputting_state();
        inputting.popped_text = popped_text;
        let inputting = InputState::Inputting(inputting);
        self.emit(out, inputting.clone());

        if self.config.use_scpc_typing_mode {
            let choosing = self.build_candidate_state(&inputting, vertical);
            if let [only] = choosing.window.candidates.as_slice() {
                let value = only.value.clone();
                self.commit_text(out, value);
            } else {
                self.emit(out, InputState::ChoosingCandidate(choosing));
            }
        }
        true
    }
}
