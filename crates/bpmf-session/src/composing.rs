use tracing::debug;

use super::types::{InputState, KeyEvent, KeyResponse};
use super::InputSession;

/// Outcome of typing a tone key right after a complete reading.
enum ToneOverride {
    NotApplicable,
    /// The previous reading was dropped and the accumulator reloaded with
    /// its phonabets under the new tone.
    Replaced,
    /// The re-toned reading is unknown; the error has been raised.
    Refused,
}

impl InputSession {
    /// Feed phonetic keys to the accumulator and insert finished readings.
    /// `None` means the key is not a reading key and routing continues.
    pub(super) fn handle_composition(
        &mut self,
        event: &KeyEvent,
        out: &mut KeyResponse,
    ) -> Option<bool> {
        let m = event.modifiers;
        let skip = event.is_reserved_key()
            || event.is_numeric_pad_key()
            || event.is_non_laptop_function_key()
            || m.control
            || m.option
            || m.shift
            || m.command;

        let mut consumed_by_reading = false;
        if let Some(c) = event.first_char().filter(|c| !skip && self.composer.input_validity_check(*c)) {
            let mut replaced = false;
            if self.composer.is_empty() && !event.is_space() {
                match self.override_previous_tone(c, out) {
                    ToneOverride::Refused => return Some(true),
                    ToneOverride::Replaced => replaced = true,
                    ToneOverride::NotApplicable => {}
                }
            }
            if !replaced {
                self.composer.receive_key(&event.text);
            }
            consumed_by_reading = true;
            if !self.composer.has_tone_marker() {
                self.emit_inputting(out);
                return Some(true);
            }
        }

        let compose = (consumed_by_reading && self.composer.has_tone_marker())
            || (!self.composer.is_empty() && (event.is_space() || event.is_enter()));
        if compose {
            return Some(self.compose_reading(event, out));
        }

        if consumed_by_reading {
            self.emit_inputting(out);
            return Some(true);
        }
        None
    }

    /// Insert the finished reading, or refuse it when the model lacks it.
    fn compose_reading(&mut self, event: &KeyEvent, out: &mut KeyResponse) -> bool {
        if event.is_space() && !self.composer.has_tone_marker() {
            self.composer.receive_key(" ");
        }
        let reading = self.composer.composition();

        if !self.lm.has_unigrams_for(&reading) {
            self.fail(out, "reading not in model");
            if self.config.keep_reading_upon_composition_error {
                self.composer.clear_intonation();
            } else {
                self.composer.clear();
            }
            if self.composer.is_empty() && self.compositor.is_empty() {
                self.emit(out, InputState::EmptyIgnoringPreviousState);
            } else {
                self.emit_inputting(out);
            }
            return true;
        }

        self.compositor.insert_reading_at_cursor(&reading);
        self.walk();
        let popped_text = self.pop_overflow_and_walk();
        self.apply_override_suggestion();
        self.composer.clear();
        debug!(%reading, popped = %popped_text, "reading inserted");

        let mut inputting = self.build_inputting_state();
        inputting.popped_text = popped_text;
        let inputting = InputState::Inputting(inputting);
        self.emit(out, inputting.clone());

        if self.config.use_scpc_typing_mode {
            self.select_single_candidate_or_offer(&inputting, event.vertical, out);
        }
        true
    }

    /// Per-character mode: a lone candidate commits at once, otherwise the
    /// candidate window opens.
    pub(super) fn select_single_candidate_or_offer(
        &mut self,
        inputting: &InputState,
        vertical: bool,
        out: &mut KeyResponse,
    ) {
        let choosing = self.build_candidate_state(inputting, vertical);
        if let [only] = choosing.window.candidates.as_slice() {
            let value = only.value.clone();
            self.commit_with_associates(out, value.clone(), &value, vertical);
        } else {
            self.emit(out, InputState::ChoosingCandidate(choosing));
        }
    }

    /// Replace the tone of the reading before the cursor when `c` is a tone
    /// key that changes it.
    fn override_previous_tone(&mut self, c: char, out: &mut KeyResponse) -> ToneOverride {
        let Some(tone) = self.composer.tone_for_key(c) else {
            return ToneOverride::NotApplicable;
        };
        let cursor = self.compositor.cursor();
        if cursor == 0 {
            return ToneOverride::NotApplicable;
        }
        let previous = &self.compositor.readings()[cursor - 1];
        if previous.contains('_') {
            return ToneOverride::NotApplicable;
        }

        let mut probe = self.composer.clone();
        probe.clear();
        previous.chars().for_each(|p| probe.receive_phonabet(p));
        let old_tone = probe.intonation().unwrap_or(' ');
        if old_tone == tone {
            return ToneOverride::NotApplicable;
        }
        probe.receive_phonabet(tone);
        if !self.lm.has_unigrams_for(&probe.composition()) {
            self.fail(out, "re-toned reading not in model");
            return ToneOverride::Refused;
        }

        self.compositor.delete_reading_before_cursor();
        self.walk();
        debug!(to = %probe.composition(), "tone replaced");
        self.composer = probe;
        ToneOverride::Replaced
    }
}
