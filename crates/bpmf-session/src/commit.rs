use tracing::debug;

use super::types::{InputState, KeyResponse};
use super::InputSession;

impl InputSession {
    /// Append a state to the response. Terminal states drop the
    /// accumulator and the lattice first.
    pub(super) fn emit(&mut self, out: &mut KeyResponse, state: InputState) {
        if matches!(
            state,
            InputState::Empty | InputState::EmptyIgnoringPreviousState | InputState::Committing { .. }
        ) {
            self.clear();
        }
        out.states.push(state);
    }

    pub(super) fn emit_inputting(&mut self, out: &mut KeyResponse) {
        let inputting = self.build_inputting_state();
        self.emit(out, InputState::Inputting(inputting));
    }

    /// `Committing` followed by the `Empty` that drains it.
    pub(super) fn commit_text(&mut self, out: &mut KeyResponse, text: String) {
        self.emit(out, InputState::Committing { text });
        self.emit(out, InputState::Empty);
    }

    /// Commit `text`, then offer phrases continuing from `key` when the
    /// preference is on and the model has any.
    pub(super) fn commit_with_associates(&mut self, out: &mut KeyResponse, text: String, key: &str, vertical: bool) {
        self.commit_text(out, text);
        if !self.config.associated_phrases_enabled {
            return;
        }
        if let Some(associates) = self.build_associated_phrases(key, vertical) {
            out.states.push(InputState::AssociatedPhrases(associates));
        }
    }

    /// Raise the error signal. The reason only reaches the log.
    pub(super) fn fail(&self, out: &mut KeyResponse, reason: &str) {
        debug!(reason, "error signal");
        out.error = true;
    }

    /// `fail` and show `state` again unchanged.
    pub(super) fn fail_and_reemit(&mut self, out: &mut KeyResponse, state: &InputState, reason: &str) {
        self.fail(out, reason);
        out.states.push(state.clone());
    }

    /// Commit whatever the host currently shows, as when the client loses
    /// focus mid-composition.
    pub fn commit_composition(&mut self) -> KeyResponse {
        let mut out = KeyResponse::not_consumed();
        if matches!(self.state, InputState::Deactivated) {
            return out;
        }
        let text = self.state.buffer().to_string();
        out.consumed = true;
        if text.is_empty() {
            self.emit(&mut out, InputState::EmptyIgnoringPreviousState);
        } else {
            self.commit_text(&mut out, text);
        }
        self.remember_last_state(&out);
        out
    }
}
