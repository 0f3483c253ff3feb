use tracing::info;

use super::types::{EmacsKey, InputState, KeyEvent, KeyResponse, Marking};
use super::InputSession;

impl InputSession {
    /// Keys while a span is marked. `false` drops back to `Inputting` and
    /// lets the key be routed from there.
    pub(super) fn handle_marking(&mut self, event: &KeyEvent, marking: &Marking, out: &mut KeyResponse) -> bool {
        let state = InputState::Marking(marking.clone());
        let emacs = event.emacs_key();

        if event.is_esc() {
            self.emit_inputting(out);
            return true;
        }

        if event.is_enter() {
            if !marking.valid_to_write(false) {
                out.states.push(state);
                return true;
            }
            return self.write_marked_phrase(marking, false, state, out);
        }

        if event.is_backspace() || event.is_delete() {
            if !marking.is_filterable() {
                return false;
            }
            return self.write_marked_phrase(marking, true, state, out);
        }

        if event.modifiers.shift && (event.is_cursor_backward() || emacs == Some(EmacsKey::Backward)) {
            let marker = marking.marker.checked_sub(1);
            self.move_marker(marking, marker, state, out);
            return true;
        }

        if event.modifiers.shift && (event.is_cursor_forward() || emacs == Some(EmacsKey::Forward)) {
            let chars = marking.buffer.chars().count();
            let marker = (marking.marker < chars).then(|| marking.marker + 1);
            self.move_marker(marking, marker, state, out);
            return true;
        }

        false
    }

    fn move_marker(&mut self, marking: &Marking, marker: Option<usize>, state: InputState, out: &mut KeyResponse) {
        let Some(marker) = marker else {
            self.fail_and_reemit(out, &state, "marker past buffer edge");
            return;
        };
        let mut next = Marking::new(
            marking.buffer.clone(),
            marking.cursor,
            marker,
            marking.readings.clone(),
            &self.config,
            self.lm.as_ref(),
        );
        next.tooltip_for_inputting = marking.tooltip_for_inputting.clone();
        if next.marked_range.is_empty() {
            out.states.push(InputState::Inputting(next.converted_to_inputting()));
        } else {
            out.states.push(InputState::Marking(next));
        }
    }

    fn write_marked_phrase(&mut self, marking: &Marking, exclude: bool, state: InputState, out: &mut KeyResponse) -> bool {
        let phrase = marking.user_phrase();
        if !self.lm.write_user_phrase(&phrase, exclude) {
            self.fail_and_reemit(out, &state, "user phrase write refused");
            return true;
        }
        info!(%phrase, exclude, "user phrase written");
        let mut inputting = self.build_inputting_state();
        inputting.tooltip = if exclude {
            "Succeeded in filtering a user phrase.".to_string()
        } else {
            "Succeeded in adding / boosting a user phrase.".to_string()
        };
        self.emit(out, InputState::Inputting(inputting));
        true
    }
}
