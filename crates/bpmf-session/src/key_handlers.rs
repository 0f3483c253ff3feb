use tracing::{debug, debug_span};

use super::types::{EmacsKey, InputState, KeyEvent, KeyResponse, SymbolTable};
use super::{InputSession, UpperCaseLetterBehavior};

/// Full-width form of an ASCII digit.
fn full_width_digit(c: char) -> char {
    char::from_u32(c as u32 + 0xFEE0).unwrap_or(c)
}

impl InputSession {
    /// Process a key event against the state the session last emitted.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyResponse {
        let state = self.state.clone();
        let out = self.dispatch(event, &state);
        self.remember_last_state(&out);
        out
    }

    /// Process a key event against `state`. The response lists the states
    /// the host applies, in order.
    pub fn dispatch(&mut self, event: &KeyEvent, state: &InputState) -> KeyResponse {
        let _span = debug_span!("dispatch", ?event, state = state.name()).entered();
        let mut out = KeyResponse::not_consumed();
        out.consumed = self.route(event, state.clone(), &mut out);
        debug!(consumed = out.consumed, error = out.error, emitted = out.states.len(), "dispatched");
        out
    }

    /// Track the last state the host will be left showing.
    pub(super) fn remember_last_state(&mut self, out: &KeyResponse) {
        if let Some(state) = out
            .states
            .iter()
            .rev()
            .find(|s| !matches!(s, InputState::Committing { .. }))
        {
            self.state = state.clone();
        }
    }

    /// Ordered routing of one key. Earlier rules shadow later ones.
    pub(super) fn route(&mut self, event: &KeyEvent, state: InputState, out: &mut KeyResponse) -> bool {
        if event.text.is_empty() || matches!(state, InputState::Deactivated) {
            return false;
        }

        if event.is_invalid() {
            if state.is_empty_kind() {
                return false;
            }
            self.fail_and_reemit(out, &state, "invalid key");
            return true;
        }

        let m = event.modifiers;
        let is_function_key = event.is_control_hot_key()
            || m.command
            || event.is_option_hot_key()
            || event.is_non_laptop_function_key();
        if !matches!(state, InputState::AssociatedPhrases(_))
            && !state.has_composition()
            && !state.is_candidate_container()
            && is_function_key
        {
            return false;
        }

        if m.caps_lock
            && !(event.is_backspace()
                || event.is_enter()
                || event.is_cursor_clock_left()
                || event.is_cursor_clock_right()
                || event.is_cursor_forward()
                || event.is_cursor_backward())
        {
            self.emit(out, InputState::Empty);
            if m.shift {
                return false;
            }
            if event.text.is_ascii() && !(0x20..0x7f).contains(&event.char_code) {
                return false;
            }
            self.commit_text(out, event.text.to_lowercase());
            return true;
        }

        if event.is_numeric_pad_key() && !state.is_candidate_container() {
            self.emit(out, InputState::Empty);
            self.commit_text(out, event.text.to_lowercase());
            return true;
        }

        let fallback = match &state {
            InputState::ChoosingCandidate(_) | InputState::SymbolTable(_) => {
                return self.handle_candidate(event, &state, out);
            }
            InputState::AssociatedPhrases(_) => {
                if self.handle_candidate(event, &state, out) {
                    return true;
                }
                self.emit(out, InputState::Empty);
                Some(InputState::Empty)
            }
            InputState::Marking(marking) => {
                if self.handle_marking(event, marking, out) {
                    return true;
                }
                let inputting = InputState::Inputting(marking.converted_to_inputting());
                out.states.push(inputting.clone());
                Some(inputting)
            }
            _ => None,
        };
        let state = fallback.unwrap_or(state);

        if let Some(handled) = self.handle_composition(event, out) {
            return handled;
        }

        if state.has_composition()
            && self.composer.is_empty()
            && !m.option
            && (event.is_cursor_clock_left()
                || event.is_cursor_clock_right()
                || event.is_space()
                || event.is_page_down()
                || event.is_page_up()
                || (event.is_tab() && self.config.specify_shift_tab_key_behavior))
        {
            if event.is_space() {
                if !self.config.choose_candidate_using_space {
                    if self.compositor.cursor() >= self.compositor.length() {
                        let text = format!("{} ", state.buffer());
                        self.commit_text(out, text);
                    } else if self.lm.has_unigrams_for(" ") {
                        self.compositor.insert_reading_at_cursor(" ");
                        self.walk();
                        self.emit_inputting(out);
                    }
                    return true;
                } else if m.shift {
                    return self.handle_inline_candidate_rotation(&state, m.command, out);
                }
            }
            let candidates = self.build_candidate_state(&state, event.vertical);
            if candidates.window.is_empty() {
                self.fail(out, "no candidates at cursor");
            }
            self.emit(out, InputState::ChoosingCandidate(candidates));
            return true;
        }

        let emacs = event.emacs_key();

        if event.is_esc() {
            return self.handle_esc(&state, out);
        }
        if event.is_tab() {
            return self.handle_inline_candidate_rotation(&state, m.shift, out);
        }
        if event.is_cursor_backward() || emacs == Some(EmacsKey::Backward) {
            return self.handle_backward(event, &state, out);
        }
        if event.is_cursor_forward() || emacs == Some(EmacsKey::Forward) {
            return self.handle_forward(event, &state, out);
        }
        if event.is_home() || emacs == Some(EmacsKey::Home) {
            return self.handle_home(&state, out);
        }
        if event.is_end() || emacs == Some(EmacsKey::End) {
            return self.handle_end(&state, out);
        }
        if (m.control || m.shift) && m.option && event.is_left() {
            return self.handle_home(&state, out);
        }
        if (m.control || m.shift) && m.option && event.is_right() {
            return self.handle_end(&state, out);
        }
        if event.is_cursor_clock_left() || event.is_cursor_clock_right() {
            if m.option && matches!(state, InputState::Inputting(_)) {
                return self.handle_inline_candidate_rotation(
                    &state,
                    event.is_cursor_clock_left(),
                    out,
                );
            }
            return self.handle_clock_key(&state, out);
        }
        if event.is_backspace() {
            return self.handle_backspace(&state, out);
        }
        if event.is_delete() || emacs == Some(EmacsKey::Delete) {
            return self.handle_delete(&state, out);
        }
        if event.is_enter() {
            if m.command && m.control {
                return if m.option {
                    self.handle_ruby_enter(&state, out)
                } else {
                    self.handle_readings_enter(&state, out)
                };
            }
            return self.handle_enter(&state, out);
        }

        if event.is_symbol_menu_key() && !m.shift && !m.control {
            if m.option {
                if self.lm.has_unigrams_for("_punctuation_list") {
                    if self.composer.is_empty() {
                        self.compositor.insert_reading_at_cursor("_punctuation_list");
                        self.walk();
                        let inputting = InputState::Inputting(self.build_inputting_state());
                        let candidates = self.build_candidate_state(&inputting, event.vertical);
                        self.emit(out, inputting);
                        self.emit(out, InputState::ChoosingCandidate(candidates));
                    } else {
                        self.fail(out, "symbol list requested mid-reading");
                    }
                    return true;
                }
            } else {
                self.handle_enter(&state, out);
                let table = SymbolTable::new(
                    self.symbol_root.clone(),
                    Vec::new(),
                    self.config.page_size(),
                    event.vertical,
                );
                self.emit(out, InputState::SymbolTable(table));
                return true;
            }
        }

        if state.is_empty_kind()
            && m.shift
            && m.option
            && !m.control
            && !m.command
        {
            if let Some(digit) = event.main_area_digit() {
                let text = if self.config.half_width_punctuation_enabled {
                    digit
                } else {
                    full_width_digit(digit)
                };
                self.commit_text(out, text.to_string());
                return true;
            }
        }

        let prefix = self.punctuation_prefix(event);
        let typed = format!("{prefix}{}_{}", self.config.layout.parser_name(), event.text);
        if self.handle_punctuation(&typed, &state, event.vertical, out) {
            return true;
        }
        let plain = format!("{prefix}{}", event.text);
        if self.handle_punctuation(&plain, &state, event.vertical, out) {
            return true;
        }

        if state.is_empty_kind() && event.is_space() && !m.option && !m.control && !m.command {
            let text = if m.shift { "\u{3000}" } else { " " };
            self.commit_text(out, text.to_string());
            return true;
        }

        if event.is_upper_case_ascii_letter() && !m.command && !m.control {
            match self.config.upper_case_letter_behavior {
                UpperCaseLetterBehavior::CommitLowercase => {
                    self.emit(out, InputState::Empty);
                    self.commit_text(out, event.text.to_lowercase());
                    return true;
                }
                UpperCaseLetterBehavior::CommitUppercase => {
                    self.emit(out, InputState::Empty);
                    self.commit_text(out, event.text.to_uppercase());
                    return true;
                }
                UpperCaseLetterBehavior::LetterTable => {
                    let letter = format!("_letter_{}", event.text);
                    if self.handle_punctuation(&letter, &state, event.vertical, out) {
                        return true;
                    }
                }
            }
        }

        if state.has_composition() || !self.composer.is_empty() {
            debug!(key_code = event.key_code, char_code = event.char_code, "blocked key");
            self.fail_and_reemit(out, &state, "unhandled key mid-composition");
            return true;
        }

        false
    }
}
