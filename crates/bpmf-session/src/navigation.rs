use bpmf_core::compositor::SELECTED_CANDIDATE_SCORE;
use bpmf_core::phonetic::{to_textbook_reading, zhuyin_to_pinyin};

use super::types::{InputState, KeyEvent, KeyResponse, Marking};
use super::InputSession;

impl InputSession {
    pub(super) fn handle_esc(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        if self.config.esc_to_clean_input_buffer {
            self.emit(out, InputState::EmptyIgnoringPreviousState);
        } else if !self.composer.is_empty() {
            self.composer.clear();
            if self.compositor.is_empty() {
                self.emit(out, InputState::EmptyIgnoringPreviousState);
            } else {
                self.emit_inputting(out);
            }
        }
        true
    }

    pub(super) fn handle_backspace(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        if self.composer.has_tone_marker_only() {
            self.composer.clear();
        } else if self.composer.is_empty() {
            if !self.compositor.delete_reading_before_cursor() {
                self.fail_and_reemit(out, state, "nothing before cursor");
                return true;
            }
            self.walk();
        } else {
            self.composer.do_backspace();
        }

        if self.composer.is_empty() && self.compositor.is_empty() {
            self.emit(out, InputState::EmptyIgnoringPreviousState);
        } else {
            self.emit_inputting(out);
        }
        true
    }

    pub(super) fn handle_delete(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        if !self.composer.is_empty() || self.compositor.cursor() == self.compositor.length() {
            self.fail_and_reemit(out, state, "nothing after cursor");
            return true;
        }
        self.compositor.delete_reading_after_cursor();
        self.walk();
        if self.compositor.is_empty() {
            self.emit(out, InputState::EmptyIgnoringPreviousState);
        } else {
            self.emit_inputting(out);
        }
        true
    }

    pub(super) fn handle_home(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        self.jump_to(0, state, out)
    }

    pub(super) fn handle_end(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        let end = self.compositor.length();
        self.jump_to(end, state, out)
    }

    fn jump_to(&mut self, target: usize, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        if !self.composer.is_empty() {
            self.fail_and_reemit(out, state, "cursor move mid-reading");
            return true;
        }
        if self.compositor.cursor() == target {
            self.fail_and_reemit(out, state, "cursor already at edge");
            return true;
        }
        self.compositor.set_cursor(target);
        self.emit_inputting(out);
        true
    }

    pub(super) fn handle_backward(&mut self, event: &KeyEvent, state: &InputState, out: &mut KeyResponse) -> bool {
        self.step_cursor(event, state, false, out)
    }

    pub(super) fn handle_forward(&mut self, event: &KeyEvent, state: &InputState, out: &mut KeyResponse) -> bool {
        self.step_cursor(event, state, true, out)
    }

    /// One step left or right. With Shift the step starts a marking instead
    /// of moving the lattice cursor.
    fn step_cursor(&mut self, event: &KeyEvent, state: &InputState, forward: bool, out: &mut KeyResponse) -> bool {
        let InputState::Inputting(inputting) = state else {
            return false;
        };
        if !self.composer.is_empty() {
            self.fail_and_reemit(out, state, "cursor move mid-reading");
            return true;
        }

        if event.modifiers.shift {
            let chars = inputting.buffer.chars().count();
            let marker = if forward {
                (inputting.cursor < chars).then(|| inputting.cursor + 1)
            } else {
                inputting.cursor.checked_sub(1)
            };
            let Some(marker) = marker else {
                self.fail_and_reemit(out, state, "marking past buffer edge");
                return true;
            };
            let mut marking = Marking::new(
                inputting.buffer.clone(),
                inputting.cursor,
                marker,
                self.compositor.readings().to_vec(),
                &self.config,
                self.lm.as_ref(),
            );
            marking.tooltip_for_inputting = inputting.tooltip.clone();
            self.emit(out, InputState::Marking(marking));
            return true;
        }

        let cursor = self.compositor.cursor();
        let next = if forward {
            (cursor < self.compositor.length()).then(|| cursor + 1)
        } else {
            cursor.checked_sub(1)
        };
        match next {
            Some(next) => {
                self.compositor.set_cursor(next);
                self.emit_inputting(out);
            }
            None => self.fail_and_reemit(out, state, "cursor already at edge"),
        }
        true
    }

    /// Up/Down outside candidate selection go nowhere but stay absorbed.
    pub(super) fn handle_clock_key(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        if !self.composer.is_empty() {
            self.fail(out, "vertical move mid-reading");
        }
        out.states.push(state.clone());
        true
    }

    /// Commit the buffer as shown.
    pub(super) fn handle_enter(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        let InputState::Inputting(inputting) = state else {
            return false;
        };
        self.commit_text(out, inputting.buffer.clone());
        true
    }

    /// Commit the readings themselves instead of the converted text.
    pub(super) fn handle_readings_enter(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        let pinyin = self.config.inline_dump_pinyin_in_lieu_of_zhuyin;
        let text = self
            .compositor
            .readings()
            .iter()
            .map(|r| {
                if pinyin && !r.contains('_') {
                    zhuyin_to_pinyin(r)
                } else {
                    r.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        self.commit_text(out, text);
        true
    }

    /// Commit the walked text annotated with HTML ruby readings.
    pub(super) fn handle_ruby_enter(&mut self, state: &InputState, out: &mut KeyResponse) -> bool {
        if !matches!(state, InputState::Inputting(_)) {
            return false;
        }
        let pinyin = self.config.inline_dump_pinyin_in_lieu_of_zhuyin;
        let mut composed = String::new();
        for node in self.compositor.walked() {
            if node.key.contains('_') {
                composed.push_str(&node.value);
                continue;
            }
            let annotation = node
                .readings()
                .map(|r| {
                    if pinyin {
                        zhuyin_to_pinyin(r)
                    } else {
                        to_textbook_reading(r)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            composed.push_str(&format!(
                "<ruby>{}<rp>(</rp><rt>{annotation}</rt><rp>)</rp></ruby>",
                node.value
            ));
        }
        self.commit_text(out, composed);
        true
    }

    /// Cycle the node at the cursor through its candidates without opening
    /// the window.
    pub(super) fn handle_inline_candidate_rotation(
        &mut self,
        state: &InputState,
        reverse: bool,
        out: &mut KeyResponse,
    ) -> bool {
        if self.composer.is_empty() && (self.compositor.is_empty() || self.compositor.walked().is_empty()) {
            return false;
        }
        if !matches!(state, InputState::Inputting(_)) {
            if state.is_empty_kind() {
                return false;
            }
            self.fail(out, "rotation outside inputting");
            return true;
        }
        if !self.composer.is_empty() {
            self.fail(out, "rotation mid-reading");
            return true;
        }

        let candidates = self.candidate_list();
        if candidates.is_empty() {
            self.fail(out, "no candidates at cursor");
            return true;
        }

        let location = self.fix_location();
        let mut length = 0;
        let Some(current) = self
            .compositor
            .walked()
            .iter()
            .find(|node| {
                length += node.span_length;
                length >= location
            })
            .cloned()
        else {
            self.fail(out, "no walked node at cursor");
            return true;
        };

        let count = candidates.len();
        let mut index = if current.score < SELECTED_CANDIDATE_SCORE {
            match (candidates[0].value == current.value, reverse) {
                (true, true) => count - 1,
                (true, false) => 1,
                (false, _) => 0,
            }
        } else {
            candidates
                .iter()
                .position(|c| c.value == current.value)
                .map(|i| super::types::cyclic_index(i, if reverse { -1 } else { 1 }, count))
                .unwrap_or(0)
        };
        if index >= count {
            index = 0;
        }

        let chosen = candidates[index].clone();
        self.fix_node(&chosen, false);
        self.emit_inputting(out);
        true
    }
}
