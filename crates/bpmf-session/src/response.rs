use std::sync::PoisonError;

use tracing::debug;

use bpmf_core::compositor::{NodeAnchor, SELECTED_CANDIDATE_SCORE};
use bpmf_core::lm::SYMBOL_SCORE_FLOOR;
use bpmf_core::user_override::now_epoch;

use super::types::{
    AssociatedPhrases, Candidate, CandidateWindow, ChoosingCandidate, InputState, Inputting,
};
use super::InputSession;

impl InputSession {
    /// Lattice position the candidate window is anchored on.
    pub(super) fn actual_candidate_cursor(&self) -> usize {
        let cursor = self.compositor.cursor();
        if self.config.use_rear_cursor_mode {
            cursor.min(self.compositor.length().saturating_sub(1))
        } else {
            cursor.max(1)
        }
    }

    /// Location handed to fix/override calls; rear mode fixes the reading
    /// in front of the cursor.
    pub(super) fn fix_location(&self) -> usize {
        let rear = usize::from(self.config.use_rear_cursor_mode);
        (self.actual_candidate_cursor() + rear).min(self.compositor.length())
    }

    pub(super) fn raw_nodes(&self) -> Vec<NodeAnchor<'_>> {
        let at = self.actual_candidate_cursor();
        if self.config.use_rear_cursor_mode {
            self.compositor.nodes_beginning_at(at)
        } else {
            self.compositor.nodes_ending_at(at)
        }
    }

    /// Candidates at the cursor, longest spans first.
    pub(super) fn candidate_list(&self) -> Vec<Candidate> {
        let mut nodes = self.raw_nodes();
        nodes.sort_by(|a, b| b.node.span_length().cmp(&a.node.span_length()));
        nodes
            .iter()
            .flat_map(|anchor| {
                anchor
                    .node
                    .candidates()
                    .iter()
                    .map(|u| Candidate::new(anchor.start, anchor.node.key(), u.value.as_str()))
            })
            .collect()
    }

    pub(super) fn build_candidate_state(&self, state: &InputState, vertical: bool) -> ChoosingCandidate {
        ChoosingCandidate {
            buffer: state.buffer().to_string(),
            cursor: state.cursor(),
            window: CandidateWindow::new(self.candidate_list(), self.config.page_size(), vertical),
        }
    }

    /// `None` when the model offers nothing after `key`.
    pub(super) fn build_associated_phrases(&self, key: &str, vertical: bool) -> Option<AssociatedPhrases> {
        let phrases = self.lm.associated_phrases_for(key);
        if phrases.is_empty() {
            return None;
        }
        Some(AssociatedPhrases {
            key: key.to_string(),
            window: CandidateWindow::new(phrases, self.config.page_size(), vertical),
        })
    }

    /// Render the walked path with the pending reading spliced in at the
    /// cursor.
    pub(super) fn build_inputting_state(&self) -> Inputting {
        let cursor = self.compositor.cursor();
        let readings = self.compositor.readings();

        let mut buffer = String::new();
        let mut display_cursor = 0;
        let mut reading_cursor = 0;
        let mut front: Option<&str> = None;
        let mut rear: Option<&str> = None;

        for node in self.compositor.walked() {
            let chars = node.value.chars().count();
            buffer.push_str(&node.value);
            if reading_cursor + node.span_length <= cursor {
                display_cursor += chars;
                reading_cursor += node.span_length;
            } else if chars == node.span_length {
                let step = cursor.saturating_sub(reading_cursor);
                display_cursor += step;
                reading_cursor += step;
            } else if reading_cursor < cursor {
                // The value cannot be split per reading, so the cursor is
                // drawn after it and the tooltip says where it really is.
                display_cursor += chars;
                reading_cursor = (reading_cursor + node.span_length).min(cursor);
                if cursor >= readings.len() {
                    front = readings.last().map(String::as_str);
                } else {
                    front = Some(readings[cursor - 1].as_str());
                    rear = Some(readings[cursor].as_str());
                }
            }
        }

        let pending = self.composer.inline_display();
        let head: String = buffer.chars().take(display_cursor).collect();
        let tail: String = buffer.chars().skip(display_cursor).collect();
        let composed: String = format!("{head}{pending}{tail}")
            .chars()
            .filter(|c| !c.is_ascii_control())
            .collect();

        let tooltip = match (front, rear) {
            (None, None) => String::new(),
            (None, Some(b)) => format!("Cursor is to the rear of \"{b}\"."),
            (Some(a), None) => format!("Cursor is in front of \"{a}\"."),
            (Some(a), Some(b)) => format!("Cursor is between \"{a}\" and \"{b}\"."),
        };

        Inputting {
            buffer: composed,
            cursor: display_cursor + pending.chars().count(),
            popped_text: String::new(),
            tooltip,
        }
    }

    /// Evict the head span while the lattice is wider than allowed, then
    /// walk. Returns the evicted text.
    pub(super) fn pop_overflow_and_walk(&mut self) -> String {
        let mut popped = String::new();
        if self.compositor.width() > self.config.composing_buffer_size {
            if let Some(head) = self.compositor.walked().first() {
                popped = head.value.clone();
                let span = head.span_length;
                self.compositor.remove_head_readings(span);
            }
        }
        self.walk();
        popped
    }

    pub(super) fn walk(&mut self) {
        self.compositor.walk();
    }

    /// Fix `candidate` at the cursor, teach the override model, and walk.
    /// With `respect_cursor_pushing` the cursor jumps past the fixed node
    /// when the preference asks for it.
    pub(super) fn fix_node(&mut self, candidate: &Candidate, respect_cursor_pushing: bool) {
        let location = self.fix_location();
        let before = self.compositor.walked().to_vec();
        let Some(anchor) = self.compositor.fix_selected_candidate(
            location,
            candidate.start,
            &candidate.key,
            &candidate.value,
        ) else {
            self.walk();
            return;
        };

        let learnable = !self.config.use_scpc_typing_mode
            && self.config.user_override_enabled
            && anchor.span_length == candidate.value.chars().count()
            && anchor.intrinsic_score > SYMBOL_SCORE_FLOOR;
        if learnable {
            if let Some(uom) = &self.uom {
                uom.write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .observe(&before, location, &candidate.value, now_epoch());
                debug!(value = %candidate.value, location, "override observed");
            }
        }
        self.walk();

        if respect_cursor_pushing && self.config.move_cursor_after_selecting_candidate {
            let mut next = 0;
            for node in self.compositor.walked() {
                next += node.span_length;
                if next >= location {
                    break;
                }
            }
            if next <= self.compositor.length() {
                self.compositor.set_cursor(next);
            }
        }
    }

    /// Raise the walk score of whatever the override model recalls for the
    /// current context.
    pub(super) fn apply_override_suggestion(&mut self) {
        if self.config.use_scpc_typing_mode || !self.config.user_override_enabled {
            return;
        }
        let Some(uom) = &self.uom else {
            return;
        };
        let suggestion = uom.read().unwrap_or_else(PoisonError::into_inner).suggest(
            self.compositor.walked(),
            self.compositor.cursor(),
            now_epoch(),
        );
        let Some(suggestion) = suggestion else {
            return;
        };
        let location = self.fix_location();
        let covering_span = self
            .compositor
            .walked()
            .iter()
            .scan(0, |end, node| {
                *end += node.span_length;
                Some((*end, node.span_length))
            })
            .find(|(end, _)| *end >= location)
            .map_or(0, |(_, span)| span);
        let suggested_span = self
            .compositor
            .nodes_crossing_or_ending_at(location)
            .iter()
            .filter(|anchor| {
                anchor
                    .node
                    .candidates()
                    .iter()
                    .any(|u| u.value == suggestion.value)
            })
            .map(|anchor| anchor.node.span_length())
            .min();

        // A shorter node can only surface over the phrase covering it with a
        // score no walk will outbid.
        let score = match suggested_span {
            Some(span) if span < covering_span => SELECTED_CANDIDATE_SCORE,
            _ => {
                let highest = self
                    .raw_nodes()
                    .iter()
                    .map(|anchor| anchor.node.highest_unigram_score())
                    .fold(0.0_f64, f64::max);
                highest + 1e-6
            }
        };
        if self
            .compositor
            .override_node_score(location, &suggestion.value, score)
        {
            debug!(value = %suggestion.value, "override suggestion applied");
        }
        self.walk();
    }
}
