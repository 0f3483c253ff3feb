use tracing::debug;

use super::types::{CandidateWindow, EmacsKey, InputState, KeyEvent, KeyResponse, SymbolTable};
use super::InputSession;

/// Highlight and page moves inside an open candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowMove {
    NextHighlight,
    PrevHighlight,
    NextPage,
    PrevPage,
    First,
    Last,
}

fn apply_move<T>(window: &mut CandidateWindow<T>, mv: WindowMove) -> bool {
    match mv {
        WindowMove::NextHighlight => window.highlight_next(),
        WindowMove::PrevHighlight => window.highlight_previous(),
        WindowMove::NextPage => window.page_next(),
        WindowMove::PrevPage => window.page_previous(),
        WindowMove::First => {
            if window.selected == 0 {
                return false;
            }
            window.highlight_first();
            true
        }
        WindowMove::Last => {
            if window.selected + 1 >= window.len() {
                return false;
            }
            window.highlight_last();
            true
        }
    }
}

/// The state with its window moved, or `None` when the move runs past
/// either end.
fn move_window(state: &InputState, mv: WindowMove) -> Option<InputState> {
    let mut next = state.clone();
    let moved = match &mut next {
        InputState::ChoosingCandidate(s) => apply_move(&mut s.window, mv),
        InputState::AssociatedPhrases(s) => apply_move(&mut s.window, mv),
        InputState::SymbolTable(s) => apply_move(&mut s.window, mv),
        _ => false,
    };
    moved.then_some(next)
}

/// Entry count, selection, orientation and page size of the window a
/// state carries.
fn window_shape(state: &InputState) -> Option<(usize, usize, bool, usize)> {
    let shape = |len, selected, vertical, page_size| Some((len, selected, vertical, page_size));
    match state {
        InputState::ChoosingCandidate(s) => shape(s.window.len(), s.window.selected, s.window.vertical, s.window.page_size),
        InputState::AssociatedPhrases(s) => shape(s.window.len(), s.window.selected, s.window.vertical, s.window.page_size),
        InputState::SymbolTable(s) => shape(s.window.len(), s.window.selected, s.window.vertical, s.window.page_size),
        _ => None,
    }
}

fn index_for_label(state: &InputState, keys: &str, label: &str) -> Option<usize> {
    match state {
        InputState::ChoosingCandidate(s) => s.window.index_for_label(keys, label),
        InputState::AssociatedPhrases(s) => s.window.index_for_label(keys, label),
        InputState::SymbolTable(s) => s.window.index_for_label(keys, label),
        _ => None,
    }
}

/// Absolute index of the first entry on the current page.
fn first_on_page(state: &InputState) -> Option<usize> {
    let (len, selected, _, page_size) = window_shape(state)?;
    (len > 0).then(|| selected / page_size * page_size)
}

impl InputSession {
    /// Keys typed while a candidate window (candidates, associated phrases
    /// or the symbol menu) is open.
    pub(super) fn handle_candidate(&mut self, event: &KeyEvent, state: &InputState, out: &mut KeyResponse) -> bool {
        let Some((len, selected, vertical, _)) = window_shape(state) else {
            return false;
        };
        let m = event.modifiers;
        let emacs = event.emacs_key();
        let is_associates = matches!(state, InputState::AssociatedPhrases(_));

        let cancel = event.is_backspace()
            || event.is_esc()
            || event.is_delete()
            || ((event.is_cursor_backward() || event.is_cursor_forward()) && m.shift);
        if cancel {
            if let InputState::SymbolTable(table) = state {
                if !table.path.is_empty() {
                    let parent = self.symbol_parent(table);
                    self.emit(out, InputState::SymbolTable(parent));
                    return true;
                }
            }
            if is_associates || self.config.use_scpc_typing_mode || self.compositor.is_empty() {
                self.emit(out, InputState::EmptyIgnoringPreviousState);
            } else {
                self.emit_inputting(out);
            }
            return true;
        }

        if event.is_enter() {
            if is_associates {
                self.emit(out, InputState::EmptyIgnoringPreviousState);
                return true;
            }
            return self.select_candidate(state, selected, out);
        }

        let horizontal = !vertical;
        let mv = if event.is_tab() {
            Some(match (self.config.specify_shift_tab_key_behavior, m.shift) {
                (true, true) => WindowMove::PrevPage,
                (true, false) => WindowMove::NextPage,
                (false, true) => WindowMove::PrevHighlight,
                (false, false) => WindowMove::NextHighlight,
            })
        } else if event.is_space() {
            Some(match (self.config.specify_shift_space_key_behavior, m.shift) {
                (true, true) => WindowMove::NextHighlight,
                (true, false) => WindowMove::NextPage,
                (false, true) => WindowMove::NextPage,
                (false, false) => WindowMove::NextHighlight,
            })
        } else if event.is_page_down() || emacs == Some(EmacsKey::NextPage) {
            Some(WindowMove::NextPage)
        } else if event.is_page_up() {
            Some(WindowMove::PrevPage)
        } else if event.is_left() {
            Some(if horizontal { WindowMove::PrevHighlight } else { WindowMove::PrevPage })
        } else if emacs == Some(EmacsKey::Backward) {
            Some(WindowMove::PrevHighlight)
        } else if event.is_right() {
            Some(if horizontal { WindowMove::NextHighlight } else { WindowMove::NextPage })
        } else if emacs == Some(EmacsKey::Forward) {
            Some(WindowMove::NextHighlight)
        } else if event.is_up() {
            Some(if horizontal { WindowMove::PrevPage } else { WindowMove::PrevHighlight })
        } else if event.is_down() {
            Some(if horizontal { WindowMove::NextPage } else { WindowMove::NextHighlight })
        } else if event.is_home() || emacs == Some(EmacsKey::Home) {
            Some(WindowMove::First)
        } else {
            None
        };
        if let Some(mv) = mv {
            self.apply_window_move(state, mv, out);
            return true;
        }

        if len == 0 {
            return false;
        }
        if event.is_end() || emacs == Some(EmacsKey::End) {
            self.apply_window_move(state, WindowMove::Last, out);
            return true;
        }

        if is_associates && !m.shift {
            return false;
        }
        let label = if is_associates {
            &event.text_ignoring_modifiers
        } else {
            &event.text
        };
        if let Some(index) = index_for_label(state, &self.config.candidate_keys, label) {
            return self.select_candidate(state, index, out);
        }
        if is_associates {
            return false;
        }

        if self.config.use_scpc_typing_mode && self.should_auto_select(event) {
            if let Some(first) = first_on_page(state) {
                self.select_candidate(state, first, out);
                self.emit(out, InputState::EmptyIgnoringPreviousState);
                return self.route(event, InputState::EmptyIgnoringPreviousState, out);
            }
            return true;
        }

        self.fail(out, "key not understood by candidate window");
        true
    }

    fn apply_window_move(&mut self, state: &InputState, mv: WindowMove, out: &mut KeyResponse) {
        match move_window(state, mv) {
            Some(next) => out.states.push(next),
            None => self.fail(out, "candidate window move out of range"),
        }
    }

    /// In per-character mode a key that starts new input picks the first
    /// candidate on the page before being processed.
    fn should_auto_select(&self, event: &KeyEvent) -> bool {
        let Some(c) = event.first_char() else {
            return false;
        };
        if self.composer.input_validity_check(c) {
            return true;
        }
        let prefix = self.punctuation_prefix(event);
        let typed = format!("{prefix}{}_{c}", self.config.layout.parser_name());
        let plain = format!("{prefix}{c}");
        if self.lm.has_unigrams_for(&typed) || self.lm.has_unigrams_for(&plain) {
            return true;
        }
        event.is_upper_case_ascii_letter() && self.lm.has_unigrams_for(&format!("_letter_{c}"))
    }

    fn symbol_parent(&self, table: &SymbolTable) -> SymbolTable {
        let parent_path = &table.path[..table.path.len().saturating_sub(1)];
        let mut node = &self.symbol_root;
        for &i in parent_path {
            match node.child(i) {
                Some(child) => node = child,
                None => break,
            }
        }
        SymbolTable::new(
            node.clone(),
            parent_path.to_vec(),
            self.config.page_size(),
            table.window.vertical,
        )
    }

    /// Accept the entry at `index` of the window `state` carries.
    pub(super) fn select_candidate(&mut self, state: &InputState, index: usize, out: &mut KeyResponse) -> bool {
        match state {
            InputState::SymbolTable(table) => {
                let Some(child) = table.node.child(index) else {
                    self.fail(out, "symbol index out of range");
                    return true;
                };
                if child.is_leaf() {
                    self.commit_text(out, child.title.clone());
                } else {
                    let mut path = table.path.clone();
                    path.push(index);
                    let next = SymbolTable::new(child.clone(), path, self.config.page_size(), table.window.vertical);
                    self.emit(out, InputState::SymbolTable(next));
                }
                true
            }
            InputState::ChoosingCandidate(choosing) => {
                let Some(candidate) = choosing.window.candidates.get(index).cloned() else {
                    self.fail(out, "candidate index out of range");
                    return true;
                };
                debug!(key = %candidate.key, value = %candidate.value, "candidate selected");
                self.fix_node(&candidate, true);
                let inputting = self.build_inputting_state();
                if self.config.use_scpc_typing_mode {
                    self.commit_with_associates(out, inputting.buffer, &candidate.value, choosing.window.vertical);
                } else {
                    self.emit(out, InputState::Inputting(inputting));
                }
                true
            }
            InputState::AssociatedPhrases(associates) => {
                let Some(value) = associates.window.candidates.get(index).cloned() else {
                    self.fail(out, "associated phrase index out of range");
                    return true;
                };
                let key = value.chars().last().map(String::from).unwrap_or_default();
                self.commit_with_associates(out, value, &key, associates.window.vertical);
                true
            }
            _ => false,
        }
    }
}
