use super::types::{InputState, KeyEvent, KeyResponse};
use super::InputSession;

/// Applies emitted states the way an input-method host does and keeps the
/// text committed to the document.
///
/// `Committing` inserts its text. `Empty` right after a composing state
/// commits that state's buffer; `EmptyIgnoringPreviousState` drops it.
/// Text evicted by overflow control arrives in `Inputting::popped_text` and
/// is committed silently.
pub struct HeadlessClient {
    session: InputSession,
    committed: String,
    shown: InputState,
}

impl HeadlessClient {
    pub fn new(session: InputSession) -> Self {
        let shown = session.state().clone();
        Self {
            session,
            committed: String::new(),
            shown,
        }
    }

    pub fn press(&mut self, event: &KeyEvent) -> KeyResponse {
        let response = self.session.handle_key(event);
        for state in &response.states {
            self.apply(state);
        }
        response
    }

    /// Type each character of `text` as a plain key.
    pub fn type_keys(&mut self, text: &str) -> Vec<KeyResponse> {
        text.chars()
            .map(|c| self.press(&KeyEvent::text(&c.to_string())))
            .collect()
    }

    fn apply(&mut self, state: &InputState) {
        match state {
            InputState::Committing { text } => self.committed.push_str(text),
            InputState::Empty => {
                if matches!(
                    self.shown,
                    InputState::Inputting(_) | InputState::Marking(_) | InputState::ChoosingCandidate(_)
                ) {
                    self.committed.push_str(self.shown.buffer());
                }
            }
            InputState::Inputting(inputting) => self.committed.push_str(&inputting.popped_text),
            _ => {}
        }
        self.shown = state.clone();
    }

    /// Focus loss: whatever is on screen gets committed.
    pub fn commit_composition(&mut self) {
        let response = self.session.commit_composition();
        for state in &response.states {
            self.apply(state);
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn take_committed(&mut self) -> String {
        std::mem::take(&mut self.committed)
    }

    /// Text shown inline as marked text.
    pub fn marked_text(&self) -> &str {
        self.shown.buffer()
    }

    /// Last state applied, `Committing` included.
    pub fn state(&self) -> &InputState {
        &self.shown
    }

    pub fn session(&self) -> &InputSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut InputSession {
        &mut self.session
    }
}
