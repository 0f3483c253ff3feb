use std::ops::Range;

use serde::Serialize;

use bpmf_core::compositor::SEPARATOR;
use bpmf_core::lm::{LanguageModel, UserPhrase};
use bpmf_core::phonetic::{to_textbook_reading, zhuyin_to_pinyin};
use bpmf_core::symbols::SymbolNode;

use super::CandidateWindow;
use crate::SessionConfig;

/// A candidate offered for the span at the cursor: the reading key it
/// covers and the text it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Lattice position of the node offering this candidate.
    pub start: usize,
    pub key: String,
    pub value: String,
}

impl Candidate {
    pub fn new(start: usize, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            start,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Composition state handed to the host. Every transition builds a new
/// value; nothing is mutated in place once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum InputState {
    Deactivated,
    Empty,
    /// Like `Empty`, but the host must drop the previous buffer instead of
    /// committing it.
    EmptyIgnoringPreviousState,
    Committing {
        text: String,
    },
    Inputting(Inputting),
    Marking(Marking),
    ChoosingCandidate(ChoosingCandidate),
    AssociatedPhrases(AssociatedPhrases),
    SymbolTable(SymbolTable),
}

impl InputState {
    /// States that carry a composing buffer.
    pub fn is_not_empty(&self) -> bool {
        matches!(
            self,
            Self::Inputting(_) | Self::Marking(_) | Self::ChoosingCandidate(_) | Self::SymbolTable(_)
        )
    }

    pub fn is_empty_kind(&self) -> bool {
        matches!(self, Self::Empty | Self::EmptyIgnoringPreviousState)
    }

    /// A non-empty composing buffer is on screen.
    pub fn has_composition(&self) -> bool {
        self.is_not_empty() && !self.buffer().is_empty()
    }

    pub fn is_candidate_container(&self) -> bool {
        matches!(
            self,
            Self::ChoosingCandidate(_) | Self::AssociatedPhrases(_) | Self::SymbolTable(_)
        )
    }

    pub fn buffer(&self) -> &str {
        match self {
            Self::Inputting(s) => &s.buffer,
            Self::Marking(s) => &s.buffer,
            Self::ChoosingCandidate(s) => &s.buffer,
            _ => "",
        }
    }

    pub fn cursor(&self) -> usize {
        match self {
            Self::Inputting(s) => s.cursor,
            Self::Marking(s) => s.cursor,
            Self::ChoosingCandidate(s) => s.cursor,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Deactivated => "Deactivated",
            Self::Empty => "Empty",
            Self::EmptyIgnoringPreviousState => "EmptyIgnoringPreviousState",
            Self::Committing { .. } => "Committing",
            Self::Inputting(_) => "Inputting",
            Self::Marking(_) => "Marking",
            Self::ChoosingCandidate(_) => "ChoosingCandidate",
            Self::AssociatedPhrases(_) => "AssociatedPhrases",
            Self::SymbolTable(_) => "SymbolTable",
        }
    }
}

/// Free typing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inputting {
    pub buffer: String,
    /// In characters.
    pub cursor: usize,
    /// Text evicted from the head of the lattice by this keystroke; the
    /// host commits it silently.
    pub popped_text: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoosingCandidate {
    pub buffer: String,
    pub cursor: usize,
    pub window: CandidateWindow<Candidate>,
}

/// Continuations offered after a commit, independent of any buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociatedPhrases {
    /// Text the phrases continue from.
    pub key: String,
    pub window: CandidateWindow<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolTable {
    pub title: String,
    #[serde(skip_serializing)]
    pub node: SymbolNode,
    /// Child indices from the root down to `node`.
    pub path: Vec<usize>,
    pub window: CandidateWindow<String>,
}

impl SymbolTable {
    pub fn new(node: SymbolNode, path: Vec<usize>, page_size: usize, vertical: bool) -> Self {
        let window = CandidateWindow::new(node.child_titles(), page_size, vertical);
        Self {
            title: node.title.clone(),
            node,
            path,
            window,
        }
    }
}

/// Shift-selection of a span to learn as a user phrase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marking {
    pub buffer: String,
    pub cursor: usize,
    /// The end of the range opposite the live cursor.
    pub marker: usize,
    /// In characters; `min(cursor, marker)..max(cursor, marker)`.
    pub marked_range: Range<usize>,
    pub readings: Vec<String>,
    pub target_exists: bool,
    pub tooltip: String,
    /// Tooltip restored when the mode falls back to `Inputting`.
    #[serde(skip_serializing)]
    pub tooltip_for_inputting: String,
    #[serde(skip_serializing)]
    min_length: usize,
    #[serde(skip_serializing)]
    max_length: usize,
}

impl Marking {
    pub fn new(
        buffer: String,
        cursor: usize,
        marker: usize,
        readings: Vec<String>,
        config: &SessionConfig,
        lm: &dyn LanguageModel,
    ) -> Self {
        let mut state = Self {
            marked_range: cursor.min(marker)..cursor.max(marker),
            buffer,
            cursor,
            marker,
            readings,
            target_exists: false,
            tooltip: String::new(),
            tooltip_for_inputting: String::new(),
            min_length: config.min_mark_length,
            max_length: config.max_mark_length,
        };
        state.target_exists = state.length_in_bounds() && !state.count_mismatch() && {
            let phrase = state.user_phrase();
            lm.user_phrase_exists(&phrase.key, &phrase.value)
        };
        state.tooltip = state.compute_tooltip(config);
        state
    }

    /// Buffer characters and readings no longer line up one to one, which
    /// happens once punctuation or symbols enter the buffer.
    pub fn count_mismatch(&self) -> bool {
        self.buffer.chars().count() != self.readings.len()
    }

    fn length_in_bounds(&self) -> bool {
        (self.min_length..=self.max_length).contains(&self.marked_range.len())
    }

    pub fn marked_text(&self) -> String {
        self.buffer
            .chars()
            .skip(self.marked_range.start)
            .take(self.marked_range.len())
            .collect()
    }

    pub fn user_phrase(&self) -> UserPhrase {
        let end = self.marked_range.end.min(self.readings.len());
        let start = self.marked_range.start.min(end);
        UserPhrase {
            key: self.readings[start..end].join(SEPARATOR),
            value: self.marked_text(),
        }
    }

    /// Whether Enter (or an exclusion when `exclude`) may write the phrase.
    pub fn valid_to_write(&self, exclude: bool) -> bool {
        if self.count_mismatch() || (exclude && !self.target_exists) {
            return false;
        }
        self.length_in_bounds()
    }

    /// An existing target of valid length can be excluded.
    pub fn is_filterable(&self) -> bool {
        self.target_exists && self.length_in_bounds()
    }

    pub fn converted_to_inputting(&self) -> Inputting {
        Inputting {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
            popped_text: String::new(),
            tooltip: self.tooltip_for_inputting.clone(),
        }
    }

    fn reading_thread(&self, pinyin: bool) -> String {
        let end = self.marked_range.end.min(self.readings.len());
        let start = self.marked_range.start.min(end);
        self.readings[start..end]
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| {
                if r.contains('_') {
                    "??".to_string()
                } else if pinyin {
                    zhuyin_to_pinyin(r)
                } else {
                    to_textbook_reading(r)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn compute_tooltip(&self, config: &SessionConfig) -> String {
        if self.count_mismatch() {
            return "⚠︎ Unhandlable: Chars and Readings in buffer doesn't match.".to_string();
        }
        if config.phrase_replacement_enabled {
            return "⚠︎ Phrase replacement mode enabled, interfering user phrase entry."
                .to_string();
        }
        if self.marked_range.is_empty() {
            return String::new();
        }
        let text = self.marked_text();
        let len = self.marked_range.len();
        let prompt = if len < self.min_length {
            format!("\"{text}\" length must ≥ {} for a user phrase.", self.min_length)
        } else if len > self.max_length {
            format!("\"{text}\" length should ≤ {} for a user phrase.", self.max_length)
        } else if self.target_exists {
            format!("\"{text}\" already exists: ENTER to boost, BackSpace or Delete key to exclude.")
        } else {
            format!("\"{text}\" selected. ENTER to add user phrase.")
        };
        format!(
            "{prompt}\n//  {}",
            self.reading_thread(config.inline_dump_pinyin_in_lieu_of_zhuyin)
        )
    }
}
