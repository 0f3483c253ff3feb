//! Language model interface consumed by the lattice and the session.
//!
//! Keys are readings joined by `-` (`ㄋㄧˇ-ㄏㄠˇ`); punctuation, letter and
//! symbol tables live in the same key space under `_`-prefixed keys.

mod lexicon;

pub use lexicon::{Lexicon, LexiconError};

/// Score given to symbol-table entries. Candidates at or below this score
/// are never learned by the user override model.
pub const SYMBOL_SCORE_FLOOR: f64 = -12.0;

/// Score given to user-added phrases so they outrank system entries.
pub const USER_PHRASE_SCORE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Unigram {
    pub value: String,
    /// Log probability; higher is better.
    pub score: f64,
}

impl Unigram {
    pub fn new(value: impl Into<String>, score: f64) -> Self {
        Self {
            value: value.into(),
            score,
        }
    }
}

/// A phrase learned from marking mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPhrase {
    /// Readings joined by `-`.
    pub key: String,
    pub value: String,
}

impl std::fmt::Display for UserPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.key)
    }
}

pub trait LanguageModel: Send + Sync {
    /// Unigrams for `key`, best score first.
    fn unigrams_for(&self, key: &str) -> Vec<Unigram>;

    fn has_unigrams_for(&self, key: &str) -> bool {
        !self.unigrams_for(key).is_empty()
    }

    /// Continuations offered after `key` has been committed.
    fn associated_phrases_for(&self, key: &str) -> Vec<String>;

    fn user_phrase_exists(&self, key: &str, value: &str) -> bool;

    /// Add (or boost) a phrase, or exclude it when `exclude` is set.
    /// Returns false when the model refuses the write.
    fn write_user_phrase(&self, phrase: &UserPhrase, exclude: bool) -> bool;
}
