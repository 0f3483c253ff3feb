use crate::lm::Unigram;

use super::{SELECTED_CANDIDATE_SCORE, SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Override {
    None,
    /// Fixed by the user; scores `SELECTED_CANDIDATE_SCORE`.
    Fixed,
    /// Re-weighted by a suggestion, still replaceable by a walk.
    Weighted(f64),
}

/// One lattice node: a run of readings and the unigrams the model knows for it.
#[derive(Debug, Clone)]
pub struct Node {
    key: String,
    span_length: usize,
    unigrams: Vec<Unigram>,
    selected: usize,
    state: Override,
}

impl Node {
    pub(super) fn new(key: String, span_length: usize, unigrams: Vec<Unigram>) -> Self {
        Self {
            key,
            span_length,
            unigrams,
            selected: 0,
            state: Override::None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn readings(&self) -> impl Iterator<Item = &str> {
        self.key.split(SEPARATOR)
    }

    pub fn span_length(&self) -> usize {
        self.span_length
    }

    pub fn candidates(&self) -> &[Unigram] {
        &self.unigrams
    }

    pub fn value(&self) -> &str {
        self.unigrams
            .get(self.selected)
            .map(|u| u.value.as_str())
            .unwrap_or_default()
    }

    /// Score used by the walk.
    pub fn score(&self) -> f64 {
        match self.state {
            Override::None => self.unigrams.get(self.selected).map_or(0.0, |u| u.score),
            Override::Fixed => SELECTED_CANDIDATE_SCORE,
            Override::Weighted(score) => score,
        }
    }

    #[cfg(test)]
    pub(super) fn is_fixed(&self) -> bool {
        self.state == Override::Fixed
    }

    #[cfg(test)]
    pub(super) fn is_overridden(&self) -> bool {
        self.state != Override::None
    }

    /// Intrinsic model score of `value`, zero when this node lacks it.
    pub fn score_for(&self, value: &str) -> f64 {
        self.unigrams
            .iter()
            .find(|u| u.value == value)
            .map_or(0.0, |u| u.score)
    }

    pub fn highest_unigram_score(&self) -> f64 {
        self.unigrams.first().map_or(0.0, |u| u.score)
    }

    pub(super) fn reset(&mut self) {
        self.selected = 0;
        self.state = Override::None;
    }

    pub(super) fn fix(&mut self, value: &str) -> bool {
        self.select(value, Override::Fixed)
    }

    pub(super) fn weigh(&mut self, value: &str, score: f64) -> bool {
        self.select(value, Override::Weighted(score))
    }

    fn select(&mut self, value: &str, state: Override) -> bool {
        match self.unigrams.iter().position(|u| u.value == value) {
            Some(idx) => {
                self.selected = idx;
                self.state = state;
                true
            }
            None => false,
        }
    }
}
