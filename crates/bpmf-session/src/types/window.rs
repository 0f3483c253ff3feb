use serde::Serialize;

/// Paged candidate list with a highlighted entry.
///
/// Moves that would run past either end fail and leave the window as it
/// was; the caller turns that into the error signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateWindow<T> {
    pub candidates: Vec<T>,
    pub selected: usize,
    pub page_size: usize,
    pub vertical: bool,
}

impl<T> CandidateWindow<T> {
    pub fn new(candidates: Vec<T>, page_size: usize, vertical: bool) -> Self {
        Self {
            candidates,
            selected: 0,
            page_size: page_size.max(1),
            vertical,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn selected_candidate(&self) -> Option<&T> {
        self.candidates.get(self.selected)
    }

    pub fn page_count(&self) -> usize {
        self.len().div_ceil(self.page_size)
    }

    pub fn page_index(&self) -> usize {
        self.selected / self.page_size
    }

    fn page_start(&self) -> usize {
        self.page_index() * self.page_size
    }

    /// Candidates on the page holding the highlight.
    pub fn current_page(&self) -> &[T] {
        let start = self.page_start().min(self.len());
        let end = (start + self.page_size).min(self.len());
        &self.candidates[start..end]
    }

    pub fn highlight_next(&mut self) -> bool {
        if self.selected + 1 >= self.len() {
            return false;
        }
        self.selected += 1;
        true
    }

    pub fn highlight_previous(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        true
    }

    /// Keeps the highlight's offset within the page, clamped to the last
    /// candidate.
    pub fn page_next(&mut self) -> bool {
        if self.page_index() + 1 >= self.page_count() {
            return false;
        }
        self.selected = (self.selected + self.page_size).min(self.len() - 1);
        true
    }

    pub fn page_previous(&mut self) -> bool {
        if self.page_index() == 0 {
            return false;
        }
        self.selected -= self.page_size;
        true
    }

    pub fn highlight_first(&mut self) {
        self.selected = 0;
    }

    pub fn highlight_last(&mut self) {
        self.selected = self.len().saturating_sub(1);
    }

    /// Absolute index picked by typing `label` from `keys`, matched
    /// case-insensitively over the current page.
    pub fn index_for_label(&self, keys: &str, label: &str) -> Option<usize> {
        let mut label_chars = label.chars();
        let c = label_chars.next()?;
        if label_chars.next().is_some() {
            return None;
        }
        let offset = keys
            .chars()
            .position(|k| k.eq_ignore_ascii_case(&c))?;
        if offset >= self.current_page().len() {
            return None;
        }
        Some(self.page_start() + offset)
    }
}
