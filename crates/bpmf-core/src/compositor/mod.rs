//! Composition lattice.
//!
//! Holds the inserted readings and, for every run of up to
//! `max_span_length` readings the language model knows, a `Node` with its
//! candidates. `walk()` picks the best-scoring partition of the whole
//! reading sequence. Every structural change (insert, delete, fix, trim)
//! must be followed by a `walk()` before the walked path is read again.

mod node;

pub use node::Node;

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::lm::LanguageModel;

/// Walk score of a node the user fixed explicitly.
pub const SELECTED_CANDIDATE_SCORE: f64 = 99.0;

/// Joins the readings of a multi-reading key.
pub const SEPARATOR: &str = "-";

/// A node on the walked path, detached from the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkedNode {
    pub start: usize,
    pub span_length: usize,
    pub key: String,
    pub value: String,
    pub score: f64,
}

impl WalkedNode {
    pub fn end(&self) -> usize {
        self.start + self.span_length
    }

    pub fn readings(&self) -> impl Iterator<Item = &str> {
        self.key.split(SEPARATOR)
    }
}

/// A lattice node together with its start position.
#[derive(Debug, Clone, Copy)]
pub struct NodeAnchor<'a> {
    pub start: usize,
    pub node: &'a Node,
}

/// Where `fix_selected_candidate` applied the user's choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAnchor {
    pub start: usize,
    pub span_length: usize,
    /// Model score of the chosen value before fixing.
    pub intrinsic_score: f64,
}

/// Nodes starting at one reading position, keyed by span length.
#[derive(Debug, Clone, Default)]
struct Span {
    nodes: BTreeMap<usize, Node>,
}

pub struct Compositor {
    lm: Arc<dyn LanguageModel>,
    readings: Vec<String>,
    spans: Vec<Span>,
    cursor: usize,
    max_span_length: usize,
    walked: Vec<WalkedNode>,
}

impl Compositor {
    pub fn new(lm: Arc<dyn LanguageModel>, max_span_length: usize) -> Self {
        Self {
            lm,
            readings: Vec::new(),
            spans: Vec::new(),
            cursor: 0,
            max_span_length: max_span_length.max(1),
            walked: Vec::new(),
        }
    }

    pub fn readings(&self) -> &[String] {
        &self.readings
    }

    /// Number of readings.
    pub fn length(&self) -> usize {
        self.readings.len()
    }

    /// Number of span positions. Equal to `length()` here; kept separate
    /// because overflow control is defined on width.
    pub fn width(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to `0..=length()`.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.length());
    }

    pub fn clear(&mut self) {
        self.readings.clear();
        self.spans.clear();
        self.walked.clear();
        self.cursor = 0;
    }

    /// Insert a reading at the cursor and advance the cursor past it.
    /// Refused when the model has no unigrams for the reading.
    pub fn insert_reading_at_cursor(&mut self, reading: &str) -> bool {
        if reading.is_empty() || !self.lm.has_unigrams_for(reading) {
            debug!(reading, "insert refused: unknown reading");
            return false;
        }
        let at = self.cursor;
        self.drop_nodes_crossing(at);
        self.readings.insert(at, reading.to_string());
        self.spans.insert(at, Span::default());
        self.cursor += 1;
        self.build_nodes_around(at);
        true
    }

    /// Backspace semantics: remove the reading behind the cursor.
    pub fn delete_reading_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_reading_at(self.cursor);
        true
    }

    /// Forward-delete semantics: remove the reading in front of the cursor.
    pub fn delete_reading_after_cursor(&mut self) -> bool {
        if self.cursor >= self.length() {
            return false;
        }
        self.remove_reading_at(self.cursor);
        true
    }

    /// Drop `count` readings from the head, shifting the cursor with them.
    pub fn remove_head_readings(&mut self, count: usize) -> bool {
        if count == 0 || count > self.length() {
            return false;
        }
        self.readings.drain(..count);
        self.spans.drain(..count);
        self.cursor = self.cursor.saturating_sub(count);
        true
    }

    fn remove_reading_at(&mut self, at: usize) {
        self.readings.remove(at);
        self.spans.remove(at);
        self.drop_nodes_crossing(at);
        self.build_nodes_around(at);
    }

    /// Remove nodes that start before `location` and extend past it.
    fn drop_nodes_crossing(&mut self, location: usize) {
        let lo = location.saturating_sub(self.max_span_length);
        let hi = location.min(self.spans.len());
        for start in lo..hi {
            self.spans[start]
                .nodes
                .retain(|len, _| start + *len <= location);
        }
    }

    /// Look up every missing window that touches `location`.
    fn build_nodes_around(&mut self, location: usize) {
        let n = self.readings.len();
        let lo = location.saturating_sub(self.max_span_length);
        let hi = location.min(n.saturating_sub(1));
        for start in lo..=hi {
            if start >= n {
                break;
            }
            for len in 1..=self.max_span_length {
                let end = start + len;
                if end > n {
                    break;
                }
                if end < location || self.spans[start].nodes.contains_key(&len) {
                    continue;
                }
                let key = self.readings[start..end].join(SEPARATOR);
                let unigrams = self.lm.unigrams_for(&key);
                if !unigrams.is_empty() {
                    self.spans[start]
                        .nodes
                        .insert(len, Node::new(key, len, unigrams));
                }
            }
        }
    }

    /// Find the best-scoring path through the lattice.
    pub fn walk(&mut self) -> &[WalkedNode] {
        let width = self.spans.len();
        let _span = debug_span!("walk", width).entered();

        // best[i] = (accumulated score, start, span length) of the best path ending at i
        let mut best: Vec<Option<(f64, usize, usize)>> = vec![None; width + 1];
        best[0] = Some((0.0, 0, 0));
        for start in 0..width {
            let Some((acc, _, _)) = best[start] else {
                continue;
            };
            for (len, node) in &self.spans[start].nodes {
                let end = start + len;
                if end > width {
                    continue;
                }
                let score = acc + node.score();
                if best[end].map_or(true, |(b, _, _)| score > b) {
                    best[end] = Some((score, start, *len));
                }
            }
        }

        let mut pos = (0..=width).rev().find(|i| best[*i].is_some()).unwrap_or(0);
        let mut path = Vec::new();
        while pos > 0 {
            let Some((_, start, len)) = best[pos] else {
                break;
            };
            if let Some(node) = self.spans[start].nodes.get(&len) {
                path.push(WalkedNode {
                    start,
                    span_length: len,
                    key: node.key().to_string(),
                    value: node.value().to_string(),
                    score: node.score(),
                });
            }
            pos = start;
        }
        path.reverse();
        debug!(nodes = path.len(), "walked");
        self.walked = path;
        &self.walked
    }

    /// Path from the most recent `walk()`.
    pub fn walked(&self) -> &[WalkedNode] {
        &self.walked
    }

    pub fn nodes_beginning_at(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        self.spans
            .get(location)
            .into_iter()
            .flat_map(|span| span.nodes.values())
            .map(|node| NodeAnchor {
                start: location,
                node,
            })
            .collect()
    }

    pub fn nodes_ending_at(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        if location == 0 || location > self.spans.len() {
            return Vec::new();
        }
        let lo = location.saturating_sub(self.max_span_length);
        (lo..location)
            .filter_map(|start| {
                self.spans[start]
                    .nodes
                    .get(&(location - start))
                    .map(|node| NodeAnchor { start, node })
            })
            .collect()
    }

    /// Every node whose span covers the reading just before `location`.
    pub fn nodes_crossing_or_ending_at(&self, location: usize) -> Vec<NodeAnchor<'_>> {
        if location == 0 || location > self.spans.len() {
            return Vec::new();
        }
        let lo = location.saturating_sub(self.max_span_length);
        (lo..location)
            .flat_map(|start| {
                self.spans[start]
                    .nodes
                    .iter()
                    .filter(move |(len, _)| start + **len >= location)
                    .map(move |(_, node)| NodeAnchor { start, node })
            })
            .collect()
    }

    /// Reset every node crossing or ending at `location`, then fix the node
    /// that starts at `start` and is keyed `key` to `value`. Other nodes
    /// sharing the key stay unfixed.
    pub fn fix_selected_candidate(
        &mut self,
        location: usize,
        start: usize,
        key: &str,
        value: &str,
    ) -> Option<FixedAnchor> {
        self.for_each_node_crossing(location, Node::reset);

        let span_length = key.split(SEPARATOR).count();
        let fixed = self
            .spans
            .get_mut(start)
            .and_then(|span| span.nodes.get_mut(&span_length))
            .filter(|node| node.key() == key)
            .and_then(|node| {
                node.fix(value).then(|| FixedAnchor {
                    start,
                    span_length,
                    intrinsic_score: node.score_for(value),
                })
            });
        if fixed.is_none() {
            debug!(location, start, key, value, "fix found no matching node");
        }
        fixed
    }

    /// Reset every node crossing or ending at `location` and re-weigh the
    /// ones offering `value` with `score`.
    pub fn override_node_score(&mut self, location: usize, value: &str, score: f64) -> bool {
        let mut applied = false;
        self.for_each_node_crossing(location, |node| {
            node.reset();
            applied |= node.weigh(value, score);
        });
        applied
    }

    fn for_each_node_crossing(&mut self, location: usize, mut f: impl FnMut(&mut Node)) {
        if location == 0 || location > self.spans.len() {
            return;
        }
        let lo = location.saturating_sub(self.max_span_length);
        for start in lo..location {
            for (len, node) in self.spans[start].nodes.iter_mut() {
                if start + *len >= location {
                    f(node);
                }
            }
        }
    }

    /// GraphViz rendering of the lattice, for diagnostics.
    pub fn dump_dot(&self) -> String {
        let width = self.spans.len();
        let mut out = String::from("digraph {\ngraph [ rankdir=LR ];\nBOS;\n");
        for (start, span) in self.spans.iter().enumerate() {
            for node in span.nodes.values() {
                let value = node.value();
                let _ = writeln!(out, "{value};");
                if start == 0 {
                    let _ = writeln!(out, "BOS -> {value};");
                }
                let dest = start + node.span_length();
                if dest >= width {
                    let _ = writeln!(out, "{value} -> EOS;");
                } else {
                    for next in self.spans[dest].nodes.values() {
                        let _ = writeln!(out, "{value} -> {};", next.value());
                    }
                }
            }
        }
        out.push_str("EOS;\n}\n");
        out
    }
}
