//! Short-term user override model.
//!
//! Remembers which candidate the user picked in a given trigram context
//! (`(anterior,previous,current)`) and suggests it again later. Confidence
//! decays exponentially with the time since the pick, halving every
//! `decay_constant` seconds. Capacity is bounded with LRU eviction.

mod persistence;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compositor::{WalkedNode, SEPARATOR};
use crate::settings::settings;

const MAGIC: &[u8; 4] = b"BPUO";
const VERSION: u8 = 1;

/// Decayed weights below this are treated as forgotten.
const DECAY_THRESHOLD: f64 = 1.0 / 1_048_576.0;

/// Values that end a clause and therefore carry no context.
const ENDING_PUNCTUATION: [&str; 8] = ["，", "。", "！", "？", "」", "』", "”", "’"];

/// Seconds since the Unix epoch, as used for observation timestamps.
pub fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Override {
    count: u32,
    timestamp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Observation {
    count: u32,
    overrides: HashMap<String, Override>,
}

impl Observation {
    fn update(&mut self, candidate: &str, timestamp: f64) {
        self.count += 1;
        let o = self
            .overrides
            .entry(candidate.to_string())
            .or_insert(Override {
                count: 0,
                timestamp,
            });
        o.count += 1;
        o.timestamp = timestamp;
    }
}

/// A candidate the model recommends for the node at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Reading key of the node the suggestion applies to.
    pub key: String,
    pub value: String,
    pub score: f64,
}

/// Trigram context derived from a walked path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextKey {
    pub trigram: String,
    /// Reading key of the node at the cursor.
    pub current: String,
}

#[derive(Debug)]
pub struct UserOverrideModel {
    capacity: usize,
    decay_exponent: f64,
    /// Keys, most recently used first.
    lru: Vec<String>,
    observations: HashMap<String, Observation>,
}

impl UserOverrideModel {
    pub fn new(capacity: usize, decay_constant: f64) -> Self {
        Self {
            capacity: capacity.max(1),
            decay_exponent: 0.5f64.ln() / decay_constant,
            lru: Vec::new(),
            observations: HashMap::new(),
        }
    }

    pub fn from_settings() -> Self {
        let s = &settings().user_override;
        Self::new(s.capacity, s.decay_constant)
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.lru.clear();
        self.observations.clear();
    }

    /// Record that `candidate` was picked for the node at `cursor`.
    pub fn observe(&mut self, walked: &[WalkedNode], cursor: usize, candidate: &str, timestamp: f64) {
        let Some(key) = context_key(walked, cursor) else {
            return;
        };
        debug!(key = %key.trigram, candidate, "observe");
        self.observations
            .entry(key.trigram.clone())
            .or_default()
            .update(candidate, timestamp);
        self.touch(key.trigram);
    }

    /// Best remembered candidate for the node at `cursor`, if any is still
    /// above the decay threshold.
    pub fn suggest(&self, walked: &[WalkedNode], cursor: usize, timestamp: f64) -> Option<Suggestion> {
        let key = context_key(walked, cursor)?;
        let observation = self.observations.get(&key.trigram)?;
        let best = observation
            .overrides
            .iter()
            .map(|(value, o)| (value, self.score(o, observation.count, timestamp)))
            .filter(|(_, score)| *score > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;
        debug!(key = %key.trigram, value = %best.0, score = best.1, "suggest");
        Some(Suggestion {
            key: key.current,
            value: best.0.clone(),
            score: best.1,
        })
    }

    fn score(&self, o: &Override, total: u32, timestamp: f64) -> f64 {
        let decay = ((timestamp - o.timestamp) * self.decay_exponent).exp();
        if decay < DECAY_THRESHOLD {
            return 0.0;
        }
        o.count as f64 / total.max(1) as f64 * decay
    }

    fn touch(&mut self, key: String) {
        self.lru.retain(|k| *k != key);
        self.lru.insert(0, key);
        while self.lru.len() > self.capacity {
            if let Some(evicted) = self.lru.pop() {
                debug!(key = %evicted, "evicted");
                self.observations.remove(&evicted);
            }
        }
    }
}

fn usable(node: &WalkedNode) -> bool {
    !ENDING_PUNCTUATION.contains(&node.value.as_str())
        && node.key.split(SEPARATOR).count() == node.value.chars().count()
}

/// Build the trigram key for the node at `cursor` on the walked path.
pub fn context_key(walked: &[WalkedNode], cursor: usize) -> Option<ContextKey> {
    let mut length = 0;
    let mut upto = 0;
    for node in walked {
        upto += 1;
        length += node.span_length;
        if length >= cursor {
            break;
        }
    }
    let mut nodes = walked[..upto].iter().rev();
    let current = nodes.next()?;
    if !usable(current) || current.key.contains('_') {
        return None;
    }

    let mut reading_stack = String::new();
    let mut neighbour = |node: Option<&WalkedNode>| match node {
        Some(n) if usable(n) => {
            reading_stack.push_str(&n.key);
            format!("({},{})", n.key, n.value)
        }
        _ => "()".to_string(),
    };
    let previous = neighbour(nodes.next());
    let anterior = neighbour(nodes.next());
    if reading_stack.contains('_') {
        return None;
    }
    Some(ContextKey {
        trigram: format!("({anterior},{previous},{})", current.key),
        current: current.key.clone(),
    })
}
