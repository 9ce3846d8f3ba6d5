//! Salience memory — the bounded working memory shared by all agents.
//!
//! Entries are kept in insertion order and carry a heuristic importance
//! score. When the store grows past its capacity, the least salient entries
//! are dropped first, so important context survives regardless of age.
//!
//! Every mutation goes through a single write lock; agents running in
//! parallel may read a slightly stale view for prompt building, but the
//! capacity bound holds after every call returns.

use chrono::{DateTime, Utc};
use neuroqueue_core::error::MemoryError;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Salience assigned to every entry when scoring is disabled.
pub const NEUTRAL_SALIENCE: f32 = 0.5;

const BASE_SALIENCE: f32 = 0.3;
const KEYWORD_BONUS: f32 = 0.1;
const LENGTH_BONUS_MAX: f32 = 0.2;
const LENGTH_SATURATION_CHARS: f32 = 500.0;

const SALIENCE_KEYWORDS: &[&str] = &[
    "important",
    "critical",
    "key",
    "essential",
    "significant",
    "crucial",
    "vital",
];

// ── Data Structures ───────────────────────────────────────────────────────

/// A single remembered item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEntry {
    pub timestamp: DateTime<Utc>,
    pub role: String,
    pub text: String,
    pub salience: f32,

    /// Insertion order; breaks timestamp ties.
    #[serde(skip)]
    seq: u64,
}

impl MemoryEntry {
    /// Build an entry with an explicit timestamp, for use with
    /// [`SalienceMemory::insert_entry`].
    pub fn new(
        timestamp: DateTime<Utc>,
        role: impl Into<String>,
        text: impl Into<String>,
        salience: f32,
    ) -> Self {
        Self {
            timestamp,
            role: role.into(),
            text: text.into(),
            salience: salience.clamp(0.0, 1.0),
            seq: 0,
        }
    }
}

struct MemoryState {
    entries: Vec<MemoryEntry>,
    capacity: usize,
    next_seq: u64,
}

/// Bounded, salience-weighted memory shared by reference across agents.
pub struct SalienceMemory {
    salience_enabled: bool,
    state: RwLock<MemoryState>,
}

// ── Scoring ───────────────────────────────────────────────────────────────

/// Heuristic importance of `text` in `[0, 1]`.
///
/// `0.3` base, `+0.1` per distinct keyword found (case-insensitive
/// substring), and up to `+0.2` scaled by length saturating at 500 chars.
pub fn score_salience(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let keyword_hits = SALIENCE_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count() as f32;
    let length_score = (text.chars().count() as f32 / LENGTH_SATURATION_CHARS).min(1.0);

    (BASE_SALIENCE + keyword_hits * KEYWORD_BONUS + length_score * LENGTH_BONUS_MAX)
        .clamp(0.0, 1.0)
}

// ── Implementation ────────────────────────────────────────────────────────

impl SalienceMemory {
    /// Create an empty memory. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize, salience_enabled: bool) -> Self {
        Self {
            salience_enabled,
            state: RwLock::new(MemoryState {
                entries: Vec::new(),
                capacity: capacity.max(1),
                next_seq: 0,
            }),
        }
    }

    pub fn salience_enabled(&self) -> bool {
        self.salience_enabled
    }

    pub async fn capacity(&self) -> usize {
        self.state.read().await.capacity
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Salience for `text` under this memory's settings.
    pub fn compute_salience(&self, text: &str) -> f32 {
        if self.salience_enabled {
            score_salience(text)
        } else {
            NEUTRAL_SALIENCE
        }
    }

    /// Record `text` under `role`, scoring it unless `salience` is given.
    ///
    /// Returns the salience that was stored.
    pub async fn add_item(&self, role: &str, text: &str, salience: Option<f32>) -> f32 {
        let salience = salience
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or_else(|| self.compute_salience(text));

        self.insert_entry(MemoryEntry::new(Utc::now(), role, text, salience))
            .await;
        salience
    }

    /// Store a pre-built entry, keeping its timestamp.
    pub async fn insert_entry(&self, mut entry: MemoryEntry) {
        let mut state = self.state.write().await;
        entry.seq = state.next_seq;
        state.next_seq += 1;
        state.entries.push(entry);

        if state.entries.len() > state.capacity {
            let capacity = state.capacity;
            self.trim_to(&mut state, capacity);
        }
    }

    /// Entries rendered as `"{role}: {text}"`, oldest first, separated by
    /// blank lines.
    pub async fn context_text(&self) -> String {
        self.items()
            .await
            .iter()
            .map(|e| format!("{}: {}", e.role, e.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Entries in ascending timestamp order.
    pub async fn items(&self) -> Vec<MemoryEntry> {
        let mut items = self.state.read().await.entries.clone();
        sort_chronologically(&mut items);
        items
    }

    /// Change the capacity, keeping the most important entries if the store
    /// must shrink.
    pub async fn resize(&self, capacity: usize) -> Result<(), MemoryError> {
        if capacity == 0 {
            return Err(MemoryError::InvalidCapacity(capacity));
        }
        let mut state = self.state.write().await;
        state.capacity = capacity;
        if state.entries.len() > capacity {
            self.trim_to(&mut state, capacity);
        }
        Ok(())
    }

    /// Remove every entry; capacity is unchanged.
    pub async fn clear(&self) {
        self.state.write().await.entries.clear();
    }

    /// Pretty-printed JSON array of the entries, oldest first.
    pub async fn export(&self) -> Result<String, MemoryError> {
        let items = self.items().await;
        serde_json::to_string_pretty(&items).map_err(|e| MemoryError::Export(e.to_string()))
    }

    /// Drop entries until `capacity` remain.
    ///
    /// With salience enabled the lowest-salience entries go first (older
    /// before newer on ties); otherwise the oldest go first.
    fn trim_to(&self, state: &mut MemoryState, capacity: usize) {
        let excess = state.entries.len().saturating_sub(capacity);
        if excess == 0 {
            return;
        }

        let mut ranked: Vec<&MemoryEntry> = state.entries.iter().collect();
        sort_chronologically(&mut ranked);
        if self.salience_enabled {
            // Stable: chronological order survives among equal salience.
            ranked.sort_by(|a, b| a.salience.total_cmp(&b.salience));
        }
        let doomed: Vec<u64> = ranked.iter().take(excess).map(|e| e.seq).collect();

        state.entries.retain(|e| !doomed.contains(&e.seq));
        debug!(
            evicted = excess,
            remaining = state.entries.len(),
            salience = self.salience_enabled,
            "Memory trimmed to capacity"
        );
    }
}

fn sort_chronologically<E: std::borrow::Borrow<MemoryEntry>>(entries: &mut [E]) {
    entries.sort_by(|a, b| {
        let (a, b) = (a.borrow(), b.borrow());
        a.timestamp.cmp(&b.timestamp).then(a.seq.cmp(&b.seq))
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────
