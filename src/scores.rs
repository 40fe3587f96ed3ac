//! Session leaderboard
//!
//! Tracks the best winning landings of the current session. Kept in memory
//! only; nothing survives a restart.

use serde::{Deserialize, Serialize};

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: f32,
    /// Simulation time (ms) when the landing happened
    pub at_ms: f64,
}

/// Bounded leaderboard, sorted by descending score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScores {
    capacity: usize,
    entries: Vec<ScoreEntry>,
}

impl SessionScores {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: f32) -> bool {
        if score <= 0.0 || self.capacity == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a landing. Returns the rank achieved (1-indexed) if it made the board.
    /// Equal scores rank behind earlier ones.
    pub fn record(&mut self, name: &str, score: f32, at_ms: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry {
            name: name.to_string(),
            score,
            at_ms,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(self.capacity);

        Some(pos + 1)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }
}
