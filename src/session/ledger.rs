//! Best-score ledger: per game, per difficulty records fed by terminal
//! session transitions. A record is only ever written on strict
//! improvement; losing a run can still set a first baseline.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::store::KvStore;
use super::{Difficulty, GameKind};

/// Store key under which the serialized ledger lives.
pub const LEDGER_KEY: &str = "scores";

/// Best results for one game at one difficulty. Which metrics apply depends
/// on the game: score is higher-is-better, time and moves lower-is-better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub best_score: Option<u32>,
    #[serde(default)]
    pub best_time_ms: Option<u64>,
    #[serde(default)]
    pub best_moves: Option<u32>,
    /// Unix timestamp of the last improvement.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Replace `slot` when `value` is strictly higher (or the first result).
pub fn improve_max_u32(slot: &mut Option<u32>, value: u32) -> bool {
    match *slot {
        Some(best) if value <= best => false,
        _ => {
            *slot = Some(value);
            true
        }
    }
}

/// Replace `slot` when `value` is strictly lower (or the first result).
pub fn improve_min_u32(slot: &mut Option<u32>, value: u32) -> bool {
    match *slot {
        Some(best) if value >= best => false,
        _ => {
            *slot = Some(value);
            true
        }
    }
}

/// Replace `slot` when `value` is strictly lower (or the first result).
pub fn improve_min_u64(slot: &mut Option<u64>, value: u64) -> bool {
    match *slot {
        Some(best) if value >= best => false,
        _ => {
            *slot = Some(value);
            true
        }
    }
}

/// All ledger entries, keyed `"<game>/<difficulty>"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreLedger {
    entries: BTreeMap<String, LedgerEntry>,
}

impl ScoreLedger {
    /// Load the ledger from the store; a missing or malformed record is an
    /// empty ledger.
    pub fn load(store: &impl KvStore) -> Self {
        let Some(blob) = store.get(LEDGER_KEY) else {
            return Self::default();
        };
        match serde_json::from_str(&blob) {
            Ok(ledger) => ledger,
            Err(err) => {
                warn!(%err, "discarding malformed score ledger");
                Self::default()
            }
        }
    }

    /// Write the ledger back to the store.
    pub fn save(&self, store: &mut impl KvStore) {
        match serde_json::to_string(self) {
            Ok(blob) => store.set(LEDGER_KEY, &blob),
            Err(err) => warn!(%err, "score ledger serialization failed"),
        }
    }

    fn key(kind: GameKind, difficulty: Difficulty) -> String {
        format!("{}/{}", kind.id(), difficulty.as_str())
    }

    /// Current entry for a game/difficulty (default when never written).
    pub fn entry(&self, kind: GameKind, difficulty: Difficulty) -> LedgerEntry {
        self.entries
            .get(&Self::key(kind, difficulty))
            .copied()
            .unwrap_or_default()
    }

    /// Offer a result via `record`; stamps the entry and reports whether
    /// anything strictly improved.
    pub fn apply<F>(&mut self, kind: GameKind, difficulty: Difficulty, record: F) -> bool
    where
        F: FnOnce(&mut LedgerEntry) -> bool,
    {
        let entry = self.entries.entry(Self::key(kind, difficulty)).or_default();
        if record(entry) {
            entry.updated_at = Some(Utc::now().timestamp());
            true
        } else {
            false
        }
    }
}
