//! Action history with incremental hashing and a shared transposition table.
//!
//! # Hashing
//!
//! ```text
//! hash = key[a1] ^ key[a2] ^ ... ^ key[an]
//! ```
//!
//! One pseudo-random 64-bit key per cell index, drawn from a seeded
//! xoshiro stream. The seed belongs to the table, so every history sharing a
//! table hashes identically and persisted tables stay valid across runs.
//! Different orderings of the same action indices collide on purpose: they
//! are merged as transpositions.
//!
//! # Merge Policy
//!
//! Per hash: `visits` is summed, `score` keeps the best cumulative score seen
//! reaching the state, `value` is summed from `record_value` calls made by
//! search policies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use log::trace;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{Result, SameGameError};
use crate::Action;

/// Seed used by the process-wide table.
pub const DEFAULT_KEY_SEED: u64 = 0x5A3E_6A3E_0000_0001;

/// Number of independently locked shards.
const SHARDS: usize = 16;

/// Aggregated statistics for one hash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranspositionEntry {
    pub score: f64,
    pub value: f64,
    pub visits: u32,
}

/// Hash -> entry map shared between histories.
///
/// Each shard is guarded by its own lock, so any single-hash update is atomic.
pub struct TranspositionTable {
    seed: u64,
    shards: Vec<Mutex<HashMap<u64, TranspositionEntry>>>,
}

static GLOBAL: OnceLock<Arc<TranspositionTable>> = OnceLock::new();

impl TranspositionTable {
    pub fn new() -> TranspositionTable {
        TranspositionTable::with_seed(DEFAULT_KEY_SEED)
    }

    /// Create a table whose histories derive their keys from `seed`.
    pub fn with_seed(seed: u64) -> TranspositionTable {
        TranspositionTable {
            seed,
            shards: (0..SHARDS).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    /// The process-wide table, created on first use and never reset implicitly.
    pub fn global() -> Arc<TranspositionTable> {
        GLOBAL
            .get_or_init(|| Arc::new(TranspositionTable::new()))
            .clone()
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn shard(&self, hash: u64) -> MutexGuard<'_, HashMap<u64, TranspositionEntry>> {
        let idx = (hash as usize) % SHARDS;
        self.shards[idx]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, hash: u64) -> Option<TranspositionEntry> {
        self.shard(hash).get(&hash).copied()
    }

    pub fn contains(&self, hash: u64) -> bool {
        self.shard(hash).contains_key(&hash)
    }

    /// Apply `f` to the entry for `hash`, creating a zeroed entry first if needed.
    pub fn update<F>(&self, hash: u64, f: F) -> TranspositionEntry
    where
        F: FnOnce(&mut TranspositionEntry),
    {
        let mut shard = self.shard(hash);
        let entry = shard.entry(hash).or_default();
        f(entry);
        *entry
    }

    /// Record that a sequence with cumulative `score` reached `hash`.
    pub fn visit(&self, hash: u64, score: f64) -> TranspositionEntry {
        self.update(hash, |entry| {
            let first = entry.visits == 0;
            entry.visits = entry.visits.saturating_add(1);
            if first || score > entry.score {
                entry.score = score;
            }
        })
    }

    /// Accumulate a search value for `hash`.
    pub fn record_value(&self, hash: u64, value: f64) -> TranspositionEntry {
        self.update(hash, |entry| entry.value += value)
    }

    /// Overwrite the entry for `hash`. Used when restoring a snapshot.
    pub fn insert(&self, hash: u64, entry: TranspositionEntry) {
        self.shard(hash).insert(hash, entry);
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(|p| p.into_inner()).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry, in no particular order.
    pub fn snapshot(&self) -> Vec<(u64, TranspositionEntry)> {
        let mut entries = Vec::new();
        for shard in &self.shards {
            let shard = shard.lock().unwrap_or_else(|p| p.into_inner());
            entries.extend(shard.iter().map(|(&k, &v)| (k, v)));
        }
        entries
    }

    /// Drop every entry. Only ever called explicitly.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().unwrap_or_else(|p| p.into_inner()).clear();
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("seed", &self.seed)
            .field("len", &self.len())
            .finish()
    }
}

/// Generate one key per cell index from `seed`.
pub fn zobrist_keys(cells: usize, seed: u64) -> Vec<u64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..cells).map(|_| rng.random::<u64>()).collect()
}

/// Stack of applied actions with running hash and score.
#[derive(Debug)]
pub struct ActionHistory {
    table: Arc<TranspositionTable>,
    keys: Vec<u64>,
    actions: Vec<Action>,
    /// Cumulative score after each action.
    totals: Vec<f64>,
    hash: u64,
}

impl ActionHistory {
    /// History over boards of `cells` cells backed by `table`.
    pub fn new(table: Arc<TranspositionTable>, cells: usize) -> ActionHistory {
        let keys = zobrist_keys(cells, table.seed());
        ActionHistory {
            table,
            keys,
            actions: Vec::new(),
            totals: Vec::new(),
            hash: 0,
        }
    }

    /// History for `board` backed by the process-wide table.
    pub fn for_board(board: &Board) -> ActionHistory {
        ActionHistory::new(TranspositionTable::global(), board.cell_count())
    }

    /// Score, apply and record `action`.
    ///
    /// Returns the action's own score. An invalid action leaves both the
    /// history and the board untouched.
    pub fn add(&mut self, board: &mut Board, action: Action) -> Result<f64> {
        if !board.is_valid(action) || action.index >= self.keys.len() {
            return Err(SameGameError::InvalidMove {
                index: action.index,
            });
        }

        self.actions.push(action);
        self.hash ^= self.keys[action.index];

        let score = board.score(action);
        let total = self.score() + score;
        self.totals.push(total);

        board.apply(action)?;

        let entry = self.table.visit(self.hash, total);
        trace!(
            "history +{} hash={:016x} total={} visits={}",
            action.index,
            self.hash,
            total,
            entry.visits
        );
        Ok(score)
    }

    /// Pop the last action from the bookkeeping. The board is not replayed.
    pub fn remove(&mut self) -> Option<Action> {
        let action = self.actions.pop()?;
        self.hash ^= self.keys[action.index];
        self.totals.pop();
        Some(action)
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Cumulative score of the recorded actions.
    #[inline]
    pub fn score(&self) -> f64 {
        self.totals.last().copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Table entry for the current hash.
    pub fn entry(&self) -> Option<TranspositionEntry> {
        self.table.get(self.hash)
    }

    pub fn table(&self) -> &Arc<TranspositionTable> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_table() -> Arc<TranspositionTable> {
        Arc::new(TranspositionTable::with_seed(7))
    }

    fn sample_board() -> Board {
        Board::parse(3, 3, "1 2 2\n1 1 2\n3 3 2\n").unwrap()
    }

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(zobrist_keys(10, 42), zobrist_keys(10, 42));
        assert_ne!(zobrist_keys(10, 42), zobrist_keys(10, 43));
        // A longer stream extends a shorter one.
        assert_eq!(zobrist_keys(20, 42)[..10], zobrist_keys(10, 42)[..]);
    }

    #[test]
    fn test_add_updates_hash_score_and_board() {
        let table = fresh_table();
        let mut board = sample_board();
        let mut history = ActionHistory::new(table.clone(), board.cell_count());
        let keys = zobrist_keys(9, 7);

        let score = history.add(&mut board, Action::new(8)).unwrap();
        assert_eq!(score, 4.0);
        assert_eq!(history.score(), 4.0);
        assert_eq!(history.hash(), keys[8]);
        assert_eq!(board.remaining(), 5);

        let entry = history.entry().unwrap();
        assert_eq!(entry.visits, 1);
        assert_eq!(entry.score, 4.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_restores_hash_and_score() {
        let mut board = sample_board();
        let mut history = ActionHistory::new(fresh_table(), board.cell_count());

        history.add(&mut board, Action::new(8)).unwrap();
        history.add(&mut board, Action::new(3)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.score(), 5.0);

        assert_eq!(history.remove(), Some(Action::new(3)));
        assert_eq!(history.score(), 4.0);
        assert_eq!(history.remove(), Some(Action::new(8)));
        assert_eq!(history.hash(), 0);
        assert_eq!(history.score(), 0.0);
        assert!(history.is_empty());
        assert_eq!(history.remove(), None);
    }

    #[test]
    fn test_invalid_add_leaves_history_untouched() {
        let mut board = sample_board();
        let mut history = ActionHistory::new(fresh_table(), board.cell_count());

        let err = history.add(&mut board, Action::new(1)).unwrap_err();
        assert!(matches!(err, SameGameError::InvalidMove { index: 1 }));
        assert!(history.is_empty());
        assert_eq!(history.hash(), 0);
        assert_eq!(board.remaining(), 9);
        assert!(history.table().is_empty());
    }

    #[test]
    fn test_transpositions_share_entry() {
        let table = fresh_table();
        // Two independent vertical pairs over singletons that keep both
        // columns alive; either order reaches the same state.
        let text = "1 2\n1 2\n3 4\n";

        let mut a = Board::parse(2, 3, text).unwrap();
        let mut first = ActionHistory::new(table.clone(), a.cell_count());
        first.add(&mut a, Action::new(2)).unwrap();
        first.add(&mut a, Action::new(3)).unwrap();

        let mut b = Board::parse(2, 3, text).unwrap();
        let mut second = ActionHistory::new(table.clone(), b.cell_count());
        second.add(&mut b, Action::new(3)).unwrap();
        second.add(&mut b, Action::new(2)).unwrap();

        assert_eq!(first.hash(), second.hash());
        assert_eq!(a.colors(), b.colors());
        assert_eq!(first.entry().unwrap().visits, 2);
    }

    #[test]
    fn test_visit_merges_by_max_and_sum() {
        let table = fresh_table();
        table.visit(99, 3.0);
        table.visit(99, 1.0);
        let entry = table.visit(99, 5.0);
        assert_eq!(entry.visits, 3);
        assert_eq!(entry.score, 5.0);

        table.record_value(99, 0.5);
        let entry = table.record_value(99, 0.25);
        assert_eq!(entry.value, 0.75);
    }

    #[test]
    fn test_visit_count_saturates() {
        let table = fresh_table();
        table.insert(
            5,
            TranspositionEntry {
                score: 2.0,
                value: 0.0,
                visits: u32::MAX,
            },
        );
        let entry = table.visit(5, 1.0);
        assert_eq!(entry.visits, u32::MAX);
        assert_eq!(entry.score, 2.0);
    }

    #[test]
    fn test_snapshot_insert_clear() {
        let table = fresh_table();
        for hash in 0..40u64 {
            table.visit(hash, hash as f64);
        }
        assert_eq!(table.len(), 40);

        let copy = fresh_table();
        for (hash, entry) in table.snapshot() {
            copy.insert(hash, entry);
        }
        assert_eq!(copy.len(), 40);
        assert_eq!(copy.get(17), table.get(17));

        table.clear();
        assert!(table.is_empty());
        assert!(!table.contains(17));
        assert!(copy.contains(17));
    }

    #[test]
    fn test_table_shared_across_threads() {
        let table = fresh_table();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        table.visit(1234, 1.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(table.get(1234).unwrap().visits, 1000);
    }

    #[test]
    fn test_global_table_is_shared() {
        let a = TranspositionTable::global();
        let b = TranspositionTable::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.seed(), DEFAULT_KEY_SEED);
    }
}
