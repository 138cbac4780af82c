//! Zobrist-keyed transposition table.
//!
//! A bounded map from position hash to the outcome of a previous search
//! of that position. The replacement policy is deliberately simple: a
//! hash already present is always overwritten with the newest result,
//! and new hashes are only admitted while the table is below capacity.
//! Once full, the table degrades by refusing new keys rather than
//! evicting old ones; it is cleared at the start of every search, so a
//! full table can only happen within a single very long search.

use std::collections::HashMap;

use shakmaty::Move;

/// Maximum number of entries held at once.
pub const MAX_TABLE_SIZE: usize = 1_000_000;

/// How a stored value relates to the true score of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is exact (searched with an open window).
    Exact,
    /// The stored score is a lower bound (the node failed high).
    Lower,
    /// The stored score is an upper bound (the node failed low).
    Upper,
}

/// One transposition table entry.
#[derive(Debug, Clone)]
pub struct TtEntry {
    /// Bound type of `value`.
    pub flag: Bound,
    /// Plies searched below the node when this entry was written.
    pub leaf_distance: u8,
    /// Score from the perspective of the side to move at the node.
    pub value: i32,
    /// The move that produced `value` or caused the cutoff, if any.
    pub best_move: Option<Move>,
}

/// Bounded transposition table.
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
    capacity: usize,
}

impl TranspositionTable {
    /// A table with the default capacity of [`MAX_TABLE_SIZE`] entries.
    pub fn new() -> Self {
        Self::with_capacity(MAX_TABLE_SIZE)
    }

    /// A table bounded at `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up a position.
    pub fn get(&self, hash: u64) -> Option<&TtEntry> {
        self.entries.get(&hash)
    }

    /// Store an entry. Existing hashes are overwritten; new hashes are
    /// dropped once the table is at capacity.
    pub fn put(&mut self, hash: u64, entry: TtEntry) {
        if self.entries.len() < self.capacity || self.entries.contains_key(&hash) {
            self.entries.insert(hash, entry);
        }
    }

    /// Drop every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occupancy in permille, as reported by `info hashfull`.
    pub fn hashfull(&self) -> u64 {
        (self.entries.len() * 1000 / self.capacity) as u64
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
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use shakmaty::{Move, Role, Square};

    use super::{Bound, TranspositionTable, TtEntry};

    fn mv(from: Square, to: Square) -> Move {
        Move::Normal {
            role: Role::Pawn,
            from,
            capture: None,
            to,
            promotion: None,
        }
    }

    fn entry(value: i32, best: Option<Move>) -> TtEntry {
        TtEntry {
            flag: Bound::Exact,
            leaf_distance: 3,
            value,
            best_move: best,
        }
    }

    #[test]
    fn store_and_probe_round_trip() {
        let mut tt = TranspositionTable::new();
        let e2e4 = mv(Square::E2, Square::E4);
        tt.put(0xDEAD_BEEF, entry(42, Some(e2e4.clone())));

        let got = tt.get(0xDEAD_BEEF).expect("entry should be present");
        assert_eq!(got.value, 42);
        assert_eq!(got.leaf_distance, 3);
        assert_eq!(got.flag, Bound::Exact);
        assert_eq!(got.best_move, Some(e2e4));
    }

    #[test]
    fn probe_miss_returns_none() {
        let tt = TranspositionTable::new();
        assert!(tt.get(0x1234).is_none());
    }

    #[test]
    fn same_hash_is_overwritten() {
        let mut tt = TranspositionTable::new();
        tt.put(1, entry(10, None));
        tt.put(1, entry(20, None));
        assert_eq!(tt.get(1).unwrap().value, 20);
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn full_table_rejects_new_keys_but_updates_old_ones() {
        let mut tt = TranspositionTable::with_capacity(2);
        tt.put(1, entry(1, None));
        tt.put(2, entry(2, None));

        // New key at capacity: silently dropped.
        tt.put(3, entry(3, None));
        assert!(tt.get(3).is_none());
        assert_eq!(tt.len(), 2);

        // Existing key at capacity: still updated.
        tt.put(2, entry(22, None));
        assert_eq!(tt.get(2).unwrap().value, 22);
    }

    #[test]
    fn clear_removes_all_entries() {
        let mut tt = TranspositionTable::new();
        tt.put(7, entry(7, None));
        assert!(!tt.is_empty());
        tt.clear();
        assert!(tt.get(7).is_none());
        assert!(tt.is_empty());
    }

    #[test]
    fn hashfull_is_permille_of_capacity() {
        let mut tt = TranspositionTable::with_capacity(1000);
        for hash in 0..250u64 {
            tt.put(hash, entry(0, None));
        }
        assert_eq!(tt.hashfull(), 250);
        assert_eq!(TranspositionTable::new().hashfull(), 0);
    }
}
