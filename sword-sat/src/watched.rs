//! Two-watched-literal lists.

use crate::clause::ClauseRef;
use sword_core::Lit;

/// A clause watching a literal, with a cached blocker literal. When the
/// blocker is true the clause is satisfied and need not be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watcher {
    /// Watching clause.
    pub clause: ClauseRef,
    /// Some other literal of the clause.
    pub blocker: Lit,
}

/// Per-literal watch lists. `lists[l]` holds the clauses that watch `l`
/// and must be visited when `l` becomes false.
#[derive(Debug, Default, Clone)]
pub struct WatchLists {
    lists: Vec<Vec<Watcher>>,
}

impl WatchLists {
    /// Create empty watch lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make room for the two literals of one more variable.
    pub fn add_var(&mut self) {
        self.lists.push(Vec::new());
        self.lists.push(Vec::new());
    }

    /// Register `clause` as watching `lit`.
    pub fn watch(&mut self, lit: Lit, clause: ClauseRef, blocker: Lit) {
        self.lists[lit.index()].push(Watcher { clause, blocker });
    }

    /// Move the list of `lit` out for in-place filtering.
    pub fn take(&mut self, lit: Lit) -> Vec<Watcher> {
        std::mem::take(&mut self.lists[lit.index()])
    }

    /// Put a list taken with [`WatchLists::take`] back.
    pub fn restore(&mut self, lit: Lit, list: Vec<Watcher>) {
        debug_assert!(self.lists[lit.index()].is_empty());
        self.lists[lit.index()] = list;
    }

    /// Watchers of `lit`.
    #[must_use]
    pub fn get(&self, lit: Lit) -> &[Watcher] {
        &self.lists[lit.index()]
    }
}
