//! Clause storage.

use smallvec::SmallVec;
use sword_core::Lit;

/// Index of a clause in the [`ClauseDb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClauseRef(u32);

impl ClauseRef {
    /// Position in the database.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a clause came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// Added by the caller.
    Original,
    /// Derived by conflict analysis.
    Learned,
    /// Supplied by an external propagator as a reason or conflict.
    External,
}

/// A disjunction of literals. The first two positions are the watched ones.
#[derive(Debug, Clone)]
pub struct Clause {
    /// Literals of the clause.
    pub lits: SmallVec<[Lit; 4]>,
    /// Origin of the clause.
    pub kind: ClauseKind,
}

impl Clause {
    /// Number of literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether the clause has no literals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }
}

/// Append-only clause arena.
#[derive(Debug, Default, Clone)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
    learned: usize,
    external: usize,
}

impl ClauseDb {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a clause and return its handle.
    pub fn push(&mut self, lits: SmallVec<[Lit; 4]>, kind: ClauseKind) -> ClauseRef {
        match kind {
            ClauseKind::Learned => self.learned += 1,
            ClauseKind::External => self.external += 1,
            ClauseKind::Original => {}
        }
        let cref = ClauseRef(self.clauses.len() as u32);
        self.clauses.push(Clause { lits, kind });
        cref
    }

    /// Total number of stored clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether no clause has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of learned clauses.
    #[must_use]
    pub fn num_learned(&self) -> usize {
        self.learned
    }

    /// Number of clauses supplied by external propagators.
    #[must_use]
    pub fn num_external(&self) -> usize {
        self.external
    }

    /// Iterate over all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }
}

impl std::ops::Index<ClauseRef> for ClauseDb {
    type Output = Clause;

    fn index(&self, cref: ClauseRef) -> &Clause {
        &self.clauses[cref.index()]
    }
}

impl std::ops::IndexMut<ClauseRef> for ClauseDb {
    fn index_mut(&mut self, cref: ClauseRef) -> &mut Clause {
        &mut self.clauses[cref.index()]
    }
}
