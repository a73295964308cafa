//! VSIDS decision heuristic backed by a binary max-heap.
//!
//! The heap holds candidate variables ordered by activity. Assigned variables
//! may linger in the heap; the solver skips them when popping and reinserts
//! variables as backtracking unassigns them.

use sword_core::Var;

const NOT_IN_HEAP: u32 = u32::MAX;
const RESCALE_LIMIT: f64 = 1e100;

/// Activity scores plus the heap that orders them.
#[derive(Debug, Clone)]
pub struct Vsids {
    activities: Vec<f64>,
    increment: f64,
    decay: f64,
    heap: Vec<u32>,
    heap_pos: Vec<u32>,
}

impl Vsids {
    /// Create an empty heuristic with the given decay factor.
    #[must_use]
    pub fn new(decay: f64) -> Self {
        Self {
            activities: Vec::new(),
            increment: 1.0,
            decay,
            heap: Vec::new(),
            heap_pos: Vec::new(),
        }
    }

    /// Register one more variable and make it a decision candidate.
    pub fn add_var(&mut self) {
        let idx = self.activities.len() as u32;
        self.activities.push(0.0);
        self.heap_pos.push(NOT_IN_HEAP);
        self.insert(Var::new(idx));
    }

    /// Number of variables known to the heuristic.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.activities.len()
    }

    /// Current activity of `var`.
    #[must_use]
    pub fn activity(&self, var: Var) -> f64 {
        self.activities[var.index()]
    }

    /// Whether `var` is currently in the heap.
    #[must_use]
    pub fn contains(&self, var: Var) -> bool {
        self.heap_pos[var.index()] != NOT_IN_HEAP
    }

    /// Bump `var` after it took part in a conflict.
    pub fn bump(&mut self, var: Var) {
        let idx = var.index();
        self.activities[idx] += self.increment;
        if self.activities[idx] > RESCALE_LIMIT {
            self.rescale();
        }
        let pos = self.heap_pos[idx];
        if pos != NOT_IN_HEAP {
            self.sift_up(pos as usize);
        }
    }

    /// Age all activities by growing the increment.
    pub fn decay(&mut self) {
        self.increment /= self.decay;
    }

    fn rescale(&mut self) {
        for a in &mut self.activities {
            *a *= 1.0 / RESCALE_LIMIT;
        }
        self.increment *= 1.0 / RESCALE_LIMIT;
    }

    /// Put `var` back into the heap if it is not already there.
    pub fn insert(&mut self, var: Var) {
        if self.contains(var) {
            return;
        }
        let pos = self.heap.len();
        self.heap.push(var.raw());
        self.heap_pos[var.index()] = pos as u32;
        self.sift_up(pos);
    }

    /// Remove and return the most active variable.
    pub fn pop_max(&mut self) -> Option<Var> {
        let top = *self.heap.first()?;
        let last = self.heap.pop()?;
        self.heap_pos[top as usize] = NOT_IN_HEAP;
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.heap_pos[last as usize] = 0;
            self.sift_down(0);
        }
        Some(Var::new(top))
    }

    /// Higher activity first, lower index on ties.
    fn better(&self, a: u32, b: u32) -> bool {
        let (aa, ab) = (self.activities[a as usize], self.activities[b as usize]);
        aa > ab || (aa == ab && a < b)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.heap_pos[self.heap[i] as usize] = i as u32;
        self.heap_pos[self.heap[j] as usize] = j as u32;
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.better(self.heap[pos], self.heap[parent]) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut best = pos;
            if left < self.heap.len() && self.better(self.heap[left], self.heap[best]) {
                best = left;
            }
            if right < self.heap.len() && self.better(self.heap[right], self.heap[best]) {
                best = right;
            }
            if best == pos {
                break;
            }
            self.swap(pos, best);
            pos = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_with(n: u32) -> Vsids {
        let mut v = Vsids::new(0.95);
        for _ in 0..n {
            v.add_var();
        }
        v
    }

    #[test]
    fn test_ties_prefer_lower_index() {
        let mut v = heap_with(4);
        let order: Vec<_> = std::iter::from_fn(|| v.pop_max()).map(Var::raw).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bump_reorders() {
        let mut v = heap_with(5);
        v.bump(Var::new(3));
        v.decay();
        v.bump(Var::new(1));
        v.bump(Var::new(1));
        assert_eq!(v.pop_max(), Some(Var::new(1)));
        assert_eq!(v.pop_max(), Some(Var::new(3)));
        assert_eq!(v.pop_max(), Some(Var::new(0)));
    }

    #[test]
    fn test_reinsert_after_pop() {
        let mut v = heap_with(2);
        let top = v.pop_max().unwrap();
        assert!(!v.contains(top));
        v.insert(top);
        v.insert(top);
        assert_eq!(v.pop_max(), Some(top));
        assert_eq!(v.pop_max(), Some(Var::new(1)));
        assert_eq!(v.pop_max(), None);
    }

    #[test]
    fn test_rescale_keeps_order() {
        let mut v = heap_with(3);
        v.bump(Var::new(2));
        for _ in 0..5000 {
            v.decay();
        }
        v.bump(Var::new(1));
        assert!(v.activity(Var::new(1)) <= RESCALE_LIMIT);
        assert_eq!(v.pop_max(), Some(Var::new(1)));
        assert_eq!(v.pop_max(), Some(Var::new(2)));
    }
}
