//! Objective-value solution cache.
//!
//! A deliberately coarse filter: the fingerprint is the solution's cached
//! objective value scaled by `u64::MAX / num_nodes` and truncated, so
//! distinct solutions sharing a cost collapse onto one entry. Its only
//! purpose is to skip repeating local search on objective values that have
//! been explored before; a structural hash would be a drop-in upgrade.

use std::collections::HashMap;

use crate::models::Solution;

/// Maps objective fingerprints to how often they were encountered.
#[derive(Debug)]
pub struct SolutionCache {
    entries: HashMap<u64, u64>,
    factor: u64,
}

impl SolutionCache {
    /// Creates an empty cache for a problem with `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            factor: u64::MAX / num_nodes as u64,
        }
    }

    fn fingerprint(&self, sol: &Solution) -> u64 {
        (sol.cost_cache() * self.factor as f64) as u64
    }

    /// Returns the number of encounters of this solution, or 0 if unseen.
    ///
    /// A hit increments the stored count as a side effect; the returned
    /// value includes that increment. The solution's cost cache must be up
    /// to date.
    pub fn contains(&mut self, sol: &Solution) -> u64 {
        let fingerprint = self.fingerprint(sol);
        match self.entries.get_mut(&fingerprint) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => 0,
        }
    }

    /// Adds the solution with an encounter count of 1.
    ///
    /// Meant to be called for solutions that `contains` reported unseen;
    /// calling it for a cached solution resets its counter.
    pub fn add(&mut self, sol: &Solution) {
        let fingerprint = self.fingerprint(sol);
        self.entries.insert(fingerprint, 1);
    }

    /// Number of distinct fingerprints.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Total number of cache interactions (multi-hits counted fully).
    pub fn queries(&self) -> u64 {
        self.entries.values().sum()
    }
}
