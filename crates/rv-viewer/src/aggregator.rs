//! Mesh load aggregation.

/// Tracks how many mesh loads were requested for the current model
/// generation and how many have completed.
///
/// Meshes are discovered incrementally while a model is built, so the
/// requested count may keep growing after completions have already landed.
/// Equality is re-evaluated after every increment to either counter, and the
/// fully-loaded signal latches: it fires at most once per generation even if
/// equality holds again on a later increment.
#[derive(Debug)]
pub struct MeshLoadAggregator {
    generation: u64,
    requested: usize,
    completed: usize,
    notified: bool,
}

impl MeshLoadAggregator {
    /// Creates an aggregator with no active generation.
    pub fn new() -> Self {
        Self {
            generation: 0,
            requested: 0,
            completed: 0,
            notified: false,
        }
    }

    /// Starts counting for a new generation, discarding previous counters.
    pub fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.requested = 0;
        self.completed = 0;
        self.notified = false;
    }

    /// The generation the counters belong to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records that one more mesh load was requested. Called before the
    /// load is started.
    pub fn add_requested(&mut self) {
        self.requested += 1;
    }

    /// Records one mesh completion (success or fallback substitution).
    ///
    /// Returns true exactly when the fully-loaded notification should fire:
    /// every requested mesh has completed and the signal has not fired for
    /// this generation yet.
    pub fn add_completed(&mut self) -> bool {
        self.completed += 1;
        self.check()
    }

    fn check(&mut self) -> bool {
        if self.notified || self.completed == 0 {
            return false;
        }
        if self.completed == self.requested {
            self.notified = true;
            return true;
        }
        false
    }

    /// Counters as (requested, completed).
    pub fn counts(&self) -> (usize, usize) {
        (self.requested, self.completed)
    }
}

impl Default for MeshLoadAggregator {
    fn default() -> Self {
        Self::new()
    }
}
