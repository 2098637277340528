use fittex_core::TrialSpec;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerError {
    /// Drawn from an empty pool with no previous trial to re-issue. Indicates
    /// the state machine was driven out of order.
    EmptyPoolNoHistory,
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerError::EmptyPoolNoHistory => {
                write!(f, "trial pool is empty and no previous draw exists")
            }
        }
    }
}

impl std::error::Error for SequencerError {}

/// Holds the not-yet-completed trial pool and re-issues missed trials.
///
/// Fresh draws remove a uniformly random pool entry, which yields a balanced
/// randomized presentation order while guaranteeing every cell of the design
/// is eventually acquired exactly once.
#[derive(Debug)]
pub struct TrialSequencer {
    pool: Vec<TrialSpec>,
    last: Option<TrialSpec>,
}

impl TrialSequencer {
    pub fn new(pool: Vec<TrialSpec>) -> Self {
        Self { pool, last: None }
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn last_drawn(&self) -> Option<TrialSpec> {
        self.last
    }

    /// Draws the next spec. A retry, or any draw from an exhausted pool,
    /// returns the most recently drawn spec again without touching the pool.
    pub fn draw<R: Rng>(
        &mut self,
        rng: &mut R,
        retry_previous: bool,
    ) -> Result<TrialSpec, SequencerError> {
        if !retry_previous && !self.pool.is_empty() {
            let index = rng.random_range(0..self.pool.len());
            let spec = self.pool.swap_remove(index);
            self.last = Some(spec);
            Ok(spec)
        } else {
            self.last.ok_or(SequencerError::EmptyPoolNoHistory)
        }
    }
}
