use crate::spec::TrialSpec;
use serde::{Deserialize, Serialize};

/// Trial runner states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Consent screen shown, nothing armed yet
    Idle,
    /// A target has been drawn and the trial clock started
    Armed,
    /// Waiting for the terminating click
    AwaitingClick,
    /// Click received, measurements being finalized
    Scoring,
    /// Pool drained; completion shown and export requested
    Terminating,
    /// No further input is processed
    Done,
}

/// Recorded result for one logical trial. A slot is opened with the spec only
/// when the trial is first drawn; time and path distance are filled by the
/// click that ends each attempt (a later attempt overwrites a miss's values),
/// and the miss count is filled once on the hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub spec: TrialSpec,
    pub errors: Option<u32>,
    pub time_ms: Option<u64>,
    pub distance: Option<f64>,
}

impl TrialRecord {
    pub fn pending(spec: TrialSpec) -> Self {
        Self {
            spec,
            errors: None,
            time_ms: None,
            distance: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_some() && self.time_ms.is_some() && self.distance.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Gap, Side, TargetSize};

    #[test]
    fn pending_record_is_incomplete() {
        let spec = TrialSpec::new(TargetSize::Small, Gap::Long, Side::Right);
        let record = TrialRecord::pending(spec);
        assert!(!record.is_complete());
        assert_eq!(record.spec, spec);
    }

    #[test]
    fn record_completes_once_all_fields_are_filled() {
        let spec = TrialSpec::new(TargetSize::Medium, Gap::Short, Side::Left);
        let mut record = TrialRecord::pending(spec);
        record.time_ms = Some(512);
        record.distance = Some(131.5);
        assert!(!record.is_complete());
        record.errors = Some(0);
        assert!(record.is_complete());
    }
}
