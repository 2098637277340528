pub mod spec;
pub mod trial;

pub use spec::{Gap, InvalidLevel, Side, TargetSize, TrialGeometry, TrialSpec};
pub use trial::{RunnerState, TrialRecord};
