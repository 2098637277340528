pub mod config;
pub mod design;
pub mod metrics;
pub mod recorder;
pub mod sequencer;
pub mod session;

pub use config::SessionConfig;
pub use recorder::SessionRecorder;
pub use sequencer::{SequencerError, TrialSequencer};
pub use session::{Effect, Session, SessionError, SessionEvent};
