use crate::config::SessionConfig;
use crate::design;
use crate::metrics;
use crate::recorder::SessionRecorder;
use crate::sequencer::{SequencerError, TrialSequencer};
use fittex_core::{RunnerState, TrialGeometry};
use fittex_timing::Timer;
use rand::Rng;
use std::fmt;

/// External input events delivered by the window layer, in the same
/// origin-centered coordinate space as the trial geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Click { x: f64, y: f64 },
    Motion { x: f64, y: f64 },
}

/// Side-effect intents for the caller to execute. The state machine never
/// touches the window, audio device, or filesystem itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DrawTarget {
        geometry: TrialGeometry,
        retry: bool,
    },
    ClearTarget,
    ShowProgress {
        remaining: usize,
    },
    Beep {
        frequency_hz: u32,
        duration_ms: u64,
    },
    RecenterPointer,
    ShowCompletion,
    ExportLog,
}

#[derive(Debug)]
pub enum SessionError {
    Sequencer(SequencerError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Sequencer(e) => write!(f, "sequencer invariant violated: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Sequencer(e) => Some(e),
        }
    }
}

impl From<SequencerError> for SessionError {
    fn from(e: SequencerError) -> Self {
        SessionError::Sequencer(e)
    }
}

#[derive(Debug, Clone, Copy)]
struct ArmedTarget<Ts> {
    geometry: TrialGeometry,
    armed_at: Ts,
}

/// One pointing session: drives trials from the consent click to the final
/// hit, converting click and motion events into state transitions plus a
/// list of side-effect intents.
pub struct Session<T: Timer, R: Rng> {
    state: RunnerState,
    sequencer: TrialSequencer,
    recorder: SessionRecorder,
    armed: Option<ArmedTarget<T::Timestamp>>,
    samples: Vec<(f64, f64)>,
    misses: u32,
    config: SessionConfig,
    timer: T,
    rng: R,
}

impl<T, R> Session<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(config: SessionConfig, timer: T, rng: R) -> Self {
        let pool = design::generate(&design::base_combinations(), config.replicates);
        Self {
            state: RunnerState::Idle,
            sequencer: TrialSequencer::new(pool),
            recorder: SessionRecorder::new(),
            armed: None,
            samples: Vec::new(),
            misses: 0,
            config,
            timer,
            rng,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Specs still waiting for a successful acquisition
    pub fn remaining(&self) -> usize {
        self.sequencer.remaining()
    }

    pub fn armed_geometry(&self) -> Option<TrialGeometry> {
        self.armed.as_ref().map(|t| t.geometry)
    }

    /// True once the final hit has been scored; the driving loop checks this
    /// instead of fabricating input events to unblock itself.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, RunnerState::Terminating | RunnerState::Done)
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Result<Vec<Effect>, SessionError> {
        match event {
            SessionEvent::Motion { x, y } => {
                if self.state == RunnerState::AwaitingClick {
                    self.samples.push((x, y));
                }
                Ok(Vec::new())
            }
            SessionEvent::Click { x, y } => self.handle_click(x, y),
        }
    }

    fn handle_click(&mut self, x: f64, y: f64) -> Result<Vec<Effect>, SessionError> {
        match self.state {
            RunnerState::Idle => {
                // Consent click: nothing to score yet, arm the first trial.
                let mut effects = vec![
                    Effect::RecenterPointer,
                    Effect::ShowProgress {
                        remaining: self.sequencer.remaining(),
                    },
                ];
                effects.extend(self.arm(false)?);
                Ok(effects)
            }
            RunnerState::Armed | RunnerState::AwaitingClick => self.score(x, y),
            RunnerState::Terminating => {
                self.state = RunnerState::Done;
                Ok(Vec::new())
            }
            RunnerState::Scoring | RunnerState::Done => Ok(Vec::new()),
        }
    }

    /// Stops the trial clock, evaluates the terminating click and decides
    /// whether to advance, retry, or end the session.
    fn score(&mut self, x: f64, y: f64) -> Result<Vec<Effect>, SessionError> {
        let Some(armed) = self.armed.take() else {
            return Ok(Vec::new());
        };
        self.state = RunnerState::Scoring;

        let time_ms = self.timer.elapsed_ms(armed.armed_at);
        let distance = metrics::path_distance(&self.samples);
        let hit = metrics::hit((x, y), &armed.geometry);
        self.recorder.score_last(time_ms, distance);

        let mut effects = vec![Effect::RecenterPointer];
        if hit {
            println!(
                "Trial {}: hit in {} ms, path {:.1} px, {} miss(es)",
                self.recorder.len(),
                time_ms,
                distance,
                self.misses
            );
            self.recorder.record_errors(self.misses);
            self.misses = 0;
            effects.push(Effect::ShowProgress {
                remaining: self.sequencer.remaining(),
            });
            if self.sequencer.is_exhausted() {
                self.state = RunnerState::Terminating;
                effects.push(Effect::ClearTarget);
                effects.push(Effect::ShowCompletion);
                effects.push(Effect::ExportLog);
            } else {
                effects.extend(self.arm(false)?);
            }
        } else {
            self.misses += 1;
            effects.push(Effect::Beep {
                frequency_hz: self.config.miss_tone_hz,
                duration_ms: self.config.miss_tone_ms,
            });
            effects.extend(self.arm(true)?);
        }
        Ok(effects)
    }

    /// Draws a spec, starts the trial clock and begins accumulating motion
    /// samples. Arming completes immediately: a click is the only input that
    /// ends the trial.
    fn arm(&mut self, retry: bool) -> Result<Vec<Effect>, SessionError> {
        let spec = self.sequencer.draw(&mut self.rng, retry)?;
        if !retry {
            self.recorder.open(spec);
            println!(
                "Trial {} armed: {} ({} left in pool)",
                self.recorder.len(),
                spec,
                self.sequencer.remaining()
            );
        }
        self.state = RunnerState::Armed;
        self.samples.clear();
        let geometry = spec.geometry();
        self.armed = Some(ArmedTarget {
            geometry,
            armed_at: self.timer.now(),
        });
        self.state = RunnerState::AwaitingClick;
        Ok(vec![Effect::DrawTarget { geometry, retry }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fittex_timing::ManualTimer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(seed: u64) -> (Session<ManualTimer, StdRng>, ManualTimer) {
        let timer = ManualTimer::new();
        let session = Session::new(
            SessionConfig::default(),
            timer.clone(),
            StdRng::seed_from_u64(seed),
        );
        (session, timer)
    }

    fn click(session: &mut Session<ManualTimer, StdRng>, x: f64, y: f64) -> Vec<Effect> {
        session
            .handle_event(SessionEvent::Click { x, y })
            .expect("click must not fail")
    }

    fn click_center(session: &mut Session<ManualTimer, StdRng>) -> Vec<Effect> {
        let (cx, cy) = session
            .armed_geometry()
            .expect("a target must be armed")
            .center();
        click(session, cx, cy)
    }

    #[test]
    fn consent_click_arms_the_first_trial() {
        let (mut session, _) = session(1);
        assert_eq!(session.state(), RunnerState::Idle);

        let effects = click(&mut session, 0.0, 0.0);
        assert_eq!(session.state(), RunnerState::AwaitingClick);
        assert_eq!(session.remaining(), 119);
        assert_eq!(session.recorder().len(), 1);
        assert!(effects.contains(&Effect::ShowProgress { remaining: 120 }));
        assert!(matches!(
            effects.last(),
            Some(Effect::DrawTarget { retry: false, .. })
        ));
    }

    #[test]
    fn clean_session_produces_120_records_and_drains_the_pool() {
        let (mut session, timer) = session(7);
        click(&mut session, 0.0, 0.0);

        let mut last_effects = Vec::new();
        for _ in 0..120 {
            timer.advance(400);
            last_effects = click_center(&mut session);
        }

        assert_eq!(session.remaining(), 0);
        assert_eq!(session.state(), RunnerState::Terminating);
        assert!(session.is_finished());
        assert!(last_effects.contains(&Effect::ClearTarget));
        assert!(last_effects.contains(&Effect::ShowCompletion));
        assert!(last_effects.contains(&Effect::ExportLog));

        let records = session.recorder().records();
        assert_eq!(records.len(), 120);
        assert!(records.iter().all(|r| r.is_complete()));
        assert!(records.iter().all(|r| r.errors == Some(0)));
        // Export expands to 120 data rows plus the header.
        assert_eq!(session.recorder().rows().len(), 121);
    }

    #[test]
    fn pool_is_untouched_by_misses_and_shrinks_once_per_trial() {
        let (mut session, _) = session(11);
        click(&mut session, 0.0, 0.0);
        let after_arm = session.remaining();

        let effects = click(&mut session, 5000.0, 5000.0);
        assert_eq!(session.remaining(), after_arm);
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::Beep { frequency_hz: 750, duration_ms: 300 })));
        assert!(matches!(
            effects.last(),
            Some(Effect::DrawTarget { retry: true, .. })
        ));
        // No new record slot for the retry.
        assert_eq!(session.recorder().len(), 1);

        click_center(&mut session);
        assert_eq!(session.remaining(), after_arm - 1);
        assert_eq!(session.recorder().len(), 2);
    }

    #[test]
    fn misses_accumulate_into_the_completed_trial_and_reset() {
        let (mut session, _) = session(13);
        click(&mut session, 0.0, 0.0);

        let spec = session.recorder().records()[0].spec;
        click(&mut session, 5000.0, 5000.0);
        click(&mut session, 5000.0, 5000.0);
        // Retries re-issue the identical spec.
        assert_eq!(session.recorder().records()[0].spec, spec);
        assert_eq!(session.recorder().records()[0].errors, None);

        click_center(&mut session);
        assert_eq!(session.recorder().records()[0].errors, Some(2));

        click_center(&mut session);
        assert_eq!(session.recorder().records()[1].errors, Some(0));
    }

    #[test]
    fn motion_samples_become_the_trial_path_distance() {
        let (mut session, _) = session(17);
        click(&mut session, 0.0, 0.0);

        for (x, y) in [(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)] {
            session.handle_event(SessionEvent::Motion { x, y }).unwrap();
        }
        click_center(&mut session);
        assert_eq!(session.recorder().records()[0].distance, Some(7.0));
    }

    #[test]
    fn samples_reset_between_attempts() {
        let (mut session, _) = session(19);
        click(&mut session, 0.0, 0.0);
        session
            .handle_event(SessionEvent::Motion { x: 100.0, y: 0.0 })
            .unwrap();
        session
            .handle_event(SessionEvent::Motion { x: 100.0, y: 90.0 })
            .unwrap();
        // Miss: the retry starts with an empty sample buffer.
        click(&mut session, 5000.0, 5000.0);
        click_center(&mut session);
        assert_eq!(session.recorder().records()[0].distance, Some(0.0));
    }

    #[test]
    fn motion_before_consent_is_ignored() {
        let (mut session, _) = session(23);
        session
            .handle_event(SessionEvent::Motion { x: 9.0, y: 9.0 })
            .unwrap();
        click(&mut session, 0.0, 0.0);
        click_center(&mut session);
        assert_eq!(session.recorder().records()[0].distance, Some(0.0));
    }

    #[test]
    fn elapsed_time_is_measured_from_arm_to_click() {
        let (mut session, timer) = session(29);
        click(&mut session, 0.0, 0.0);
        timer.advance(345);
        click_center(&mut session);
        assert_eq!(session.recorder().records()[0].time_ms, Some(345));

        timer.advance(1000);
        timer.advance(200); // only time since the re-arm counts
        click_center(&mut session);
        assert_eq!(session.recorder().records()[1].time_ms, Some(1200));
    }

    #[test]
    fn clicks_after_completion_reach_done_and_are_then_ignored() {
        let (mut session, _) = session(31);
        click(&mut session, 0.0, 0.0);
        for _ in 0..120 {
            click_center(&mut session);
        }
        assert_eq!(session.state(), RunnerState::Terminating);

        let effects = click(&mut session, 0.0, 0.0);
        assert!(effects.is_empty());
        assert_eq!(session.state(), RunnerState::Done);

        let effects = click(&mut session, 0.0, 0.0);
        assert!(effects.is_empty());
        assert_eq!(session.state(), RunnerState::Done);
        assert_eq!(session.recorder().len(), 120);
    }

    #[test]
    fn every_scored_click_recenters_the_pointer() {
        let (mut session, _) = session(37);
        click(&mut session, 0.0, 0.0);
        let hit_effects = click_center(&mut session);
        assert_eq!(hit_effects.first(), Some(&Effect::RecenterPointer));
        let miss_effects = click(&mut session, 5000.0, 5000.0);
        assert_eq!(miss_effects.first(), Some(&Effect::RecenterPointer));
    }
}
