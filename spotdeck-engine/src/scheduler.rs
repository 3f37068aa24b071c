//! Refresh scheduling.
//!
//! A pure state machine: it owns no timers and performs no I/O. The driver
//! feeds it timer expiries and user requests and carries out the [`Step`]s it
//! returns. At most one pass is ever in flight.
//!
//! ```text
//!   Idle --tick/request--> MarkingBusy --busy timer--> Fetching --finish--> Idle
//!                               ^                                  |
//!                               +------- queued request -----------+
//! ```

use crate::pass::RefreshPass;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Busy treatment is on screen; the pass starts when the busy timer fires.
    MarkingBusy,
    Fetching,
}

/// What the driver must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Redraw the current view as busy and arm the one-shot busy timer.
    MarkBusy { delay: Duration },
    /// Arm the periodic timer.
    Rearm { interval: Duration },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("A refresh pass is already in flight")]
    PassInFlight,

    #[error("No refresh pass is pending")]
    NothingPending,

    #[error("No refresh pass is in flight")]
    NoPassInFlight,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    state: SchedulerState,
    pending: Option<RefreshPass>,
    queued: Option<RefreshPass>,
    refresh_interval: Duration,
    busy_delay: Duration,
    paused: bool,
    passes_started: u64,
}

impl Scheduler {
    pub fn new(refresh_interval: Duration, busy_delay: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            pending: None,
            queued: None,
            refresh_interval,
            busy_delay,
            paused: false,
            passes_started: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state != SchedulerState::Idle
    }

    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn passes_started(&self) -> u64 {
        self.passes_started
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Suspend or resume periodic refreshes. Requested passes still run.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// The periodic deadline passed.
    pub fn on_periodic_tick(&mut self) -> Option<Step> {
        if self.paused || self.state != SchedulerState::Idle {
            return None;
        }
        Some(self.mark_busy(RefreshPass::periodic()))
    }

    /// An out-of-cycle pass was requested (after a confirmed action, or a
    /// manual refresh).
    pub fn request(&mut self, pass: RefreshPass) -> Option<Step> {
        match self.state {
            SchedulerState::Idle => Some(self.mark_busy(pass)),
            SchedulerState::MarkingBusy => {
                let pending = self.pending.get_or_insert_with(RefreshPass::periodic);
                if let Some(displaced) = pending.merge(pass) {
                    tracing::warn!(action = %displaced, "pending action replaced by a later one");
                }
                None
            }
            SchedulerState::Fetching => {
                match self.queued.as_mut() {
                    Some(queued) => {
                        if let Some(displaced) = queued.merge(pass) {
                            tracing::warn!(action = %displaced, "queued action replaced by a later one");
                        }
                    }
                    None => self.queued = Some(pass),
                }
                None
            }
        }
    }

    /// The busy timer fired: hand out the pass to run.
    pub fn begin_pass(&mut self) -> Result<RefreshPass, SchedulerError> {
        match self.state {
            SchedulerState::Fetching => Err(SchedulerError::PassInFlight),
            SchedulerState::Idle => Err(SchedulerError::NothingPending),
            SchedulerState::MarkingBusy => {
                self.state = SchedulerState::Fetching;
                self.passes_started += 1;
                Ok(self.pending.take().unwrap_or_default())
            }
        }
    }

    /// The in-flight pass completed and its view is on screen.
    pub fn finish_pass(&mut self) -> Result<Step, SchedulerError> {
        if self.state != SchedulerState::Fetching {
            return Err(SchedulerError::NoPassInFlight);
        }
        match self.queued.take() {
            Some(next) => Ok(self.mark_busy(next)),
            None => {
                self.state = SchedulerState::Idle;
                Ok(Step::Rearm {
                    interval: self.refresh_interval,
                })
            }
        }
    }

    fn mark_busy(&mut self, pass: RefreshPass) -> Step {
        self.state = SchedulerState::MarkingBusy;
        self.pending = Some(pass);
        Step::MarkBusy {
            delay: self.busy_delay,
        }
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Event {
        Tick,
        Request,
        BusyTimer,
        Finish,
    }

    fn arb_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::Tick),
            Just(Event::Request),
            Just(Event::BusyTimer),
            Just(Event::Finish),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: no event sequence ever yields two passes in flight
        #[test]
        fn prop_single_pass_in_flight(events in prop::collection::vec(arb_event(), 0..80)) {
            let mut s = Scheduler::new(Duration::from_secs(20), Duration::from_millis(150));
            let mut in_flight = 0i32;
            for event in events {
                match event {
                    Event::Tick => { s.on_periodic_tick(); }
                    Event::Request => { s.request(RefreshPass::full()); }
                    Event::BusyTimer => {
                        if s.begin_pass().is_ok() {
                            in_flight += 1;
                        }
                    }
                    Event::Finish => {
                        if s.finish_pass().is_ok() {
                            in_flight -= 1;
                        }
                    }
                }
                prop_assert!((0..=1).contains(&in_flight));
                prop_assert_eq!(in_flight == 1, s.state() == SchedulerState::Fetching);
            }
        }
    }
}
