//! Event loop driver for refresh passes.
//!
//! The [`Driver`] owns the scheduler, the two timer deadlines, and the engine
//! slot. The engine is moved into the task running a pass and handed back
//! when the pass completes, so a second pass cannot start while one is in
//! flight even if the scheduler were bypassed. A pass task that panics takes
//! the engine with it; the driver then builds a fresh one with an empty cache.

use crate::error::TuiError;
use crate::notifications::NotificationLevel;
use crate::state::App;
use spotdeck_core::{PanelConfig, RenderedView};
use spotdeck_engine::{Engine, Gateway, RefreshPass, Scheduler, SchedulerError, Step};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

type PassTask = JoinHandle<(Engine, RenderedView)>;

pub struct Driver {
    scheduler: Scheduler,
    config: PanelConfig,
    gateway: Arc<dyn Gateway>,
    engine: Option<Engine>,
    in_flight: Option<PassTask>,
    periodic_at: Option<Instant>,
    busy_at: Option<Instant>,
}

impl Driver {
    pub fn new(engine: Engine) -> Self {
        let config = engine.config().clone();
        let scheduler = Scheduler::new(config.refresh_interval(), config.busy_delay());
        Self {
            scheduler,
            gateway: engine.gateway(),
            config,
            engine: Some(engine),
            in_flight: None,
            periodic_at: None,
            busy_at: None,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn periodic_deadline(&self) -> Option<Instant> {
        self.periodic_at
    }

    pub fn busy_deadline(&self) -> Option<Instant> {
        self.busy_at
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Engine access between passes.
    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    fn apply(&mut self, step: Step, app: &mut App) {
        match step {
            Step::MarkBusy { delay } => {
                self.periodic_at = None;
                self.busy_at = Some(Instant::now() + delay);
            }
            Step::Rearm { interval } => {
                self.periodic_at = Some(Instant::now() + interval);
            }
        }
        app.busy = self.scheduler.is_busy();
    }

    pub fn request(&mut self, pass: RefreshPass, app: &mut App) {
        if let Some(step) = self.scheduler.request(pass) {
            self.apply(step, app);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.scheduler.set_paused(paused);
    }

    pub fn on_periodic_deadline(&mut self, app: &mut App) {
        self.periodic_at = None;
        match self.scheduler.on_periodic_tick() {
            Some(step) => self.apply(step, app),
            // Paused: keep counting so resuming picks up on the next interval.
            None => {
                self.periodic_at = Some(Instant::now() + self.scheduler.refresh_interval());
            }
        }
    }

    /// The busy timer fired: move the engine into a task running the pass.
    pub fn on_busy_deadline(&mut self) -> Result<(), TuiError> {
        self.busy_at = None;
        let mut engine = self.engine.take().ok_or(SchedulerError::PassInFlight)?;
        let pass = match self.scheduler.begin_pass() {
            Ok(pass) => pass,
            Err(e) => {
                self.engine = Some(engine);
                return Err(e.into());
            }
        };

        tracing::debug!(
            forced = pass.invalidated.len(),
            action = pass.preceding_action.is_some(),
            "starting refresh pass"
        );
        self.in_flight = Some(tokio::spawn(async move {
            let view = engine.run_pass(pass).await;
            (engine, view)
        }));
        Ok(())
    }

    /// Resolves when the in-flight pass finishes; never resolves when idle.
    pub async fn pass_finished(&mut self) -> Result<(Engine, RenderedView), JoinError> {
        let result = match self.in_flight.as_mut() {
            Some(task) => task.await,
            None => std::future::pending().await,
        };
        self.in_flight = None;
        result
    }

    /// Return the engine, show the view, and let the scheduler decide what
    /// comes next.
    pub fn complete(&mut self, engine: Engine, view: RenderedView, app: &mut App) -> Result<(), TuiError> {
        app.stats = engine.stats();
        self.engine = Some(engine);
        app.show_view(view);
        let step = self.scheduler.finish_pass()?;
        self.apply(step, app);
        Ok(())
    }

    /// Handle whatever [`Driver::pass_finished`] produced.
    pub fn finish(
        &mut self,
        finished: Result<(Engine, RenderedView), JoinError>,
        app: &mut App,
    ) -> Result<(), TuiError> {
        match finished {
            Ok((engine, view)) => self.complete(engine, view, app),
            Err(error) => self.recover(error, app),
        }
    }

    /// The pass task died without returning the engine. Report it, rebuild
    /// the engine, and keep the scheduler cycling.
    pub fn recover(&mut self, error: JoinError, app: &mut App) -> Result<(), TuiError> {
        tracing::error!(error = %error, "refresh pass task died; rebuilding engine");
        self.report(&TuiError::Pass(error), app);
        let engine = Engine::new(self.config.clone(), Arc::clone(&self.gateway))?
            .continuing_after(app.sequence());
        app.stats = engine.stats();
        self.engine = Some(engine);
        let step = self.scheduler.finish_pass()?;
        self.apply(step, app);
        Ok(())
    }

    /// Wait for the in-flight pass and complete it.
    pub async fn settle(&mut self, app: &mut App) -> Result<(), TuiError> {
        let finished = self.pass_finished().await;
        self.finish(finished, app)
    }

    /// Log and surface a driver error without stopping the loop.
    pub fn report(&self, error: &TuiError, app: &mut App) {
        tracing::warn!(error = %error, "refresh driver error");
        app.notify(NotificationLevel::Error, error.to_string());
    }
}

/// Sleep until `deadline`, or forever when there is none.
pub async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
