//! Pacer - the one-second scheduler for a live exercise
//!
//! A pacer task owns the engine outright. Commands arrive over a channel and
//! ticks come from a timer that exists only while the engine is running, so:
//! - pause, reset, and pattern switches drop the timer immediately
//! - dropping every handle (or calling `shutdown`) ends the task and its timer
//! - each command and each tick sees the latest state, never a stale copy
//!
//! Snapshots are published on a watch channel after every change.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::engine::{BreathingEngine, Command, Snapshot};
use crate::error::PatternError;
use crate::pattern::BreathingPattern;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Errors returned through a pacer handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacerError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("Pacer task is no longer running")]
    Stopped,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<(), PatternError>>,
}

/// Builder for a pacer task
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    period: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Pacer {
    /// Pacer that issues one tick per `period` while running. Periods
    /// shorter than one millisecond are raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Move the engine into a new task and return its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, engine: BreathingEngine) -> PacerHandle {
        let (tx, rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        info!(
            pattern = %engine.state().pattern().id,
            period_ms = self.period.as_millis() as u64,
            "Pacer started"
        );

        let task = tokio::spawn(run(engine, rx, snapshot_tx, self.period));

        PacerHandle {
            tx,
            snapshots: snapshot_rx,
            task,
        }
    }
}

/// Control side of a running pacer
pub struct PacerHandle {
    tx: mpsc::Sender<Request>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<BreathingEngine>,
}

impl PacerHandle {
    pub async fn start(&self) -> Result<(), PacerError> {
        self.send(Command::Start).await
    }

    pub async fn pause(&self) -> Result<(), PacerError> {
        self.send(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<(), PacerError> {
        self.send(Command::Reset).await
    }

    /// Switch pattern; the exercise stops and starts over
    pub async fn select_pattern(&self, pattern: BreathingPattern) -> Result<(), PacerError> {
        self.send(Command::SelectPattern(pattern)).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every command and tick
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Stop the task and take the engine back
    pub async fn shutdown(self) -> Result<BreathingEngine, PacerError> {
        let PacerHandle { tx, task, .. } = self;
        drop(tx);
        task.await.map_err(|_| PacerError::Stopped)
    }

    async fn send(&self, command: Command) -> Result<(), PacerError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| PacerError::Stopped)?;
        response.await.map_err(|_| PacerError::Stopped)??;
        Ok(())
    }
}

async fn run(
    mut engine: BreathingEngine,
    mut requests: mpsc::Receiver<Request>,
    snapshots: watch::Sender<Snapshot>,
    period: Duration,
) -> BreathingEngine {
    let mut timer: Option<Interval> = None;

    loop {
        tokio::select! {
            biased;

            request = requests.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };

                let result = engine.dispatch(command).map(|_| ());

                match (engine.state().is_running(), timer.is_some()) {
                    (true, false) => timer = Some(start_timer(period)),
                    (false, true) => {
                        debug!("Timer cancelled");
                        timer = None;
                    }
                    _ => {}
                }

                snapshots.send_replace(engine.snapshot());
                let _ = reply.send(result);
            }

            _ = next_tick(&mut timer) => {
                engine.tick();
                snapshots.send_replace(engine.snapshot());
            }
        }
    }

    info!(
        pattern = %engine.state().pattern().id,
        cycles = engine.state().completed_cycles(),
        "Pacer stopped"
    );
    engine
}

/// First tick lands one full period after start; late ticks are not bunched
fn start_timer(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(period_ms = period.as_millis() as u64, "Timer armed");
    interval
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
