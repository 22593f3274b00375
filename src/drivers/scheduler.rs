use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use crate::drivers::PipelineError;
/// Recurring task runner: fires once immediately, then once per interval.
#[derive(Clone, Copy, Debug)]
pub struct TickScheduler {
    interval: Duration,
    max_ticks: Option<u64>,
}
impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }
    /// Moves `task` onto its own thread. The task sees only its own state.
    pub fn spawn<F>(self, mut task: F) -> SchedulerHandle
    where
        F: FnMut() -> Result<(), PipelineError> + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.interval;
        let max_ticks = self.max_ticks;
        let join = thread::spawn(move || {
            let mut ticks = 0u64;
            loop {
                if max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
                if let Err(err) = task() {
                    log::warn!("scheduled task failed after {ticks} ticks: {err}");
                    return Err(err);
                }
                ticks += 1;
                if max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            log::info!("scheduler stopped after {ticks} ticks");
            Ok(ticks)
        });
        SchedulerHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }
}
/// Owner of a running schedule. Dropping it stops the loop without waiting.
pub struct SchedulerHandle {
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<Result<u64, PipelineError>>>,
}
impl SchedulerHandle {
    /// Signals the loop to stop and waits for it. Returns the number of ticks run.
    pub fn stop(&mut self) -> Result<u64, PipelineError> {
        if let Some(tx) = self.stop_tx.take() {
            tx.send(()).ok();
        }
        self.join()
    }
    /// Waits for the loop to end on its own (tick limit or task error).
    pub fn join(&mut self) -> Result<u64, PipelineError> {
        let handle = self.join.take().ok_or(PipelineError::SchedulerStopped)?;
        handle
            .join()
            .map_err(|_| PipelineError::SchedulerPanicked)?
    }
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }
}
impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            tx.send(()).ok();
        }
    }
}
