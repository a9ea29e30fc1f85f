use crate::error::{Result, ScanError};
use crate::session::ScanSession;
use crate::types::{FileMetadata, ScanPhase, ScanResult, ScanUpdate};
use log::debug;
use rand::Rng;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Progress(ScanUpdate),
    Completed(ScanResult),
}

/// Receiving end of a running scan. Dropping it stops further ticks.
pub struct ScanHandle {
    events: mpsc::UnboundedReceiver<ScanEvent>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    /// Next event, or `None` once the result was delivered or the scan was cancelled.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.events.recv().await
    }

    /// Stops scheduling ticks. Events already queued can still be read.
    pub fn cancel(&mut self) {
        self.task.abort();
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Validates `meta` and starts ticking a fresh session every `interval`.
///
/// Must be called from within a tokio runtime. The first tick fires one full interval
/// after the call. Emits progress events followed by exactly one `Completed`.
pub fn start_scan<R>(meta: Option<FileMetadata>, rng: R, interval: Duration) -> Result<ScanHandle>
where
    R: Rng + Send + 'static,
{
    let mut session = ScanSession::new(rng);
    session.start(meta)?;
    spawn_session(session, interval)
}

/// Drives a started session. Anything not scanning could never deliver a result.
pub(crate) fn spawn_session<R>(
    mut session: ScanSession<R>,
    interval: Duration,
) -> Result<ScanHandle>
where
    R: Rng + Send + 'static,
{
    if session.phase() != ScanPhase::Scanning {
        return Err(ScanError::InvalidInput(format!(
            "session is {:?}, not scanning",
            session.phase()
        )));
    }
    let interval = interval.max(MIN_INTERVAL);
    let (sender, events) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(update) = session.tick() else {
                break;
            };
            if sender.send(ScanEvent::Progress(update)).is_err() {
                debug!("scan receiver dropped, stopping ticks");
                return;
            }
            if session.is_done() {
                break;
            }
        }

        if let Some(result) = session.into_result() {
            let _ = sender.send(ScanEvent::Completed(result));
        }
    });

    Ok(ScanHandle { events, task })
}
