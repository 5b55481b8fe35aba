//! Debounced, non-overlapping rebuild scheduling.
//!
//! Every change re-arms a single debounce timer. When it fires and no rebuild
//! is running, one starts. When one is running, a single `queued` flag is
//! set instead, and exactly one more rebuild runs after the current one
//! finishes. Further triggers while queued are absorbed.

use crate::dev::FileChange;
use std::future::{Future, pending};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// State machine behind [`drive`].
#[derive(Debug, Clone)]
pub struct RebuildScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
    running: bool,
    queued: bool,
}

impl RebuildScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
            running: false,
            queued: false,
        }
    }

    /// A relevant change happened: (re)arm the timer.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    /// When the debounce timer fires, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The timer fired. Returns `true` when a rebuild should start now.
    pub fn on_timer(&mut self) -> bool {
        self.deadline = None;
        if self.running {
            self.queued = true;
            false
        } else {
            self.running = true;
            true
        }
    }

    /// The running rebuild finished. Returns `true` when the queued rebuild
    /// should start now.
    pub fn on_finished(&mut self) -> bool {
        if self.queued {
            self.queued = false;
            true
        } else {
            self.running = false;
            false
        }
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    fn is_queued(&self) -> bool {
        self.queued
    }
}

/// Run the watch loop until `shutdown` resolves or the change channel closes
/// and all pending work is done.
///
/// `rebuild` is called once per rebuild and the returned future is spawned.
/// On shutdown an in-flight rebuild is aborted. Returns the number of
/// rebuilds started.
pub async fn drive<F, Fut>(
    mut changes: mpsc::Receiver<FileChange>,
    debounce: Duration,
    shutdown: impl Future<Output = ()>,
    mut rebuild: F,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut scheduler = RebuildScheduler::new(debounce);
    let mut in_flight: Option<JoinHandle<()>> = None;
    let mut open = true;
    let mut started = 0;
    tokio::pin!(shutdown);

    loop {
        if !open && in_flight.is_none() && scheduler.deadline().is_none() {
            break;
        }

        tokio::select! {
            _ = &mut shutdown => {
                if let Some(handle) = in_flight.take() {
                    handle.abort();
                }
                break;
            }
            change = changes.recv(), if open => match change {
                Some(change) => {
                    debug!(path = %change.path().display(), "change detected");
                    scheduler.trigger(Instant::now());
                }
                None => open = false,
            },
            _ = sleep_until_opt(scheduler.deadline()) => {
                if scheduler.on_timer() {
                    in_flight = Some(tokio::spawn(rebuild()));
                    started += 1;
                } else {
                    debug!("rebuild queued");
                }
            }
            result = join_opt(&mut in_flight) => {
                in_flight = None;
                if let Err(e) = result {
                    warn!("Rebuild task failed: {e}");
                }
                if scheduler.on_finished() {
                    in_flight = Some(tokio::spawn(rebuild()));
                    started += 1;
                }
            }
        }
    }

    started
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn join_opt(handle: &mut Option<JoinHandle<()>>) -> Result<(), JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::sleep;

    const DEBOUNCE: Duration = Duration::from_millis(6);

    fn change() -> FileChange {
        FileChange::Modified(PathBuf::from("/site/routes/index.svelte"))
    }

    type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

    /// Counts finished rebuilds and the peak number running at once.
    #[derive(Default)]
    struct Recorder {
        finished: AtomicUsize,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    /// A rebuild closure that takes `duration` and reports to `recorder`.
    fn job(recorder: &Arc<Recorder>, duration: Duration) -> impl FnMut() -> Job + use<> {
        let recorder = Arc::clone(recorder);
        move || -> Job {
            let recorder = Arc::clone(&recorder);
            Box::pin(async move {
                let active = recorder.active.fetch_add(1, Ordering::SeqCst) + 1;
                recorder.peak.fetch_max(active, Ordering::SeqCst);
                sleep(duration).await;
                recorder.active.fetch_sub(1, Ordering::SeqCst);
                recorder.finished.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[test]
    fn test_scheduler_queues_one_rebuild() {
        let mut scheduler = RebuildScheduler::new(DEBOUNCE);
        let now = Instant::now();

        scheduler.trigger(now);
        assert_eq!(scheduler.deadline(), Some(now + DEBOUNCE));
        assert!(scheduler.on_timer());
        assert!(scheduler.is_running());
        assert_eq!(scheduler.deadline(), None);

        // Two timers fire while running: one queued rebuild
        scheduler.trigger(now);
        assert!(!scheduler.on_timer());
        scheduler.trigger(now);
        assert!(!scheduler.on_timer());
        assert!(scheduler.is_queued());

        assert!(scheduler.on_finished());
        assert!(scheduler.is_running());
        assert!(!scheduler.is_queued());

        assert!(!scheduler.on_finished());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_trigger_rearms_timer() {
        let mut scheduler = RebuildScheduler::new(DEBOUNCE);
        let now = Instant::now();

        scheduler.trigger(now);
        scheduler.trigger(now + Duration::from_millis(4));
        assert_eq!(
            scheduler.deadline(),
            Some(now + Duration::from_millis(4) + DEBOUNCE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_inside_window_rebuilds_once() {
        let recorder = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(16);
        for _ in 0..5 {
            tx.send(change()).await.unwrap();
        }
        drop(tx);

        let started = drive(rx, DEBOUNCE, pending(), job(&recorder, Duration::from_millis(1))).await;

        assert_eq!(started, 1);
        assert_eq!(recorder.finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_closer_than_window_coalesce() {
        let recorder = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            for _ in 0..4 {
                tx.send(change()).await.unwrap();
                sleep(Duration::from_millis(4)).await;
            }
        });

        let started = drive(rx, DEBOUNCE, pending(), job(&recorder, Duration::from_millis(1))).await;

        assert_eq!(started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_rebuild_separately() {
        let recorder = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            tx.send(change()).await.unwrap();
            sleep(Duration::from_millis(50)).await;
            tx.send(change()).await.unwrap();
        });

        let started = drive(rx, DEBOUNCE, pending(), job(&recorder, Duration::from_millis(1))).await;

        assert_eq!(started, 2);
        assert_eq!(recorder.finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_during_rebuild_queue_exactly_one() {
        let recorder = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            // Starts a rebuild at 6ms that runs until 106ms
            tx.send(change()).await.unwrap();
            sleep(Duration::from_millis(20)).await;
            tx.send(change()).await.unwrap();
            sleep(Duration::from_millis(20)).await;
            tx.send(change()).await.unwrap();
            sleep(Duration::from_millis(20)).await;
            tx.send(change()).await.unwrap();
        });

        let started = drive(
            rx,
            DEBOUNCE,
            pending(),
            job(&recorder, Duration::from_millis(100)),
        )
        .await;

        assert_eq!(started, 2);
        assert_eq!(recorder.finished.load(Ordering::SeqCst), 2);
        assert_eq!(recorder.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_in_flight_rebuild() {
        let recorder = Arc::new(Recorder::default());
        let (tx, rx) = mpsc::channel(16);
        tx.send(change()).await.unwrap();

        let shutdown = sleep(Duration::from_secs(1));
        let started = drive(rx, DEBOUNCE, shutdown, job(&recorder, Duration::from_secs(10))).await;

        assert_eq!(started, 1);
        // Let the aborted task get dropped
        sleep(Duration::from_secs(20)).await;
        assert_eq!(recorder.finished.load(Ordering::SeqCst), 0);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_without_changes_returns() {
        let ran = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<FileChange>(1);
        drop(tx);

        let flag = Arc::clone(&ran);
        let started = drive(rx, DEBOUNCE, pending(), move || {
            let flag = Arc::clone(&flag);
            async move { flag.store(true, Ordering::SeqCst) }
        })
        .await;

        assert_eq!(started, 0);
        assert!(!ran.load(Ordering::SeqCst));
    }
}
