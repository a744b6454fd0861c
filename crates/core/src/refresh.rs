//! Fire-and-forget refresh of the backing file.
//!
//! A trigger hands the ingestion collaborator to a detached worker thread and
//! returns at once. Whether the worker succeeded is never reported back; the
//! next query simply sees whatever the file holds by then.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::ports::TrendingIngestor;

/// What to do when a refresh is triggered while another is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Every trigger starts its own worker, even against the same file.
    #[default]
    Unbounded,
    /// At most one worker at a time; extra triggers are acknowledged only.
    SingleFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAck {
    Scheduled,
    AlreadyRunning,
}

pub struct RefreshOrchestrator {
    ingestor: Arc<dyn TrendingIngestor>,
    policy: RefreshPolicy,
    in_flight: Arc<AtomicUsize>,
}

impl RefreshOrchestrator {
    pub fn new(ingestor: Arc<dyn TrendingIngestor>, policy: RefreshPolicy) -> Self {
        Self {
            ingestor,
            policy,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Workers scheduled or running right now. Zero means idle.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Schedules an ingestion run for `region` and returns without waiting.
    pub fn trigger(&self, region: &str, limit: usize) -> RefreshAck {
        if !self.reserve_slot() {
            info!(region, "Refresh already in flight, not scheduling another");
            return RefreshAck::AlreadyRunning;
        }

        let ingestor = Arc::clone(&self.ingestor);
        let in_flight = Arc::clone(&self.in_flight);
        let region = region.to_string();

        let spawned = thread::Builder::new()
            .name("trending-refresh".to_string())
            .spawn({
                let in_flight = Arc::clone(&in_flight);
                move || {
                    let _slot = SlotGuard(in_flight);
                    info!(%region, limit, "Refresh running");
                    match ingestor.ingest(&region, limit) {
                        Ok(()) => info!(%region, "Refresh finished"),
                        Err(e) => warn!(%region, "Refresh failed: {e}"),
                    }
                }
            });

        if let Err(e) = spawned {
            // The closure never ran, so its guard never released the slot.
            in_flight.fetch_sub(1, Ordering::SeqCst);
            warn!("Failed to spawn refresh worker: {e}");
        } else {
            info!(limit, "Refresh scheduled");
        }

        RefreshAck::Scheduled
    }

    fn reserve_slot(&self) -> bool {
        match self.policy {
            RefreshPolicy::Unbounded => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                true
            }
            RefreshPolicy::SingleFlight => self
                .in_flight
                .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok(),
        }
    }
}

/// Releases an in-flight slot when the worker ends, panics included.
struct SlotGuard(Arc<AtomicUsize>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::ports::Result;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Blocks inside `ingest` until the test releases it.
    struct GatedIngestor {
        started: Mutex<Sender<String>>,
        release: Mutex<Receiver<()>>,
        fail: bool,
    }

    fn gated(fail: bool) -> (Arc<GatedIngestor>, Receiver<String>, Sender<()>) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let ingestor = Arc::new(GatedIngestor {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
            fail,
        });
        (ingestor, started_rx, release_tx)
    }

    impl TrendingIngestor for GatedIngestor {
        fn ingest(&self, region: &str, limit: usize) -> Result<()> {
            self.started
                .lock()
                .unwrap()
                .send(format!("{region}:{limit}"))
                .unwrap();
            self.release.lock().unwrap().recv().unwrap();
            if self.fail {
                Err(CoreError::Collaborator("scrape blew up".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn wait_until_idle(orchestrator: &RefreshOrchestrator) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while orchestrator.in_flight() != 0 {
            assert!(Instant::now() < deadline, "refresh worker never finished");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_trigger_returns_before_ingestion_completes() {
        let (ingestor, started, release) = gated(false);
        let orchestrator = RefreshOrchestrator::new(ingestor, RefreshPolicy::Unbounded);

        assert_eq!(orchestrator.trigger("IN", 100), RefreshAck::Scheduled);

        // The worker is parked until released, yet trigger already returned.
        assert_eq!(started.recv_timeout(Duration::from_secs(5)).unwrap(), "IN:100");
        assert_eq!(orchestrator.in_flight(), 1);

        release.send(()).unwrap();
        wait_until_idle(&orchestrator);
    }

    #[test]
    fn test_failed_ingestion_is_swallowed() {
        let (ingestor, started, release) = gated(true);
        let orchestrator = RefreshOrchestrator::new(ingestor, RefreshPolicy::Unbounded);

        assert_eq!(orchestrator.trigger("US", 10), RefreshAck::Scheduled);
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        release.send(()).unwrap();
        wait_until_idle(&orchestrator);
    }

    #[test]
    fn test_unbounded_policy_allows_overlapping_refreshes() {
        let (ingestor, started, release) = gated(false);
        let orchestrator = RefreshOrchestrator::new(ingestor, RefreshPolicy::Unbounded);

        assert_eq!(orchestrator.trigger("IN", 1), RefreshAck::Scheduled);
        assert_eq!(orchestrator.trigger("IN", 1), RefreshAck::Scheduled);
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(orchestrator.in_flight(), 2);

        release.send(()).unwrap();
        release.send(()).unwrap();
        wait_until_idle(&orchestrator);
    }

    #[test]
    fn test_single_flight_policy_rejects_second_trigger() {
        let (ingestor, started, release) = gated(false);
        let orchestrator = RefreshOrchestrator::new(ingestor, RefreshPolicy::SingleFlight);

        assert_eq!(orchestrator.trigger("IN", 1), RefreshAck::Scheduled);
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(orchestrator.trigger("IN", 1), RefreshAck::AlreadyRunning);

        release.send(()).unwrap();
        wait_until_idle(&orchestrator);

        assert_eq!(orchestrator.trigger("IN", 1), RefreshAck::Scheduled);
        started.recv_timeout(Duration::from_secs(5)).unwrap();
        release.send(()).unwrap();
        wait_until_idle(&orchestrator);
    }
}
