use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

/// Counters for the poll loop itself (not the backend's metrics).
#[derive(Clone)]
pub struct PollStats {
    polls_started: Arc<AtomicU64>,
    polls_succeeded: Arc<AtomicU64>,
    polls_failed: Arc<AtomicU64>,
    in_flight: Arc<AtomicU64>,
    total_latency_ms: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollStatsSnapshot {
    pub polls_started: u64,
    pub polls_succeeded: u64,
    pub polls_failed: u64,
    pub in_flight: u64,
    pub success_rate: f64,
    pub avg_latency_ms: u64,
    pub elapsed_seconds: f64,
}

impl Default for PollStats {
    fn default() -> Self {
        Self {
            polls_started: Arc::new(AtomicU64::new(0)),
            polls_succeeded: Arc::new(AtomicU64::new(0)),
            polls_failed: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicU64::new(0)),
            total_latency_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl PollStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&self) {
        self.polls_started.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_success(&self, latency: Duration) {
        self.polls_succeeded.fetch_add(1, Ordering::SeqCst);
        self.finish(latency);
    }

    pub fn record_failure(&self, latency: Duration) {
        self.polls_failed.fetch_add(1, Ordering::SeqCst);
        self.finish(latency);
    }

    fn finish(&self, latency: Duration) {
        self.total_latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::SeqCst);
        // Saturating: an outcome may be recorded without a matching start in tests.
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)));
    }

    pub fn snapshot(&self) -> PollStatsSnapshot {
        let succeeded = self.polls_succeeded.load(Ordering::SeqCst);
        let failed = self.polls_failed.load(Ordering::SeqCst);
        let finished = succeeded + failed;
        let total_latency = self.total_latency_ms.load(Ordering::SeqCst);

        PollStatsSnapshot {
            polls_started: self.polls_started.load(Ordering::SeqCst),
            polls_succeeded: succeeded,
            polls_failed: failed,
            in_flight: self.in_flight.load(Ordering::SeqCst),
            success_rate: if finished > 0 {
                (succeeded as f64 / finished as f64) * 100.0
            } else {
                0.0
            },
            avg_latency_ms: if finished > 0 {
                total_latency / finished
            } else {
                0
            },
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}
