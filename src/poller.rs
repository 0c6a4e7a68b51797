use crate::error::{Error, Result};
use crate::metrics::collector::PollStats;
use crate::metrics::snapshot::MetricsSnapshot;
use futures::future;
use futures::stream::StreamExt;
use reqwest::{header, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use url::Url;

/// Refresh cadence of the panel.
pub const REFRESH_MS: u64 = 3000;

/// Result of one poll cycle. `seq` counts ticks from 1; outcomes may arrive
/// out of order when a slow request overlaps the next tick.
#[derive(Debug)]
pub struct PollOutcome {
    pub seq: u64,
    pub elapsed: Duration,
    pub result: Result<MetricsSnapshot>,
}

#[derive(Debug, Clone)]
pub struct Poller {
    client: Client,
    endpoint: Url,
    period: Duration,
}

impl Poller {
    pub fn new(endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("metrics-panel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            period: Duration::from_millis(REFRESH_MS),
        })
    }

    #[cfg(test)]
    fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One GET against the endpoint. Any non-2xx status, transport error or
    /// unparseable body is an error.
    pub async fn fetch(&self) -> Result<MetricsSnapshot> {
        log::debug!("Fetching {}", self.endpoint);

        let res = self
            .client
            .get(self.endpoint.clone())
            .header(header::CACHE_CONTROL, "no-store")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = res.bytes().await?;
        log::debug!("Metrics body: {} bytes", body.len());
        Ok(serde_json::from_slice(&body)?)
    }

    /// Starts the timer loop. Each tick fetches in its own task, so a hung
    /// request never delays the next tick. The loop ends once `tx` is closed.
    pub fn spawn(self, tx: mpsc::Sender<PollOutcome>, stats: PollStats) -> JoinHandle<()> {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let poller = Arc::new(self);

        tokio::spawn(async move {
            IntervalStream::new(interval)
                .enumerate()
                .take_while(|_| future::ready(!tx.is_closed()))
                .for_each(|(tick, _)| {
                    let poller = poller.clone();
                    let tx = tx.clone();
                    let stats = stats.clone();
                    async move {
                        tokio::spawn(async move {
                            stats.record_started();
                            let start = Instant::now();
                            let result = poller.fetch().await;
                            let elapsed = start.elapsed();
                            match &result {
                                Ok(_) => stats.record_success(elapsed),
                                Err(_) => stats.record_failure(elapsed),
                            }
                            let outcome = PollOutcome {
                                seq: tick as u64 + 1,
                                elapsed,
                                result,
                            };
                            if tx.send(outcome).await.is_err() {
                                log::debug!("Poll outcome dropped, receiver closed");
                            }
                        });
                    }
                })
                .await;

            log::debug!("Poll loop stopped.");
        })
    }
}
