use crate::error::Result;
use crate::html::DomId;
use crate::metrics::collector::{PollStats, PollStatsSnapshot};
use crate::output::RenderSink;
use crate::panel::{ClickTarget, LiveRegion, Toggle};
use crate::poller::{PollOutcome, Poller};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// Command that toggles the profiles panel in interactive mode. Any other
/// line is taken as a profile key.
pub const PROFILES_COMMAND: &str = "profiles";

/// Owns the live region. Poll outcomes and interactive clicks are applied
/// here, one at a time, and every change is flushed to the sink.
pub struct Monitor {
    region: LiveRegion,
    stats: PollStats,
    state_watcher: watch::Sender<MonitorState>,
    latest_seq: u64,
}

impl Monitor {
    pub fn new(container_id: DomId) -> Self {
        let (state_tx, _) = watch::channel(MonitorState::Idle);
        Self {
            region: LiveRegion::new(container_id),
            stats: PollStats::new(),
            state_watcher: state_tx,
            latest_seq: 0,
        }
    }

    pub fn region(&self) -> &LiveRegion {
        &self.region
    }

    pub fn stats(&self) -> PollStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn watch_state(&self) -> watch::Receiver<MonitorState> {
        self.state_watcher.subscribe()
    }

    pub fn watch_stats(&self) -> watch::Receiver<PollStatsSnapshot> {
        let (tx, rx) = watch::channel(self.stats.snapshot());
        let stats = self.stats.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;
                if tx.send(stats.snapshot()).is_err() {
                    break;
                }
            }
        });
        rx
    }

    pub fn handle_outcome(&mut self, outcome: PollOutcome) {
        if outcome.seq < self.latest_seq {
            log::debug!(
                "Poll #{} finished after #{}, rendering it anyway",
                outcome.seq,
                self.latest_seq
            );
        }
        self.latest_seq = self.latest_seq.max(outcome.seq);

        match &outcome.result {
            Ok(snapshot) => log::debug!(
                "Poll #{} ok in {}ms: {}/{} profiles ready",
                outcome.seq,
                outcome.elapsed.as_millis(),
                snapshot.prof_ready,
                snapshot.prof_total
            ),
            Err(e) => log::warn!("Poll #{} failed: {}", outcome.seq, e),
        }
        self.region.apply(outcome.result);
    }

    pub fn handle_command(&mut self, line: &str) -> Toggle {
        let command = line.trim();
        if command.is_empty() {
            return Toggle::Ignored;
        }
        if command == PROFILES_COMMAND {
            return self.region.click(&ClickTarget::ProfilesButton);
        }

        let row = self.region.dashboard().and_then(|d| d.profile_row(command));
        match row {
            Some(row) => self.region.click(&ClickTarget::ProfileRow(row)),
            None => {
                log::info!("Unknown profile: {}", command);
                Toggle::Ignored
            }
        }
    }

    pub async fn run(
        &mut self,
        poller: Poller,
        sink: &mut dyn RenderSink,
        commands: Option<mpsc::Receiver<String>>,
    ) -> Result<()> {
        self.run_until(poller, sink, commands, async {
            if tokio::signal::ctrl_c().await.is_err() {
                log::error!("Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            log::info!("Shutting down...");
        })
        .await
    }

    pub async fn run_until<F>(
        &mut self,
        poller: Poller,
        sink: &mut dyn RenderSink,
        mut commands: Option<mpsc::Receiver<String>>,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.set_state(MonitorState::Running);
        log::info!("Polling {}", poller.endpoint());

        let (tx, mut rx) = mpsc::channel(32);
        let poll_task = poller.spawn(tx, self.stats.clone());
        self.flush(sink).await;

        let mut commands_open = commands.is_some();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                outcome = rx.recv() => match outcome {
                    Some(outcome) => {
                        self.handle_outcome(outcome);
                        self.flush(sink).await;
                    }
                    None => break,
                },
                line = next_command(&mut commands), if commands_open => match line {
                    Some(line) => {
                        let toggle = self.handle_command(&line);
                        log::debug!("{:?} -> {:?}", line.trim(), toggle);
                        if toggle != Toggle::Ignored {
                            self.flush(sink).await;
                        }
                    }
                    None => commands_open = false,
                },
            }
        }

        poll_task.abort();
        self.set_state(MonitorState::Stopped);
        sink.close().await
    }

    async fn flush(&self, sink: &mut dyn RenderSink) {
        if let Err(e) = sink.write(&self.region.to_html()).await {
            log::error!("Failed to write output: {}", e);
        }
    }

    fn set_state(&self, state: MonitorState) {
        self.state_watcher.send_replace(state);
    }
}

async fn next_command(commands: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
