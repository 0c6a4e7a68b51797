use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use metrics_panel::config::{ConfigLoader, DashboardConfig, OutputConfig};
use metrics_panel::html::DomId;
use metrics_panel::metrics::collector::PollStatsSnapshot;
use metrics_panel::output::{console::ConsoleOutput, file::FileOutput, RenderSink};
use metrics_panel::{ClickTarget, LiveRegion, MetricsSnapshot, Monitor, Poller};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "metrics-panel")]
#[command(version = "0.1.0")]
#[command(about = "Live status panel for the WPBot metrics endpoint", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the metrics endpoint every 3s and keep the panel output updated
    Watch {
        /// Path to the configuration file (JSON/YAML/TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Read toggle commands from stdin ("profiles" or a profile key)
        #[arg(short, long)]
        interactive: bool,

        /// Show a poll status spinner (stderr)
        #[arg(short, long)]
        progress: bool,
    },
    /// Fetch once and print the panel
    Once {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Render a saved metrics payload without contacting the backend
    Render {
        /// JSON file holding one /metrics response
        #[arg(short, long)]
        input: PathBuf,

        /// Open the profiles panel
        #[arg(long)]
        open: bool,

        /// Expand the given profile (implies --open); repeatable
        #[arg(short, long)]
        expand: Vec<String>,

        #[arg(long, default_value = "live-metrics")]
        container_id: String,
    },
    /// Validate a configuration file
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn resolve_container_id(config: &DashboardConfig) -> anyhow::Result<DomId> {
    DomId::parse(&config.container_id)
        .ok_or_else(|| anyhow::anyhow!("invalid container id: {}", config.container_id))
}

fn stdin_commands() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
        log::debug!("stdin closed");
    });
    rx
}

fn status_line(stats: &PollStatsSnapshot) -> String {
    format!(
        "Polls: {} | OK: {:.1}% | Avg: {}ms | In flight: {}",
        stats.polls_succeeded + stats.polls_failed,
        stats.success_rate,
        stats.avg_latency_ms,
        stats.in_flight
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    let cli = Cli::parse();
    let logger = env_logger::Builder::from_default_env().build();
    let multi = Arc::new(indicatif::MultiProgress::new());

    let progress = matches!(cli.command, Commands::Watch { progress: true, .. });
    let level = logger.filter();
    if progress {
        indicatif_log_bridge::LogWrapper::new((*multi).clone(), logger).try_init()?;
    } else {
        log::set_boxed_logger(Box::new(logger))?;
    }
    log::set_max_level(level);

    match cli.command {
        Commands::Watch { config, interactive, progress } => {
            let config_data = ConfigLoader::load(config.as_deref())?;
            let endpoint = ConfigLoader::metrics_endpoint(&config_data)?;
            let poller = Poller::new(endpoint)?;

            let mut sink: Box<dyn RenderSink> = match &config_data.output {
                OutputConfig::Console => {
                    Box::new(ConsoleOutput::new(progress.then(|| multi.clone())))
                }
                OutputConfig::File { path } => {
                    log::info!("Writing panel to {}", path);
                    Box::new(FileOutput::new(PathBuf::from(path)))
                }
            };

            let mut monitor = Monitor::new(resolve_container_id(&config_data)?);

            let mut spinner = None;
            if progress {
                let pb = multi.add(ProgressBar::new_spinner());
                pb.set_style(ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")?);
                pb.enable_steady_tick(Duration::from_millis(120));

                let mut stats_rx = monitor.watch_stats();
                let pb_clone = pb.clone();
                let task = tokio::spawn(async move {
                    while stats_rx.changed().await.is_ok() {
                        let stats = stats_rx.borrow().clone();
                        pb_clone.set_message(status_line(&stats));
                    }
                });
                spinner = Some((pb, task));
            }

            let commands = interactive.then(stdin_commands);
            if interactive {
                log::info!("Interactive: type \"profiles\" or a profile key, then Enter");
            }

            monitor.run(poller, sink.as_mut(), commands).await?;

            let final_stats = monitor.stats();
            if let Some((pb, task)) = spinner {
                task.abort();
                pb.finish_with_message(format!("{} - Stopped", status_line(&final_stats)));
            }

            println!("\n✅ Panel stopped:");
            println!("   Polls OK: {}", final_stats.polls_succeeded);
            println!("   Polls failed: {}", final_stats.polls_failed);
            println!("   Average latency: {}ms", final_stats.avg_latency_ms);
            println!("   Total time: {:.1}s", final_stats.elapsed_seconds);
        }
        Commands::Once { config } => {
            let config_data = ConfigLoader::load(config.as_deref())?;
            let endpoint = ConfigLoader::metrics_endpoint(&config_data)?;
            let poller = Poller::new(endpoint)?;

            let mut region = LiveRegion::new(resolve_container_id(&config_data)?);
            let result = poller.fetch().await;
            let failed = result.is_err();
            region.apply(result);
            println!("{}", region.to_html());
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Render { input, open, expand, container_id } => {
            let raw = std::fs::read_to_string(&input)?;
            let snapshot: MetricsSnapshot = serde_json::from_str(&raw)?;
            let id = DomId::parse(&container_id)
                .ok_or_else(|| anyhow::anyhow!("invalid container id: {}", container_id))?;

            let mut region = LiveRegion::new(id);
            region.show_snapshot(snapshot);
            if open || !expand.is_empty() {
                region.click(&ClickTarget::ProfilesButton);
            }
            for key in &expand {
                let row = region.dashboard().and_then(|d| d.profile_row(key));
                match row {
                    Some(row) => {
                        region.click(&ClickTarget::ProfileRow(row));
                    }
                    None => log::warn!("No profile with key {:?}", key),
                }
            }
            println!("{}", region.to_html());
        }
        Commands::Check { config } => {
            match ConfigLoader::load(Some(config.as_path())).and_then(|cfg| {
                ConfigLoader::metrics_endpoint(&cfg).map(|url| (cfg, url))
            }) {
                Ok((cfg, url)) => {
                    println!("✅ Config is valid:");
                    println!("   Endpoint: {}", url);
                    println!("   Container: #{}", cfg.container_id);
                    println!("   Output: {:?}", cfg.output);
                }
                Err(e) => {
                    eprintln!("❌ Config error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
