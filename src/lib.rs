pub mod config;
pub mod error;
pub mod html;
pub mod metrics;
pub mod monitor;
pub mod output;
pub mod panel;
pub mod poller;
pub mod render;

pub use error::{Error, Result};
pub use metrics::collector::PollStats;
pub use metrics::snapshot::{MetricsSnapshot, Profile, Window};
pub use monitor::{Monitor, MonitorState};
pub use panel::{ClickTarget, Dashboard, LiveRegion, Toggle};
pub use poller::{PollOutcome, Poller, REFRESH_MS};
