pub mod collector;
pub mod snapshot;

pub use collector::{PollStats, PollStatsSnapshot};
pub use snapshot::{MetricsSnapshot, Profile, Window};
