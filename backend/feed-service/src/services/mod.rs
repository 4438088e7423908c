pub mod daily_sampler;
pub mod poller;

pub use daily_sampler::DailySampler;
pub use poller::{PollerGuard, SharedPoller};
