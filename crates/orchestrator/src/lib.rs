//! Orchestrator - worker pool, result collection and scan lifecycle

mod collector;
mod orchestrator;
mod progress;
mod rate_limiter;

pub use collector::ResultCollector;
pub use orchestrator::Orchestrator;
pub use progress::ProgressTracker;
pub use rate_limiter::RateLimiter;
