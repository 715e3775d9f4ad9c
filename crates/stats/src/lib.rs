//! Windowed statistics aggregator
//!
//! Derives rolling-window statistics (counts by type, top users by value,
//! average purchase ticket, hourly histogram) from the event store on
//! demand. Every query recomputes from a fresh store snapshot — results are
//! never cached across calls.

pub mod accumulate;
pub mod aggregator;
pub mod window;

pub use aggregator::StatsAggregator;
pub use window::WindowBounds;
