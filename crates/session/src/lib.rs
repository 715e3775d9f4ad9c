//! Dashboard session connector
//!
//! Client-side construct that keeps a logical "connected" state alive,
//! polls for fresh data on a timer, and opportunistically reacts to push
//! notifications. Push transport being absent or dying is not an error:
//! the connector silently keeps operating in polling-only mode.

pub mod connector;
pub mod source;

pub use connector::{ConnectionState, SessionConfig, SessionConnector};
pub use source::{DashboardSnapshot, RefreshSource};
