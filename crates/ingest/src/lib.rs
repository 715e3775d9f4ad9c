//! Ingestion gateway
//!
//! The single write path into the engine: validate the inbound payload,
//! append it to the event store (with a bounded retry on transient store
//! failures), then notify live dashboard sessions on a best-effort basis.
//! Notification failure never affects the caller's result.

pub mod gateway;

pub use gateway::{GatewayConfig, IngestionGateway};
