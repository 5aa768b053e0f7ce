//! Event-driven email relay.
//!
//! Storage notifications name newly stored raw messages; each message is
//! fetched, parsed, matched against the configured filters, and either
//! forwarded with rewritten envelope headers or suppressed.

pub mod config;
pub mod error;
pub mod event;
pub mod mime;
pub mod pipeline;
pub mod relay;
pub mod storage;
pub mod transport;

pub use error::{Error, Result};
