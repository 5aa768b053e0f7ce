//! Forward/suppress decision pipeline.
//!
//! Every retrieved message flows through:
//! 1. `mime::parse` — raw bytes to a typed part tree
//! 2. `ContentExtractor::extract` — normalized body text for matching
//! 3. `DecisionEngine::decide` — filter predicate + outbound rewrite
//!
//! Suppression is a normal outcome, never an error.

pub mod decision;
pub mod types;

pub use decision::DecisionEngine;
pub use types::{FilterConfig, ForwardOutcome, OutboundMessage};
