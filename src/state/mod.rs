//! State module for tracking crawl progress
//!
//! This module provides the mutable state of a breadth-first crawl.
//!
//! # Components
//!
//! - `CrawlState`: A node in the crawl graph (url, referrer, depth)
//! - `VisitedSet`: Every URL ever admitted into a frontier
//! - `FailureQueue`: Bounded, shared buffer of states whose processing failed
//! - `CrawlPhase`: The scheduler's state machine over crawl waves

mod crawl_state;
mod failure_queue;
mod phase;

// Re-export main types
pub use crawl_state::{CrawlState, VisitedSet};
pub use failure_queue::{FailureQueue, DEFAULT_FAILURE_CAPACITY};
pub use phase::CrawlPhase;
