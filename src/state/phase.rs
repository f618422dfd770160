/// Crawl phase definitions
///
/// This module defines the states of the wave-by-wave crawl state machine.
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Waves are still being dispatched
    Running,

    // ===== Terminal States =====
    /// A wave reported failures; a checkpoint was written and crawling stopped
    HaltedOnFailure,

    /// The frontier ran dry
    Exhausted,

    /// Every remaining candidate was at or beyond the maximum depth
    DepthLimitReached,
}

impl CrawlPhase {
    /// Returns true once no further waves will be dispatched
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Returns true if the crawl finished without a failure halt
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exhausted | Self::DepthLimitReached)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::HaltedOnFailure => "halted_on_failure",
            Self::Exhausted => "exhausted",
            Self::DepthLimitReached => "depth_limit_reached",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
