/// Crawl engine phase definitions
///
/// The engine walks `Init -> Fetching -> (Fetching | Stopping) -> Stopped`.
use std::fmt;

/// Current phase of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Checkpoint loaded, dedup set and resume cursor being built
    Init,

    /// Requesting and processing result pages one at a time
    Fetching,

    /// A terminal condition was hit; the checkpoint is being flushed
    Stopping,

    /// Checkpoint flushed, run finished
    Stopped,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Fetching)
                | (Self::Fetching, Self::Fetching)
                | (Self::Fetching, Self::Stopping)
                | (Self::Stopping, Self::Stopped)
        )
    }

    /// Returns true once the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetching => "fetching",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
