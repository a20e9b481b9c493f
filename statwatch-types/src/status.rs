//! Feed status - the single active state of a telemetry feed.

/// The state a telemetry feed is in.
///
/// Exactly one status is active at a time. `Unauthenticated` is terminal:
/// a feed only leaves it through an explicit stop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", content = "message", rename_all = "snake_case"))]
pub enum FeedStatus {
    /// Not started, or stopped.
    #[default]
    Idle,
    /// Polling, last tick succeeded.
    Running,
    /// Polling, last tick hit a transient failure.
    Error(String),
    /// The source rejected our credentials. Polling has stopped.
    Unauthenticated,
}

impl FeedStatus {
    /// Whether the feed is still scheduling ticks in this state.
    pub fn is_polling(&self) -> bool {
        matches!(self, FeedStatus::Running | FeedStatus::Error(_))
    }

    /// Whether this state can only be left through `stop()`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FeedStatus::Unauthenticated)
    }

    /// The error message, if the last tick failed transiently.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            FeedStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Short label for status bars.
    pub fn label(&self) -> &'static str {
        match self {
            FeedStatus::Idle => "idle",
            FeedStatus::Running => "running",
            FeedStatus::Error(_) => "error",
            FeedStatus::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedStatus::Error(msg) => write!(f, "error: {}", msg),
            other => f.write_str(other.label()),
        }
    }
}
