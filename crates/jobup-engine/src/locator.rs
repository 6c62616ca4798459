use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Cadence used when a [`WaitSpec`] does not override it. The portal renders
/// asynchronously with no completion signal, so one probe per second over a
/// generous budget is the detection strategy throughout.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One way of identifying one UI element.
///
/// The set is closed: every variant is matched exhaustively where it is
/// translated into a driver-native query, so adding a strategy is a
/// compile-time-checked change. The only runtime failure left is malformed
/// selector syntax, which the driver reports as a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    Id(String),
    Name(String),
    XPath(String),
    Tag(String),
    Class(String),
    Css(String),
    LinkText(String),
}

impl Locator {
    /// The raw selector string, without its kind.
    pub fn value(&self) -> &str {
        match self {
            Locator::Id(v)
            | Locator::Name(v)
            | Locator::XPath(v)
            | Locator::Tag(v)
            | Locator::Class(v)
            | Locator::Css(v)
            | Locator::LinkText(v) => v,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Locator::Id(_) => "ID",
            Locator::Name(_) => "NAME",
            Locator::XPath(_) => "XPATH",
            Locator::Tag(_) => "TAG",
            Locator::Class(_) => "CLASS",
            Locator::Css(_) => "CSS",
            Locator::LinkText(_) => "LINKTEXT",
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.kind(), self.value())
    }
}

/// Governs one bounded polling attempt.
#[derive(Debug, Clone)]
pub struct WaitSpec {
    pub locator: Locator,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitSpec {
    pub fn new(locator: Locator, timeout: Duration) -> Self {
        Self {
            locator,
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the cadence. The interval must be nonzero, otherwise the
    /// polling budget would never be consumed.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "poll interval must be nonzero");
        self.poll_interval = interval;
        self
    }
}
