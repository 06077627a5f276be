use std::fmt;

use playtally_core::ItemId;

/// Progress notifications emitted while a harvest runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    /// The run picked up a stored, unfinished record.
    Resumed { item_id: ItemId, page: u32 },
    /// About to request a page (after the rate-limit delay).
    Requesting { item_id: ItemId, page: u32 },
    /// A page was folded in and checkpointed.
    PageProcessed {
        item_id: ItemId,
        page: u32,
        remaining: i64,
    },
    Finished { item_id: ItemId, page: u32 },
    Aborted {
        item_id: ItemId,
        page: u32,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
