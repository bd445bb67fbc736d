//! Request status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a document request or enrollment record.
///
/// Not every document type uses every state; the workflow tables decide
/// which transitions are legal per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    /// Submitted by the user, awaiting staff review.
    Pending,
    /// Approved by an administrator.
    Approved,
    /// Rejected by an administrator (with a reason).
    Rejected,
    /// Declaration-of-intent stub issued to the requester.
    StubGenerated,
    /// Document prepared and ready for pickup.
    Ready,
    /// Fulfilled and picked up.
    Completed,
}

impl RequestStatus {
    /// Check if the record is in a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Return the status as its kebab-case wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::StubGenerated => "stub-generated",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }

    /// Every status, in pipeline order.
    pub fn all() -> [RequestStatus; 6] {
        [
            Self::Pending,
            Self::Approved,
            Self::Rejected,
            Self::StubGenerated,
            Self::Ready,
            Self::Completed,
        ]
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = regidesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "stub-generated" => Ok(Self::StubGenerated),
            "ready" => Ok(Self::Ready),
            "completed" => Ok(Self::Completed),
            _ => Err(regidesk_core::AppError::validation(format!(
                "Invalid request status: '{s}'"
            ))),
        }
    }
}
