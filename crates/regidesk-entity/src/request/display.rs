//! Presentational status mapping.
//!
//! Consumed by UI layers outside this core; the mapping itself is part of
//! the contract and must stay total over [`RequestStatus`].

use serde::{Deserialize, Serialize};

use super::status::RequestStatus;

/// Semantic color category for a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    /// Neutral, in-progress information.
    Info,
    /// Forward progress through the pipeline.
    Primary,
    /// Successful terminal outcome.
    Success,
    /// Unsuccessful terminal outcome.
    Error,
}

/// Human label and color for one status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusDisplay {
    /// Human-readable label.
    pub label: &'static str,
    /// Semantic color category.
    pub color: StatusColor,
}

impl StatusDisplay {
    /// Display configuration for the given status.
    pub fn of(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => Self {
                label: "Pending Review",
                color: StatusColor::Info,
            },
            RequestStatus::Approved => Self {
                label: "Approved",
                color: StatusColor::Primary,
            },
            RequestStatus::StubGenerated => Self {
                label: "Stub Generated",
                color: StatusColor::Primary,
            },
            RequestStatus::Ready => Self {
                label: "Ready for Pickup",
                color: StatusColor::Primary,
            },
            RequestStatus::Completed => Self {
                label: "Completed",
                color: StatusColor::Success,
            },
            RequestStatus::Rejected => Self {
                label: "Rejected",
                color: StatusColor::Error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_total() {
        for status in RequestStatus::all() {
            let display = StatusDisplay::of(status);
            assert!(!display.label.is_empty());
        }
    }

    #[test]
    fn test_terminal_colors() {
        assert_eq!(
            StatusDisplay::of(RequestStatus::Completed).color,
            StatusColor::Success
        );
        assert_eq!(
            StatusDisplay::of(RequestStatus::Rejected).color,
            StatusColor::Error
        );
    }
}
