//! Document type enumeration and workflow family assignment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of document or process a record requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    /// Permanent academic record (transcript transfer).
    Form137,
    /// Report card.
    Form138,
    /// Certificate of good moral character.
    GoodMoral,
    /// Enrollment application.
    Enrollment,
}

/// Which transition table a document type follows.
///
/// Transcript transfers go through an appointment stub that the requester
/// presents at the registrar; everything else is fulfilled directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowFamily {
    /// pending → approved → stub-generated → completed.
    AppointmentStub,
    /// pending → approved → ready → completed.
    DirectFulfillment,
}

impl DocumentType {
    /// The workflow family this document type belongs to.
    pub fn family(&self) -> WorkflowFamily {
        match self {
            Self::Form137 => WorkflowFamily::AppointmentStub,
            Self::Form138 | Self::GoodMoral | Self::Enrollment => {
                WorkflowFamily::DirectFulfillment
            }
        }
    }

    /// Return the document type as its kebab-case wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form137 => "form137",
            Self::Form138 => "form138",
            Self::GoodMoral => "good-moral",
            Self::Enrollment => "enrollment",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
