//! Document request and enrollment domain entities.

pub mod display;
pub mod document_type;
pub mod model;
pub mod status;

pub use display::{StatusColor, StatusDisplay};
pub use document_type::{DocumentType, WorkflowFamily};
pub use model::{RequestRecord, TransitionEntry};
pub use status::RequestStatus;
