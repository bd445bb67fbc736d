//! Domain events emitted by the session and workflow subsystems.

pub mod request;
pub mod session;

pub use request::RequestEvent;
pub use session::SessionEvent;
