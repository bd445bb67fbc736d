//! # regidesk-storage
//!
//! Concrete storage backends for Regidesk:
//! - a durable file-backed key-value store for the persisted session,
//! - an in-memory twin of the same backend for tests,
//! - an in-memory versioned record store with compare-and-update
//!   semantics for request/enrollment records.

pub mod memory;
pub mod records;
pub mod session_file;

pub use memory::MemorySessionBackend;
pub use records::RequestRecordStore;
pub use session_file::FileSessionBackend;
