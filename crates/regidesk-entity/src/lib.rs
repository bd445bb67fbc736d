//! # regidesk-entity
//!
//! Domain entity models for Regidesk. Every struct in this crate
//! represents a persisted record or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod request;
pub mod session;
pub mod user;
