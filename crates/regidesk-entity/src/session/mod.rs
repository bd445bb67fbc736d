//! Session domain entities.

pub mod claims;
pub mod model;

pub use claims::TokenClaims;
pub use model::Session;
