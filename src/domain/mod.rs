//! Domain layer types and invariants.

pub mod articles;
pub mod categories;
pub mod document;
pub mod error;
