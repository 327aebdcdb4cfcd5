//! Core domain types and errors shared across the crate.

pub mod errors;
pub mod model;
