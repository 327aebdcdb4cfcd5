//! Application layer: the pure pipeline from raw stack text or untrusted
//! JSON to a classified selection.

pub mod classify;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod validate;
