//! Infrastructure adapters: configuration, shared state, and the bridge.

pub mod bridge;
pub mod config;
pub mod store;
