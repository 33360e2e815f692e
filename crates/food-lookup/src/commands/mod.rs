//! Command implementations.

pub mod info;
pub mod lookup;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod serve;
pub mod stats;
pub mod suggest;
