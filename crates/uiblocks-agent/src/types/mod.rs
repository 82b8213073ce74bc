//! Agent-side types.

pub mod error;

pub use error::*;
