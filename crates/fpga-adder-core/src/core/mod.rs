//! Core error and data types.

pub mod error;
pub mod types;

// Re-export core types
pub use error::*;
pub use types::*;
