//! Schema value objects and change records
//!
//! Everything here is a plain immutable snapshot value; the engine builds
//! fresh instances per call and never keeps state between calls.

pub mod change;
pub mod foreign_key;
pub mod table;

// Re-export commonly used types
pub use change::*;
pub use foreign_key::*;
pub use table::*;
