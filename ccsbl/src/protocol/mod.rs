//! Protocol implementations.

pub mod sbl;

// Re-export common types
pub use sbl::{Ack, Command, CommandFrame, StatusCode, checksum8};
