//! Chip/target abstraction and per-family flasher implementations.

pub mod cc26xx;
pub mod chip;

pub use chip::{ChipFamily, Flasher, LoadError, LoadStage};
