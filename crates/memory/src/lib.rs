//! Scratch pad implementations for Parley.

pub mod file;
pub mod in_memory;

pub use file::FileScratchPad;
pub use in_memory::InMemoryScratchPad;
