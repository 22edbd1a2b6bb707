//! Infrastructure layer
//!
//! Handles all I/O primitives: source control, filesystem, external
//! processes and platform directories.

pub mod dirs;
pub mod filesystem;
pub mod git;
pub mod process;
