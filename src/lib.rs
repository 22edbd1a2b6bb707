//! vcpkg-provision - Reproducible vcpkg provisioning
//!
//! Bootstraps a pinned vcpkg checkout, installs manifests with it and merges
//! per-architecture install trees into universal trees.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Provisioning, install and merge logic
//! - [`infra`] - Infrastructure layer (git, filesystem, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
