//! Core business logic module
//!
//! Provisioning, installing and merging. Process and filesystem primitives
//! live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`triplet`] - Platform descriptor to vcpkg triplet resolution
//! - [`env`] - Environment handed to child processes
//! - [`manifest`] - Pinned revision from `vcpkg.json`
//! - [`bootstrap`] - Dependency root clone, update and bootstrap
//! - [`install`] - `vcpkg install` invocation
//! - [`merge`] - Static library tree merge
//! - [`universal`] - Dual-architecture install and merge
//! - [`config`] - Optional TOML configuration
//! - [`doctor`] - Environment checks

pub mod bootstrap;
pub mod config;
pub mod doctor;
pub mod env;
pub mod install;
pub mod manifest;
pub mod merge;
pub mod triplet;
pub mod universal;
