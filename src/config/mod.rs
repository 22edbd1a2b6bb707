//! Configuration constants
//!
//! - [`defaults`] - Default values and environment variable names
//! - [`urls`] - Remote repository URLs

pub mod defaults;
pub mod urls;
