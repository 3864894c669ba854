//! Utilities module
//!
//! This module contains error handling, logging, and helper utilities

pub mod errors;
pub mod helpers;
pub mod logging;
