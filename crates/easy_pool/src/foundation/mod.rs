//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the pool:
//! - Math types and operations
//! - Timer queue for deferred work
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
