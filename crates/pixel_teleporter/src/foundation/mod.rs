//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Packed color helpers
//! - Clocks and frame timing
//! - Logging utilities

pub mod color;
pub mod logging;
pub mod math;
pub mod time;
