//! # Core Module
//!
//! Shared configuration for the whole crate.
//!
//! ## Organization
//!
//! - **Config**: [`TeleporterConfig`], the file-loadable settings for a
//!   [`crate::PixelTeleporter`]

pub mod config;

pub use config::{Config, ConfigError, TeleporterConfig};
