//! Configuration module for EduCenter
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::EduPaths;
pub use settings::Settings;
