//! Configuration management for reportlog.
//!
//! Provides XDG-compliant paths for the settings file and the default
//! log location, plus the settings that can override them.

mod settings;

pub use settings::{AppSettings, Paths};
