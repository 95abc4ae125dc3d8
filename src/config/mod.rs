//! Configuration management
//!
//! JSON settings for the server endpoint, credential source and manager
//! window.

pub mod settings;

pub use settings::Settings;
