//! GUI module - egui window for picking the active configuration

mod app;
pub mod components;
pub mod state;

pub use app::run_gui;
