use eframe::egui;

pub mod core;

pub use self::core::ManagerState;

/// One-line status shown under the dropdown
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub color: egui::Color32,
}
