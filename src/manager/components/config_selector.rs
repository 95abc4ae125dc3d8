use eframe::egui;

use crate::page::{Page, SelectControl};

/// A pick made in one of the page's dropdowns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub control_id: String,
    pub value: String,
}

/// Controls that `on_ready` has turned into dropdowns
fn ready_controls(page: &Page) -> impl Iterator<Item = &SelectControl> {
    page.controls().iter().filter(|control| control.is_enhanced())
}

/// Render every enhanced select control as a combo box.
///
/// Only reads the page; the caller applies the returned pick.
pub fn render(ui: &mut egui::Ui, page: &Page) -> Option<Selection> {
    let mut selection = None;

    for control in page.controls().iter().filter(|c| !c.is_enhanced()) {
        ui.weak(format!("{}: not ready", control.label));
    }

    for control in ready_controls(page) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("{}:", control.label)).strong());

                let current = control.value().map(str::to_string);
                let mut display_value = current.clone();

                egui::ComboBox::from_id_salt(("select_control", control.id.as_str()))
                    .selected_text(control.selected_label())
                    .show_ui(ui, |ui| {
                        for option in &control.options {
                            ui.selectable_value(
                                &mut display_value,
                                Some(option.value.clone()),
                                option.label.as_str(),
                            );
                        }
                    });

                if display_value != current
                    && let Some(value) = display_value
                {
                    selection = Some(Selection {
                        control_id: control.id.clone(),
                        value,
                    });
                }
            });
        });
    }

    selection
}
