//! egui window hosting the configuration dropdown

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use eframe::{NativeOptions, egui};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};

use super::components;
use super::state::ManagerState;
use crate::config::Settings;
use crate::constants::defaults::manager::{POLL_INTERVAL_MS, SHUTDOWN_TIMEOUT};
use crate::constants::gui::ITEM_SPACING;
use crate::credential::{CookieCredentials, CredentialProvider};
use crate::page::{LoggingEnhancer, Page, SelectControl};
use crate::switcher::{ConfigSwitcher, HttpTransport, SwitchEvent};

type Switcher = ConfigSwitcher<HttpTransport, CookieCredentials, UnboundedSender<SwitchEvent>>;

/// Borrows the state so `run_gui` can still drain it once the window closes
struct SwitcherApp<'a> {
    state: &'a mut ManagerState,
    switcher: Switcher,
}

impl eframe::App for SwitcherApp<'_> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Configuration");
            ui.add_space(ITEM_SPACING);

            if let Some(selection) = components::config_selector::render(ui, &self.state.page) {
                self.state
                    .apply_selection(&self.switcher, &selection.control_id, &selection.value);
            }

            ui.add_space(ITEM_SPACING);
            ui.separator();

            if self.state.in_flight > 0 {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("{} request(s) in flight", self.state.in_flight));
                });
            }

            if let Some(status) = &self.state.status_message {
                ui.colored_label(status.color, status.text.as_str());
            }
        });

        ctx.request_repaint_after(Duration::from_millis(POLL_INTERVAL_MS));
    }
}

/// Catalog ids for the dropdown, or the configured list when the catalog is unavailable
fn load_options(
    runtime: &Runtime,
    transport: &HttpTransport,
    credentials: &CookieCredentials,
    fallback: &[String],
) -> Vec<String> {
    let Some(credential) = credentials.credential() else {
        warn!(
            cookie = %credentials.cookie_name(),
            "No credential cookie, using configured config list"
        );
        return fallback.to_vec();
    };

    match runtime.block_on(transport.list_configs(&credential.token)) {
        Ok(ids) if !ids.is_empty() => {
            info!(count = ids.len(), "Loaded config catalog");
            ids
        }
        Ok(_) => {
            warn!("Config catalog is empty, using configured config list");
            fallback.to_vec()
        }
        Err(err) => {
            warn!(error = %err, "Failed to fetch config catalog, using configured config list");
            fallback.to_vec()
        }
    }
}

pub fn run_gui(settings: Settings, credentials: CookieCredentials) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let transport = HttpTransport::new(&settings.server)?;
    let options = load_options(&runtime, &transport, &credentials, &settings.configs);

    let mut page = Page::new(vec![SelectControl::config_select(options)])?;
    let enhanced = page.on_ready(&mut LoggingEnhancer);
    info!(enhanced, "Page ready");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let switcher = ConfigSwitcher::new(
        transport,
        credentials,
        events_tx,
        runtime.handle().clone(),
    );
    let mut state = ManagerState::new(page, events_rx);

    let viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size([
            settings.window.width as f32,
            settings.window.height as f32,
        ])
        .with_title("Config Switcher - v".to_string() + env!("CARGO_PKG_VERSION"));

    let native_options = NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    let result = eframe::run_native(
        &format!("Config Switcher - v{}", env!("CARGO_PKG_VERSION")),
        native_options,
        Box::new(|_cc| {
            Ok(Box::new(SwitcherApp {
                state: &mut state,
                switcher,
            }))
        }),
    );

    // Switches picked just before closing still get their answer logged
    let grace = settings.server.request_timeout();
    let drained = runtime.block_on(state.drain_in_flight(grace));
    if state.in_flight > 0 {
        warn!(
            abandoned = state.in_flight,
            "Window closed with switch requests still in flight"
        );
    } else if drained > 0 {
        debug!(drained, "Finished in-flight switches after window closed");
    }
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);

    result.map_err(|err| anyhow!("Failed to launch config switcher window: {err}"))
}
