use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::constants::gui::{COLOR_ERROR, COLOR_SUCCESS, COLOR_WARNING};
use crate::credential::CredentialProvider;
use crate::page::Page;
use crate::switcher::{
    ConfigSwitcher, ConfigTransport, SwitchEvent, SwitchReporter, TracingReporter,
};

use super::StatusMessage;

/// Window state: the page, switch results arriving from tasks, and the
/// status line they produce
pub struct ManagerState {
    pub page: Page,
    pub status_message: Option<StatusMessage>,
    /// Switches spawned but not reported yet
    pub in_flight: usize,
    events_rx: UnboundedReceiver<SwitchEvent>,
}

impl ManagerState {
    pub fn new(page: Page, events_rx: UnboundedReceiver<SwitchEvent>) -> Self {
        Self {
            page,
            status_message: None,
            in_flight: 0,
            events_rx,
        }
    }

    /// Apply a dropdown pick and hand the resulting change to the switcher
    pub fn apply_selection<T, C, R>(
        &mut self,
        switcher: &ConfigSwitcher<T, C, R>,
        control_id: &str,
        value: &str,
    ) -> Option<JoinHandle<SwitchEvent>>
    where
        T: ConfigTransport,
        C: CredentialProvider,
        R: SwitchReporter,
    {
        let event = match self.page.select(control_id, value) {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(err) => {
                error!(error = %err, "Rejected selection");
                return None;
            }
        };

        let handle = switcher.handle_change(&event)?;
        self.in_flight += 1;
        Some(handle)
    }

    /// Drain finished switches: log each one and update the status line.
    /// Returns the number of events processed.
    pub fn poll_events(&mut self) -> usize {
        let mut processed = 0;

        while let Ok(event) = self.events_rx.try_recv() {
            self.record(&event);
            processed += 1;
        }

        if processed > 0 {
            debug!(processed, in_flight = self.in_flight, "Processed switch events");
        }
        processed
    }

    /// Wait up to `timeout` for switches still in flight, recording each as it
    /// lands. Returns the number of events processed.
    pub async fn drain_in_flight(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut processed = 0;

        while self.in_flight > 0 {
            match tokio::time::timeout_at(deadline, self.events_rx.recv()).await {
                Ok(Some(event)) => {
                    self.record(&event);
                    processed += 1;
                }
                Ok(None) | Err(_) => break,
            }
        }
        processed
    }

    fn record(&mut self, event: &SwitchEvent) {
        TracingReporter.report(event);
        self.in_flight = self.in_flight.saturating_sub(1);
        self.status_message = Some(status_for(event));
    }
}

fn status_for(event: &SwitchEvent) -> StatusMessage {
    let at = Local::now().format("%H:%M:%S");

    if let Some(reason) = event.rejection_reason() {
        return StatusMessage {
            text: format!("[{at}] Server rejected '{}': {reason}", event.config_id()),
            color: COLOR_WARNING,
        };
    }

    match event {
        SwitchEvent::Changed { config_id, .. } => StatusMessage {
            text: format!("[{at}] Config changed: {config_id}"),
            color: COLOR_SUCCESS,
        },
        SwitchEvent::Failed {
            config_id, message, ..
        } => StatusMessage {
            text: format!("[{at}] Error changing config '{config_id}': {message}"),
            color: COLOR_ERROR,
        },
    }
}
