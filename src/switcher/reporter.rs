//! Developer log channel for switch results

use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use super::error::FailureKind;

/// Result of one switch interaction, reported exactly once
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchEvent {
    Changed {
        seq: u64,
        config_id: String,
        status: u16,
        payload: Value,
    },
    Failed {
        seq: u64,
        config_id: String,
        kind: FailureKind,
        message: String,
    },
}

impl SwitchEvent {
    pub fn seq(&self) -> u64 {
        match self {
            SwitchEvent::Changed { seq, .. } | SwitchEvent::Failed { seq, .. } => *seq,
        }
    }

    pub fn config_id(&self) -> &str {
        match self {
            SwitchEvent::Changed { config_id, .. } | SwitchEvent::Failed { config_id, .. } => {
                config_id
            }
        }
    }

    /// Server answered, but with a non-2xx status or an `error` field in the payload
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            SwitchEvent::Changed { status, payload, .. }
                if !(200..300).contains(status) || payload.get("error").is_some()
        )
    }

    /// Message the server gave for a rejection: `error`, then `detail`, then the raw payload
    pub fn rejection_reason(&self) -> Option<String> {
        if !self.is_rejected() {
            return None;
        }
        let SwitchEvent::Changed { payload, .. } = self else {
            return None;
        };

        let reason = ["error", "detail"]
            .iter()
            .find_map(|field| payload.get(field))
            .unwrap_or(payload);
        Some(match reason.as_str() {
            Some(text) => text.to_string(),
            None => reason.to_string(),
        })
    }
}

pub trait SwitchReporter: Send + Sync + 'static {
    fn report(&self, event: &SwitchEvent);
}

/// Writes every event to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl SwitchReporter for TracingReporter {
    fn report(&self, event: &SwitchEvent) {
        match event {
            SwitchEvent::Changed {
                seq,
                config_id,
                status,
                payload,
            } => {
                if event.is_rejected() {
                    warn!(seq, config_id = %config_id, status, payload = %payload, "Config change rejected by server");
                } else {
                    info!(seq, config_id = %config_id, status, payload = %payload, "Config changed");
                }
            }
            SwitchEvent::Failed {
                seq,
                config_id,
                kind,
                message,
            } => {
                error!(seq, config_id = %config_id, kind = ?kind, error = %message, "Error changing config");
            }
        }
    }
}

/// Forwards events to a receiver polled elsewhere (the manager window)
impl SwitchReporter for UnboundedSender<SwitchEvent> {
    fn report(&self, event: &SwitchEvent) {
        if self.send(event.clone()).is_err() {
            debug!(seq = event.seq(), "Switch event receiver dropped");
        }
    }
}
