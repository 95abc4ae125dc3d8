//! Configuration switcher
//!
//! Turns `configSelect` change events into authenticated switch requests.
//! Every change runs as its own task: nothing is cancelled, nothing is
//! retried, and results are reported in whatever order they arrive. Each
//! task reports exactly one [`SwitchEvent`], success or failure.

pub mod error;
pub mod reporter;
pub mod transport;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::constants::page::CONFIG_SELECT_ID;
use crate::credential::CredentialProvider;
use crate::page::ChangeEvent;

pub use error::SwitchError;
pub use reporter::{SwitchEvent, SwitchReporter, TracingReporter};
pub use transport::{ConfigTransport, HttpTransport, SwitchRequest, SwitchResponse};

struct Inner<T, C, R> {
    transport: T,
    credentials: C,
    reporter: R,
    /// Only used to correlate overlapping requests in the log
    next_seq: AtomicU64,
}

pub struct ConfigSwitcher<T, C, R> {
    inner: Arc<Inner<T, C, R>>,
    runtime: Handle,
}

impl<T, C, R> Clone for ConfigSwitcher<T, C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T, C, R> ConfigSwitcher<T, C, R>
where
    T: ConfigTransport,
    C: CredentialProvider,
    R: SwitchReporter,
{
    pub fn new(transport: T, credentials: C, reporter: R, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                credentials,
                reporter,
                next_seq: AtomicU64::new(0),
            }),
            runtime,
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    #[cfg(test)]
    pub fn credentials(&self) -> &C {
        &self.inner.credentials
    }

    /// Spawn a switch for a change on the config select.
    ///
    /// Changes from other controls are ignored and return `None`.
    pub fn handle_change(&self, event: &ChangeEvent) -> Option<JoinHandle<SwitchEvent>> {
        if event.control_id != CONFIG_SELECT_ID {
            debug!(control = %event.control_id, "Ignoring change from non-config control");
            return None;
        }

        let switcher = self.clone();
        let config_id = event.value.clone();
        Some(
            self.runtime
                .spawn(async move { switcher.switch(config_id).await }),
        )
    }

    /// Run one switch to completion and report its outcome
    pub async fn switch(&self, config_id: String) -> SwitchEvent {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(seq, config_id = %config_id, "Switching config");

        let event = match self.request(&config_id).await {
            Ok(response) => SwitchEvent::Changed {
                seq,
                config_id,
                status: response.status,
                payload: response.payload,
            },
            Err(err) => SwitchEvent::Failed {
                seq,
                config_id,
                kind: err.kind(),
                message: err.to_string(),
            },
        };

        self.inner.reporter.report(&event);
        event
    }

    async fn request(&self, config_id: &str) -> Result<SwitchResponse, SwitchError> {
        let credential =
            self.inner
                .credentials
                .credential()
                .ok_or_else(|| SwitchError::MissingCredential {
                    cookie: self.inner.credentials.cookie_name().to_string(),
                })?;

        let request = SwitchRequest {
            config_id: config_id.to_string(),
            token: credential.token,
            cookie_header: credential.cookie_header,
        };
        self.inner.transport.select_config(&request).await
    }
}
