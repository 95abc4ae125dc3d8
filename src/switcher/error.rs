use serde::Serialize;

/// Failure of one switch interaction
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error("credential cookie '{cookie}' is not set")]
    MissingCredential { cookie: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Coarse failure category carried in reported events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingCredential,
    Transport,
    Decode,
}

impl SwitchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SwitchError::MissingCredential { .. } => FailureKind::MissingCredential,
            SwitchError::Transport(_) | SwitchError::InvalidUrl { .. } => FailureKind::Transport,
            SwitchError::Decode(_) => FailureKind::Decode,
        }
    }
}
