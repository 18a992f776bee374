use thiserror::Error;

/// Errors a single backend's `fetch_events` call may raise.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Precondition failure (permission denied, binary missing). Treated as
    /// an empty result for cascade purposes.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    /// Any other failure. Propagates immediately unless a later backend
    /// still has a chance to supply a result.
    #[error("backend operational error: {0}")]
    OperationalError(String),
}

/// Raised by the cascade once every backend has been exhausted without a
/// usable event, or a mid-cascade `OperationalError` could not be absorbed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CalendarResolutionError {
    pub backend: Option<&'static str>,
    pub message: String,
    pub hint: Option<String>,
}

impl CalendarResolutionError {
    pub fn new(backend: Option<&'static str>, message: impl Into<String>) -> Self {
        Self { backend, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// JSON error envelope per the `{error, backend?, hint?}` shape the CLI
    /// layer emits on stdout for structured errors.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.message,
            "backend": self.backend,
            "hint": self.hint,
        })
    }
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Resolution(#[from] CalendarResolutionError),
}
