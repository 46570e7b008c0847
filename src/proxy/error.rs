//! Backend call failures.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// A backend call that produced no usable response. Always surfaces as `502`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid outbound URI: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    #[error("backend request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("backend sent no response headers within {0:?}")]
    ResponseTimeout(Duration),

    #[error("no backend client for route #{0}")]
    UnknownRoute(usize),
}

impl DispatchError {
    /// True when the backend could not be reached at all.
    pub fn is_connect(&self) -> bool {
        matches!(self, DispatchError::Transport(e) if e.is_connect())
    }

    /// Error text including every source in the chain.
    pub fn describe(&self) -> String {
        let mut text = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        text
    }
}
