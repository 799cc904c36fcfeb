//! Client error types.

/// Errors surfaced by [`AquaLinkClient`](crate::AquaLinkClient).
///
/// Every variant maps to a numeric status-like code through
/// [`ApiError::status`]. Turning these into user-facing text is the caller's
/// job.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response within the per-attempt timeout after exhausting retries
    /// (and the backup server, when one is configured).
    #[error("request timed out")]
    Timeout,

    /// The API could not be reached and no fresh cached response exists.
    #[error("service unavailable (offline: {offline})")]
    Unavailable {
        /// `true` when the device reported itself offline and no request was
        /// attempted; `false` when the request failed at the network level.
        offline: bool,
    },

    /// The server failed: a 5xx status, or a 2xx body with `success: false`.
    #[error("server error: HTTP {status}")]
    ServerError {
        /// HTTP status code (500 for an explicit `success: false`).
        status: u16,
    },

    /// The server rejected the request with a 4xx status.
    #[error("client error: HTTP {status}")]
    ClientError {
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected schema.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Status code for `Timeout`.
    pub const TIMEOUT_STATUS: u16 = 408;
    /// Status code for `Unavailable`.
    pub const UNAVAILABLE_STATUS: u16 = 503;
    /// Status code for generic failures.
    pub const GENERIC_STATUS: u16 = 500;

    /// Build the error for a non-2xx HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::ServerError { status }
        } else {
            Self::ClientError { status }
        }
    }

    /// Numeric status-like code of this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Timeout => Self::TIMEOUT_STATUS,
            Self::Unavailable { .. } => Self::UNAVAILABLE_STATUS,
            Self::ServerError { status } | Self::ClientError { status } => *status,
            Self::MalformedResponse(_) | Self::Configuration(_) => Self::GENERIC_STATUS,
        }
    }

    /// Whether the device was offline when the call was made.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Unavailable { offline: true })
    }
}
