/// Unified error handling module
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote call failed{}: {message}", status_suffix(.status))]
    RemoteCall {
        status: Option<u16>,
        message: String,
    },

    #[error("No data: {0}")]
    EmptyResult(String),

    #[error("Not yet available: {0}")]
    NotYetAvailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl SdaError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        SdaError::RemoteCall {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a failed remote call, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            SdaError::RemoteCall { status, .. } => *status,
            _ => None,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            SdaError::Configuration(_) => "CONFIG_ERROR",
            SdaError::RemoteCall { status, .. } => match status {
                Some(401) => "UPSTREAM_401",
                Some(403) => "UPSTREAM_403",
                Some(404) => "UPSTREAM_404",
                Some(429) => "UPSTREAM_429",
                Some(500..=599) => "UPSTREAM_5XX",
                _ => "UPSTREAM_ERROR",
            },
            SdaError::EmptyResult(_) => "EMPTY_RESULT",
            SdaError::NotYetAvailable(_) => "NOT_YET_AVAILABLE",
            SdaError::InvalidInput(_) => "INVALID_INPUT",
            SdaError::Io(_) => "IO_ERROR",
            SdaError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SdaError::RemoteCall { .. })
    }
}

// transport, timeout and body-decoding failures all end up here
impl From<reqwest::Error> for SdaError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_decode() {
            format!("malformed response body: {}", err)
        } else {
            err.to_string()
        };
        SdaError::RemoteCall { status, message }
    }
}

/// Type alias for client results
pub type SdaResult<T> = Result<T, SdaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_codes_by_status() {
        assert_eq!(SdaError::remote(Some(403), "x").code(), "UPSTREAM_403");
        assert_eq!(SdaError::remote(Some(404), "x").code(), "UPSTREAM_404");
        assert_eq!(SdaError::remote(Some(429), "x").code(), "UPSTREAM_429");
        assert_eq!(SdaError::remote(Some(503), "x").code(), "UPSTREAM_5XX");
        assert_eq!(SdaError::remote(Some(418), "x").code(), "UPSTREAM_ERROR");
        assert_eq!(SdaError::remote(None, "dns").code(), "UPSTREAM_ERROR");
    }

    #[test]
    fn test_remote_display_includes_status() {
        let err = SdaError::remote(Some(500), "boom");
        assert_eq!(err.to_string(), "Remote call failed (HTTP 500): boom");

        let err = SdaError::remote(None, "connection refused");
        assert_eq!(err.to_string(), "Remote call failed: connection refused");
    }

    #[test]
    fn test_empty_result_is_not_remote() {
        let err = SdaError::EmptyResult("no windows".into());
        assert!(!err.is_remote());
        assert_eq!(err.status(), None);
        assert_eq!(err.code(), "EMPTY_RESULT");
    }
}
