use thiserror::Error;

/// Failure of a single round-trip to the dialogue endpoint.
///
/// Never surfaced to callers of `send`; it only drives the retry decision
/// and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    /// Connection failure, transport error or timeout.
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}")]
    Protocol { status: u16 },
    /// Success status, but the payload was empty, null or not JSON.
    #[error("degraded response: {0}")]
    Degraded(&'static str),
    /// Success payload that matches none of the known reply shapes.
    #[error("unrecognized response shape")]
    Unparseable,
}

impl DialogueError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unparseable)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Protocol { .. } => "protocol",
            Self::Degraded(_) => "degraded",
            Self::Unparseable => "unparseable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unparseable_is_final() {
        assert!(DialogueError::Network("refused".into()).is_retryable());
        assert!(DialogueError::Protocol { status: 500 }.is_retryable());
        assert!(DialogueError::Degraded("empty list").is_retryable());
        assert!(!DialogueError::Unparseable.is_retryable());
    }

    #[test]
    fn messages_carry_detail() {
        assert_eq!(
            DialogueError::Protocol { status: 503 }.to_string(),
            "endpoint returned HTTP 503"
        );
        assert!(DialogueError::Network("timed out".into())
            .to_string()
            .contains("timed out"));
        assert_eq!(DialogueError::Degraded("null").kind(), "degraded");
    }
}
