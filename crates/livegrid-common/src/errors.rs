#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport could not even be constructed (bad endpoint).
    /// Never retried automatically.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("connection failed: {0}")]
    ConnectFailed(String),

    #[error("connection timed out after {0}s")]
    Timeout(u64),
}

impl TransportError {
    /// Setup errors surface via logs only; transient errors ride the
    /// bounded reconnect path.
    pub fn is_setup(&self) -> bool {
        matches!(self, TransportError::InvalidEndpoint(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = TransportError::InvalidEndpoint("not a url".into());
        assert_eq!(err.to_string(), "invalid endpoint: not a url");

        let err = TransportError::ConnectFailed("connection refused".into());
        assert_eq!(err.to_string(), "connection failed: connection refused");

        let err = TransportError::Timeout(15);
        assert_eq!(err.to_string(), "connection timed out after 15s");
    }

    #[test]
    fn setup_classification() {
        assert!(TransportError::InvalidEndpoint("x".into()).is_setup());
        assert!(!TransportError::ConnectFailed("x".into()).is_setup());
        assert!(!TransportError::Timeout(15).is_setup());
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::MalformedFrame("expected value at line 1".into());
        assert_eq!(
            err.to_string(),
            "malformed frame: expected value at line 1"
        );
    }
}
