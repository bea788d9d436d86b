//! Unified error type for the Netpong client.

use netpong_net::NetError;
use netpong_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `netpong` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum NetpongError {
    /// A connection-level error (handshake, stream).
    #[error(transparent)]
    Net(#[from] NetError),

    /// A wire-format error (unrecognized or malformed frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::Unrecognized;
        let netpong_err: NetpongError = err.into();
        assert!(matches!(netpong_err, NetpongError::Protocol(_)));
    }

    #[test]
    fn test_from_net_error_preserves_message() {
        let inner = tokio_tungstenite::tungstenite::Error::ConnectionClosed;
        let err = NetError::Stream(inner);
        let netpong_err: NetpongError = err.into();
        assert!(matches!(netpong_err, NetpongError::Net(_)));
        assert!(netpong_err.to_string().contains("stream error"));
    }
}
