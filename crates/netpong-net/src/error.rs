/// Errors that can occur in the connection layer.
///
/// These never propagate past the receive-loop task: they are logged and
/// collapsed into the `Disconnected` state.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The WebSocket handshake to the server failed.
    #[error("connect failed: {0}")]
    Connect(#[source] tokio_tungstenite::tungstenite::Error),

    /// The established stream returned an error mid-read.
    #[error("stream error: {0}")]
    Stream(#[source] tokio_tungstenite::tungstenite::Error),
}
