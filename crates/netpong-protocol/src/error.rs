/// Errors that can occur while classifying an inbound frame.
///
/// None of these are fatal anywhere in the engine: the receive loop logs
/// the error and drops the frame, leaving all published state unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON (and not a known control string).
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The frame was valid JSON but matched no known message shape.
    #[error("unrecognized frame shape")]
    Unrecognized,

    /// An envelope frame carried a payload that matched no known shape.
    #[error("unrecognized envelope payload (type tag {0:?})")]
    UnrecognizedPayload(String),
}
