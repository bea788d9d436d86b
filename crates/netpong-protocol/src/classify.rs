//! The inbound frame classifier.
//!
//! Two protocol versions have been observed on the wire. The newer one wraps
//! ball events in a `{"type": ..., "data": {...}}` envelope; the older one
//! sends the payload flat. Score updates are always flat, and the two
//! control signals are bare strings, not JSON. The classifier accepts all of
//! it by structural matching, so a mixed-version server never breaks the
//! client.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    CollisionEvent, CoordinatesEvent, ProtocolError, ScoreEvent, ServerEvent,
};

/// Control string: both players connected, match begins.
const FRAME_START: &str = "start";

/// Control string: server is full, no seat for this client.
const FRAME_FULL: &str = "full";

/// Envelope type tag for collision events.
const TAG_COLLISION: &str = "collision";

/// Envelope type tag for coordinates events.
const TAG_COORDINATES: &str = "coordinates";

/// The `type`/`data` wrapper used by newer protocol versions.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: Value,
}

/// The common shape of both ball events. Decoded once, then split into
/// [`ServerEvent::Collision`] or [`ServerEvent::Coordinates`].
#[derive(Deserialize)]
struct BallPayload {
    x: f32,
    y: f32,
    v: f32,
    #[serde(default)]
    goal_x: Option<f32>,
}

/// Classifies one inbound text frame.
///
/// Grammar, in match order:
/// 1. The exact strings `"start"` and `"full"` → control events.
/// 2. A JSON `type`/`data` envelope whose payload has the ball shape →
///    [`ServerEvent::Collision`] or [`ServerEvent::Coordinates`]. The type
///    tag decides the variant when it is one of the known tags; an unknown
///    tag falls back to structural matching.
/// 3. A flat JSON object with `x`, `y`, `v` → ball event; the presence of
///    `goal_x` marks it a collision.
/// 4. A flat JSON object with `score` (exactly two non-negative integers)
///    and `message` → [`ServerEvent::Score`].
/// 5. Anything else → an error the caller is expected to log and swallow.
///
/// # Errors
/// Returns [`ProtocolError`] when the frame matches no grammar row. This is
/// a per-frame condition: the caller drops the frame and keeps reading.
pub fn parse_frame(frame: &str) -> Result<ServerEvent, ProtocolError> {
    match frame {
        FRAME_START => return Ok(ServerEvent::Start),
        FRAME_FULL => return Ok(ServerEvent::LobbyFull),
        _ => {}
    }

    let value: Value =
        serde_json::from_str(frame).map_err(ProtocolError::Malformed)?;

    // Envelope form first: a `type`/`data` object is never a flat payload.
    if let Ok(envelope) = Envelope::deserialize(&value) {
        return classify_envelope(envelope);
    }

    // Flat ball payload.
    if let Ok(ball) = BallPayload::deserialize(&value) {
        return Ok(split_ball(ball, None));
    }

    // Flat score update.
    if let Ok(score) = ScoreEvent::deserialize(&value) {
        return Ok(ServerEvent::Score(score));
    }

    Err(ProtocolError::Unrecognized)
}

fn classify_envelope(envelope: Envelope) -> Result<ServerEvent, ProtocolError> {
    let Ok(ball) = BallPayload::deserialize(&envelope.data) else {
        return Err(ProtocolError::UnrecognizedPayload(envelope.kind));
    };
    Ok(split_ball(ball, Some(envelope.kind.as_str())))
}

/// Splits the shared ball shape into its event variant.
///
/// A recognized envelope tag wins; otherwise the presence of `goal_x`
/// decides, since only collisions carry a predicted baseline crossing.
fn split_ball(ball: BallPayload, tag: Option<&str>) -> ServerEvent {
    let collision = match tag {
        Some(TAG_COLLISION) => true,
        Some(TAG_COORDINATES) => false,
        _ => ball.goal_x.is_some(),
    };

    if collision {
        ServerEvent::Collision(CollisionEvent {
            x: ball.x,
            y: ball.y,
            v: ball.v,
            goal_x: ball.goal_x,
        })
    } else {
        ServerEvent::Coordinates(CoordinatesEvent {
            x: ball.x,
            y: ball.y,
            v: ball.v,
        })
    }
}

// =========================================================================
// Tests
// =========================================================================
