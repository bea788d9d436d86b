//! Typed server events and player identity.
//!
//! These are the structures inbound frames decode into. The server is
//! authoritative for all of them; the client only reads.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Player identity
// ---------------------------------------------------------------------------

/// Which side of the table the local client plays.
///
/// Assigned once per successful connection, when the presentation layer
/// picks a side; "unassigned" is modelled as `Option<PlayerSlot>` (and
/// reported downstream as player number 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    /// Near end of the table; server slot A.
    One,
    /// Far end of the table; server slot B.
    Two,
}

impl PlayerSlot {
    /// The opaque role token sent as the `token` query parameter when
    /// connecting. The server uses it to assign the role.
    pub fn token(self) -> &'static str {
        match self {
            Self::One => "player1",
            Self::Two => "player2",
        }
    }

    /// The human-facing player number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Parses a player number back into a slot. Returns `None` for
    /// anything other than 1 or 2 (including the "unassigned" 0).
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Ball events
// ---------------------------------------------------------------------------

/// A server-reported bounce or paddle hit, in game-space coordinates.
///
/// `v` is the ball's speed after the hit; the motion layer turns it into an
/// animation duration. `goal_x` is where the ball will cross the baseline,
/// when the server chooses to reveal it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub x: f32,
    pub y: f32,
    /// Velocity magnitude. Expected > 0; non-positive samples are ignored
    /// by consumers.
    pub v: f32,
    /// Predicted baseline crossing, if the server sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_x: Option<f32>,
}

/// A plain ball position/velocity sample, in game-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesEvent {
    pub x: f32,
    pub y: f32,
    pub v: f32,
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// A score update pushed by the server.
///
/// The pair is positional **by server slot** — `score[0]` belongs to slot A
/// (player one) and `score[1]` to slot B — not by the local player. Use
/// [`ordered_for`](Self::ordered_for) before showing it to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// `[slot A, slot B]` points.
    pub score: [u32; 2],
    /// Server-provided commentary ("point!", "game over", ...).
    pub message: String,
}

impl ScoreEvent {
    /// Re-orders the positional pair so the local player's score comes
    /// first: `(a, b)` when the local player holds slot one, `(b, a)` when
    /// they hold slot two.
    pub fn ordered_for(&self, slot: PlayerSlot) -> (u32, u32) {
        let [a, b] = self.score;
        match slot {
            PlayerSlot::One => (a, b),
            PlayerSlot::Two => (b, a),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent — everything a frame can classify into
// ---------------------------------------------------------------------------

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Both players are connected; the match begins.
    Start,
    /// The server is full; this client will not get a seat.
    LobbyFull,
    /// A bounce/hit event.
    Collision(CollisionEvent),
    /// A plain position sample.
    Coordinates(CoordinatesEvent),
    /// A score update.
    Score(ScoreEvent),
}

// =========================================================================
// Tests
// =========================================================================
