//! # Netpong
//!
//! Client-side engine for a two-player, server-authoritative table tennis
//! game.
//!
//! The server owns all game logic and streams sparse events over a
//! WebSocket; this crate turns that stream into state a renderer can draw
//! every frame:
//!
//! - [`netpong_net`] supervises the connection and classifies frames,
//! - the [`SessionStateMachine`] tracks the match lifecycle and score,
//! - [`netpong_motion`] fills the gaps between ball events with smooth,
//!   interruptible trajectories,
//! - [`netpong_court`] maps table space onto the screen.
//!
//! [`PongEngine`] wires the four together behind one handle.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netpong::prelude::*;
//!
//! # async fn run() {
//! let engine = PongEngine::new(ClientConfig::default());
//! engine.select_player(PlayerSlot::One).await;
//!
//! let mut session = engine.session();
//! let ball = engine.ball_position();
//! // Render loop: draw `*ball.borrow()` projected via `project`,
//! // overlay `session.borrow().score`.
//! # let _ = session.changed().await;
//! # }
//! ```

mod engine;
mod error;
mod session;

pub use engine::{serve_position, PongEngine};
pub use error::NetpongError;
pub use session::{GamePhase, SessionState, SessionStateMachine};

/// The common imports, re-exported in one place.
pub mod prelude {
    pub use crate::{
        GamePhase, NetpongError, PongEngine, SessionState, SessionStateMachine,
    };
    pub use netpong_court::{
        map_game_to_table, map_table_to_game, project, project_mirrored,
        Camera, ScreenPoint, TableDims, TablePoint,
    };
    pub use netpong_motion::{MotionConfig, MotionDriver};
    pub use netpong_net::{ClientConfig, ConnectionManager, ConnectionState};
    pub use netpong_protocol::{
        CollisionEvent, CoordinatesEvent, PlayerSlot, ScoreEvent,
    };
}
