//! The connection manager: one supervised WebSocket per session.
//!
//! # Concurrency note
//!
//! The receive loop is the sole writer of every published channel while it
//! runs; `connect`/`disconnect` only touch them while holding the task
//! lock, after the old loop has been aborted *and joined*. At most one
//! receive loop is ever live: starting a new connection swaps the task
//! handle atomically under the lock, so there is no window with two loops
//! both writing.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use netpong_protocol::{
    parse_frame, CollisionEvent, CoordinatesEvent, PlayerSlot, ScoreEvent,
    ServerEvent,
};

use crate::{ClientConfig, NetError};

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// The lifecycle of the client's single connection.
///
/// ```text
///   Disconnected ──(connect)──→ Connecting ──(handshake ok)──→ Connected
///        ↑                          │                              │
///        └──────(error/close/disconnect)───────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The WebSocket is established and the receive loop is reading.
    Connected,
}

// ---------------------------------------------------------------------------
// Published outputs
// ---------------------------------------------------------------------------

/// The watch senders the receive loop publishes into.
///
/// Event channels hold only the latest value; stale events are overwritten,
/// never queued.
struct Outputs {
    state: watch::Sender<ConnectionState>,
    both_connected: watch::Sender<bool>,
    lobby_full: watch::Sender<bool>,
    collision: watch::Sender<Option<CollisionEvent>>,
    coordinates: watch::Sender<Option<CoordinatesEvent>>,
    score: watch::Sender<Option<ScoreEvent>>,
}

impl Outputs {
    fn new() -> Self {
        Self {
            state: watch::Sender::new(ConnectionState::Disconnected),
            both_connected: watch::Sender::new(false),
            lobby_full: watch::Sender::new(false),
            collision: watch::Sender::new(None),
            coordinates: watch::Sender::new(None),
            score: watch::Sender::new(None),
        }
    }

    /// Resets everything for a fresh connection attempt.
    fn reset_for_connect(&self) {
        self.state.send_replace(ConnectionState::Connecting);
        self.both_connected.send_replace(false);
        self.lobby_full.send_replace(false);
        self.collision.send_replace(None);
        self.coordinates.send_replace(None);
        self.score.send_replace(None);
    }

    /// The connection is gone, however it ended.
    fn connection_lost(&self) {
        self.both_connected.send_replace(false);
        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// Classifies one text frame and publishes the result.
    ///
    /// A frame that fails to classify is dropped here, per message: state
    /// stays unchanged and the loop keeps reading.
    fn publish_frame(&self, frame: &str) {
        match parse_frame(frame) {
            Ok(ServerEvent::Start) => {
                info!("both players connected, match starting");
                self.both_connected.send_replace(true);
            }
            Ok(ServerEvent::LobbyFull) => {
                warn!("server is full, no seat for this client");
                self.both_connected.send_replace(false);
                self.lobby_full.send_replace(true);
            }
            Ok(ServerEvent::Collision(ev)) => {
                trace!(x = ev.x, y = ev.y, v = ev.v, "collision event");
                self.collision.send_replace(Some(ev));
            }
            Ok(ServerEvent::Coordinates(ev)) => {
                trace!(x = ev.x, y = ev.y, v = ev.v, "coordinates event");
                self.coordinates.send_replace(Some(ev));
            }
            Ok(ServerEvent::Score(ev)) => {
                debug!(a = ev.score[0], b = ev.score[1], "score update");
                self.score.send_replace(Some(ev));
            }
            Err(e) => {
                debug!(error = %e, len = frame.len(), "dropping frame");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionManager
// ---------------------------------------------------------------------------

/// Owns the client's connection to the match server.
///
/// Create one per session. `connect` may be called repeatedly — each call
/// supersedes the previous attempt. Readers subscribe once and keep their
/// receivers across reconnects; the channels are owned here, not by the
/// individual connection.
pub struct ConnectionManager {
    config: ClientConfig,
    outputs: Arc<Outputs>,
    /// The active receive-loop task, if any. Swapped atomically under the
    /// lock so two loops can never be live at once.
    active: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    /// Creates a manager for the given endpoint. No connection is made
    /// until [`connect`](Self::connect).
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            outputs: Arc::new(Outputs::new()),
            active: Mutex::new(None),
        }
    }

    /// Opens a connection as the given player, superseding any outstanding
    /// one.
    ///
    /// Safe to call in any state: an in-flight or established connection
    /// is aborted first, then all published state is reset and a new
    /// receive loop is spawned. The whole swap happens under the task lock.
    pub async fn connect(&self, slot: PlayerSlot) {
        let mut active = self.active.lock().await;

        // Abort the old loop and wait for it to actually stop before
        // resetting. An abort alone does not interrupt a task mid-poll on
        // another worker, so an in-flight publish could otherwise land
        // after the reset.
        if let Some(old) = active.take() {
            debug!("superseding previous connection");
            old.abort();
            let _ = old.await;
        }

        self.outputs.reset_for_connect();

        let url = self.config.url(slot.token());
        let outputs = Arc::clone(&self.outputs);
        *active = Some(tokio::spawn(async move {
            if let Err(e) = run_receive_loop(&url, &outputs).await {
                warn!(error = %e, "connection ended with error");
            }
            outputs.connection_lost();
        }));
    }

    /// Tears down the connection, if any. Idempotent.
    pub async fn disconnect(&self) {
        let mut active = self.active.lock().await;
        if let Some(task) = active.take() {
            info!("disconnecting");
            task.abort();
            // As in connect: the loop must be fully stopped before the
            // outputs are touched.
            let _ = task.await;
        }
        self.outputs.connection_lost();
    }

    /// The connection lifecycle signal.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.outputs.state.subscribe()
    }

    /// True once the server has announced both players are present.
    pub fn both_players_connected(&self) -> watch::Receiver<bool> {
        self.outputs.both_connected.subscribe()
    }

    /// Flips true when the server reports it is full. Reset on the next
    /// [`connect`](Self::connect).
    pub fn lobby_full(&self) -> watch::Receiver<bool> {
        self.outputs.lobby_full.subscribe()
    }

    /// Latest collision event, if any has arrived this connection.
    pub fn collisions(&self) -> watch::Receiver<Option<CollisionEvent>> {
        self.outputs.collision.subscribe()
    }

    /// Latest coordinates event, if any has arrived this connection.
    pub fn coordinates(&self) -> watch::Receiver<Option<CoordinatesEvent>> {
        self.outputs.coordinates.subscribe()
    }

    /// Latest score update, if any has arrived this connection.
    pub fn scores(&self) -> watch::Receiver<Option<ScoreEvent>> {
        self.outputs.score.subscribe()
    }
}

/// The receive loop: connect, then read frames until the stream ends.
///
/// Runs inside the supervised task; every error path returns here and is
/// collapsed to `Disconnected` by the caller. The client is receive-only:
/// nothing is sent after the upgrade handshake.
async fn run_receive_loop(url: &str, outputs: &Outputs) -> Result<(), NetError> {
    info!(url, "connecting to match server");
    let (mut ws, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(NetError::Connect)?;

    outputs.state.send_replace(ConnectionState::Connected);
    info!("connected, awaiting match events");

    while let Some(frame) = ws.next().await {
        match frame.map_err(NetError::Stream)? {
            Message::Text(text) => outputs.publish_frame(text.as_str()),
            Message::Close(_) => {
                debug!("server closed the connection");
                break;
            }
            // Binary, ping, and pong frames carry no game state.
            _ => {}
        }
    }

    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
