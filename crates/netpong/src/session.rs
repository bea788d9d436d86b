//! The session state machine: one small actor that owns the match
//! lifecycle.
//!
//! The client moves through three phases:
//!
//! ```text
//!   PlayerSelection ──(player_selected)──→ Waiting ──("start")──→ Playing
//!          ↑                                  │                      │
//!          └──────(lobby full / connection lost / reset)─────────────┘
//! ```
//!
//! Every drop back to `PlayerSelection` is a full reset: the chosen slot,
//! the player number, and the score are all cleared. There is no partial
//! resume; the server is authoritative, and a client that lost its stream
//! has no score it can trust.
//!
//! # Concurrency note
//!
//! The machine runs as a single spawned task that is the sole writer of
//! the published [`SessionState`]. User actions arrive over a command
//! channel and server-driven inputs arrive over the connection layer's
//! watch channels, so every transition is serialized through one
//! `select!` loop and readers can never observe a half-applied update.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use netpong_net::ConnectionManager;
use netpong_protocol::{PlayerSlot, ScoreEvent};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where the client is in the match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// No role chosen yet. The entry screen.
    #[default]
    PlayerSelection,
    /// A role is chosen and the connection is up (or in flight), but the
    /// opponent has not arrived.
    Waiting,
    /// Both players are present; match events are live.
    Playing,
}

/// The full observable session state, published as one value.
///
/// `player_number` is 1 or 2 once a role is chosen, 0 before then. The
/// score is ordered (own, opponent) from this client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: GamePhase,
    pub player_number: u8,
    pub score: (u32, u32),
}

// ---------------------------------------------------------------------------
// SessionStateMachine
// ---------------------------------------------------------------------------

/// User-driven inputs. Server-driven inputs come from the connection
/// layer's watch channels instead.
enum SessionCmd {
    PlayerSelected(PlayerSlot),
    Reset,
}

/// Handle to the running session machine.
///
/// Cloning the handle is not needed: readers call [`subscribe`] and keep
/// their receiver. Dropping the last handle stops the task.
///
/// [`subscribe`]: SessionStateMachine::subscribe
pub struct SessionStateMachine {
    cmd_tx: mpsc::UnboundedSender<SessionCmd>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionStateMachine {
    /// Spawns the machine, wired to the given connection's signals.
    pub fn spawn(connection: &ConnectionManager) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let state_tx = watch::Sender::new(SessionState::default());
        let state_rx = state_tx.subscribe();

        tokio::spawn(run_machine(
            cmd_rx,
            state_tx,
            connection.both_players_connected(),
            connection.lobby_full(),
            connection.scores(),
        ));

        Self { cmd_tx, state_rx }
    }

    /// The user chose a role. Moves the session into `Waiting`.
    pub fn player_selected(&self, slot: PlayerSlot) {
        let _ = self.cmd_tx.send(SessionCmd::PlayerSelected(slot));
    }

    /// Drops the session back to `PlayerSelection`, clearing everything.
    pub fn reset(&self) {
        let _ = self.cmd_tx.send(SessionCmd::Reset);
    }

    /// Subscribes to the published session state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }
}

/// The machine's event loop. Sole writer of `state_tx`.
async fn run_machine(
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCmd>,
    state_tx: watch::Sender<SessionState>,
    mut both_connected: watch::Receiver<bool>,
    mut lobby_full: watch::Receiver<bool>,
    mut scores: watch::Receiver<Option<ScoreEvent>>,
) {
    // The chosen slot lives here, not in the published state: readers only
    // need the number, and score ordering needs the slot.
    let mut slot: Option<PlayerSlot> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCmd::PlayerSelected(chosen)) => {
                    info!(player = %chosen, "player role selected");
                    slot = Some(chosen);
                    state_tx.send_replace(SessionState {
                        phase: GamePhase::Waiting,
                        player_number: chosen.number(),
                        score: (0, 0),
                    });
                }
                Some(SessionCmd::Reset) => {
                    debug!("session reset requested");
                    slot = None;
                    state_tx.send_replace(SessionState::default());
                }
                // All handles dropped; the session is over.
                None => break,
            },

            changed = both_connected.changed() => {
                if changed.is_err() {
                    break;
                }
                let connected = *both_connected.borrow_and_update();
                let phase = state_tx.borrow().phase;
                match (connected, phase) {
                    (true, GamePhase::Waiting) => {
                        info!("opponent present, match starting");
                        state_tx.send_modify(|s| s.phase = GamePhase::Playing);
                    }
                    (false, GamePhase::Playing) => {
                        // Mid-match connection loss. Nothing is resumable.
                        info!("connection lost mid-match, resetting session");
                        slot = None;
                        state_tx.send_replace(SessionState::default());
                    }
                    _ => {}
                }
            }

            changed = lobby_full.changed() => {
                if changed.is_err() {
                    break;
                }
                if *lobby_full.borrow_and_update() {
                    info!("lobby is full, returning to player selection");
                    slot = None;
                    state_tx.send_replace(SessionState::default());
                }
            }

            changed = scores.changed() => {
                if changed.is_err() {
                    break;
                }
                let event = scores.borrow_and_update().clone();
                if let (Some(ev), Some(slot)) = (event, slot) {
                    let score = ev.ordered_for(slot);
                    debug!(own = score.0, opponent = score.1, "score updated");
                    state_tx.send_modify(|s| s.score = score);
                }
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
