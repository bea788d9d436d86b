//! The engine: one object that wires connection, session, and ball motion
//! together.
//!
//! ```text
//!                      ┌──────────────────┐
//!   select_player ───→ │ ConnectionManager │──── frames ────┐
//!                      └──────────────────┘                 │
//!                             │ signals                     ▼
//!                             ▼                      ┌─────────────┐
//!                      ┌──────────────────┐  phase   │ event pump  │
//!                      │ SessionStateMachine │──────→ │ (this file) │
//!                      └──────────────────┘          └─────────────┘
//!                                                           │ retarget /
//!                                                           ▼ snap
//!                                                    ┌─────────────┐
//!                                                    │ MotionDriver │──→ ball position
//!                                                    └─────────────┘
//! ```
//!
//! The pump is the only bridge between server events and ball motion. It
//! turns each collision event into a retarget command and parks the ball
//! on the serve spot whenever the session drops back to player selection.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use netpong_court::{map_game_to_table, TableDims, TablePoint};
use netpong_motion::{MotionCommands, MotionConfig, MotionDriver};
use netpong_net::{ClientConfig, ConnectionManager, ConnectionState};
use netpong_protocol::{CollisionEvent, CoordinatesEvent, PlayerSlot};

use crate::session::{GamePhase, SessionState, SessionStateMachine};

/// Where the ball rests between points, in table space: centered on the
/// near baseline (game coordinates `(0, -99)`).
pub fn serve_position() -> TablePoint {
    map_game_to_table(0.0, -(TableDims::GAME_TOP - 1.0))
}

/// The client engine. Create one, keep it alive for the whole session.
///
/// All outputs are watch channels: subscribe once, render from the latest
/// value. Dropping the engine tears down the connection, the session
/// machine, and the motion driver.
pub struct PongEngine {
    connection: Arc<ConnectionManager>,
    session: SessionStateMachine,
    driver: MotionDriver,
    pump: JoinHandle<()>,
}

impl PongEngine {
    /// Builds an engine pointed at the given server. Nothing connects
    /// until [`select_player`](Self::select_player).
    pub fn new(config: ClientConfig) -> Self {
        let connection = Arc::new(ConnectionManager::new(config));
        let session = SessionStateMachine::spawn(&connection);
        let driver =
            MotionDriver::spawn(serve_position(), MotionConfig::default());

        let pump = tokio::spawn(run_event_pump(
            connection.collisions(),
            connection.coordinates(),
            session.subscribe(),
            driver.commands(),
        ));

        Self { connection, session, driver, pump }
    }

    /// The user picked a role: the session moves to `Waiting` and the
    /// connection opens (superseding any previous one).
    pub async fn select_player(&self, slot: PlayerSlot) {
        self.session.player_selected(slot);
        self.connection.connect(slot).await;
    }

    /// Leaves the match: closes the connection and resets the session.
    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
        self.session.reset();
    }

    /// The published session state (phase, player number, score).
    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// The ball's position in table space, refreshed at the tick rate.
    pub fn ball_position(&self) -> watch::Receiver<TablePoint> {
        self.driver.subscribe()
    }

    /// The raw connection lifecycle, for status displays.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.state()
    }

    /// True when the server turned this client away at the door.
    pub fn lobby_full(&self) -> watch::Receiver<bool> {
        self.connection.lobby_full()
    }
}

impl Drop for PongEngine {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Routes server events into motion commands.
///
/// Collision handling follows the server's contract: the event's `x` is
/// where the ball will land across the table, its `y` sign says which
/// half it bounced in, and `v` scales the flight time. A non-positive
/// velocity marks an event that carries no motion and is skipped.
/// Coordinates events carry an actual ball position and retarget there
/// directly.
async fn run_event_pump(
    mut collisions: watch::Receiver<Option<CollisionEvent>>,
    mut coordinates: watch::Receiver<Option<CoordinatesEvent>>,
    mut session: watch::Receiver<SessionState>,
    motion: MotionCommands,
) {
    let mut phase = session.borrow_and_update().phase;

    loop {
        tokio::select! {
            changed = collisions.changed() => {
                if changed.is_err() {
                    break;
                }
                let event = collisions.borrow_and_update().clone();
                if let Some(ev) = event {
                    apply_collision(&motion, &ev);
                }
            }

            changed = coordinates.changed() => {
                if changed.is_err() {
                    break;
                }
                let event = coordinates.borrow_and_update().clone();
                if let Some(ev) = event {
                    apply_coordinates(&motion, &ev);
                }
            }

            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = session.borrow_and_update().phase;
                // Entering player selection parks the ball for the next
                // serve; every other phase change leaves motion alone.
                if next == GamePhase::PlayerSelection
                    && phase != GamePhase::PlayerSelection
                {
                    debug!("session reset, parking ball at serve position");
                    motion.snap_to(serve_position());
                }
                phase = next;
            }
        }
    }
}

fn apply_collision(motion: &MotionCommands, ev: &CollisionEvent) {
    if ev.v <= 0.0 {
        debug!(v = ev.v, "ignoring collision with non-positive velocity");
        return;
    }
    // The ball bounces away from the half it hit: a collision in the far
    // half sends it to the near baseline, and the other way around.
    let target_game_y = if ev.y > 0.0 {
        -(TableDims::GAME_TOP - 1.0)
    } else {
        TableDims::GAME_TOP - 1.0
    };
    let target = map_game_to_table(ev.x, target_game_y);
    trace!(x = target.x, z = target.z, v = ev.v, "retargeting ball");
    motion.retarget(target, ev.v);
}

fn apply_coordinates(motion: &MotionCommands, ev: &CoordinatesEvent) {
    if ev.v <= 0.0 {
        debug!(v = ev.v, "ignoring coordinates with non-positive velocity");
        return;
    }
    let target = map_game_to_table(ev.x, ev.y);
    trace!(x = target.x, z = target.z, v = ev.v, "retargeting ball");
    motion.retarget(target, ev.v);
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for the pure pieces; the full network-to-motion path is
    //! covered by `tests/session_flow.rs`.

    use super::*;

    #[test]
    fn test_serve_position_is_centered_on_near_baseline() {
        let serve = serve_position();

        assert_eq!(serve.x, 0.0);
        assert!(serve.z < 0.0, "serve spot is on the near half");
        // Game y = -99 maps just inside the table edge.
        assert!(serve.z > -(TableDims::EFFECTIVE_LENGTH / 2.0));
    }

    #[tokio::test]
    async fn test_apply_collision_bounces_near_hit_to_far_baseline() {
        let driver = MotionDriver::spawn(serve_position(), MotionConfig::default());
        let motion = driver.commands();
        let mut position = driver.subscribe();

        // A bounce in the near half (y < 0) sends the ball across the net.
        apply_collision(
            &motion,
            &CollisionEvent { x: 0.0, y: -20.0, v: 100.0, goal_x: None },
        );

        // v=100 clamps to the minimum flight time, so the ball settles
        // quickly on the far half.
        let settled = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            position.wait_for(|p| p.z > 0.0),
        )
        .await;
        assert!(settled.is_ok(), "ball should head to the far baseline");
    }

    #[tokio::test]
    async fn test_apply_collision_bounces_far_hit_to_near_baseline() {
        let far = map_game_to_table(0.0, TableDims::GAME_TOP - 1.0);
        let driver = MotionDriver::spawn(far, MotionConfig::default());
        let motion = driver.commands();
        let mut position = driver.subscribe();

        apply_collision(
            &motion,
            &CollisionEvent { x: 50.0, y: 20.0, v: 100.0, goal_x: None },
        );

        let settled = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            position.wait_for(|p| p.z < 0.0),
        )
        .await;
        assert!(settled.is_ok(), "ball should head back to the near baseline");
    }

    #[tokio::test]
    async fn test_apply_coordinates_retargets_to_reported_position() {
        let driver = MotionDriver::spawn(serve_position(), MotionConfig::default());
        let motion = driver.commands();
        let mut position = driver.subscribe();

        // Coordinates carry an actual position, not a bounce: the ball
        // heads exactly there.
        apply_coordinates(
            &motion,
            &CoordinatesEvent { x: 40.0, y: 60.0, v: 100.0 },
        );

        let expected = map_game_to_table(40.0, 60.0);
        let settled = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            position.wait_for(|p| p.distance_to(expected) < 1.0),
        )
        .await;
        assert!(settled.is_ok(), "ball should settle on the reported position");
    }

    #[tokio::test]
    async fn test_apply_coordinates_ignores_non_positive_velocity() {
        let driver = MotionDriver::spawn(serve_position(), MotionConfig::default());
        let motion = driver.commands();

        apply_coordinates(
            &motion,
            &CoordinatesEvent { x: 40.0, y: 60.0, v: 0.0 },
        );

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let at = *driver.subscribe().borrow();
        assert!(at.distance_to(serve_position()) < 1e-3);
    }

    #[tokio::test]
    async fn test_apply_collision_ignores_non_positive_velocity() {
        let driver = MotionDriver::spawn(serve_position(), MotionConfig::default());
        let motion = driver.commands();

        apply_collision(
            &motion,
            &CollisionEvent { x: 50.0, y: 10.0, v: 0.0, goal_x: None },
        );
        apply_collision(
            &motion,
            &CollisionEvent { x: 50.0, y: 10.0, v: -3.0, goal_x: None },
        );

        // Give the driver a few ticks; the ball must not have moved.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let at = *driver.subscribe().borrow();
        assert!(at.distance_to(serve_position()) < 1e-3);
    }
}
