//! A terminal viewer for a netpong match.
//!
//! Joins the server as the given player and prints the session state and
//! the ball's projected screen position a few times per second. Useful
//! for watching a match without a renderer, and as a minimal example of
//! driving [`PongEngine`].
//!
//! ```text
//! console-viewer [1|2] [host port]
//! ```
//!
//! Defaults to player 1 on the production server. Set `RUST_LOG` to see
//! the engine's tracing output.

use std::time::Duration;

use netpong::prelude::*;

// Pretend screen for the projection printout.
const SCREEN_W: f32 = 800.0;
const SCREEN_H: f32 = 600.0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let slot = match args.next().as_deref() {
        Some("2") => PlayerSlot::Two,
        _ => PlayerSlot::One,
    };
    let config = match (args.next(), args.next()) {
        (Some(host), Some(port)) => ClientConfig::new(host, port.parse()?),
        _ => ClientConfig::default(),
    };

    eprintln!(
        "joining ws://{}:{} as {}",
        config.host, config.port, slot
    );

    let engine = PongEngine::new(config);
    engine.select_player(slot).await;

    let mut session = engine.session();
    let ball = engine.ball_position();
    let mirrored = slot == PlayerSlot::Two;

    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut was_active = false;

    loop {
        ticker.tick().await;
        let state = *session.borrow_and_update();

        // The demo exits once a started session drops back to the entry
        // phase (connection lost, lobby full, or match over).
        match state.phase {
            GamePhase::PlayerSelection if was_active => {
                eprintln!("session ended");
                break;
            }
            GamePhase::PlayerSelection => {}
            _ => was_active = true,
        }

        let at = *ball.borrow();
        let screen = if mirrored {
            project_mirrored(at.x, 0.0, at.z, SCREEN_W, SCREEN_H)
        } else {
            project(at.x, 0.0, at.z, SCREEN_W, SCREEN_H)
        };

        println!(
            "{:?} {}:{}  ball table ({:7.1}, {:7.1})  screen ({:5.1}, {:5.1})",
            state.phase, state.score.0, state.score.1, at.x, at.z, screen.x, screen.y
        );
    }

    engine.disconnect().await;
    Ok(())
}
