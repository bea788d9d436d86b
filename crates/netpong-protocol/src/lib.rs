//! Inbound wire grammar for Netpong.
//!
//! The match server pushes UTF-8 text frames at the client; the client never
//! sends gameplay messages back. This crate defines the typed events those
//! frames decode into and the classifier that sorts raw frames into them:
//!
//! - **Types** ([`CollisionEvent`], [`CoordinatesEvent`], [`ScoreEvent`],
//!   [`ServerEvent`], [`PlayerSlot`]) — what a frame means once decoded.
//! - **Classifier** ([`parse_frame`]) — the frame grammar itself, including
//!   tolerance for both the enveloped and the flat payload forms that have
//!   occurred across protocol versions.
//! - **Errors** ([`ProtocolError`]) — why a frame failed to classify. The
//!   receive loop treats every such error as "drop the frame", never as a
//!   crash.
//!
//! # Architecture
//!
//! The protocol layer sits between the raw WebSocket frames and the session
//! machinery. It knows nothing about connections, tasks, or channels — it
//! only turns strings into events.
//!
//! ```text
//! WebSocket text frame → parse_frame → ServerEvent → session / motion
//! ```

mod classify;
mod error;
mod types;

pub use classify::parse_frame;
pub use error::ProtocolError;
pub use types::{
    CollisionEvent, CoordinatesEvent, PlayerSlot, ScoreEvent, ServerEvent,
};
