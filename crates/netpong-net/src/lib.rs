//! Connection management for Netpong.
//!
//! One [`ConnectionManager`] owns the client's single WebSocket to the match
//! server. It runs a cancellable background receive loop, classifies every
//! inbound text frame through `netpong-protocol`, and exposes the results as
//! observable state:
//!
//! - a [`ConnectionState`] signal (disconnected / connecting / connected),
//! - a "both players connected" boolean,
//! - last-value channels for collision, coordinates, and score events.
//!
//! All outputs are `tokio::sync::watch` channels: single-writer (the receive
//! loop), multi-reader, last-value-wins. A slow reader may skip intermediate
//! values; downstream logic only ever wants the newest.
//!
//! # Failure model
//!
//! Every transport error is caught at the receive-loop boundary and surfaces
//! only as "disconnected". There is no automatic reconnection: recovery is a
//! fresh [`ConnectionManager::connect`] call under caller control.

mod config;
mod error;
mod manager;

pub use config::ClientConfig;
pub use error::NetError;
pub use manager::{ConnectionManager, ConnectionState};
