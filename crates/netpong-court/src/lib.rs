//! Table geometry and coordinate mapping for Netpong.
//!
//! Three coordinate systems exist in the engine, and this crate is the only
//! place that converts between them:
//!
//! - **Game-space** — the abstract, resolution-independent system the server
//!   reports ball positions in. x ∈ [-100, 100] across the table width,
//!   y ∈ [-100, 100] along its length.
//! - **Table-space** — physical millimetres matching a real table-tennis
//!   table (1525 × 1700 mm). Motion interpolation runs here.
//! - **Screen-space** — final 2D pixels after perspective projection under a
//!   fixed virtual camera.
//!
//! ```text
//! server event (game) → map_game_to_table → animation (table)
//!                                              │
//!                           project ◄──────────┘
//!                              │
//!                              ▼
//!                        pixels (screen)
//! ```
//!
//! Everything here is pure math: no I/O, no async, no dependencies. The
//! mapping functions are exact algebraic inverses of each other, which the
//! tests verify.

mod dims;
mod mapper;

pub use dims::{Camera, TableDims};
pub use mapper::{
    map_game_to_table, map_table_to_game, project, project_mirrored,
    ScreenPoint, TablePoint,
};
