//! Coordinate mapping and camera projection.
//!
//! Two linear maps (game ↔ table) and one perspective projection
//! (table → screen). The linear maps are exact inverses; the projection
//! clamps its denominator so points behind the camera plane can never
//! produce a division blow-up or a sign flip.

use crate::dims::{Camera, TableDims};

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// A point on the table plane, in table-space millimetres.
///
/// `x` runs across the table (left/right), `z` along it (near/far).
/// Height above the table is handled separately at projection time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TablePoint {
    /// Across the table, 0 at the centre line.
    pub x: f32,
    /// Along the table, 0 at the net.
    pub z: f32,
}

impl TablePoint {
    /// Creates a table-space point.
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Straight-line distance to another point.
    pub fn distance_to(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// The point halfway between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            z: (self.z + other.z) / 2.0,
        }
    }
}

/// A 2D screen position in pixels, produced by [`project`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

// ---------------------------------------------------------------------------
// Game ↔ table mapping
// ---------------------------------------------------------------------------

/// Converts a game-space coordinate into table-space millimetres.
///
/// Both axes are independent linear scales: game x ∈ [-100, 100] spans the
/// table width, game y ∈ [-100, 100] spans the (effective) table length.
/// Exact algebraic inverse of [`map_table_to_game`].
pub fn map_game_to_table(game_x: f32, game_y: f32) -> TablePoint {
    let table_x = game_x * (TableDims::WIDTH / 2.0) / TableDims::GAME_RIGHT;
    let table_z =
        game_y * (TableDims::EFFECTIVE_LENGTH / 2.0) / TableDims::GAME_TOP;
    TablePoint::new(table_x, table_z)
}

/// Converts a table-space point back into game-space coordinates.
///
/// Inverse of [`map_game_to_table`].
pub fn map_table_to_game(point: TablePoint) -> (f32, f32) {
    let game_x = point.x * TableDims::GAME_RIGHT / (TableDims::WIDTH / 2.0);
    let game_y =
        point.z * TableDims::GAME_TOP / (TableDims::EFFECTIVE_LENGTH / 2.0);
    (game_x, game_y)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Projects a 3D table-space point to 2D screen pixels.
///
/// `x` is across the table, `y` is height above it, `z` is depth (positive
/// toward the far end). The denominator `z + DISTANCE` is clamped to 1.0 so
/// a point at or behind the camera plane projects to a large-but-finite
/// position instead of exploding or flipping through the camera.
pub fn project(
    x: f32,
    y: f32,
    z: f32,
    screen_w: f32,
    screen_h: f32,
) -> ScreenPoint {
    let cx = screen_w / 2.0;
    let cy = screen_h / 2.0;

    let safe_z = (z + Camera::DISTANCE).max(1.0);
    let scale = Camera::FOCAL_LENGTH / safe_z;

    // Shift the whole scene up a little: the top/bottom of the viewport is
    // reserved for score and status chrome.
    let vertical_offset = -(cy * Camera::VERTICAL_OFFSET_FRACTION);

    ScreenPoint {
        x: cx + x * scale,
        y: cy + vertical_offset - y * scale - z * Camera::TILT * scale,
    }
}

/// Projects for the opposite side of the table.
///
/// Player two sees the table from the far end, so x and z are negated
/// before projecting. Height is unaffected.
pub fn project_mirrored(
    x: f32,
    y: f32,
    z: f32,
    screen_w: f32,
    screen_h: f32,
) -> ScreenPoint {
    project(-x, y, -z, screen_w, screen_h)
}

// =========================================================================
// Tests
// =========================================================================
