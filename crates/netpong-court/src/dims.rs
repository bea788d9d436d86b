//! Physical table dimensions and the fixed virtual camera.
//!
//! These constants match a regulation table-tennis table (in millimetres)
//! and the camera placement the renderer was tuned against. They are
//! deliberately `const` rather than config: the server reports positions
//! against this exact geometry, so changing them would desynchronize the
//! client from the authoritative simulation.

/// Table geometry and the game-space coordinate range it maps to.
pub struct TableDims;

impl TableDims {
    /// Table width in millimetres (x axis).
    pub const WIDTH: f32 = 1525.0;

    /// Table length in millimetres (z axis, toward the far end).
    pub const LENGTH: f32 = 1700.0;

    /// Net height in millimetres (y axis, up).
    pub const NET_HEIGHT: f32 = 135.0;

    /// Game-space y at the far baseline.
    pub const GAME_TOP: f32 = 100.0;

    /// Game-space x at the left edge.
    pub const GAME_LEFT: f32 = -100.0;

    /// Game-space x at the right edge.
    pub const GAME_RIGHT: f32 = 100.0;

    /// Usable table length for mapping. The 2 mm inset keeps mapped
    /// positions strictly inside the drawn table outline.
    pub const EFFECTIVE_LENGTH: f32 = Self::LENGTH - 2.0;
}

/// The fixed virtual camera used for projection.
///
/// The camera sits behind the near baseline looking down the table, with a
/// tilt factor that fakes a raised viewing angle without a full 3D view
/// matrix.
pub struct Camera;

impl Camera {
    /// Distance from the camera to the table centre along z, in table units.
    pub const DISTANCE: f32 = 4500.0;

    /// Focal length controlling perspective strength.
    pub const FOCAL_LENGTH: f32 = 2500.0;

    /// Vertical tilt factor: how strongly depth (z) pushes points up the
    /// screen, simulating a raised viewpoint.
    pub const TILT: f32 = 0.8;

    /// Fraction of the half-screen height the table is shifted up by, to
    /// leave room for score/status chrome at the top and bottom.
    pub const VERTICAL_OFFSET_FRACTION: f32 = 0.1;
}
