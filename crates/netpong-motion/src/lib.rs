//! Motion interpolation for Netpong.
//!
//! The server reports ball state as sparse, discrete events: "the ball is
//! here, moving this fast". This crate reconstructs a continuous, plausible
//! trajectory between those events:
//!
//! - [`TrajectoryPlan`] — one animation segment: start, target, optional
//!   Bezier control point, and a duration derived from the reported speed.
//! - [`Interpolator`] — the live animation state. Retargeting mid-flight
//!   starts the new segment from the *currently interpolated* position, so
//!   the ball never teleports when events preempt each other.
//! - [`MotionDriver`] — a background task that ticks at a fixed rate and
//!   publishes the current position on a last-value-wins watch channel.
//!
//! # Concurrency
//!
//! At most one driver runs per session. The newest retarget command always
//! wins — there is no queue of pending trajectories. Dropping the driver
//! handle stops the task; no timer outlives it.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use netpong_court::TablePoint;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Shortest allowed animation segment.
pub const MIN_DURATION: Duration = Duration::from_millis(300);

/// Longest allowed animation segment.
pub const MAX_DURATION: Duration = Duration::from_millis(1500);

/// Converts a reported ball speed into an animation duration.
///
/// `duration_ms = clamp(3000 / velocity, 300, 1500)`. Faster balls animate
/// for less time. The clamp is total: zero velocity divides to infinity and
/// clamps to the upper bound, so no input produces an unbounded or undefined
/// duration.
pub fn duration_for_velocity(velocity: f32) -> Duration {
    let ms = 3000.0 / velocity;
    if ms.is_finite() {
        Duration::from_millis(ms.clamp(300.0, 1500.0) as u64)
    } else {
        MAX_DURATION
    }
}

/// Symmetric quadratic ease-in-out timing curve.
///
/// Accelerates through the first half, decelerates through the second.
/// Fixes the endpoints: `ease_in_out(0) == 0` and `ease_in_out(1) == 1`,
/// which is what keeps the interpolated position exact at both ends of a
/// segment.
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u / 2.0
    }
}

// ---------------------------------------------------------------------------
// Trajectory planning
// ---------------------------------------------------------------------------

/// Probability that a segment takes a curved (quadratic Bezier) path
/// instead of a straight line.
const CURVE_PROBABILITY: f64 = 0.3;

/// Range of the perpendicular control-point offset, in table units.
const CURVE_OFFSET_MIN: f32 = 50.0;
const CURVE_OFFSET_MAX: f32 = 150.0;

/// One planned animation segment in table space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPlan {
    /// Where the segment starts.
    pub start: TablePoint,
    /// Where it ends.
    pub target: TablePoint,
    /// Bezier control point; `None` means a straight line.
    pub control: Option<TablePoint>,
    /// How long the segment takes.
    pub duration: Duration,
    /// The reported speed the duration was derived from.
    pub velocity: f32,
}

impl TrajectoryPlan {
    /// Plans a segment from `start` to `target` at the reported `velocity`.
    ///
    /// With probability 0.3 the path curves: the control point sits at the
    /// segment midpoint, pushed perpendicular to the straight line by a
    /// random 50–150 table units. A zero-length segment degenerates to the
    /// midpoint with no offset (there is no perpendicular to push along).
    pub fn plan(
        start: TablePoint,
        target: TablePoint,
        velocity: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let control = if rng.random_bool(CURVE_PROBABILITY) {
            Some(Self::control_point(start, target, rng))
        } else {
            None
        };

        Self {
            start,
            target,
            control,
            duration: duration_for_velocity(velocity),
            velocity,
        }
    }

    /// Plans a straight-line segment. Used for the initial "resting" plan
    /// and anywhere randomness is unwanted.
    pub fn linear(start: TablePoint, target: TablePoint, velocity: f32) -> Self {
        Self {
            start,
            target,
            control: None,
            duration: duration_for_velocity(velocity),
            velocity,
        }
    }

    fn control_point(
        start: TablePoint,
        target: TablePoint,
        rng: &mut impl Rng,
    ) -> TablePoint {
        let mid = start.midpoint(target);

        let dx = target.x - start.x;
        let dz = target.z - start.z;
        let length = (dx * dx + dz * dz).sqrt();
        if length <= 0.0 {
            // Degenerate segment: nothing to be perpendicular to.
            return mid;
        }

        // Rotate the direction 90° and scale to a random arc height.
        let magnitude = rng.random_range(CURVE_OFFSET_MIN..CURVE_OFFSET_MAX);
        TablePoint::new(
            mid.x + (-dz / length) * magnitude,
            mid.z + (dx / length) * magnitude,
        )
    }

    /// The position at raw progress `t ∈ [0, 1]`.
    ///
    /// Linear: `start + (target - start) * t`.
    /// Curved: the quadratic Bezier
    /// `(1-t)²·start + 2(1-t)t·control + t²·target`.
    /// Both give exactly `start` at `t = 0` and exactly `target` at `t = 1`.
    pub fn position_at(&self, t: f32) -> TablePoint {
        match self.control {
            None => TablePoint::new(
                self.start.x + (self.target.x - self.start.x) * t,
                self.start.z + (self.target.z - self.start.z) * t,
            ),
            Some(c) => {
                let u = 1.0 - t;
                TablePoint::new(
                    u * u * self.start.x + 2.0 * u * t * c.x + t * t * self.target.x,
                    u * u * self.start.z + 2.0 * u * t * c.z + t * t * self.target.z,
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Interpolator
// ---------------------------------------------------------------------------

/// The live animation state: the current plan plus when it started.
///
/// Exactly one `Interpolator` is live per session. It is a plain value —
/// time is passed in explicitly (as [`tokio::time::Instant`], so tests can
/// run it under paused virtual time).
#[derive(Debug, Clone)]
pub struct Interpolator {
    plan: TrajectoryPlan,
    started_at: Instant,
}

impl Interpolator {
    /// Creates an interpolator resting at `initial` (a zero-length,
    /// already-finished segment).
    pub fn new(initial: TablePoint, now: Instant) -> Self {
        Self {
            plan: TrajectoryPlan::linear(initial, initial, 0.0),
            started_at: now,
        }
    }

    /// Raw (un-eased) progress of the current segment at `now`, in [0, 1].
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        let duration = self.plan.duration.as_secs_f32();
        if duration <= 0.0 {
            return 1.0;
        }
        (elapsed.as_secs_f32() / duration).clamp(0.0, 1.0)
    }

    /// The interpolated position at `now`: eased progress through the
    /// current plan's formula.
    pub fn position(&self, now: Instant) -> TablePoint {
        self.plan.position_at(ease_in_out(self.progress(now)))
    }

    /// Whether the current segment has run to completion.
    pub fn is_settled(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Starts a new segment toward `target` at the reported `velocity`.
    ///
    /// The new segment starts from the position the interpolator is
    /// reporting *right now* — not from the old segment's start or target —
    /// so an event that preempts a running animation never causes a visible
    /// jump. Progress restarts at 0; the preempted segment is discarded
    /// (newest event wins, nothing is queued).
    pub fn retarget(
        &mut self,
        target: TablePoint,
        velocity: f32,
        now: Instant,
        rng: &mut impl Rng,
    ) {
        let start = self.position(now);
        self.plan = TrajectoryPlan::plan(start, target, velocity, rng);
        self.started_at = now;
        trace!(
            ?start,
            ?target,
            velocity,
            duration_ms = self.plan.duration.as_millis() as u64,
            curved = self.plan.control.is_some(),
            "retargeted"
        );
    }

    /// Teleports to `point` and stops (zero-length finished segment).
    /// Used when a session resets and the ball returns to the serve spot.
    pub fn snap_to(&mut self, point: TablePoint, now: Instant) {
        self.plan = TrajectoryPlan::linear(point, point, 0.0);
        self.started_at = now;
    }

    /// The plan currently being animated.
    pub fn plan(&self) -> &TrajectoryPlan {
        &self.plan
    }
}

// ---------------------------------------------------------------------------
// MotionDriver — the background position publisher
// ---------------------------------------------------------------------------

/// Default publish rate for the driver, in Hz.
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Configuration for the [`MotionDriver`] task.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// How often the driver samples and publishes the position.
    /// This is a rendering-independent cadence: consumers read the watch
    /// channel whenever they draw, at whatever frame rate they like.
    pub tick_rate_hz: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { tick_rate_hz: DEFAULT_TICK_RATE_HZ }
    }
}

/// Commands accepted by the driver task.
#[derive(Debug, Clone, Copy)]
enum Command {
    /// Begin a new segment toward the given target.
    Retarget { target: TablePoint, velocity: f32 },
    /// Teleport to the given point and stop.
    SnapTo(TablePoint),
}

/// A cloneable handle for sending commands to a running driver.
#[derive(Debug, Clone)]
pub struct MotionCommands {
    tx: mpsc::UnboundedSender<Command>,
}

impl MotionCommands {
    /// Requests a new animation segment. If the driver has stopped the
    /// command is silently dropped — there is nothing left to animate.
    pub fn retarget(&self, target: TablePoint, velocity: f32) {
        let _ = self.tx.send(Command::Retarget { target, velocity });
    }

    /// Teleports the ball and stops the current segment.
    pub fn snap_to(&self, point: TablePoint) {
        let _ = self.tx.send(Command::SnapTo(point));
    }
}

/// The background task that turns the interpolator into an observable
/// position stream.
///
/// Spawning a driver starts a loop that ticks at the configured rate and
/// publishes [`Interpolator::position`] to a watch channel. Commands
/// preempt the tick via `select!`, so a retarget takes effect immediately,
/// not on the next tick boundary. Dropping the `MotionDriver` drops the
/// command sender, which stops the loop.
pub struct MotionDriver {
    commands: MotionCommands,
    position_rx: watch::Receiver<TablePoint>,
}

impl MotionDriver {
    /// Spawns the driver task, resting at `initial`.
    pub fn spawn(initial: TablePoint, config: MotionConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (pos_tx, position_rx) = watch::channel(initial);

        let rate = config.tick_rate_hz.max(1);
        let tick = Duration::from_secs_f64(1.0 / f64::from(rate));
        debug!(rate_hz = rate, "motion driver started");

        tokio::spawn(run_driver(initial, tick, cmd_rx, pos_tx));

        Self { commands: MotionCommands { tx: cmd_tx }, position_rx }
    }

    /// A cloneable command handle for this driver.
    pub fn commands(&self) -> MotionCommands {
        self.commands.clone()
    }

    /// Requests a new animation segment.
    pub fn retarget(&self, target: TablePoint, velocity: f32) {
        self.commands.retarget(target, velocity);
    }

    /// Teleports the ball and stops animating.
    pub fn snap_to(&self, point: TablePoint) {
        self.commands.snap_to(point);
    }

    /// Subscribes to the published position stream. Last-value-wins: a slow
    /// reader sees only the most recent sample.
    pub fn subscribe(&self) -> watch::Receiver<TablePoint> {
        self.position_rx.clone()
    }
}

async fn run_driver(
    initial: TablePoint,
    tick: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    pos_tx: watch::Sender<TablePoint>,
) {
    // ThreadRng is not Send, so the task owns a seeded StdRng instead.
    let mut rng = rand::rngs::StdRng::from_os_rng();
    let mut interpolator = Interpolator::new(initial, Instant::now());
    let mut next_tick = Instant::now() + tick;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Retarget { target, velocity }) => {
                    interpolator.retarget(target, velocity, Instant::now(), &mut rng);
                    pos_tx.send_replace(interpolator.position(Instant::now()));
                }
                Some(Command::SnapTo(point)) => {
                    interpolator.snap_to(point, Instant::now());
                    pos_tx.send_replace(point);
                }
                // All command handles dropped: the session is over.
                None => break,
            },
            _ = time::sleep_until(next_tick) => {
                next_tick += tick;
                pos_tx.send_replace(interpolator.position(Instant::now()));
            }
        }
    }

    debug!("motion driver stopped");
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn pt(x: f32, z: f32) -> TablePoint {
        TablePoint::new(x, z)
    }

    // =====================================================================
    // duration_for_velocity
    // =====================================================================

    #[test]
    fn test_duration_mid_range_velocity_is_unclamped() {
        assert_eq!(duration_for_velocity(5.0), Duration::from_millis(600));
    }

    #[test]
    fn test_duration_slow_ball_clamps_to_max() {
        assert_eq!(duration_for_velocity(1.0), MAX_DURATION);
    }

    #[test]
    fn test_duration_fast_ball_clamps_to_min() {
        assert_eq!(duration_for_velocity(100.0), MIN_DURATION);
    }

    #[test]
    fn test_duration_zero_velocity_is_bounded() {
        // 3000 / 0 → ∞, which must clamp rather than blow up.
        assert_eq!(duration_for_velocity(0.0), MAX_DURATION);
    }

    #[test]
    fn test_duration_always_within_bounds() {
        for v in [0.001f32, 0.5, 2.0, 10.0, 1e6] {
            let d = duration_for_velocity(v);
            assert!(d >= MIN_DURATION && d <= MAX_DURATION, "v={v} d={d:?}");
        }
    }

    // =====================================================================
    // ease_in_out
    // =====================================================================

    #[test]
    fn test_ease_fixes_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
    }

    #[test]
    fn test_ease_midpoint_is_half() {
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let t = i as f32 / 100.0;
            let e = ease_in_out(t);
            assert!(e >= prev, "not monotonic at t={t}");
            prev = e;
        }
    }

    // =====================================================================
    // TrajectoryPlan
    // =====================================================================

    #[test]
    fn test_linear_plan_endpoints_are_exact() {
        let plan = TrajectoryPlan::linear(pt(-100.0, 200.0), pt(300.0, -850.0), 5.0);
        assert_eq!(plan.position_at(0.0), pt(-100.0, 200.0));
        assert_eq!(plan.position_at(1.0), pt(300.0, -850.0));
    }

    #[test]
    fn test_curved_plan_endpoints_are_exact() {
        let plan = TrajectoryPlan {
            start: pt(-100.0, 200.0),
            target: pt(300.0, -850.0),
            control: Some(pt(500.0, 500.0)),
            duration: Duration::from_millis(600),
            velocity: 5.0,
        };
        // (1-t)² start + 2(1-t)t c + t² target collapses to the endpoints.
        assert_eq!(plan.position_at(0.0), pt(-100.0, 200.0));
        assert_eq!(plan.position_at(1.0), pt(300.0, -850.0));
    }

    #[test]
    fn test_linear_plan_midpoint_is_halfway() {
        let plan = TrajectoryPlan::linear(pt(0.0, 0.0), pt(100.0, -200.0), 5.0);
        assert_eq!(plan.position_at(0.5), pt(50.0, -100.0));
    }

    #[test]
    fn test_curved_plan_midpoint_bends_toward_control() {
        let plan = TrajectoryPlan {
            start: pt(0.0, 0.0),
            target: pt(100.0, 0.0),
            control: Some(pt(50.0, 100.0)),
            duration: Duration::from_millis(600),
            velocity: 5.0,
        };
        let mid = plan.position_at(0.5);
        assert_eq!(mid.x, 50.0);
        assert!(mid.z > 0.0, "curve should bow toward the control point");
    }

    #[test]
    fn test_plan_control_point_is_perpendicular_to_midpoint() {
        // Force the curved branch by trying seeds until one curves, then
        // verify the geometry: the control point sits on the perpendicular
        // through the midpoint, 50–150 units out.
        let start = pt(0.0, 0.0);
        let target = pt(200.0, 0.0);
        for seed in 0..64 {
            let mut r = StdRng::seed_from_u64(seed);
            let plan = TrajectoryPlan::plan(start, target, 5.0, &mut r);
            if let Some(c) = plan.control {
                // Segment runs along x, so the perpendicular is pure z.
                assert_eq!(c.x, 100.0, "control stays at the midpoint x");
                let offset = c.z.abs();
                assert!(
                    (CURVE_OFFSET_MIN..CURVE_OFFSET_MAX).contains(&offset),
                    "offset {offset} outside [50, 150)"
                );
                return;
            }
        }
        panic!("no seed in 0..64 produced a curved path");
    }

    #[test]
    fn test_plan_zero_distance_control_degenerates_to_midpoint() {
        let p = pt(40.0, -30.0);
        for seed in 0..64 {
            let mut r = StdRng::seed_from_u64(seed);
            let plan = TrajectoryPlan::plan(p, p, 5.0, &mut r);
            if let Some(c) = plan.control {
                assert_eq!(c, p, "degenerate control must be the midpoint");
                return;
            }
        }
        panic!("no seed in 0..64 produced a curved path");
    }

    #[test]
    fn test_plan_curve_frequency_is_roughly_thirty_percent() {
        let mut r = rng();
        let curved = (0..2000)
            .filter(|_| {
                TrajectoryPlan::plan(pt(0.0, 0.0), pt(100.0, 100.0), 5.0, &mut r)
                    .control
                    .is_some()
            })
            .count();
        // 2000 draws at p=0.3: ~600 expected; allow a generous band.
        assert!(
            (450..750).contains(&curved),
            "curved {curved}/2000 is far from the 0.3 probability"
        );
    }

    // =====================================================================
    // Interpolator
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_interpolator_new_rests_at_initial() {
        let now = Instant::now();
        let interp = Interpolator::new(pt(10.0, 20.0), now);
        assert_eq!(interp.position(now), pt(10.0, 20.0));
        assert!(interp.is_settled(now));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retarget_starts_exactly_at_current_position() {
        let now = Instant::now();
        let mut interp = Interpolator::new(pt(0.0, 0.0), now);
        let mut r = rng();

        interp.retarget(pt(400.0, -600.0), 5.0, now, &mut r);

        // At progress 0 the position equals the recorded start exactly.
        assert_eq!(interp.position(now), pt(0.0, 0.0));
        assert_eq!(interp.progress(now), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interpolator_reaches_target_exactly_at_duration() {
        let now = Instant::now();
        let mut interp = Interpolator::new(pt(0.0, 0.0), now);
        let mut r = rng();

        interp.retarget(pt(400.0, -600.0), 5.0, now, &mut r); // 600 ms

        let end = now + Duration::from_millis(600);
        assert_eq!(interp.position(end), pt(400.0, -600.0));
        assert!(interp.is_settled(end));

        // And it stays put afterwards.
        let later = end + Duration::from_secs(5);
        assert_eq!(interp.position(later), pt(400.0, -600.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interruption_preserves_continuity() {
        // A second event arriving mid-flight must start the new segment at
        // the position being reported at that instant — not at the old
        // start, not at the old target.
        let now = Instant::now();
        let mut interp = Interpolator::new(pt(0.0, 0.0), now);
        let mut r = rng();

        interp.retarget(pt(400.0, 0.0), 5.0, now, &mut r);

        let mid = now + Duration::from_millis(250);
        let reported = interp.position(mid);
        assert_ne!(reported, pt(0.0, 0.0));
        assert_ne!(reported, pt(400.0, 0.0));

        interp.retarget(pt(-200.0, 300.0), 10.0, mid, &mut r);

        // The new segment's start equals the interrupted position.
        assert_eq!(interp.plan().start, reported);
        assert_eq!(interp.position(mid), reported);
        // And the old target is gone — newest event wins.
        assert_eq!(interp.plan().target, pt(-200.0, 300.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snap_to_teleports_and_settles() {
        let now = Instant::now();
        let mut interp = Interpolator::new(pt(0.0, 0.0), now);
        let mut r = rng();
        interp.retarget(pt(400.0, 0.0), 5.0, now, &mut r);

        let mid = now + Duration::from_millis(100);
        interp.snap_to(pt(-7.0, 849.0), mid);

        assert_eq!(interp.position(mid), pt(-7.0, 849.0));
        assert!(interp.is_settled(mid));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_clamps_before_start_and_after_end() {
        let now = Instant::now();
        let mut interp = Interpolator::new(pt(0.0, 0.0), now);
        let mut r = rng();
        interp.retarget(pt(100.0, 0.0), 5.0, now + Duration::from_secs(1), &mut r);

        // Querying "before" the segment started saturates to 0.
        assert_eq!(interp.progress(now), 0.0);
        // Querying long after saturates to 1.
        assert_eq!(interp.progress(now + Duration::from_secs(60)), 1.0);
    }
}
