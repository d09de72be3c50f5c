//! Humpback Voyage - follow two humpback whales on their yearly migration
//!
//! Core modules:
//! - `sim`: Deterministic simulation (whales, krill, scenarios, timed dialogue)
//! - `platform`: Key bindings and held-key tracking
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `audio`: Event-driven sound cues (Web Audio on wasm)

pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// Every rate here is expressed per tick. The simulation assumes a roughly
/// constant ~60 Hz frame and never scales by measured delta time.
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Milliseconds represented by one tick (used for glow timers)
    pub const TICK_MS: f32 = 16.0;

    /// Sea level as a fraction of viewport height
    pub const SEA_LEVEL_RATIO: f32 = 0.3;

    /// Whale size as a fraction of the smaller viewport dimension
    pub const WHALE_SIZE_RATIO: f32 = 0.08;
    /// Acceleration from held control keys
    pub const WHALE_CONTROL_ACCEL: f32 = 0.18;
    /// Acceleration toward an autonomous target (x, y)
    pub const WHALE_TARGET_ACCEL_X: f32 = 0.22;
    pub const WHALE_TARGET_ACCEL_Y: f32 = 0.18;
    /// Within this distance the target counts as reached
    pub const WHALE_TARGET_CAPTURE: f32 = 8.0;
    /// Velocity damping applied every tick
    pub const WHALE_DAMPING: f32 = 0.92;
    /// Drift heading advance per tick (plus up to `WHALE_DRIFT_TURN_JITTER`)
    pub const WHALE_DRIFT_TURN: f32 = 0.008;
    pub const WHALE_DRIFT_TURN_JITTER: f32 = 0.003;
    /// Drift acceleration magnitudes (x, y)
    pub const WHALE_DRIFT_ACCEL_X: f32 = 0.02;
    pub const WHALE_DRIFT_ACCEL_Y: f32 = 0.008;
    /// Whales swim no higher than sea level + this offset
    pub const SURFACE_OFFSET: f32 = 20.0;
    /// Upward speed needed at the surface to breach
    pub const BREACH_SPEED: f32 = 0.1;
    /// Whale bottom clamp: y <= height - size * this
    pub const WHALE_FLOOR_RATIO: f32 = 1.6;
    /// Jump phase advance per tick (about 67 ticks per breach)
    pub const JUMP_PHASE_STEP: f32 = 0.015;
    /// Peak height of a breach above the surface line
    pub const JUMP_HEIGHT: f32 = 150.0;
    /// Horizontal nudge while airborne toward a target
    pub const JUMP_TARGET_NUDGE: f32 = 0.08;
    /// Horizontal nudge while airborne from control keys
    pub const JUMP_CONTROL_NUDGE: f32 = 0.45 * WHALE_CONTROL_ACCEL;
    /// Krill within `size * EAT_RADIUS_RATIO` of a whale get eaten
    pub const EAT_RADIUS_RATIO: f32 = 0.6;
    /// Tail animation phase per tick
    pub const TAIL_STEP: f32 = 0.08;

    /// Swarm centers spawn at least this far below the surface
    pub const SWARM_DEPTH_MIN: f32 = 60.0;
    /// Swarm centers keep this horizontal margin from the viewport edge
    pub const SWARM_MARGIN: f32 = 20.0;
    /// Krill particles keep this margin from the viewport edge
    pub const KRILL_PAD: f32 = 6.0;
    /// Ticks a fresh particle drifts before orbiting its swarm
    pub const KRILL_SETTLE_TICKS: u32 = 60;
    /// Swarm jitter damping per tick
    pub const SWARM_DAMPING: f32 = 0.98;
    /// Settling particle damping per tick
    pub const KRILL_SETTLE_DAMPING: f32 = 0.96;
    /// Orbit phase advance per tick (plus up to `KRILL_ORBIT_JITTER`)
    pub const KRILL_ORBIT_STEP: f32 = 0.008;
    pub const KRILL_ORBIT_JITTER: f32 = 0.002;
    /// Blend factor easing an orbiting particle toward its slot
    pub const KRILL_FOLLOW: f32 = 0.04;
    /// Glow duration set when a swarm is consumed (ms)
    pub const SWARM_CONSUME_GLOW_MS: f32 = 900.0;

    /// Calf steering gain, damping and fade-in rate
    pub const CALF_STEER: f32 = 0.02;
    pub const CALF_DAMPING: f32 = 0.95;
    pub const CALF_FADE_STEP: f32 = 0.007;
    pub const CALF_LIFE_STEP: f32 = 0.02;
    /// Number of hearts released when a calf is born
    pub const LOVE_PARTICLE_COUNT: usize = 18;
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Sea level for a viewport of the given height
#[inline]
pub fn sea_level_for(height: f32) -> f32 {
    height * consts::SEA_LEVEL_RATIO
}

/// Replace non-finite components with `fallback`
#[inline]
pub fn finite_or(v: Vec2, fallback: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.is_finite() { v.x } else { fallback.x },
        if v.y.is_finite() { v.y } else { fallback.y },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_level_is_upper_third() {
        assert!((sea_level_for(1000.0) - 300.0).abs() < 0.001);
    }

    #[test]
    fn test_finite_or_replaces_nan() {
        let v = finite_or(Vec2::new(f32::NAN, 3.0), Vec2::new(1.0, 1.0));
        assert_eq!(v, Vec2::new(1.0, 3.0));
    }
}
