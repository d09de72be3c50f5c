//! Whale actors
//!
//! A whale is steered by an autonomous target, by held control keys, or
//! (when neither applies) wanders on a slowly rotating drift heading.
//! Reaching the surface with upward speed launches a breach: a fixed
//! sinusoidal arc above the waterline that always lands back on the
//! surface line.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use super::krill::KrillField;
use super::state::Viewport;
use crate::consts::*;
use crate::finite_or;

/// Which parent a whale is. Decides its key bindings and its dialogue lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhaleRole {
    /// Bubbles (WASD)
    Primary,
    /// Splash (arrow keys)
    Secondary,
}

impl WhaleRole {
    pub const ALL: [WhaleRole; 2] = [WhaleRole::Primary, WhaleRole::Secondary];

    /// Slot in per-whale arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            WhaleRole::Primary => 0,
            WhaleRole::Secondary => 1,
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            WhaleRole::Primary => "Bubbles",
            WhaleRole::Secondary => "Splash",
        }
    }
}

/// Surface state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JumpState {
    Swimming,
    /// Airborne, `phase` runs from 0 to 1 over the arc
    Jumping { phase: f32 },
}

/// Directional control keys currently held for one whale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Controls {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// A parent whale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Whale {
    pub role: WhaleRole,
    pub name: String,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Body length scale, fixed at creation
    pub size: f32,
    pub jump: JumpState,
    /// Krill eaten this scenario (saturates at the mission target)
    pub krill_eaten: u32,
    /// Breaches started this scenario
    pub jumps_done: u32,
    pub joined: bool,
    pub target: Option<Vec2>,
    pub target_active: bool,
    /// Wander heading used when nothing steers the whale
    pub drift_angle: f32,
    /// Tail animation phase
    pub tail: f32,
}

impl Whale {
    pub fn new<R: Rng>(role: WhaleRole, pos: Vec2, viewport: Viewport, rng: &mut R) -> Self {
        Self {
            role,
            name: role.default_name().to_string(),
            pos,
            vel: Vec2::ZERO,
            size: viewport.width.min(viewport.height) * WHALE_SIZE_RATIO,
            jump: JumpState::Swimming,
            krill_eaten: 0,
            jumps_done: 0,
            joined: false,
            target: None,
            target_active: false,
            drift_angle: rng.random::<f32>() * TAU,
            tail: 0.0,
        }
    }

    #[inline]
    pub fn is_jumping(&self) -> bool {
        matches!(self.jump, JumpState::Jumping { .. })
    }

    /// Steer toward `target` until within capture range
    pub fn set_target(&mut self, target: Vec2) {
        self.target = Some(target);
        self.target_active = true;
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.target_active = false;
    }

    /// Zero per-scenario counters
    pub fn reset_progress(&mut self) {
        self.krill_eaten = 0;
        self.jumps_done = 0;
        self.joined = false;
    }

    /// Advance one tick. Returns true if a breach started this tick.
    pub fn update<R: Rng>(&mut self, controls: &Controls, viewport: Viewport, rng: &mut R) -> bool {
        self.update_movement(controls, rng);
        self.integrate();
        let breached = self.check_boundaries(viewport);
        self.update_jump(controls, viewport);
        self.sanitize(viewport);
        self.tail += TAIL_STEP;
        breached
    }

    fn update_movement<R: Rng>(&mut self, controls: &Controls, rng: &mut R) {
        let jumping = self.is_jumping();
        let mut controlled = false;

        if !jumping && self.target_active {
            if let Some(target) = self.target {
                let delta = target - self.pos;
                let dist = delta.length();
                if dist > WHALE_TARGET_CAPTURE {
                    let dir = delta / dist;
                    self.vel += dir * Vec2::new(WHALE_TARGET_ACCEL_X, WHALE_TARGET_ACCEL_Y);
                    controlled = true;
                } else {
                    self.target_active = false;
                }
            } else {
                self.target_active = false;
            }
        }

        if !jumping && !self.target_active {
            if controls.left {
                self.vel.x -= WHALE_CONTROL_ACCEL;
            }
            if controls.right {
                self.vel.x += WHALE_CONTROL_ACCEL;
            }
            if controls.up {
                self.vel.y -= WHALE_CONTROL_ACCEL;
            }
            if controls.down {
                self.vel.y += WHALE_CONTROL_ACCEL;
            }
            controlled |= controls.any();
        }

        if !controlled && !jumping {
            self.drift_angle += WHALE_DRIFT_TURN + rng.random::<f32>() * WHALE_DRIFT_TURN_JITTER;
            self.vel.x += self.drift_angle.cos() * WHALE_DRIFT_ACCEL_X;
            self.vel.y += (self.drift_angle * 0.8).sin() * WHALE_DRIFT_ACCEL_Y;
        }
    }

    fn integrate(&mut self) {
        self.vel *= WHALE_DAMPING;
        self.pos += self.vel;
    }

    fn check_boundaries(&mut self, viewport: Viewport) -> bool {
        let surface = viewport.sea_level() + SURFACE_OFFSET;
        let mut breached = false;
        if !self.is_jumping() && self.pos.y < surface {
            self.pos.y = surface;
            if self.vel.y < -BREACH_SPEED {
                self.start_jump();
                breached = true;
            }
        }
        self.pos.y = self.pos.y.min(self.floor(viewport));
        self.pos.x = self.pos.x.clamp(0.0, viewport.width.max(0.0));
        breached
    }

    /// Begin a breach. Counts the jump exactly once, on this edge.
    pub fn start_jump(&mut self) {
        if self.is_jumping() {
            return;
        }
        self.jump = JumpState::Jumping { phase: 0.0 };
        self.jumps_done = self.jumps_done.saturating_add(1);
    }

    fn update_jump(&mut self, controls: &Controls, viewport: Viewport) {
        let JumpState::Jumping { phase } = self.jump else {
            return;
        };
        let phase = phase + JUMP_PHASE_STEP;
        let arc = (PI * phase.min(1.0)).sin() * JUMP_HEIGHT;
        self.pos.y = viewport.sea_level() - arc + SURFACE_OFFSET;

        match self.target.filter(|_| self.target_active) {
            Some(target) => {
                self.vel.x += (target.x - self.pos.x).signum() * JUMP_TARGET_NUDGE;
            }
            None => {
                if controls.left {
                    self.vel.x -= JUMP_CONTROL_NUDGE;
                }
                if controls.right {
                    self.vel.x += JUMP_CONTROL_NUDGE;
                }
            }
        }

        if phase >= 1.0 {
            self.jump = JumpState::Swimming;
            self.vel.y = 0.0;
        } else {
            self.jump = JumpState::Jumping { phase };
        }
    }

    /// Lowest y the whale may reach
    #[inline]
    pub fn floor(&self, viewport: Viewport) -> f32 {
        viewport.height - self.size * WHALE_FLOOR_RATIO
    }

    /// Eat every krill particle within reach. Returns how many were eaten.
    pub fn eat_krill(&mut self, krill: &mut KrillField, cap: u32) -> u32 {
        let eaten = krill.eat_near(self.pos, self.size * EAT_RADIUS_RATIO, u32::MAX);
        self.krill_eaten = self.krill_eaten.saturating_add(eaten).min(cap);
        eaten
    }

    /// Non-finite state is a caller bug; clamp it back into the sea in release builds.
    fn sanitize(&mut self, viewport: Viewport) {
        debug_assert!(
            self.pos.is_finite() && self.vel.is_finite(),
            "whale {:?} left finite space: pos={:?} vel={:?}",
            self.role,
            self.pos,
            self.vel
        );
        if !self.pos.is_finite() || !self.vel.is_finite() {
            let fallback = Vec2::new(
                viewport.width / 2.0,
                viewport.sea_level() + SURFACE_OFFSET,
            );
            self.pos = finite_or(self.pos, fallback);
            self.vel = Vec2::ZERO;
        }
        if self.size.is_nan() || self.size < 0.0 {
            debug_assert!(false, "whale {:?} has invalid size {}", self.role, self.size);
            self.size = 0.0;
        }
    }
}

/// A newborn calf. It has no controls and only follows its mother.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calf {
    pub name: String,
    pub mother: WhaleRole,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Fades in from 0 to 1
    pub opacity: f32,
    pub life: f32,
    pub tail: f32,
}

impl Calf {
    pub fn born_to(mother: &Whale, size_ratio: f32) -> Self {
        Self {
            name: "Sandy".to_string(),
            mother: mother.role,
            pos: mother.pos + Vec2::new(-40.0, 20.0),
            vel: mother.vel,
            size: mother.size * size_ratio,
            opacity: 0.0,
            life: 0.01,
            tail: 0.0,
        }
    }

    /// Ease toward a slot just behind and below the mother
    pub fn follow(&mut self, mother: &Whale, viewport: Viewport) {
        if self.opacity < 1.0 {
            self.opacity = (self.opacity + CALF_FADE_STEP).min(1.0);
        }

        let side = if mother.vel.x < 0.0 { -1.0 } else { 1.0 };
        let target = Vec2::new(
            mother.pos.x - mother.vel.x * 6.0 - side * mother.size * 0.4,
            (viewport.sea_level() + SURFACE_OFFSET + 6.0).max(mother.pos.y + mother.size * 0.25),
        );

        let max_speed = (0.7 + 0.3 * mother.vel.length()).min(1.2);
        self.vel += (target - self.pos) * CALF_STEER;
        self.vel = self.vel.clamp_length_max(max_speed);
        self.vel *= CALF_DAMPING;
        self.pos += self.vel;

        let surface = viewport.sea_level() + SURFACE_OFFSET;
        let floor = viewport.height - self.size * WHALE_FLOOR_RATIO;
        self.pos.y = self.pos.y.max(surface).min(floor);
        self.pos.x = self
            .pos
            .x
            .clamp(-self.size * 3.0, viewport.width + self.size * 3.0);

        self.tail += 0.1;
        self.life += CALF_LIFE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn viewport() -> Viewport {
        Viewport::new(1200.0, 800.0)
    }

    fn whale() -> (Whale, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(42);
        let whale = Whale::new(WhaleRole::Primary, Vec2::new(600.0, 500.0), viewport(), &mut rng);
        (whale, rng)
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "left finite space")]
    fn test_nan_velocity_panics_in_debug() {
        let (mut whale, mut rng) = whale();
        whale.vel = Vec2::new(f32::NAN, 1.0);
        whale.update(&Controls::default(), viewport(), &mut rng);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_nan_velocity_clamped_in_release() {
        let (mut whale, mut rng) = whale();
        whale.vel = Vec2::new(f32::NAN, 1.0);
        whale.update(&Controls::default(), viewport(), &mut rng);

        let vp = viewport();
        assert!(whale.pos.is_finite());
        assert!(whale.pos.x >= 0.0 && whale.pos.x <= vp.width);
        assert!(whale.pos.y <= whale.floor(vp));
        assert_eq!(whale.vel, Vec2::ZERO);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid size")]
    fn test_negative_size_panics_in_debug() {
        let (mut whale, mut rng) = whale();
        whale.size = -5.0;
        whale.update(&Controls::default(), viewport(), &mut rng);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_negative_size_clamped_in_release() {
        let (mut whale, mut rng) = whale();
        whale.size = -5.0;
        whale.update(&Controls::default(), viewport(), &mut rng);
        assert_eq!(whale.size, 0.0);
        assert!(whale.pos.is_finite());
    }

    #[test]
    fn test_size_from_viewport() {
        let (whale, _) = whale();
        assert!((whale.size - 64.0).abs() < 0.001);
        assert_eq!(whale.name, "Bubbles");
    }

    #[test]
    fn test_control_moves_whale() {
        let (mut whale, mut rng) = whale();
        let right = Controls {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            whale.update(&right, viewport(), &mut rng);
        }
        assert!(whale.pos.x > 620.0);
        assert!(whale.vel.x > 1.5);
    }

    #[test]
    fn test_target_reached_clears_flag() {
        let (mut whale, mut rng) = whale();
        whale.set_target(Vec2::new(700.0, 520.0));
        let mut reached = false;
        for _ in 0..600 {
            whale.update(&Controls::default(), viewport(), &mut rng);
            if !whale.target_active {
                reached = true;
                break;
            }
        }
        assert!(reached);
        assert!(whale.pos.distance(Vec2::new(700.0, 520.0)) <= WHALE_TARGET_CAPTURE + 3.0);
    }

    #[test]
    fn test_target_overrides_controls() {
        let (mut whale, mut rng) = whale();
        whale.set_target(Vec2::new(100.0, 500.0));
        let right = Controls {
            right: true,
            ..Default::default()
        };
        for _ in 0..20 {
            whale.update(&right, viewport(), &mut rng);
        }
        assert!(whale.pos.x < 600.0);
    }

    #[test]
    fn test_breach_counts_once_and_lands_on_surface() {
        let (mut whale, mut rng) = whale();
        let surface = viewport().sea_level() + SURFACE_OFFSET;
        whale.pos.y = surface + 1.0;
        whale.vel.y = -5.0;

        let left = Controls {
            left: true,
            ..Default::default()
        };
        assert!(whale.update(&left, viewport(), &mut rng));
        assert!(whale.is_jumping());
        assert_eq!(whale.jumps_done, 1);

        let mut peak = f32::MAX;
        while whale.is_jumping() {
            assert!(!whale.update(&left, viewport(), &mut rng));
            peak = peak.min(whale.pos.y);
        }
        assert_eq!(whale.jumps_done, 1);
        assert!((whale.pos.y - surface).abs() < 0.01);
        assert_eq!(whale.vel.y, 0.0);
        // Arc peaks about JUMP_HEIGHT above the surface line
        assert!(peak < surface - JUMP_HEIGHT + 1.0);
    }

    #[test]
    fn test_start_jump_ignored_midair() {
        let (mut whale, _) = whale();
        whale.start_jump();
        whale.start_jump();
        assert_eq!(whale.jumps_done, 1);
    }

    #[test]
    fn test_floor_clamp() {
        let (mut whale, mut rng) = whale();
        let down = Controls {
            down: true,
            ..Default::default()
        };
        for _ in 0..200 {
            whale.update(&down, viewport(), &mut rng);
        }
        assert!(whale.pos.y <= whale.floor(viewport()) + 0.001);
    }

    #[test]
    fn test_eating_saturates() {
        let (mut whale, mut rng) = whale();
        let mut krill = KrillField::new();
        krill.spawn_swarms(3, 8, viewport(), &mut rng);
        for particle in &mut krill.particles {
            particle.pos = whale.pos + Vec2::new(3.0, 0.0);
        }
        assert_eq!(whale.eat_krill(&mut krill, 10), 24);
        assert_eq!(whale.krill_eaten, 10);
        assert!(krill.particles.iter().all(|p| p.eaten));
    }

    #[test]
    fn test_calf_fades_in_and_follows() {
        let (mother, _) = whale();
        let mut calf = Calf::born_to(&mother, 0.55);
        assert_eq!(calf.opacity, 0.0);
        assert!((calf.size - mother.size * 0.55).abs() < 0.001);

        calf.follow(&mother, viewport());
        assert!((calf.opacity - CALF_FADE_STEP).abs() < 1e-6);
        for _ in 0..400 {
            calf.follow(&mother, viewport());
        }
        assert_eq!(calf.opacity, 1.0);
        assert!(calf.pos.distance(mother.pos) < mother.size);
    }

    proptest! {
        #[test]
        fn prop_drift_velocity_stays_bounded(
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            seed in any::<u64>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut whale = Whale::new(WhaleRole::Secondary, Vec2::new(600.0, 500.0), viewport(), &mut rng);
            whale.vel = Vec2::new(vx, vy);
            for _ in 0..600 {
                whale.update(&Controls::default(), viewport(), &mut rng);
            }
            prop_assert!(!whale.is_jumping());
            prop_assert!(whale.vel.length() < 0.3);
        }
    }
}
