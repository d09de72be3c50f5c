//! Krill swarms
//!
//! Each swarm is a nearly stationary center with a cloud of particles.
//! Fresh particles drift freely for a settling window, then ease into an
//! orbit around their swarm center. Swarms are never removed once spawned,
//! so a swarm id stays valid for the whole scenario; only particles leave
//! the live set.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::state::Viewport;
use crate::consts::*;

/// A swarm center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swarm {
    pub id: u32,
    pub pos: Vec2,
    /// Tiny jitter velocity
    pub vel: Vec2,
    /// Cosmetic glow remaining (ms)
    pub glow_ms: f32,
    /// Set once by `consume_swarm`, never cleared
    pub consumed: bool,
}

/// A single krill particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrillParticle {
    pub swarm_id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Free-drift velocity, only used while settling
    pub vel: Vec2,
    /// Ticks alive
    pub age: u32,
    pub settling: bool,
    /// Orbit angle around the swarm center
    pub orbit_phase: f32,
    /// Orbit radius around the swarm center
    pub orbit_radius: f32,
    /// Removed from the live set on the next update
    pub eaten: bool,
}

/// All swarms and their particles for the current scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KrillField {
    pub swarms: Vec<Swarm>,
    pub particles: Vec<KrillParticle>,
    /// Wall-clock time of the last auto-spawn (ms)
    last_auto_spawn_ms: f64,
}

impl KrillField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live set with `count` fresh swarms. A count of zero clears.
    pub fn spawn_swarms<R: Rng>(
        &mut self,
        count: usize,
        per_swarm: usize,
        viewport: Viewport,
        rng: &mut R,
    ) {
        self.swarms.clear();
        self.particles.clear();
        self.add_swarms(count, per_swarm, viewport, rng);
    }

    /// Append `count` swarms without touching existing ones
    pub fn add_swarms<R: Rng>(
        &mut self,
        count: usize,
        per_swarm: usize,
        viewport: Viewport,
        rng: &mut R,
    ) {
        let min_y = viewport.sea_level() + SWARM_DEPTH_MIN;
        let y_range = (viewport.height - viewport.sea_level() - 160.0).max(40.0);

        for _ in 0..count {
            let id = self.swarms.len() as u32;
            let center = Vec2::new(
                rng.random::<f32>() * viewport.width,
                min_y + rng.random::<f32>() * y_range,
            );
            self.swarms.push(Swarm {
                id,
                pos: center,
                vel: Vec2::new(
                    rng.random::<f32>() * 0.02 - 0.01,
                    (rng.random::<f32>() * TAU).sin() * 0.02,
                ),
                glow_ms: 0.0,
                consumed: false,
            });

            for _ in 0..per_swarm {
                let offset = 6.0 + rng.random::<f32>() * 22.0;
                let angle = rng.random::<f32>() * TAU;
                let scatter = Vec2::new(
                    (rng.random::<f32>() - 0.5) * 6.0,
                    (rng.random::<f32>() - 0.5) * 6.0,
                );
                self.particles.push(KrillParticle {
                    swarm_id: id,
                    pos: center + Vec2::new(angle.cos(), angle.sin()) * offset + scatter,
                    radius: 1.0 + rng.random::<f32>() * 1.6,
                    vel: Vec2::new(
                        (rng.random::<f32>() - 0.5) * 0.08,
                        (rng.random::<f32>() - 0.5) * 0.04,
                    ),
                    age: 0,
                    settling: true,
                    orbit_phase: angle,
                    orbit_radius: offset,
                    eaten: false,
                });
            }
        }
    }

    /// Consume a whole swarm. Returns false if it is missing or already consumed.
    pub fn consume_swarm(&mut self, id: u32) -> bool {
        let Some(swarm) = self.swarms.get_mut(id as usize) else {
            return false;
        };
        if swarm.consumed {
            return false;
        }
        swarm.consumed = true;
        swarm.glow_ms = SWARM_CONSUME_GLOW_MS;
        for particle in self.particles.iter_mut().filter(|p| p.swarm_id == id) {
            particle.eaten = true;
        }
        log::info!("Krill swarm {} consumed", id);
        true
    }

    /// Mark live particles within `radius` of `pos` as eaten, at most `limit`.
    /// Returns how many were eaten.
    pub fn eat_near(&mut self, pos: Vec2, radius: f32, limit: u32) -> u32 {
        let mut eaten = 0;
        for particle in self.particles.iter_mut() {
            if eaten >= limit {
                break;
            }
            if !particle.eaten && particle.pos.distance(pos) < radius {
                particle.eaten = true;
                eaten += 1;
            }
        }
        eaten
    }

    /// Consume every unconsumed swarm with no uneaten particles left.
    /// Returns the ids that were consumed.
    pub fn consume_exhausted(&mut self) -> Vec<u32> {
        let exhausted: Vec<u32> = self
            .swarms
            .iter()
            .filter(|s| !s.consumed)
            .filter(|s| {
                !self
                    .particles
                    .iter()
                    .any(|p| p.swarm_id == s.id && !p.eaten)
            })
            .map(|s| s.id)
            .collect();
        exhausted
            .into_iter()
            .filter(|&id| self.consume_swarm(id))
            .collect()
    }

    /// Number of swarms not yet consumed
    pub fn active_swarms(&self) -> usize {
        self.swarms.iter().filter(|s| !s.consumed).count()
    }

    /// Live particles belonging to a swarm
    pub fn particles_in(&self, id: u32) -> impl Iterator<Item = &KrillParticle> {
        self.particles.iter().filter(move |p| p.swarm_id == id)
    }

    /// Advance swarms and particles one tick.
    ///
    /// Returns the id of an auto-spawned swarm, if one was added.
    pub fn update<R: Rng>(
        &mut self,
        viewport: Viewport,
        now_ms: f64,
        active_target: usize,
        cooldown_ms: f64,
        per_swarm: usize,
        rng: &mut R,
    ) -> Option<u32> {
        let bob = ((now_ms / 1200.0).sin() * 0.02) as f32;
        let max_x = (viewport.width - SWARM_MARGIN).max(SWARM_MARGIN);
        for swarm in &mut self.swarms {
            swarm.pos += swarm.vel + Vec2::new(0.0, bob);
            swarm.pos.x = swarm.pos.x.clamp(SWARM_MARGIN, max_x);
            if swarm.glow_ms > 0.0 {
                swarm.glow_ms = (swarm.glow_ms - TICK_MS).max(0.0);
            }
            swarm.vel *= SWARM_DAMPING;
        }

        let pad_max = Vec2::new(
            (viewport.width - KRILL_PAD).max(KRILL_PAD),
            (viewport.height - KRILL_PAD).max(KRILL_PAD),
        );
        let pad_min = Vec2::splat(KRILL_PAD);
        for particle in self.particles.iter_mut().filter(|p| !p.eaten) {
            particle.age += 1;
            if particle.settling && particle.age < KRILL_SETTLE_TICKS {
                particle.pos += particle.vel;
                particle.vel *= KRILL_SETTLE_DAMPING;
            } else {
                particle.settling = false;
                let Some(swarm) = self.swarms.get(particle.swarm_id as usize) else {
                    continue;
                };
                particle.orbit_phase +=
                    KRILL_ORBIT_STEP + rng.random::<f32>() * KRILL_ORBIT_JITTER;
                let slot = Vec2::new(
                    particle.orbit_phase.cos() * particle.orbit_radius,
                    (particle.orbit_phase * 0.9).sin() * particle.orbit_radius * 0.6,
                );
                particle.pos += (swarm.pos + slot - particle.pos) * KRILL_FOLLOW;
            }
            particle.pos = particle.pos.clamp(pad_min, pad_max);
        }

        self.particles.retain(|p| !p.eaten);

        if self.active_swarms() < active_target && now_ms - self.last_auto_spawn_ms > cooldown_ms {
            self.add_swarms(1, per_swarm, viewport, rng);
            self.last_auto_spawn_ms = now_ms;
            let id = self.swarms.len() as u32 - 1;
            log::info!("Auto-spawned krill swarm {}", id);
            return Some(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    fn field(count: usize, per_swarm: usize) -> (KrillField, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = KrillField::new();
        field.spawn_swarms(count, per_swarm, viewport(), &mut rng);
        (field, rng)
    }

    #[test]
    fn test_spawn_places_swarms_below_surface() {
        let (field, _) = field(9, 8);
        assert_eq!(field.swarms.len(), 9);
        assert_eq!(field.particles.len(), 72);

        let sea = viewport().sea_level();
        for swarm in &field.swarms {
            assert!(swarm.pos.y >= sea + SWARM_DEPTH_MIN);
            assert!(swarm.vel.length() < 0.05);
        }
        for particle in &field.particles {
            assert!(particle.settling);
            assert!(particle.orbit_radius >= 6.0 && particle.orbit_radius < 28.0);
        }
    }

    #[test]
    fn test_spawn_zero_clears() {
        let (mut field, mut rng) = field(3, 4);
        field.spawn_swarms(0, 8, viewport(), &mut rng);
        assert!(field.swarms.is_empty());
        assert!(field.particles.is_empty());
    }

    #[test]
    fn test_consume_swarm_is_idempotent() {
        let (mut field, mut rng) = field(9, 8);
        assert!(field.consume_swarm(2));
        assert!(!field.consume_swarm(2));
        assert!(!field.consume_swarm(99));
        assert_eq!(field.swarms[2].glow_ms, SWARM_CONSUME_GLOW_MS);

        // Particles linger until the next update
        assert_eq!(field.particles_in(2).count(), 8);
        field.update(viewport(), 0.0, 0, 1200.0, 8, &mut rng);
        assert_eq!(field.particles_in(2).count(), 0);
        assert_eq!(field.particles.len(), 64);
    }

    #[test]
    fn test_particles_settle_then_orbit() {
        let (mut field, mut rng) = field(1, 6);
        for tick in 0..KRILL_SETTLE_TICKS - 1 {
            field.update(viewport(), tick as f64 * 16.0, 0, 1200.0, 8, &mut rng);
        }
        assert!(field.particles.iter().all(|p| p.settling));

        field.update(viewport(), 1000.0, 0, 1200.0, 8, &mut rng);
        assert!(field.particles.iter().all(|p| !p.settling));

        // After a long time every particle sits close to its orbit band
        for tick in 0..600 {
            field.update(viewport(), 1000.0 + tick as f64 * 16.0, 0, 1200.0, 8, &mut rng);
        }
        let center = field.swarms[0].pos;
        for particle in &field.particles {
            assert!(particle.pos.distance(center) < particle.orbit_radius + 10.0);
        }
    }

    #[test]
    fn test_auto_respawn_respects_cooldown() {
        let (mut field, mut rng) = field(9, 8);
        field.consume_swarm(0);
        field.consume_swarm(1);

        // First refill is immediate (no previous auto-spawn)
        assert_eq!(field.update(viewport(), 5000.0, 9, 1200.0, 8, &mut rng), Some(9));
        assert_eq!(field.active_swarms(), 8);

        // Still one short, but the cooldown holds
        let mut now = 5000.0;
        while now <= 6200.0 {
            assert_eq!(field.update(viewport(), now, 9, 1200.0, 8, &mut rng), None);
            now += 16.0;
        }
        assert_eq!(field.update(viewport(), 6216.0, 9, 1200.0, 8, &mut rng), Some(10));
        assert_eq!(field.active_swarms(), 9);
        assert_eq!(field.particles_in(10).count(), 8);

        // Target met, nothing more spawns
        assert_eq!(field.update(viewport(), 99_000.0, 9, 1200.0, 8, &mut rng), None);
    }

    #[test]
    fn test_exhausted_swarm_is_consumed() {
        let (mut field, _) = field(2, 3);
        for particle in field.particles.iter_mut().filter(|p| p.swarm_id == 1) {
            particle.eaten = true;
        }
        assert_eq!(field.consume_exhausted(), vec![1]);
        assert!(field.swarms[1].consumed);
        assert!(!field.swarms[0].consumed);
        assert!(field.consume_exhausted().is_empty());
    }

    #[test]
    fn test_eat_near_respects_limit() {
        let (mut field, _) = field(1, 8);
        let center = field.swarms[0].pos;
        assert_eq!(field.eat_near(center, 100.0, 3), 3);
        assert_eq!(field.particles.iter().filter(|p| p.eaten).count(), 3);
    }

    proptest! {
        #[test]
        fn prop_consumed_never_reverts(ids in proptest::collection::vec(0u32..12, 1..20), seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut field = KrillField::new();
            field.spawn_swarms(9, 4, viewport(), &mut rng);
            let mut consumed = std::collections::HashSet::new();
            for (i, id) in ids.into_iter().enumerate() {
                let first = field.consume_swarm(id);
                prop_assert_eq!(first, id < 9 && consumed.insert(id));
                field.update(viewport(), i as f64 * 16.0, 0, 1200.0, 4, &mut rng);
                for &c in &consumed {
                    prop_assert!(field.swarms[c as usize].consumed);
                    prop_assert_eq!(field.particles_in(c).count(), 0);
                }
            }
        }
    }
}
