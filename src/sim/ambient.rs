//! Scenery: fish, seagulls, corals and the hearts released when a calf is born.
//!
//! None of these affect gameplay.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::state::Viewport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fish {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seagull {
    pub pos: Vec2,
    pub speed: f32,
    /// Wing flap phase
    pub wing: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coral {
    /// Base of the coral (bottom center)
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

/// A floating heart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoveParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fades out and is removed at 0
    pub life: f32,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Palette index for the renderer
    pub color: u8,
}

/// Number of heart colors the renderer knows about
pub const LOVE_PALETTE_LEN: u8 = 5;

/// Scenery for the current scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ambient {
    pub fish: Vec<Fish>,
    pub seagulls: Vec<Seagull>,
    pub corals: Vec<Coral>,
    pub hearts: Vec<LoveParticle>,
}

impl Ambient {
    /// Replace all scenery with fresh entities. Hearts are dropped too.
    pub fn spawn<R: Rng>(
        &mut self,
        fish: usize,
        seagulls: usize,
        corals: usize,
        viewport: Viewport,
        rng: &mut R,
    ) {
        let sea = viewport.sea_level();
        let depth = (viewport.height - sea - 160.0).max(0.0);

        self.fish = (0..fish)
            .map(|_| Fish {
                pos: Vec2::new(
                    rng.random::<f32>() * viewport.width,
                    sea + 80.0 + rng.random::<f32>() * depth,
                ),
                size: 6.0 + rng.random::<f32>() * 8.0,
                speed: 0.6 + rng.random::<f32>() * 1.2,
            })
            .collect();

        self.seagulls = (0..seagulls)
            .map(|_| Seagull {
                pos: Vec2::new(
                    rng.random::<f32>() * viewport.width,
                    sea - 40.0 - rng.random::<f32>() * 80.0,
                ),
                speed: 0.4 + rng.random::<f32>() * 0.6,
                wing: rng.random::<f32>() * TAU,
            })
            .collect();

        self.corals = (0..corals)
            .map(|_| Coral {
                pos: Vec2::new(
                    40.0 + rng.random::<f32>() * (viewport.width - 80.0).max(0.0),
                    viewport.height - (30.0 + rng.random::<f32>() * 80.0),
                ),
                height: 20.0 + rng.random::<f32>() * 60.0,
                width: 8.0 + rng.random::<f32>() * 18.0,
            })
            .collect();

        self.hearts.clear();
    }

    /// Burst of hearts from `origin`
    pub fn release_hearts<R: Rng>(&mut self, origin: Vec2, count: usize, rng: &mut R) {
        for i in 0..count {
            // Two full turns spread across the burst
            let angle = TAU * 2.0 * i as f32 / count as f32;
            let speed = 0.5 + rng.random::<f32>() * 0.8;
            self.hearts.push(LoveParticle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed * 2.0,
                life: 1.3,
                size: 20.0 + rng.random::<f32>() * 15.0,
                rotation: rng.random::<f32>() * TAU,
                rotation_speed: (rng.random::<f32>() - 0.5) * 0.01,
                color: rng.random_range(0..LOVE_PALETTE_LEN),
            });
        }
    }

    pub fn update(&mut self, viewport: Viewport) {
        for fish in &mut self.fish {
            fish.pos.x -= fish.speed;
            if fish.pos.x < -20.0 {
                fish.pos.x = viewport.width + 20.0;
            }
        }

        for gull in &mut self.seagulls {
            gull.pos.x += gull.speed;
            if gull.pos.x > viewport.width + 50.0 {
                gull.pos.x = -50.0;
            }
            gull.wing += 0.2;
        }

        for heart in &mut self.hearts {
            heart.vel.y -= 0.01; // float upward
            heart.vel *= 0.98;
            heart.pos += heart.vel;
            heart.rotation += heart.rotation_speed;
            heart.life -= 0.004;
        }
        self.hearts.retain(|h| h.life > 0.0);
    }
}
