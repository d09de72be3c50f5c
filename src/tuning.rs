//! Data-driven game balance
//!
//! Mission thresholds and entity counts. Every field has a default so a
//! partial JSON blob only overrides what it names.

use serde::{Deserialize, Serialize};

/// Balance values consumed by the scenario state machine and krill model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Krill each whale must eat in Antarctica (also the counter cap)
    pub krill_target: u32,
    /// Breaches each whale must perform off Sydney
    pub jump_target: u32,
    /// Swarms spawned on entering Antarctica
    pub swarm_count: usize,
    /// Particles per swarm. Must be non-zero: an empty swarm is exhausted
    /// on arrival and would be respawned after every cooldown.
    pub particles_per_swarm: usize,
    /// Auto-respawn keeps at least this many unconsumed swarms
    pub active_swarm_target: usize,
    /// Minimum time between auto-spawned swarms (ms)
    pub respawn_cooldown_ms: f64,
    /// A whale at or left of this x may advance the scenario
    pub edge_threshold: f32,
    /// Parents closer than `min(size) * calf_trigger_ratio` meet
    pub calf_trigger_ratio: f32,
    /// Calf size relative to its mother
    pub calf_size_ratio: f32,
    /// Fish per scenario (Antarctica, Sydney, Warm Waters)
    pub fish_counts: [usize; 3],
    /// Seagulls per scenario
    pub seagull_counts: [usize; 3],
    /// Coral decorations in Warm Waters
    pub coral_count: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            krill_target: 10,
            jump_target: 5,
            swarm_count: 9,
            particles_per_swarm: 8,
            active_swarm_target: 9,
            respawn_cooldown_ms: 1200.0,
            edge_threshold: 12.0,
            calf_trigger_ratio: 0.8,
            calf_size_ratio: 0.55,
            fish_counts: [0, 8, 12],
            seagull_counts: [0, 6, 0],
            coral_count: 8,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    /// Replace values the simulation cannot run with by their defaults
    pub fn validated(mut self) -> Self {
        if self.particles_per_swarm == 0 {
            let fallback = Self::default().particles_per_swarm;
            log::warn!("particles_per_swarm must be non-zero, using {}", fallback);
            self.particles_per_swarm = fallback;
        }
        self
    }

    /// Parse tuning overrides, falling back to defaults on bad input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring invalid tuning JSON: {}", e);
                Self::default()
            }
        }
    }
}
