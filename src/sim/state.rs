//! Game state and core simulation types
//!
//! Everything the simulation owns lives in `GameState`. The presentation
//! layer reads it (or its JSON snapshot) after each tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ambient::Ambient;
use super::dialogue::{DialogueId, DialogueScheduler};
use super::krill::KrillField;
use super::scenario::Scenario;
use super::whale::{Calf, Whale, WhaleRole};
use crate::tuning::Tuning;

/// Current drawing surface size. Re-read every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn sea_level(&self) -> f32 {
        crate::sea_level_for(self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Notifications for audio/HUD, collected during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScenarioEntered(Scenario),
    /// The mission predicate just turned true
    MissionComplete(Scenario),
    JumpStarted(WhaleRole),
    KrillEaten { whale: WhaleRole, total: u32 },
    SwarmConsumed(u32),
    SwarmSpawned(u32),
    CalfBorn,
    DialogueShown(DialogueId),
    DialogueEnded(DialogueId),
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub viewport: Viewport,
    /// Wall clock of the current tick (ms)
    pub now_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub scenario: Scenario,
    /// Mission predicate as evaluated at the start of the last tick
    pub mission_complete: bool,
    /// The intro card for this scenario is still up
    pub intro_pending: bool,
    /// Both parents; index with `WhaleRole::index`
    pub whales: [Whale; 2],
    pub calf: Option<Calf>,
    pub krill: KrillField,
    pub ambient: Ambient,
    pub dialogue: DialogueScheduler,
    /// Events raised during the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// New game in Antarctica with default tuning
    pub fn new(seed: u64, viewport: Viewport, now_ms: f64) -> Self {
        Self::with_tuning(seed, viewport, now_ms, Tuning::default())
    }

    pub fn with_tuning(seed: u64, viewport: Viewport, now_ms: f64, tuning: Tuning) -> Self {
        let tuning = tuning.validated();
        let mut rng = Pcg32::seed_from_u64(seed);
        let sea = viewport.sea_level();
        let center_x = viewport.width / 2.0;
        let whales = [
            Whale::new(
                WhaleRole::Primary,
                Vec2::new(center_x, sea + 200.0),
                viewport,
                &mut rng,
            ),
            Whale::new(
                WhaleRole::Secondary,
                Vec2::new(center_x + 180.0, sea + 260.0),
                viewport,
                &mut rng,
            ),
        ];

        let mut state = Self {
            seed,
            rng,
            tuning,
            viewport,
            now_ms,
            time_ticks: 0,
            scenario: Scenario::Antarctica,
            mission_complete: false,
            intro_pending: false,
            whales,
            calf: None,
            krill: KrillField::new(),
            ambient: Ambient::default(),
            dialogue: DialogueScheduler::new(),
            events: Vec::new(),
        };
        state.enter_scenario(Scenario::Antarctica);
        state
    }

    #[inline]
    pub fn whale(&self, role: WhaleRole) -> &Whale {
        &self.whales[role.index()]
    }

    /// Distance between the two parents
    pub fn whale_distance(&self) -> f32 {
        crate::distance(self.whales[0].pos, self.whales[1].pos)
    }

    /// Per-whale progress lines for the HUD
    pub fn hud_lines(&self) -> [String; 2] {
        let [a, b] = &self.whales;
        match self.scenario {
            Scenario::Antarctica => [
                format!("{}: {} / {} krill", a.name, a.krill_eaten, self.tuning.krill_target),
                format!("{}: {} / {} krill", b.name, b.krill_eaten, self.tuning.krill_target),
            ],
            Scenario::Sydney => [
                format!("{}: {} / {} jumps", a.name, a.jumps_done, self.tuning.jump_target),
                format!("{}: {} / {} jumps", b.name, b.jumps_done, self.tuning.jump_target),
            ],
            Scenario::WarmWaters => {
                let calf = match &self.calf {
                    Some(calf) => format!("{} - born", calf.name),
                    None => "No calf yet".to_string(),
                };
                [
                    format!("{}: Distance: {}px", a.name, self.whale_distance().round() as i64),
                    format!("{}: {}", b.name, calf),
                ]
            }
        }
    }

    /// JSON snapshot for the page renderer
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
