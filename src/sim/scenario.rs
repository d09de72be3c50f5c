//! Scenario and mission state machine
//!
//! Antarctica (feed) -> Sydney (breach) -> Warm Waters (calf). Each scenario
//! has an entry action and a mission predicate; a completed mission lets a
//! whale swimming off the left edge carry the pair into the next scenario.
//! Warm Waters is terminal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};
use super::whale::{Calf, JumpState};
use crate::consts::LOVE_PARTICLE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Antarctica,
    Sydney,
    WarmWaters,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Antarctica, Scenario::Sydney, Scenario::WarmWaters];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Scenario::Antarctica => 0,
            Scenario::Sydney => 1,
            Scenario::WarmWaters => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The scenario after this one, `None` for the terminal scenario
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn title(self) -> &'static str {
        match self {
            Scenario::Antarctica => "Antarctica",
            Scenario::Sydney => "Sydney",
            Scenario::WarmWaters => "Warmer Waters",
        }
    }

    /// Whether this scenario opens with an intro card the player must dismiss
    pub fn has_intro(self) -> bool {
        matches!(self, Scenario::Antarctica | Scenario::Sydney)
    }
}

impl GameState {
    /// Reset all scenario-scoped state and spawn the scenario's entities
    pub fn enter_scenario(&mut self, scenario: Scenario) {
        self.scenario = scenario;
        self.mission_complete = false;
        self.intro_pending = scenario.has_intro();
        self.calf = None;
        self.dialogue.reset();

        let viewport = self.viewport;
        let tuning = &self.tuning;
        let swarms = if scenario == Scenario::Antarctica {
            tuning.swarm_count
        } else {
            0
        };
        let corals = if scenario == Scenario::WarmWaters {
            tuning.coral_count
        } else {
            0
        };
        self.krill
            .spawn_swarms(swarms, tuning.particles_per_swarm, viewport, &mut self.rng);
        self.ambient.spawn(
            tuning.fish_counts[scenario.index()],
            tuning.seagull_counts[scenario.index()],
            corals,
            viewport,
            &mut self.rng,
        );

        let center = viewport.center();
        let spacing = self.whales[0].size.max(120.0);
        let drop = (self.whales[1].size * 0.35).min(40.0);
        let slots = [
            Vec2::new(center.x - spacing, center.y),
            Vec2::new(center.x + spacing, center.y + drop),
        ];
        for (whale, slot) in self.whales.iter_mut().zip(slots) {
            whale.reset_progress();
            whale.pos = slot;
            whale.vel = Vec2::ZERO;
            whale.jump = JumpState::Swimming;
            whale.clear_target();
        }

        log::info!(
            "Entered scenario {} ({} swarms, {} fish, {} seagulls)",
            scenario.title(),
            self.krill.swarms.len(),
            self.ambient.fish.len(),
            self.ambient.seagulls.len()
        );
        self.events.push(GameEvent::ScenarioEntered(scenario));
    }

    /// True when the parents are close enough to welcome a calf
    pub fn parents_met(&self) -> bool {
        let [a, b] = &self.whales;
        self.whale_distance() < a.size.min(b.size) * self.tuning.calf_trigger_ratio
    }

    /// Mission predicate for the current scenario
    pub fn is_mission_complete(&self) -> bool {
        let [a, b] = &self.whales;
        match self.scenario {
            Scenario::Antarctica => {
                a.krill_eaten >= self.tuning.krill_target && b.krill_eaten >= self.tuning.krill_target
            }
            Scenario::Sydney => {
                a.jumps_done >= self.tuning.jump_target && b.jumps_done >= self.tuning.jump_target
            }
            Scenario::WarmWaters => self.calf.is_some() || self.parents_met(),
        }
    }

    /// Re-evaluate the mission flag, raising an event on the rising edge
    pub fn refresh_mission_flag(&mut self) -> bool {
        let complete = self.is_mission_complete();
        if complete && !self.mission_complete {
            log::info!("Mission complete in {}", self.scenario.title());
            self.events.push(GameEvent::MissionComplete(self.scenario));
        }
        self.mission_complete = complete;
        complete
    }

    /// Spawn the calf the first time the parents meet in Warm Waters
    pub fn check_calf_spawn(&mut self) -> bool {
        if self.scenario != Scenario::WarmWaters || self.calf.is_some() || !self.parents_met() {
            return false;
        }

        let calf = Calf::born_to(&self.whales[0], self.tuning.calf_size_ratio);
        let midpoint = (self.whales[0].pos + self.whales[1].pos) / 2.0;
        for whale in &mut self.whales {
            whale.joined = true;
        }
        self.ambient
            .release_hearts(midpoint, LOVE_PARTICLE_COUNT, &mut self.rng);
        log::info!("{} was born to {}", calf.name, self.whales[0].name);
        self.calf = Some(calf);
        self.events.push(GameEvent::CalfBorn);
        true
    }

    /// Move on to the next scenario once the mission is complete and a whale
    /// reaches the left edge. Returns true if the scenario changed.
    pub fn check_scenario_advance(&mut self) -> bool {
        if !self.is_mission_complete() {
            return false;
        }
        let Some(next) = self.scenario.next() else {
            return false;
        };
        let edge = self.tuning.edge_threshold;
        if self.whales.iter().any(|w| w.pos.x <= edge) {
            self.enter_scenario(next);
            return true;
        }
        false
    }

    /// Developer shortcut. Jumping back out of Warm Waters is not allowed,
    /// re-entering it is.
    pub fn dev_override(&mut self, scenario: Scenario) -> bool {
        if self.scenario == Scenario::WarmWaters && scenario != Scenario::WarmWaters {
            log::warn!("Ignoring scenario override to {} from Warm Waters", scenario.title());
            return false;
        }
        self.enter_scenario(scenario);
        true
    }
}
