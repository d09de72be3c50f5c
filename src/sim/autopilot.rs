//! Idle/demo mode - the whales play the game themselves
//!
//! Builds a `TickInput` from the current state: chase krill, breach, swim for
//! the edge once the mission is done, and finally find each other.

use glam::Vec2;

use super::scenario::Scenario;
use super::state::{GameState, Viewport};
use super::tick::TickInput;
use super::whale::{Controls, Whale};
use crate::consts::SURFACE_OFFSET;

/// Depth below the surface line the whales cruise at when heading for the edge
const CRUISE_DEPTH: f32 = 80.0;

pub fn autopilot(state: &GameState, now_ms: f64, viewport: Viewport) -> TickInput {
    let mut input = TickInput {
        now_ms,
        viewport,
        dismiss_intro: state.intro_pending,
        ..Default::default()
    };

    let cruise_y = viewport.sea_level() + SURFACE_OFFSET + CRUISE_DEPTH;
    let to_edge = |whale: &Whale| Some(Vec2::new(0.0, whale.pos.y.max(cruise_y)));
    let mission_done = state.is_mission_complete();

    match state.scenario {
        Scenario::Antarctica => {
            for (i, whale) in state.whales.iter().enumerate() {
                input.targets[i] = if mission_done {
                    to_edge(whale)
                } else if whale.krill_eaten < state.tuning.krill_target {
                    nearest_krill(state, whale.pos)
                } else {
                    None
                };
            }
        }
        Scenario::Sydney => {
            let up = Controls {
                up: true,
                ..Default::default()
            };
            for (i, whale) in state.whales.iter().enumerate() {
                if mission_done {
                    input.targets[i] = to_edge(whale);
                } else if whale.jumps_done < state.tuning.jump_target {
                    input.controls[i] = up;
                }
            }
        }
        Scenario::WarmWaters => {
            if state.calf.is_none() {
                let [a, b] = &state.whales;
                input.targets = [Some(b.pos), Some(a.pos)];
            }
        }
    }

    input
}

fn nearest_krill(state: &GameState, from: Vec2) -> Option<Vec2> {
    state
        .krill
        .particles
        .iter()
        .filter(|p| !p.eaten)
        .map(|p| p.pos)
        .min_by(|a, b| {
            a.distance_squared(from)
                .partial_cmp(&b.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::state::GameEvent;
    use crate::sim::tick::tick;

    #[test]
    fn test_autopilot_completes_voyage() {
        let viewport = Viewport::default();
        let mut state = GameState::new(2024, viewport, 0.0);
        let mut entered = Vec::new();
        let mut now = 0.0;

        for _ in 0..20_000 {
            now += TICK_MS as f64;
            let input = autopilot(&state, now, viewport);
            tick(&mut state, &input);
            for event in &state.events {
                if let GameEvent::ScenarioEntered(s) = event {
                    entered.push(*s);
                }
            }
            if state.calf.is_some() {
                break;
            }
        }

        assert_eq!(entered, vec![Scenario::Sydney, Scenario::WarmWaters]);
        assert!(state.calf.is_some());
        assert!(state.mission_complete || state.is_mission_complete());
    }

    #[test]
    fn test_autopilot_dismisses_intro() {
        let state = GameState::new(1, Viewport::default(), 0.0);
        let input = autopilot(&state, 16.0, Viewport::default());
        assert!(input.dismiss_intro);
        assert!(input.targets.iter().all(|t| t.is_some()));
    }
}
