//! Per-frame simulation tick
//!
//! Advances whales, krill, scenery, the calf, dialogue and the scenario
//! state machine by one frame. All rates are per tick.

use glam::Vec2;

use super::dialogue::DialogueContext;
use super::scenario::Scenario;
use super::state::{GameEvent, GameState, Viewport};
use super::whale::{Controls, WhaleRole};

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Wall clock for this tick (ms)
    pub now_ms: f64,
    /// Current drawing surface size
    pub viewport: Viewport,
    /// Held control keys per whale
    pub controls: [Controls; 2],
    /// New autonomous targets (pointer/touch guidance)
    pub targets: [Option<Vec2>; 2],
    /// Close the intro card
    pub dismiss_intro: bool,
    /// Developer scenario shortcut
    pub dev_scenario: Option<Scenario>,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();
    state.now_ms = input.now_ms;
    state.viewport = input.viewport;
    state.time_ticks += 1;

    if let Some(scenario) = input.dev_scenario {
        state.dev_override(scenario);
    }

    if input.dismiss_intro && state.intro_pending {
        log::info!("Intro dismissed in {}", state.scenario.title());
        state.intro_pending = false;
    }

    let mission_ready = state.refresh_mission_flag();

    for role in WhaleRole::ALL {
        let i = role.index();
        if let Some(target) = input.targets[i] {
            state.whales[i].set_target(target);
        }

        if state.whales[i].update(&input.controls[i], state.viewport, &mut state.rng) {
            state.events.push(GameEvent::JumpStarted(role));
        }

        if state.scenario == Scenario::Antarctica {
            let cap = state.tuning.krill_target;
            if state.whales[i].eat_krill(&mut state.krill, cap) > 0 {
                state.events.push(GameEvent::KrillEaten {
                    whale: role,
                    total: state.whales[i].krill_eaten,
                });
            }
        }
    }

    if state.scenario == Scenario::Antarctica {
        for id in state.krill.consume_exhausted() {
            state.events.push(GameEvent::SwarmConsumed(id));
        }
        let spawned = state.krill.update(
            state.viewport,
            state.now_ms,
            state.tuning.active_swarm_target,
            state.tuning.respawn_cooldown_ms,
            state.tuning.particles_per_swarm,
            &mut state.rng,
        );
        if let Some(id) = spawned {
            state.events.push(GameEvent::SwarmSpawned(id));
        }
    }

    state.check_calf_spawn();
    state.ambient.update(state.viewport);
    if let Some(calf) = state.calf.as_mut() {
        calf.follow(&state.whales[calf.mother.index()], state.viewport);
    }

    let ctx = DialogueContext::from_state(state);
    state
        .dialogue
        .update(&ctx, state.now_ms, &mut state.events);

    let calf_in_warm_waters = state.scenario == Scenario::WarmWaters && state.calf.is_some();
    if mission_ready && !calf_in_warm_waters {
        state.check_scenario_advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CALF_FADE_STEP, KRILL_PAD, SURFACE_OFFSET, TICK_MS};
    use crate::sim::dialogue::DialogueId;
    use crate::sim::whale::JumpState;

    fn input(now_ms: f64) -> TickInput {
        TickInput {
            now_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999, Viewport::default(), 0.0);
        let mut b = GameState::new(99999, Viewport::default(), 0.0);

        let right = Controls {
            right: true,
            ..Default::default()
        };
        for t in 0..300 {
            let mut frame = input(t as f64 * TICK_MS as f64);
            if t % 50 < 20 {
                frame.controls = [right, Controls::default()];
            }
            if t == 120 {
                frame.targets[1] = Some(Vec2::new(200.0, 500.0));
            }
            tick(&mut a, &frame);
            tick(&mut b, &frame);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.whales[0].pos, b.whales[0].pos);
        assert_eq!(a.whales[1].pos, b.whales[1].pos);
        assert_eq!(a.krill.particles.len(), b.krill.particles.len());
        assert_eq!(a.whales[0].krill_eaten, b.whales[0].krill_eaten);
    }

    #[test]
    fn test_dismiss_intro_triggers_dialogue() {
        let mut state = GameState::new(1, Viewport::default(), 0.0);
        tick(&mut state, &input(16.0));
        assert!(state.intro_pending);
        assert!(!state.dialogue.is_active(DialogueId::SplashIntro));

        let frame = TickInput {
            dismiss_intro: true,
            ..input(32.0)
        };
        tick(&mut state, &frame);
        assert!(!state.intro_pending);
        assert!(state.dialogue.is_active(DialogueId::SplashIntro));
        assert!(state.events.contains(&GameEvent::DialogueShown(DialogueId::SplashIntro)));
    }

    #[test]
    fn test_feeding_then_advance() {
        let mut state = GameState::new(3, Viewport::default(), 0.0);
        // Park every swarm in a whale's mouth, alternating whales
        let mouths = [state.whales[0].pos, state.whales[1].pos];
        for particle in &mut state.krill.particles {
            particle.pos = mouths[particle.swarm_id as usize % 2];
            particle.vel = Vec2::ZERO;
        }

        tick(&mut state, &input(16.0));
        let eaten = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::KrillEaten { .. }))
            .count();
        assert_eq!(eaten, 2);
        assert_eq!(state.whales[0].krill_eaten, 10);
        assert_eq!(state.whales[1].krill_eaten, 10);
        assert!(state.krill.particles.is_empty());
        assert!(state.krill.swarms.iter().all(|s| s.consumed));
        assert!(state.events.contains(&GameEvent::SwarmConsumed(0)));

        let left = Controls {
            left: true,
            ..Default::default()
        };
        let mut t = 32.0;
        while state.scenario == Scenario::Antarctica && t < 60_000.0 {
            let frame = TickInput {
                controls: [left, Controls::default()],
                ..input(t)
            };
            tick(&mut state, &frame);
            t += 16.0;
        }
        assert_eq!(state.scenario, Scenario::Sydney);
        assert!(state.krill.swarms.is_empty());
        assert_eq!(state.ambient.seagulls.len(), 6);
        assert_eq!(state.whales[0].krill_eaten, 0);
        assert!(state.events.contains(&GameEvent::ScenarioEntered(Scenario::Sydney)));
    }

    #[test]
    fn test_calf_born_and_fades_in() {
        let mut state = GameState::new(8, Viewport::default(), 0.0);
        tick(
            &mut state,
            &TickInput {
                dev_scenario: Some(Scenario::WarmWaters),
                ..input(16.0)
            },
        );
        assert_eq!(state.scenario, Scenario::WarmWaters);
        assert!(state.calf.is_none());

        let gap = state.whales[0].size.min(state.whales[1].size) * 0.5;
        state.whales[1].pos = state.whales[0].pos + Vec2::new(gap, 0.0);
        state.whales[0].vel = Vec2::ZERO;
        state.whales[1].vel = Vec2::ZERO;
        tick(&mut state, &input(32.0));

        assert!(state.events.contains(&GameEvent::CalfBorn));
        let first = state.calf.as_ref().expect("calf").opacity;
        assert!((first - CALF_FADE_STEP).abs() < 1e-6);

        tick(&mut state, &input(48.0));
        assert!(!state.events.contains(&GameEvent::CalfBorn));
        let second = state.calf.as_ref().expect("calf").opacity;
        assert!((second - 2.0 * CALF_FADE_STEP).abs() < 1e-6);

        // Terminal: the left edge does nothing
        state.whales[0].pos.x = 0.0;
        tick(&mut state, &input(64.0));
        assert_eq!(state.scenario, Scenario::WarmWaters);
        assert!(state.is_mission_complete());
    }

    #[test]
    fn test_breach_in_sydney() {
        let mut state = GameState::new(21, Viewport::default(), 0.0);
        state.enter_scenario(Scenario::Sydney);
        let surface = state.viewport.sea_level() + SURFACE_OFFSET;
        state.whales[0].pos.y = surface + 2.0;
        state.whales[0].vel.y = -6.0;

        tick(&mut state, &input(16.0));
        assert!(state.events.contains(&GameEvent::JumpStarted(WhaleRole::Primary)));
        assert_eq!(state.whales[0].jumps_done, 1);
        assert!(state.krill.particles.is_empty());
    }

    #[test]
    fn test_resize_takes_effect_next_tick() {
        let mut state = GameState::new(12, Viewport::default(), 0.0);
        for t in 1..30 {
            tick(&mut state, &input(t as f64 * 16.0));
        }

        let small = Viewport::new(600.0, 400.0);
        tick(
            &mut state,
            &TickInput {
                viewport: small,
                ..input(30.0 * 16.0)
            },
        );
        assert_eq!(state.viewport, small);
        for whale in &state.whales {
            assert!(whale.pos.x <= small.width);
            assert!(whale.pos.y <= whale.floor(small));
        }
        assert!(!state.krill.particles.is_empty());
        for particle in &state.krill.particles {
            assert!(particle.pos.x >= KRILL_PAD && particle.pos.x <= small.width - KRILL_PAD);
            assert!(particle.pos.y >= KRILL_PAD && particle.pos.y <= small.height - KRILL_PAD);
        }

        // A taller window lowers the surface; a whale above it is pushed down
        let tall = Viewport::new(1280.0, 1000.0);
        state.whales[0].pos.y = 0.0;
        state.whales[0].vel = Vec2::ZERO;
        state.whales[0].jump = JumpState::Swimming;
        let down = Controls {
            down: true,
            ..Default::default()
        };
        tick(
            &mut state,
            &TickInput {
                viewport: tall,
                controls: [down, Controls::default()],
                ..input(31.0 * 16.0)
            },
        );
        assert_eq!(state.whales[0].pos.y, tall.sea_level() + SURFACE_OFFSET);
        assert!(!state.whales[0].is_jumping());
    }

    #[test]
    fn test_dev_override_resets_dialogue() {
        let mut state = GameState::new(4, Viewport::default(), 0.0);
        tick(
            &mut state,
            &TickInput {
                dismiss_intro: true,
                ..input(16.0)
            },
        );
        assert!(state.dialogue.is_active(DialogueId::SplashIntro));

        tick(
            &mut state,
            &TickInput {
                dev_scenario: Some(Scenario::Antarctica),
                ..input(32.0)
            },
        );
        assert!(state.intro_pending);
        assert!(!state.dialogue.is_active(DialogueId::SplashIntro));
        assert_eq!(state.krill.swarms.len(), 9);
    }
}
