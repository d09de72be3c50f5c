//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Per-tick rates only (no measured delta time)
//! - Seeded RNG only
//! - Wall-clock time only as passed in through `TickInput`
//! - No rendering or platform dependencies

pub mod ambient;
pub mod autopilot;
pub mod dialogue;
pub mod krill;
pub mod scenario;
pub mod state;
pub mod tick;
pub mod whale;

pub use ambient::{Ambient, Coral, Fish, LoveParticle, Seagull};
pub use autopilot::autopilot;
pub use dialogue::{Anchor, CUES, Cue, DialogueContext, DialogueId, DialogueScheduler, Trigger};
pub use krill::{KrillField, KrillParticle, Swarm};
pub use scenario::Scenario;
pub use state::{GameEvent, GameState, Viewport};
pub use tick::{TickInput, tick};
pub use whale::{Calf, Controls, JumpState, Whale, WhaleRole};
