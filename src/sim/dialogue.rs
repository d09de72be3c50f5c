//! Timed dialogue scheduler
//!
//! Speech bubbles and banners are rows in a static cue table. Each cue has a
//! trigger predicate over a [`DialogueContext`], an optional delay, and a
//! display duration. A single scheduler walks every cue each tick; cues fire
//! at most once per scenario entry.

use serde::{Deserialize, Serialize};

use super::scenario::Scenario;
use super::state::{GameEvent, GameState};
use super::whale::WhaleRole;

/// Stable key for every cue in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueId {
    SplashIntro,
    SwarmTip,
    JumpTogether,
    MightyBreach,
    Woohoo,
    BigAndBrave,
    Again,
    OneMore,
    TravelNorth,
    CalfWelcome,
    CalfFact,
}

/// Where the presentation layer attaches a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Whale(WhaleRole),
    Calf,
    Banner,
}

/// Predicate that fires a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The scenario's intro card was dismissed
    IntroDismissed,
    /// Either whale has eaten at least this much krill
    EitherKrillAtLeast(u32),
    JumpsAtLeast(WhaleRole, u32),
    /// Both whales have breached at least this many times
    BothJumpsAtLeast(u32),
    CalfBorn,
    /// Another cue's display window has ended
    AfterFinished(DialogueId),
}

/// One row of the dialogue table
#[derive(Debug, Clone, Copy)]
pub struct Cue {
    pub id: DialogueId,
    pub scenario: Scenario,
    pub trigger: Trigger,
    pub delay_ms: f64,
    pub duration_ms: f64,
    pub anchor: Anchor,
    pub text: &'static str,
}

pub const CUES: &[Cue] = &[
    Cue {
        id: DialogueId::SplashIntro,
        scenario: Scenario::Antarctica,
        trigger: Trigger::IntroDismissed,
        delay_ms: 0.0,
        duration_ms: 4000.0,
        anchor: Anchor::Whale(WhaleRole::Secondary),
        text: "Let's fill up on krill before the long swim north!",
    },
    Cue {
        id: DialogueId::SwarmTip,
        scenario: Scenario::Antarctica,
        trigger: Trigger::EitherKrillAtLeast(3),
        delay_ms: 0.0,
        duration_ms: 5000.0,
        anchor: Anchor::Banner,
        text: "A single humpback can eat over a tonne of krill a day.",
    },
    Cue {
        id: DialogueId::JumpTogether,
        scenario: Scenario::Sydney,
        trigger: Trigger::IntroDismissed,
        delay_ms: 0.0,
        duration_ms: 3000.0,
        anchor: Anchor::Whale(WhaleRole::Primary),
        text: "Let's jump together!",
    },
    Cue {
        id: DialogueId::MightyBreach,
        scenario: Scenario::Sydney,
        trigger: Trigger::JumpsAtLeast(WhaleRole::Primary, 1),
        delay_ms: 0.0,
        duration_ms: 3000.0,
        anchor: Anchor::Whale(WhaleRole::Primary),
        text: "What a mighty breach!",
    },
    Cue {
        id: DialogueId::Woohoo,
        scenario: Scenario::Sydney,
        trigger: Trigger::JumpsAtLeast(WhaleRole::Secondary, 1),
        delay_ms: 0.0,
        duration_ms: 2000.0,
        anchor: Anchor::Whale(WhaleRole::Secondary),
        text: "Woohoo!",
    },
    Cue {
        id: DialogueId::BigAndBrave,
        scenario: Scenario::Sydney,
        trigger: Trigger::JumpsAtLeast(WhaleRole::Primary, 2),
        delay_ms: 0.0,
        duration_ms: 2000.0,
        anchor: Anchor::Whale(WhaleRole::Primary),
        text: "I feel big and brave!",
    },
    Cue {
        id: DialogueId::Again,
        scenario: Scenario::Sydney,
        trigger: Trigger::JumpsAtLeast(WhaleRole::Secondary, 3),
        delay_ms: 2000.0,
        duration_ms: 2000.0,
        anchor: Anchor::Whale(WhaleRole::Secondary),
        text: "Again! Again!",
    },
    Cue {
        id: DialogueId::OneMore,
        scenario: Scenario::Sydney,
        trigger: Trigger::JumpsAtLeast(WhaleRole::Primary, 4),
        delay_ms: 0.0,
        duration_ms: 2000.0,
        anchor: Anchor::Whale(WhaleRole::Primary),
        text: "One more!",
    },
    Cue {
        id: DialogueId::TravelNorth,
        scenario: Scenario::Sydney,
        trigger: Trigger::BothJumpsAtLeast(5),
        delay_ms: 1000.0,
        duration_ms: 5000.0,
        anchor: Anchor::Banner,
        text: "Time to travel north to warmer waters. Swim left!",
    },
    Cue {
        id: DialogueId::CalfWelcome,
        scenario: Scenario::WarmWaters,
        trigger: Trigger::CalfBorn,
        delay_ms: 600.0,
        duration_ms: 4000.0,
        anchor: Anchor::Calf,
        text: "Hello world! I'm Sandy!",
    },
    Cue {
        id: DialogueId::CalfFact,
        scenario: Scenario::WarmWaters,
        trigger: Trigger::AfterFinished(DialogueId::CalfWelcome),
        delay_ms: 800.0,
        duration_ms: 5000.0,
        anchor: Anchor::Banner,
        text: "Humpback calves are born in warm, shallow waters and drink their mother's milk.",
    },
];

/// Look up a cue in the built-in table
pub fn cue(id: DialogueId) -> Option<&'static Cue> {
    CUES.iter().find(|c| c.id == id)
}

/// The slice of game state cue triggers can see
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialogueContext {
    pub scenario: Scenario,
    pub krill_eaten: [u32; 2],
    pub jumps_done: [u32; 2],
    pub intro_dismissed: bool,
    pub calf_born: bool,
}

impl DialogueContext {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            scenario: state.scenario,
            krill_eaten: state.whales.each_ref().map(|w| w.krill_eaten),
            jumps_done: state.whales.each_ref().map(|w| w.jumps_done),
            intro_dismissed: !state.intro_pending,
            calf_born: state.calf.is_some(),
        }
    }
}

/// Runtime state of one cue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueSlot {
    pub triggered: bool,
    pub scheduled_at: Option<f64>,
    pub shown: bool,
    pub active: bool,
    pub start_ms: f64,
    pub finished_ms: Option<f64>,
}

/// Runs every cue in a table against the game state.
///
/// Only the slots are serialized. A deserialized scheduler always runs the
/// built-in `CUES`; a custom table from `with_cues` does not survive the
/// round trip, and saved slots that do not line up with `CUES` are reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SavedScheduler")]
pub struct DialogueScheduler {
    #[serde(skip_serializing)]
    cues: &'static [Cue],
    /// Parallel to `cues`
    slots: Vec<CueSlot>,
}

#[derive(Deserialize)]
struct SavedScheduler {
    #[serde(default)]
    slots: Vec<CueSlot>,
}

impl From<SavedScheduler> for DialogueScheduler {
    fn from(saved: SavedScheduler) -> Self {
        let mut scheduler = Self::new();
        if saved.slots.len() == scheduler.slots.len() {
            scheduler.slots = saved.slots;
        } else {
            log::warn!(
                "Saved dialogue has {} slots, table has {}; resetting",
                saved.slots.len(),
                scheduler.slots.len()
            );
        }
        scheduler
    }
}

impl Default for DialogueScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogueScheduler {
    pub fn new() -> Self {
        Self::with_cues(CUES)
    }

    pub fn with_cues(cues: &'static [Cue]) -> Self {
        for c in cues {
            if let Trigger::AfterFinished(other) = c.trigger {
                if !cues.iter().any(|o| o.id == other) {
                    log::warn!("Cue {:?} waits on {:?}, which is not in the table", c.id, other);
                }
            }
        }
        Self {
            cues,
            slots: vec![CueSlot::default(); cues.len()],
        }
    }

    /// Forget every trigger. Called on scenario entry.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.slots.resize(self.cues.len(), CueSlot::default());
    }

    pub fn slot(&self, id: DialogueId) -> Option<&CueSlot> {
        let index = self.cues.iter().position(|c| c.id == id)?;
        self.slots.get(index)
    }

    pub fn is_active(&self, id: DialogueId) -> bool {
        self.slot(id).is_some_and(|s| s.active)
    }

    /// Cues currently on screen
    pub fn active(&self) -> impl Iterator<Item = &'static Cue> + '_ {
        self.cues
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.active)
            .map(|(cue, _)| cue)
    }

    fn finished(&self, id: DialogueId) -> bool {
        self.slot(id).is_some_and(|s| s.finished_ms.is_some())
    }

    fn holds(&self, cue: &Cue, ctx: &DialogueContext) -> bool {
        if cue.scenario != ctx.scenario {
            return false;
        }
        match cue.trigger {
            Trigger::IntroDismissed => ctx.intro_dismissed,
            Trigger::EitherKrillAtLeast(n) => ctx.krill_eaten.iter().any(|&k| k >= n),
            Trigger::JumpsAtLeast(role, n) => ctx.jumps_done[role.index()] >= n,
            Trigger::BothJumpsAtLeast(n) => ctx.jumps_done.iter().all(|&j| j >= n),
            Trigger::CalfBorn => ctx.calf_born,
            Trigger::AfterFinished(other) => self.finished(other),
        }
    }

    /// Run the trigger, show and expire steps for every cue
    pub fn update(&mut self, ctx: &DialogueContext, now_ms: f64, events: &mut Vec<GameEvent>) {
        // Predicates see the state as of the start of this pass
        let firing: Vec<bool> = self
            .cues
            .iter()
            .zip(&self.slots)
            .map(|(cue, slot)| !slot.triggered && self.holds(cue, ctx))
            .collect();

        for ((cue, slot), fire) in self.cues.iter().zip(self.slots.iter_mut()).zip(firing) {
            if fire {
                slot.triggered = true;
                slot.scheduled_at = Some(now_ms + cue.delay_ms);
            }

            let due = slot.scheduled_at.is_some_and(|at| now_ms >= at);
            if !slot.shown && due {
                slot.shown = true;
                slot.active = true;
                slot.start_ms = now_ms;
                log::debug!("Dialogue {:?} shown", cue.id);
                events.push(GameEvent::DialogueShown(cue.id));
            }

            if slot.active && now_ms - slot.start_ms > cue.duration_ms {
                slot.active = false;
                slot.finished_ms = Some(now_ms);
                log::debug!("Dialogue {:?} ended", cue.id);
                events.push(GameEvent::DialogueEnded(cue.id));
            }
        }
    }
}
