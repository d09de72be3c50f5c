//! Audio cues using the Web Audio API
//!
//! Procedurally generated sound effects - no external files needed.
//! `SoundEffect::for_event` is platform-independent; playback is wasm only.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// A whale gulps krill
    KrillGulp,
    /// A whole swarm has been eaten
    SwarmGlow,
    /// A whale leaves the water
    Breach,
    /// Speech bubble or banner appears
    BubblePop,
    /// Mission predicate just became true
    MissionComplete,
    /// Whale song on entering a new scenario
    ScenarioAdvance,
    /// The calf arrives
    CalfBorn,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::KrillEaten { .. } => Some(SoundEffect::KrillGulp),
            GameEvent::SwarmConsumed(_) => Some(SoundEffect::SwarmGlow),
            GameEvent::JumpStarted(_) => Some(SoundEffect::Breach),
            GameEvent::DialogueShown(_) => Some(SoundEffect::BubblePop),
            GameEvent::MissionComplete(_) => Some(SoundEffect::MissionComplete),
            GameEvent::ScenarioEntered(_) => Some(SoundEffect::ScenarioAdvance),
            GameEvent::CalfBorn => Some(SoundEffect::CalfBorn),
            GameEvent::SwarmSpawned(_) | GameEvent::DialogueEnded(_) => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use manager::AudioManager;

#[cfg(target_arch = "wasm32")]
mod manager {
    use super::SoundEffect;
    use crate::Settings;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: settings.effective_volume(),
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }

        /// Silence output without touching saved settings (tab hidden)
        pub fn set_suspended(&self, suspended: bool) {
            if let Some(ctx) = &self.ctx {
                let _ = if suspended { ctx.suspend() } else { ctx.resume() };
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::KrillGulp => self.play_gulp(ctx, vol),
                SoundEffect::SwarmGlow => self.play_swarm_glow(ctx, vol),
                SoundEffect::Breach => self.play_breach(ctx, vol),
                SoundEffect::BubblePop => self.play_bubble(ctx, vol),
                SoundEffect::MissionComplete => self.play_mission_complete(ctx, vol),
                SoundEffect::ScenarioAdvance => self.play_whale_song(ctx, vol),
                SoundEffect::CalfBorn => self.play_lullaby(ctx, vol),
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Short rising blip per note, staggered by `step` seconds
        fn arpeggio(&self, ctx: &AudioContext, vol: f32, notes: &[f32], step: f64, len: f64, osc_type: OscillatorType) {
            for (i, freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * step;
                gain.gain().set_value_at_time(vol, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + len)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + len + 0.05).ok();
            }
        }

        /// Krill gulp - low wet pop
        fn play_gulp(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(90.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Swarm glow - shimmering chime
        fn play_swarm_glow(&self, ctx: &AudioContext, vol: f32) {
            self.arpeggio(ctx, vol * 0.18, &[1200.0, 1800.0, 2400.0], 0.02, 0.3, OscillatorType::Sine);
        }

        /// Breach - rush up out of the water, then the splash
        fn play_breach(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Triangle) {
                gain.gain().set_value_at_time(vol * 0.35, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                    .ok();
                osc.frequency().set_value_at_time(120.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(420.0, t + 0.3)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.4).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(0.001, t).ok();
                gain.gain().set_value_at_time(vol * 0.15, t + 0.25).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.5)
                    .ok();
                osc.frequency().set_value_at_time(900.0, t + 0.25).ok();
                osc.frequency().set_value_at_time(300.0, t + 0.3).ok();
                osc.frequency().set_value_at_time(700.0, t + 0.35).ok();
                osc.frequency().set_value_at_time(150.0, t + 0.45).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.55).ok();
            }
        }

        /// Bubble - soft pop under a speech bubble
        fn play_bubble(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 500.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(500.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(950.0, t + 0.06)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        fn play_mission_complete(&self, ctx: &AudioContext, vol: f32) {
            self.arpeggio(ctx, vol * 0.3, &[400.0, 500.0, 600.0, 800.0], 0.1, 0.4, OscillatorType::Triangle);
        }

        /// Whale song - slow swooping moan
        fn play_whale_song(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.35, t + 0.4)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 1.6)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(420.0, t + 0.7)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(240.0, t + 1.5)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 1.7).ok();
        }

        /// Lullaby - gentle rising arpeggio for the calf
        fn play_lullaby(&self, ctx: &AudioContext, vol: f32) {
            self.arpeggio(ctx, vol * 0.25, &[523.0, 659.0, 784.0, 1047.0, 784.0], 0.15, 0.35, OscillatorType::Sine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DialogueId, Scenario, WhaleRole};

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::JumpStarted(WhaleRole::Secondary)),
            Some(SoundEffect::Breach)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ScenarioEntered(Scenario::Sydney)),
            Some(SoundEffect::ScenarioAdvance)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::CalfBorn), Some(SoundEffect::CalfBorn));
        assert_eq!(SoundEffect::for_event(&GameEvent::SwarmSpawned(3)), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::DialogueEnded(DialogueId::Woohoo)),
            None
        );
    }
}
