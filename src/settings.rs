//! Player preferences
//!
//! Persisted in LocalStorage, separate from the (unsaved) voyage itself.

use serde::{Deserialize, Serialize};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Silence every sound cue
    pub muted: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when the tab is hidden
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no bubble flourishes or heart bursts)
    pub reduced_motion: bool,

    // === Developer ===
    /// Keys 1/2/3 jump straight to a scenario
    pub dev_shortcuts: bool,
    /// Fixed RNG seed; a fresh one per visit when `None`
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            sfx_volume: 0.8,
            mute_on_blur: true,
            reduced_motion: false,
            dev_shortcuts: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Volume to feed the audio layer (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Whether cosmetic flourishes (hearts, bubbles) should play
    pub fn flourishes(&self) -> bool {
        !self.reduced_motion
    }

    /// Parse settings JSON, falling back to defaults on bad input
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid settings JSON: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "humpback_voyage_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json_or_default(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_volume_is_zero() {
        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        assert_eq!(settings.effective_volume(), 0.0);
        assert_eq!(Settings::default().effective_volume(), 0.8);
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json_or_default(r#"{"reduced_motion":true,"seed":42}"#);
        assert!(settings.reduced_motion);
        assert!(!settings.flourishes());
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.sfx_volume, 0.8);
    }

    #[test]
    fn test_bad_json_falls_back() {
        assert_eq!(Settings::from_json_or_default("{not json"), Settings::default());
    }
}
