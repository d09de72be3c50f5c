//! Platform abstraction layer
//!
//! Maps raw browser key names onto per-whale `Controls` and the handful of
//! one-shot commands (intro dismissal, developer scenario shortcuts).
//! Pure Rust so it can be tested natively.

use std::collections::HashSet;

use crate::sim::{Controls, Scenario, WhaleRole};

/// Key names (lowercased `KeyboardEvent.key`) bound to each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlScheme {
    pub up: &'static str,
    pub down: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

impl ControlScheme {
    pub const WASD: ControlScheme = ControlScheme {
        up: "w",
        down: "s",
        left: "a",
        right: "d",
    };

    pub const ARROWS: ControlScheme = ControlScheme {
        up: "arrowup",
        down: "arrowdown",
        left: "arrowleft",
        right: "arrowright",
    };

    pub fn for_role(role: WhaleRole) -> Self {
        match role {
            WhaleRole::Primary => Self::WASD,
            WhaleRole::Secondary => Self::ARROWS,
        }
    }

    pub fn binds(&self, key: &str) -> bool {
        [self.up, self.down, self.left, self.right]
            .iter()
            .any(|&bound| bound == key)
    }
}

/// Keys currently held down
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keydown. Returns true if the key is bound to a whale
    /// (callers suppress the browser default for those).
    pub fn press(&mut self, key: &str) -> bool {
        let key = key.to_lowercase();
        let bound = WhaleRole::ALL
            .iter()
            .any(|&role| ControlScheme::for_role(role).binds(&key));
        self.held.insert(key);
        bound
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    /// Drop everything (window lost focus)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&key.to_lowercase())
    }

    pub fn controls_for(&self, role: WhaleRole) -> Controls {
        let scheme = ControlScheme::for_role(role);
        Controls {
            up: self.held.contains(scheme.up),
            down: self.held.contains(scheme.down),
            left: self.held.contains(scheme.left),
            right: self.held.contains(scheme.right),
        }
    }

    pub fn controls(&self) -> [Controls; 2] {
        WhaleRole::ALL.map(|role| self.controls_for(role))
    }
}

/// Developer shortcut for a digit key
pub fn dev_scenario_for_key(key: &str) -> Option<Scenario> {
    match key {
        "1" => Some(Scenario::Antarctica),
        "2" => Some(Scenario::Sydney),
        "3" => Some(Scenario::WarmWaters),
        _ => None,
    }
}

/// Keys that close the intro card
pub fn dismisses_intro(key: &str) -> bool {
    matches!(key.to_lowercase().as_str(), "enter" | " " | "escape")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemes_are_independent() {
        let mut keys = KeyState::new();
        assert!(keys.press("ArrowLeft"));
        assert!(keys.press("W"));
        assert!(!keys.press("q"));

        let [primary, secondary] = keys.controls();
        assert!(primary.up && !primary.left);
        assert!(secondary.left && !secondary.up);

        keys.release("arrowleft");
        assert!(!keys.controls_for(WhaleRole::Secondary).any());
        assert!(keys.is_held("w"));

        keys.clear();
        assert!(!keys.controls_for(WhaleRole::Primary).any());
    }

    #[test]
    fn test_dev_keys() {
        assert_eq!(dev_scenario_for_key("2"), Some(Scenario::Sydney));
        assert_eq!(dev_scenario_for_key("4"), None);
        assert!(dismisses_intro("Enter"));
        assert!(!dismisses_intro("a"));
    }
}
