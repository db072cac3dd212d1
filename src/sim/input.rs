//! Key-state table and logical driving controls
//!
//! The table is written by input listeners between frames and only read
//! during a frame. It is owned by the engine and passed explicitly to the
//! car update; nothing here is global.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pressed/released state per platform key code (e.g. `"ArrowLeft"`, `"KeyW"`)
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    keys: HashMap<String, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Returns the previous pressed state.
    pub fn set(&mut self, code: &str, pressed: bool) -> bool {
        match self.keys.get_mut(code) {
            Some(state) => std::mem::replace(state, pressed),
            None => {
                self.keys.insert(code.to_owned(), pressed);
                false
            }
        }
    }

    pub fn is_down(&self, code: &str) -> bool {
        self.keys.get(code).copied().unwrap_or(false)
    }

    /// True if any of the given codes is held
    pub fn any_down(&self, codes: &[String]) -> bool {
        codes.iter().any(|code| self.is_down(code))
    }

    /// Release every key, entry by entry
    pub fn clear(&mut self) {
        for state in self.keys.values_mut() {
            *state = false;
        }
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Platform key codes bound to each logical action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub turn_left: Vec<String>,
    pub turn_right: Vec<String>,
    pub accelerate: Vec<String>,
    pub brake: Vec<String>,
    /// Toggles on key-down
    pub headlights: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let codes = |list: &[&str]| list.iter().map(|c| c.to_string()).collect();
        Self {
            turn_left: codes(&["ArrowLeft", "KeyA"]),
            turn_right: codes(&["ArrowRight", "KeyD"]),
            accelerate: codes(&["ArrowUp", "KeyW"]),
            brake: codes(&["ArrowDown", "KeyS"]),
            headlights: codes(&["KeyL"]),
        }
    }
}

impl KeyBindings {
    /// Whether a code drives one of the four directions
    pub fn is_driving_key(&self, code: &str) -> bool {
        [&self.turn_left, &self.turn_right, &self.accelerate, &self.brake]
            .iter()
            .any(|codes| codes.iter().any(|c| c == code))
    }

    pub fn is_headlight_key(&self, code: &str) -> bool {
        self.headlights.iter().any(|c| c == code)
    }
}

/// Logical inputs for a single car update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub turn_left: bool,
    pub turn_right: bool,
    pub accelerate: bool,
    pub brake: bool,
}

impl Controls {
    /// Snapshot the key table through the bindings
    pub fn read(keys: &KeyState, bindings: &KeyBindings) -> Self {
        Self {
            turn_left: keys.any_down(&bindings.turn_left),
            turn_right: keys.any_down(&bindings.turn_right),
            accelerate: keys.any_down(&bindings.accelerate),
            brake: keys.any_down(&bindings.brake),
        }
    }

    pub fn accelerate() -> Self {
        Self {
            accelerate: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_set_returns_previous() {
        let mut keys = KeyState::new();
        assert!(!keys.set("ArrowUp", true));
        assert!(keys.set("ArrowUp", true));
        assert!(keys.is_down("ArrowUp"));
        assert!(keys.set("ArrowUp", false));
        assert!(!keys.is_down("ArrowUp"));
        assert!(!keys.is_down("KeyZ"));
    }

    #[test]
    fn test_controls_read_through_bindings() {
        let bindings = KeyBindings::default();
        let mut keys = KeyState::new();
        keys.set("KeyW", true);
        keys.set("ArrowLeft", true);

        let controls = Controls::read(&keys, &bindings);
        assert!(controls.accelerate);
        assert!(controls.turn_left);
        assert!(!controls.turn_right);
        assert!(!controls.brake);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut keys = KeyState::new();
        keys.set("KeyA", true);
        keys.set("KeyD", true);
        keys.clear();
        assert!(keys.is_empty());
        assert!(!keys.is_down("KeyA"));
    }

    #[test]
    fn test_binding_lookup() {
        let bindings = KeyBindings::default();
        assert!(bindings.is_driving_key("ArrowDown"));
        assert!(!bindings.is_driving_key("KeyL"));
        assert!(bindings.is_headlight_key("KeyL"));
    }
}
