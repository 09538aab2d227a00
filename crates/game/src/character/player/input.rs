use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw player intents for the current frame, written by whatever drives the
/// simulation (keyboard, script, replay).
#[derive(Resource, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerIntents {
    pub move_left: bool,
    pub move_right: bool,
    pub sprint: bool,
    pub jump: bool,
    pub attack: bool,
    pub block: bool,
}

/// Rising edges of the press-to-trigger intents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentEdges {
    pub attack: bool,
    pub jump: bool,
}

impl PlayerIntents {
    /// -1 left, 1 right, 0 for none or both.
    pub fn horizontal(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Compare against last frame's intents and remember the current ones.
    pub fn edges(&self, previous: &mut PlayerIntents) -> IntentEdges {
        let edges = IntentEdges {
            attack: self.attack && !previous.attack,
            jump: self.jump && !previous.jump,
        };
        *previous = *self;
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_fires_once() {
        let mut previous = PlayerIntents::default();
        let held = PlayerIntents {
            attack: true,
            ..Default::default()
        };
        assert!(held.edges(&mut previous).attack);
        assert!(!held.edges(&mut previous).attack);
        assert!(!PlayerIntents::default().edges(&mut previous).attack);
        assert!(held.edges(&mut previous).attack);
    }

    #[test]
    fn opposite_directions_cancel() {
        let both = PlayerIntents {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        assert_eq!(both.horizontal(), 0.0);
    }
}
