use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type StableIdType = u32;

/// Stable identity of a simulated entity.
///
/// Systems that consume randomness sort by this id so a seeded run replays
/// identically regardless of ECS storage order.
#[derive(Component, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorId(pub StableIdType, pub String);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}-{})", self.1, self.0)
    }
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ActorIdFactory {
    counter: StableIdType,
}

impl ActorIdFactory {
    pub fn next(&mut self, name: impl Into<String>) -> ActorId {
        self.counter += 1;

        ActorId(self.counter, name.into())
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_reset() {
        let mut factory = ActorIdFactory::default();
        assert_eq!(factory.next("player").0, 1);
        assert_eq!(factory.next("zombie").0, 2);
        factory.reset();
        let id = factory.next("zombie");
        assert_eq!(id.0, 1);
        assert_eq!(id.to_string(), "(zombie-1)");
    }
}
