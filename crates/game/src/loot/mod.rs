pub mod pickup;

use bevy_ecs::prelude::*;
use bevy_math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, Level};
use utils::{
    frame::FrameClock,
    net_id::{ActorId, ActorIdFactory},
    rng::SimRng,
};

use crate::{
    character::{enemy::Enemy, movement::Body, status::ActorState},
    collider::Collider,
    config::GameConfig,
    event::{FrameEvents, GameEvent},
};

use pickup::{Pickup, PickupEffect};

/// Value range rolled per kill. The value lands in a single pickup.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LootRange {
    pub coins_min: i32,
    pub coins_max: i32,
}

impl LootRange {
    /// `max < min` collapses to `min`.
    pub fn roll(&self, rng: &mut SimRng) -> i32 {
        let max = self.coins_max.max(self.coins_min);
        rng.next_i32_inclusive(self.coins_min, max)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LootConfig {
    pub coins_min: i32,
    pub coins_max: i32,
    /// Chance that a non-empty drop is a heal item instead of coins.
    pub heal_chance: f32,
    pub heal_amount: f32,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            coins_min: 0,
            coins_max: 4,
            heal_chance: 0.1,
            heal_amount: 2.0,
        }
    }
}

impl LootConfig {
    pub fn range(&self) -> LootRange {
        LootRange {
            coins_min: self.coins_min,
            coins_max: self.coins_max,
        }
    }
}

/// One-shot drop flag carried by every enemy.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LootGuard {
    pub dropped: bool,
}

/// Roll the drop of a freshly dead enemy. Only the first call per guard
/// rolls anything; later calls return `None` without touching the rng.
pub fn on_enemy_death(
    guard: &mut LootGuard,
    config: &LootConfig,
    range_override: Option<&LootRange>,
    rng: &mut SimRng,
) -> Option<PickupEffect> {
    if guard.dropped {
        return None;
    }
    guard.dropped = true;

    let range = range_override.copied().unwrap_or_else(|| config.range());
    let value = range.roll(rng);
    if value <= 0 {
        return None;
    }

    if config.heal_amount > 0.0 && rng.chance(config.heal_chance) {
        return Some(PickupEffect::Heal(config.heal_amount));
    }
    Some(PickupEffect::Coins(value as u32))
}

type LootParts = (
    &'static ActorId,
    &'static Enemy,
    &'static ActorState,
    &'static Body,
    &'static Collider,
    &'static mut LootGuard,
);

pub fn loot_drop_system(
    mut commands: Commands,
    clock: Res<FrameClock>,
    config: Res<GameConfig>,
    mut rng: ResMut<SimRng>,
    mut id_factory: ResMut<ActorIdFactory>,
    mut events: ResMut<FrameEvents>,
    mut query: Query<LootParts>,
) {
    let system_span = span!(Level::INFO, "sim", f = clock.frame, s = "loot_drop");
    let _enter = system_span.enter();

    let mut dead: Vec<_> = query
        .iter_mut()
        .filter(|(_, _, state, _, _, guard)| state.is_dead() && !guard.dropped)
        .collect();
    dead.sort_unstable_by_key(|(id, ..)| id.0);

    for (id, enemy, _, body, collider, mut guard) in dead {
        let loot = enemy.config.loot.as_ref();
        let Some(effect) = on_enemy_death(&mut guard, &config.loot, loot, &mut rng) else {
            debug!("sim{{f={} loot_drop {} dropped nothing}}", clock.frame, id);
            continue;
        };

        let origin: Vec2 = collider.center_from_feet(body.position);
        let pickup = Pickup::spawn(effect, origin, &config.pickups, &mut rng);
        let pickup_id = id_factory.next("pickup");
        commands.spawn((pickup_id.clone(), pickup));

        info!(
            "sim{{f={} loot_drop {} dropped {:?} as {} at x={:.1}}}",
            clock.frame, id, effect, pickup_id, origin.x
        );
        events.push(GameEvent::LootDropped {
            from: id.clone(),
            effect,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_death_call_drops_nothing() {
        let mut rng = SimRng::from_seed(5);
        let config = LootConfig {
            coins_min: 3,
            coins_max: 3,
            heal_chance: 0.0,
            ..Default::default()
        };
        let mut guard = LootGuard::default();

        assert_eq!(
            on_enemy_death(&mut guard, &config, None, &mut rng),
            Some(PickupEffect::Coins(3))
        );
        assert!(guard.dropped);
        assert_eq!(on_enemy_death(&mut guard, &config, None, &mut rng), None);
    }

    #[test]
    fn zero_value_drops_nothing_but_consumes_guard() {
        let mut rng = SimRng::from_seed(5);
        let config = LootConfig {
            coins_min: 0,
            coins_max: 0,
            heal_chance: 1.0,
            ..Default::default()
        };
        let mut guard = LootGuard::default();
        assert_eq!(on_enemy_death(&mut guard, &config, None, &mut rng), None);
        assert!(guard.dropped);
    }

    #[test]
    fn override_wins_and_inverted_range_collapses() {
        let mut rng = SimRng::from_seed(9);
        let config = LootConfig {
            heal_chance: 0.0,
            ..Default::default()
        };
        let inverted = LootRange {
            coins_min: 7,
            coins_max: 2,
        };
        for _ in 0..50 {
            let mut guard = LootGuard::default();
            assert_eq!(
                on_enemy_death(&mut guard, &config, Some(&inverted), &mut rng),
                Some(PickupEffect::Coins(7))
            );
        }
    }

    #[test]
    fn rolled_values_stay_in_range() {
        let mut rng = SimRng::from_seed(21);
        let config = LootConfig {
            heal_chance: 0.0,
            ..Default::default()
        };
        let mut seen = [false; 5];
        for _ in 0..2_000 {
            let mut guard = LootGuard::default();
            match on_enemy_death(&mut guard, &config, None, &mut rng) {
                None => seen[0] = true,
                Some(PickupEffect::Coins(v)) => {
                    assert!((1..=4).contains(&v));
                    seen[v as usize] = true;
                }
                Some(other) => panic!("unexpected drop {other:?}"),
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn certain_heal_replaces_coins() {
        let mut rng = SimRng::from_seed(2);
        let config = LootConfig {
            coins_min: 1,
            coins_max: 1,
            heal_chance: 1.0,
            heal_amount: 3.0,
        };
        let mut guard = LootGuard::default();
        assert_eq!(
            on_enemy_death(&mut guard, &config, None, &mut rng),
            Some(PickupEffect::Heal(3.0))
        );
    }
}
