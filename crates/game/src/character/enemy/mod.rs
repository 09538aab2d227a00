pub mod ai;
pub mod create;
pub mod spawning;

use animation::{Clip, ClipSet, ClipSpec};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    character::{
        health::HitReactions,
        timers::{TimerKind, TimerSet},
    },
    loot::LootRange,
    weapons::melee::MeleeProfile,
};

/// Closed set of enemy kinds. Tuning lives in `EnemyConfig`; the variant
/// only selects what cannot be expressed as numbers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyArchetype {
    #[default]
    Zombie,
    Ghoul,
}

impl EnemyArchetype {
    pub fn clip_set(&self) -> ClipSet {
        match self {
            EnemyArchetype::Zombie => ClipSet::new(10.0)
                .with(Clip::Idle, ClipSpec::looped(6))
                .with(Clip::Walk, ClipSpec::looped(10))
                .with(Clip::Attack, ClipSpec::once(4))
                .with(Clip::Hurt, ClipSpec::once(4))
                .with(Clip::Dead, ClipSpec::once(5)),
            EnemyArchetype::Ghoul => ClipSet::new(10.0)
                .with(Clip::Idle, ClipSpec::looped(7))
                .with(Clip::Walk, ClipSpec::looped(12))
                .with(Clip::Attack, ClipSpec::once(10))
                .with(Clip::Hurt, ClipSpec::once(4))
                .with(Clip::Dead, ClipSpec::once(5)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub archetype: EnemyArchetype,
    pub hp: f32,
    pub speed: f32,

    pub attack_damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_hit_time: f32,

    pub parry_stun: f32,
    pub parry_cooldown: f32,
    /// Animation playback rate while stunned.
    pub stun_anim_speed: f32,
    /// Slow that keeps running after a parry stun ends.
    pub slow_duration: f32,
    pub slow_multiplier: f32,

    pub hurt_duration: f32,
    pub flash_duration: f32,
    pub death_linger: f32,
    pub death_fade_time: f32,
    pub death_knockback: f32,

    /// Closer than this the enemy stops chasing and idles.
    pub chase_epsilon: f32,
    pub collider: (f32, f32),

    /// Overrides the global coin range when set.
    pub loot: Option<LootRange>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self::zombie()
    }
}

impl EnemyConfig {
    pub fn zombie() -> Self {
        Self {
            archetype: EnemyArchetype::Zombie,
            hp: 5.0,
            speed: 120.0,
            attack_damage: 2.0,
            attack_range: 90.0,
            attack_cooldown: 1.0,
            attack_hit_time: 0.25,
            parry_stun: 0.7,
            parry_cooldown: 0.25,
            stun_anim_speed: 0.2,
            slow_duration: 0.6,
            slow_multiplier: 0.45,
            hurt_duration: 0.4,
            flash_duration: 0.2,
            death_linger: 1.2,
            death_fade_time: 0.6,
            death_knockback: 120.0,
            chase_epsilon: 5.0,
            collider: (30.0, 60.0),
            loot: None,
        }
    }

    pub fn ghoul() -> Self {
        Self {
            archetype: EnemyArchetype::Ghoul,
            hp: 4.0,
            speed: 150.0,
            attack_hit_time: 0.6,
            loot: Some(LootRange {
                coins_min: 1,
                coins_max: 6,
            }),
            ..Self::zombie()
        }
    }

    pub fn melee_profile(&self) -> MeleeProfile {
        MeleeProfile {
            damage: self.attack_damage,
            range: self.attack_range,
            cooldown: self.attack_cooldown,
            hit_time: self.attack_hit_time,
            parry_stun: self.parry_stun,
            parry_cooldown: self.parry_cooldown,
            slow_duration: self.slow_duration,
        }
    }

    pub fn hit_reactions(&self) -> HitReactions {
        HitReactions {
            hurt_duration: self.hurt_duration,
            // enemies are only slowed by parries
            slow_duration: 0.0,
            flash_duration: self.flash_duration,
            death_linger: self.death_linger,
            death_knockback: self.death_knockback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpseEvent {
    FadeStarted,
    Removed,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Enemy {
    /// Registry key this enemy was spawned from.
    pub name: String,
    pub config: EnemyConfig,
    pub profile: MeleeProfile,
    pub fade_started: bool,
    /// Set once the corpse has fully faded; the entity is despawned in cleanup.
    pub remove: bool,
}

impl Enemy {
    pub fn new(name: impl Into<String>, config: EnemyConfig) -> Self {
        let profile = config.melee_profile();
        Self {
            name: name.into(),
            config,
            profile,
            fade_started: false,
            remove: false,
        }
    }


    /// Advance the linger -> fade -> remove sequence of a dead enemy. Timers
    /// must already be ticked for this frame.
    pub fn update_corpse(&mut self, timers: &mut TimerSet) -> Option<CorpseEvent> {
        if self.remove {
            return None;
        }

        if !self.fade_started {
            if timers.is_active(TimerKind::DeathLinger) {
                return None;
            }
            self.fade_started = true;
            if self.config.death_fade_time <= 0.0 {
                self.remove = true;
                return Some(CorpseEvent::Removed);
            }
            timers.arm(TimerKind::Fade, self.config.death_fade_time);
            return Some(CorpseEvent::FadeStarted);
        }

        if !timers.is_active(TimerKind::Fade) {
            self.remove = true;
            return Some(CorpseEvent::Removed);
        }
        None
    }

    /// Render opacity in `[0, 1]`.
    pub fn alpha(&self, timers: &TimerSet) -> f32 {
        if self.remove {
            return 0.0;
        }
        if !self.fade_started {
            return 1.0;
        }
        let fade = self.config.death_fade_time;
        if fade <= 0.0 {
            return 0.0;
        }
        (timers.remaining(TimerKind::Fade) / fade).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{
        health::{apply_damage, Defender, Health},
        movement::Body,
        status::ActorState,
    };
    use animation::FacingDirection;
    use approx::assert_relative_eq;
    use utils::{net_id::ActorId, rng::SimRng};

    #[test]
    fn corpse_lingers_fades_then_is_removed() {
        let mut rng = SimRng::from_seed(0);
        let mut enemy = Enemy::new("zombie", EnemyConfig::zombie());
        let id = ActorId(3, "zombie".into());
        let reactions = enemy.config.hit_reactions();
        let mut state = ActorState::Walk;
        let mut health = Health::new(enemy.config.hp);
        let mut timers = TimerSet::default();
        let mut body = Body::grounded_at(900.0, 680.0);

        for amount in [2.0, 3.0] {
            let mut defender = Defender {
                id: &id,
                state: &mut state,
                health: &mut health,
                timers: &mut timers,
                body: &mut body,
                reactions: &reactions,
                facing: FacingDirection::Left,
                guard: None,
            };
            apply_damage(&mut defender, amount, 800.0, &mut rng);
        }

        assert_eq!(health.current, 0.0);
        assert_eq!(state, ActorState::Dead);
        assert_relative_eq!(timers.remaining(TimerKind::DeathLinger), 1.2);

        let dt = 1.0 / 60.0;
        let mut events = Vec::new();
        let mut frames = 0;
        while !enemy.remove && frames < 600 {
            timers.tick(dt);
            if let Some(event) = enemy.update_corpse(&mut timers) {
                events.push((frames, event));
            }
            if enemy.fade_started && !enemy.remove {
                let alpha = enemy.alpha(&timers);
                assert!((0.0..=1.0).contains(&alpha));
            }
            frames += 1;
        }

        assert!(enemy.remove);
        assert_eq!(enemy.alpha(&timers), 0.0);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].1, CorpseEvent::FadeStarted);
        assert_eq!(events[1].1, CorpseEvent::Removed);
        // 1.2s linger + 0.6s fade at 60 fps
        assert!((106..=110).contains(&frames), "frames {frames}");
        assert!(enemy.update_corpse(&mut timers).is_none());
    }

    #[test]
    fn zero_fade_removes_right_after_linger() {
        let mut config = EnemyConfig::zombie();
        config.death_fade_time = 0.0;
        let mut enemy = Enemy::new("zombie", config);
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::DeathLinger, 0.1);

        assert_eq!(enemy.update_corpse(&mut timers), None);
        timers.tick(0.1);
        assert_eq!(enemy.update_corpse(&mut timers), Some(CorpseEvent::Removed));
        assert!(enemy.remove);
    }

    #[test]
    fn ghoul_keeps_zombie_combat_defaults() {
        let ghoul = EnemyConfig::ghoul();
        assert_eq!(ghoul.archetype, EnemyArchetype::Ghoul);
        assert_eq!(ghoul.attack_range, 90.0);
        assert!(ghoul.archetype.clip_set().duration(Clip::Attack).unwrap() > ghoul.attack_hit_time);
    }
}
