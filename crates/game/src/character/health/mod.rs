use animation::FacingDirection;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utils::{net_id::ActorId, rng::SimRng};

use super::{
    movement::Body,
    player::block::Guard,
    status::ActorState,
    timers::{TimerKind, TimerSet},
};

#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        debug_assert!(max >= 0.0, "negative max health {max}");
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Remove `amount`, flooring at zero. Returns the health actually lost.
    pub fn take(&mut self, amount: f32) -> f32 {
        debug_assert!(amount >= 0.0, "negative damage {amount}");
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Restore up to max. A dead actor is never healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }
}

/// How an actor reacts to being damaged.
#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitReactions {
    pub hurt_duration: f32,
    pub slow_duration: f32,
    pub flash_duration: f32,
    pub death_linger: f32,
    pub death_knockback: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageOutcome {
    Hit,
    BlockedSuccess,
    BlockedFail,
}

/// Mutable view over the components `apply_damage` touches.
pub struct Defender<'a> {
    pub id: &'a ActorId,
    pub state: &'a mut ActorState,
    pub health: &'a mut Health,
    pub timers: &'a mut TimerSet,
    pub body: &'a mut Body,
    pub reactions: &'a HitReactions,
    pub facing: FacingDirection,
    pub guard: Option<&'a Guard>,
}

impl Defender<'_> {
    pub fn is_dead(&self) -> bool {
        self.state.is_dead() || self.health.is_dead()
    }

    /// A failed block earlier in the same frame already armed the cooldown and
    /// the stun, so the guard counts as down from that moment on.
    pub fn is_blocking(&self) -> bool {
        *self.state == ActorState::Protect
            && self.guard.is_some_and(|g| g.raised)
            && !self.timers.is_active(TimerKind::BlockCooldown)
            && !self.timers.is_active(TimerKind::Stun)
    }

    /// Unit direction pointing from the attacker toward this defender.
    fn away_from(&self, attacker_x: f32) -> f32 {
        let dx = self.body.position.x - attacker_x;
        if dx > 0.0 {
            1.0
        } else if dx < 0.0 {
            -1.0
        } else {
            -self.facing.sign()
        }
    }
}

/// Damage entry point for every defender.
///
/// A dead defender is left untouched. A blocking defender rolls once against
/// its block chance: success costs nothing and shoves the defender back, failure
/// stuns it, puts the guard on cooldown and then lets the full hit through.
pub fn apply_damage(
    defender: &mut Defender,
    amount: f32,
    attacker_x: f32,
    rng: &mut SimRng,
) -> DamageOutcome {
    if defender.is_dead() {
        return DamageOutcome::Hit;
    }

    let mut outcome = DamageOutcome::Hit;

    if let Some(guard) = defender.guard.filter(|_| defender.is_blocking()) {
        let block = &guard.config;
        if rng.chance(block.chance) {
            defender.body.pushback = defender.away_from(attacker_x) * block.pushback_force;
            defender.timers.arm(TimerKind::BlockFeedback, block.feedback_duration);
            debug!("{} blocked {} damage", defender.id, amount);
            return DamageOutcome::BlockedSuccess;
        }

        defender.timers.extend(TimerKind::Stun, block.fail_stun);
        defender.timers.arm(TimerKind::BlockCooldown, block.cooldown);
        debug!("{} block failed, guard down for {}s", defender.id, block.cooldown);
        outcome = DamageOutcome::BlockedFail;
    }

    defender.health.take(amount);

    let reactions = defender.reactions;
    defender.timers.extend(TimerKind::Hurt, reactions.hurt_duration);
    defender.timers.extend(TimerKind::Slow, reactions.slow_duration);
    defender.timers.arm(TimerKind::DamageFlash, reactions.flash_duration);

    if defender.health.is_dead() {
        defender.state.enter(ActorState::Dead);
        defender.timers.arm(TimerKind::DeathLinger, reactions.death_linger);
        defender.body.drift = defender.away_from(attacker_x) * reactions.death_knockback;
        info!("{} died", defender.id);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::player::block::BlockConfig;
    use approx::assert_relative_eq;

    struct Dummy {
        id: ActorId,
        state: ActorState,
        health: Health,
        timers: TimerSet,
        body: Body,
        reactions: HitReactions,
        guard: Option<Guard>,
    }

    impl Dummy {
        fn new(max: f32) -> Self {
            Self {
                id: ActorId(1, "dummy".into()),
                state: ActorState::Idle,
                health: Health::new(max),
                timers: TimerSet::default(),
                body: Body::grounded_at(500.0, 680.0),
                reactions: HitReactions {
                    hurt_duration: 0.25,
                    slow_duration: 0.35,
                    flash_duration: 0.2,
                    death_linger: 1.2,
                    death_knockback: 260.0,
                },
                guard: None,
            }
        }

        fn blocking(mut self, chance: f32) -> Self {
            self.state = ActorState::Protect;
            self.guard = Some(Guard {
                raised: true,
                config: BlockConfig {
                    chance,
                    ..Default::default()
                },
            });
            self
        }

        fn hit(&mut self, amount: f32, attacker_x: f32, rng: &mut SimRng) -> DamageOutcome {
            let mut defender = Defender {
                id: &self.id,
                state: &mut self.state,
                health: &mut self.health,
                timers: &mut self.timers,
                body: &mut self.body,
                reactions: &self.reactions,
                facing: FacingDirection::Right,
                guard: self.guard.as_ref(),
            };
            apply_damage(&mut defender, amount, attacker_x, rng)
        }
    }

    #[test]
    fn certain_block_never_costs_health() {
        let mut rng = SimRng::from_seed(1);
        let mut dummy = Dummy::new(10.0).blocking(1.0);
        for _ in 0..50 {
            assert_eq!(dummy.hit(2.0, 600.0, &mut rng), DamageOutcome::BlockedSuccess);
        }
        assert_eq!(dummy.health.current, 10.0);
        assert!(dummy.timers.is_active(TimerKind::BlockFeedback));
        assert!(!dummy.timers.is_active(TimerKind::Hurt));
        // attacker on the right, shoved left
        assert!(dummy.body.pushback < 0.0);
    }

    #[test]
    fn impossible_block_takes_full_damage_and_extra_stun() {
        let mut rng = SimRng::from_seed(2);
        let mut dummy = Dummy::new(10.0).blocking(0.0);
        assert_eq!(dummy.hit(2.0, 400.0, &mut rng), DamageOutcome::BlockedFail);
        assert_eq!(dummy.health.current, 8.0);
        assert_relative_eq!(dummy.timers.remaining(TimerKind::Stun), 0.4);
        assert_relative_eq!(dummy.timers.remaining(TimerKind::BlockCooldown), 1.0);
        assert!(dummy.timers.is_active(TimerKind::Hurt));
        assert!(dummy.timers.is_active(TimerKind::Slow));
        assert!(dummy.timers.is_active(TimerKind::DamageFlash));
        assert_eq!(dummy.body.pushback, 0.0);
    }

    #[test]
    fn block_rate_converges_to_chance() {
        let mut rng = SimRng::from_seed(99);
        let mut dummy = Dummy::new(1_000_000.0).blocking(0.8);
        let samples = 20_000;
        let mut successes = 0;
        for _ in 0..samples {
            dummy.timers = TimerSet::default();
            if dummy.hit(0.0, 0.0, &mut rng) == DamageOutcome::BlockedSuccess {
                successes += 1;
            }
        }
        let rate = successes as f32 / samples as f32;
        assert!((rate - 0.8).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn failed_block_drops_the_guard_for_the_rest_of_the_frame() {
        let mut rng = SimRng::from_seed(6);
        let mut dummy = Dummy::new(10.0).blocking(0.0);
        // two swings landing on the same frame, no tick in between
        assert_eq!(dummy.hit(2.0, 600.0, &mut rng), DamageOutcome::BlockedFail);
        assert_eq!(dummy.hit(2.0, 600.0, &mut rng), DamageOutcome::Hit);
        assert_eq!(dummy.health.current, 6.0);
        assert_relative_eq!(dummy.timers.remaining(TimerKind::BlockCooldown), 1.0);
    }

    #[test]
    fn stunned_defender_cannot_block_even_with_guard_up() {
        let mut rng = SimRng::from_seed(7);
        let mut dummy = Dummy::new(10.0).blocking(1.0);
        dummy.timers.arm(TimerKind::Stun, 0.3);
        assert_eq!(dummy.hit(2.0, 600.0, &mut rng), DamageOutcome::Hit);
        assert_eq!(dummy.health.current, 8.0);
    }

    #[test]
    fn hit_never_shortens_a_running_slow() {
        let mut rng = SimRng::from_seed(8);
        let mut dummy = Dummy::new(10.0);
        dummy.reactions.slow_duration = 0.0;
        dummy.timers.arm(TimerKind::Slow, 1.3);
        dummy.hit(1.0, 600.0, &mut rng);
        assert_relative_eq!(dummy.timers.remaining(TimerKind::Slow), 1.3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "negative damage")]
    fn negative_damage_fails_fast_in_debug() {
        Health::new(5.0).take(-4.0);
    }

    #[test]
    fn health_stays_in_range() {
        let mut rng = SimRng::from_seed(3);
        let mut dummy = Dummy::new(5.0);
        for amount in [2.0, 0.5, 0.0, 7.0, 3.0] {
            dummy.hit(amount, 0.0, &mut rng);
            assert!(dummy.health.current >= 0.0 && dummy.health.current <= dummy.health.max);
        }
        assert_eq!(dummy.health.current, 0.0);
    }

    #[test]
    fn killing_blow_enters_dead_with_linger_and_knockback() {
        let mut rng = SimRng::from_seed(4);
        let mut dummy = Dummy::new(5.0);
        assert_eq!(dummy.hit(2.0, 450.0, &mut rng), DamageOutcome::Hit);
        assert_eq!(dummy.health.current, 3.0);
        assert_ne!(dummy.state, ActorState::Dead);

        dummy.hit(3.0, 450.0, &mut rng);
        assert_eq!(dummy.health.current, 0.0);
        assert_eq!(dummy.state, ActorState::Dead);
        assert_relative_eq!(dummy.timers.remaining(TimerKind::DeathLinger), 1.2);
        assert_relative_eq!(dummy.body.drift, 260.0);
    }

    #[test]
    fn damage_on_corpse_is_a_no_op() {
        let mut rng = SimRng::from_seed(5);
        let mut dummy = Dummy::new(1.0);
        dummy.hit(1.0, 0.0, &mut rng);
        let snapshot = dummy.timers.clone();
        dummy.timers.tick(0.1);
        let ticked = dummy.timers.clone();
        assert_eq!(dummy.hit(5.0, 0.0, &mut rng), DamageOutcome::Hit);
        assert_eq!(dummy.health.current, 0.0);
        assert_eq!(dummy.timers, ticked);
        assert_ne!(dummy.timers, snapshot);
    }

    #[test]
    fn heal_is_clamped_and_skips_the_dead() {
        let mut health = Health::new(10.0);
        health.take(4.0);
        assert_eq!(health.heal(10.0), 4.0);
        assert_eq!(health.current, 10.0);
        health.take(20.0);
        assert_eq!(health.heal(3.0), 0.0);
        assert!(health.is_dead());
    }
}
