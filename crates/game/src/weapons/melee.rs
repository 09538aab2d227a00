use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utils::{net_id::ActorId, rng::SimRng};

use crate::character::{
    health::{apply_damage, DamageOutcome, Defender},
    status::ActorState,
    timers::{TimerKind, TimerSet},
};

// MELEE PROFILE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeleeProfile {
    pub damage: f32,
    pub range: f32,
    pub cooldown: f32,
    /// Seconds into the attack at which the single hit check happens.
    pub hit_time: f32,
    pub parry_stun: f32,
    /// Minimum attack cooldown left after being parried.
    pub parry_cooldown: f32,
    /// Slow that outlasts the parry stun by this much.
    pub slow_duration: f32,
}

// ATTACK STATE
/// One attack instance. `hit_applied` guards the single hit check (or, for
/// the player, the single projectile) of the instance.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AttackState {
    pub active: bool,
    pub elapsed: f32,
    pub hit_applied: bool,
}

impl AttackState {
    pub fn start(&mut self) {
        self.active = true;
        self.elapsed = 0.0;
        self.hit_applied = false;
    }

    /// Clip ran out.
    pub fn finish(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
    }

    /// Interrupted. The hit can no longer happen.
    pub fn cancel(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
        self.hit_applied = true;
    }
}

/// Mutable view over the attacking side of a melee exchange.
pub struct Attacker<'a> {
    pub id: &'a ActorId,
    pub position_x: f32,
    pub profile: &'a MeleeProfile,
    pub attack: &'a mut AttackState,
    pub timers: &'a mut TimerSet,
    pub state: &'a mut ActorState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackResolution {
    pub in_range: bool,
    /// `None` when the defender was out of range.
    pub outcome: Option<DamageOutcome>,
    pub parried: bool,
}

/// Run the single hit check of an attack instance once its elapsed time has
/// reached the hit instant. Returns `None` on every other call.
pub fn resolve_attack(
    attacker: &mut Attacker,
    defender: &mut Defender,
    rng: &mut SimRng,
) -> Option<AttackResolution> {
    if !attacker.attack.active
        || attacker.attack.hit_applied
        || attacker.attack.elapsed < attacker.profile.hit_time
    {
        return None;
    }

    attacker.attack.hit_applied = true;

    let distance = (defender.body.position.x - attacker.position_x).abs();
    if distance > attacker.profile.range {
        debug!("{} swing missed {} at {:.1}", attacker.id, defender.id, distance);
        return Some(AttackResolution {
            in_range: false,
            outcome: None,
            parried: false,
        });
    }

    let outcome = apply_damage(defender, attacker.profile.damage, attacker.position_x, rng);

    let parried = outcome == DamageOutcome::BlockedSuccess;
    if parried {
        resolve_parry(attacker);
    }

    Some(AttackResolution {
        in_range: true,
        outcome: Some(outcome),
        parried,
    })
}

/// Punish an attacker whose hit was blocked: stun, cancel, push the cooldown
/// out and leave a slow running past the end of the stun.
pub fn resolve_parry(attacker: &mut Attacker) {
    let profile = attacker.profile;
    attacker.timers.extend(TimerKind::Stun, profile.parry_stun);
    attacker.attack.cancel();
    attacker.timers.extend(TimerKind::AttackCooldown, profile.parry_cooldown);
    attacker
        .timers
        .extend(TimerKind::Slow, profile.parry_stun + profile.slow_duration);
    attacker.state.enter(ActorState::Stunned);
    debug!("{} parried, stunned for {}s", attacker.id, profile.parry_stun);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{
        health::{Health, HitReactions},
        movement::Body,
        player::block::{BlockConfig, Guard},
    };
    use animation::FacingDirection;
    use approx::assert_relative_eq;

    fn profile() -> MeleeProfile {
        MeleeProfile {
            damage: 2.0,
            range: 90.0,
            cooldown: 1.0,
            hit_time: 0.25,
            parry_stun: 0.7,
            parry_cooldown: 0.25,
            slow_duration: 0.6,
        }
    }

    struct Side {
        id: ActorId,
        state: ActorState,
        health: Health,
        timers: TimerSet,
        body: Body,
        reactions: HitReactions,
        guard: Option<Guard>,
        attack: AttackState,
    }

    impl Side {
        fn at(x: f32) -> Self {
            Self {
                id: ActorId(1, "side".into()),
                state: ActorState::Idle,
                health: Health::new(10.0),
                timers: TimerSet::default(),
                body: Body::grounded_at(x, 680.0),
                reactions: HitReactions {
                    hurt_duration: 0.25,
                    slow_duration: 0.35,
                    flash_duration: 0.2,
                    death_linger: 0.0,
                    death_knockback: 0.0,
                },
                guard: None,
                attack: AttackState::default(),
            }
        }
    }

    fn swing(
        attacker: &mut Side,
        defender: &mut Side,
        rng: &mut SimRng,
    ) -> Option<AttackResolution> {
        let profile = profile();
        let mut a = Attacker {
            id: &attacker.id,
            position_x: attacker.body.position.x,
            profile: &profile,
            attack: &mut attacker.attack,
            timers: &mut attacker.timers,
            state: &mut attacker.state,
        };
        let mut d = Defender {
            id: &defender.id,
            state: &mut defender.state,
            health: &mut defender.health,
            timers: &mut defender.timers,
            body: &mut defender.body,
            reactions: &defender.reactions,
            facing: FacingDirection::Left,
            guard: defender.guard.as_ref(),
        };
        resolve_attack(&mut a, &mut d, rng)
    }

    #[test]
    fn one_hit_per_attack_instance() {
        let mut rng = SimRng::from_seed(1);
        let mut zombie = Side::at(560.0);
        let mut player = Side::at(500.0);
        zombie.attack.start();
        zombie.state = ActorState::Attack;

        assert!(swing(&mut zombie, &mut player, &mut rng).is_none());

        let mut hits = 0;
        for _ in 0..30 {
            zombie.attack.elapsed += 1.0 / 60.0;
            if swing(&mut zombie, &mut player, &mut rng).is_some() {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
        assert_eq!(player.health.current, 8.0);
    }

    #[test]
    fn out_of_range_still_consumes_the_hit() {
        let mut rng = SimRng::from_seed(1);
        let mut zombie = Side::at(700.0);
        let mut player = Side::at(500.0);
        zombie.attack.start();
        zombie.attack.elapsed = 0.3;

        let res = swing(&mut zombie, &mut player, &mut rng).unwrap();
        assert!(!res.in_range);
        assert!(zombie.attack.hit_applied);

        player.body.position.x = 650.0;
        assert!(swing(&mut zombie, &mut player, &mut rng).is_none());
        assert_eq!(player.health.current, 10.0);
    }

    #[test]
    fn successful_block_parries_the_attacker() {
        let mut rng = SimRng::from_seed(1);
        let mut zombie = Side::at(560.0);
        let mut player = Side::at(500.0);
        player.state = ActorState::Protect;
        player.guard = Some(Guard {
            raised: true,
            config: BlockConfig {
                chance: 1.0,
                ..Default::default()
            },
        });
        zombie.state = ActorState::Attack;
        zombie.attack.start();
        zombie.timers.arm(TimerKind::AttackCooldown, 0.1);
        zombie.attack.elapsed = 0.25;

        let res = swing(&mut zombie, &mut player, &mut rng).unwrap();
        assert!(res.parried);
        assert_eq!(res.outcome, Some(DamageOutcome::BlockedSuccess));
        assert_eq!(player.health.current, 10.0);

        assert_eq!(zombie.state, ActorState::Stunned);
        assert!(!zombie.attack.active);
        assert!(zombie.attack.hit_applied);
        assert_relative_eq!(zombie.timers.remaining(TimerKind::Stun), 0.7);
        assert_relative_eq!(zombie.timers.remaining(TimerKind::AttackCooldown), 0.25);
        assert_relative_eq!(zombie.timers.remaining(TimerKind::Slow), 1.3);
    }

    #[test]
    fn counter_hit_keeps_the_parry_slow() {
        let mut rng = SimRng::from_seed(2);
        let mut zombie = Side::at(560.0);
        zombie.reactions.slow_duration = 0.0;
        let mut player = Side::at(500.0);
        player.state = ActorState::Protect;
        player.guard = Some(Guard {
            raised: true,
            config: BlockConfig {
                chance: 1.0,
                ..Default::default()
            },
        });
        zombie.attack.start();
        zombie.attack.elapsed = 0.25;
        assert!(swing(&mut zombie, &mut player, &mut rng).unwrap().parried);

        player.state = ActorState::Attack;
        player.attack.start();
        player.attack.elapsed = 0.25;
        let res = swing(&mut player, &mut zombie, &mut rng).unwrap();
        assert_eq!(res.outcome, Some(DamageOutcome::Hit));
        assert_eq!(zombie.health.current, 8.0);
        assert_relative_eq!(zombie.timers.remaining(TimerKind::Slow), 1.3);
        assert_relative_eq!(zombie.timers.remaining(TimerKind::Stun), 0.7);
    }

    #[test]
    fn failed_block_does_not_parry() {
        let mut rng = SimRng::from_seed(1);
        let mut zombie = Side::at(560.0);
        let mut player = Side::at(500.0);
        player.state = ActorState::Protect;
        player.guard = Some(Guard {
            raised: true,
            config: BlockConfig {
                chance: 0.0,
                ..Default::default()
            },
        });
        zombie.attack.start();
        zombie.attack.elapsed = 0.25;

        let res = swing(&mut zombie, &mut player, &mut rng).unwrap();
        assert_eq!(res.outcome, Some(DamageOutcome::BlockedFail));
        assert!(!res.parried);
        assert!(!zombie.timers.is_active(TimerKind::Stun));
        assert_eq!(player.health.current, 8.0);
        assert!(player.timers.is_active(TimerKind::BlockCooldown));
    }

    #[test]
    fn parry_respects_a_longer_running_cooldown() {
        let mut zombie = Side::at(0.0);
        zombie.timers.arm(TimerKind::AttackCooldown, 0.9);
        let profile = profile();
        let mut a = Attacker {
            id: &zombie.id,
            position_x: 0.0,
            profile: &profile,
            attack: &mut zombie.attack,
            timers: &mut zombie.timers,
            state: &mut zombie.state,
        };
        resolve_parry(&mut a);
        assert_relative_eq!(zombie.timers.remaining(TimerKind::AttackCooldown), 0.9);
    }
}
