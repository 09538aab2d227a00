use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Every countdown an actor can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    AttackCooldown,
    Stun,
    Slow,
    Hurt,
    DamageFlash,
    BlockCooldown,
    BlockFeedback,
    DeathLinger,
    Fade,
}

impl TimerKind {
    pub const COUNT: usize = 9;

    pub const ALL: [TimerKind; TimerKind::COUNT] = [
        TimerKind::AttackCooldown,
        TimerKind::Stun,
        TimerKind::Slow,
        TimerKind::Hurt,
        TimerKind::DamageFlash,
        TimerKind::BlockCooldown,
        TimerKind::BlockFeedback,
        TimerKind::DeathLinger,
        TimerKind::Fade,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Kinds that reached zero during one `TimerSet::tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiredTimers(u16);

impl ExpiredTimers {
    fn insert(&mut self, kind: TimerKind) {
        self.0 |= 1 << kind.index();
    }

    pub fn contains(&self, kind: TimerKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = TimerKind> + '_ {
        TimerKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

/// Named non-negative countdowns of one actor, in seconds.
///
/// A timer's effect is active while its value is strictly positive. Negative
/// or non-finite input trips a debug assertion and is clamped to zero in
/// release builds.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct TimerSet {
    values: [f32; TimerKind::COUNT],
}

impl TimerSet {
    /// Overwrite the timer.
    pub fn arm(&mut self, kind: TimerKind, secs: f32) {
        debug_assert!(is_duration(secs), "invalid {kind:?} duration {secs}");
        self.values[kind.index()] = sanitize(secs);
    }

    /// Raise the timer to `secs` if it is currently lower.
    pub fn extend(&mut self, kind: TimerKind, secs: f32) {
        debug_assert!(is_duration(secs), "invalid {kind:?} duration {secs}");
        let slot = &mut self.values[kind.index()];
        *slot = slot.max(sanitize(secs));
    }

    pub fn clear(&mut self, kind: TimerKind) {
        self.values[kind.index()] = 0.0;
    }

    pub fn remaining(&self, kind: TimerKind) -> f32 {
        self.values[kind.index()]
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.values[kind.index()] > 0.0
    }

    /// Count every active timer down by `dt`. Each kind that hits zero during
    /// this call is reported once; timers already at zero are not.
    pub fn tick(&mut self, dt: f32) -> ExpiredTimers {
        debug_assert!(is_duration(dt), "invalid tick delta {dt}");
        let dt = sanitize(dt);
        let mut expired = ExpiredTimers::default();
        for kind in TimerKind::ALL {
            let slot = &mut self.values[kind.index()];
            if *slot > 0.0 {
                *slot = (*slot - dt).max(0.0);
                if *slot == 0.0 {
                    expired.insert(kind);
                }
            }
        }
        expired
    }
}

fn is_duration(secs: f32) -> bool {
    secs.is_finite() && secs >= 0.0
}

fn sanitize(secs: f32) -> f32 {
    if secs.is_finite() {
        secs.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    #[cfg(not(debug_assertions))]
    fn arm_clamps_negative_values() {
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::Stun, -1.0);
        assert_eq!(timers.remaining(TimerKind::Stun), 0.0);
        assert!(!timers.is_active(TimerKind::Stun));
        timers.arm(TimerKind::Stun, f32::NAN);
        assert_eq!(timers.remaining(TimerKind::Stun), 0.0);
    }

    #[test]
    fn extend_keeps_the_longer_value() {
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::Stun, 0.7);
        timers.extend(TimerKind::Stun, 0.4);
        assert_relative_eq!(timers.remaining(TimerKind::Stun), 0.7);
        timers.extend(TimerKind::Stun, 1.0);
        assert_relative_eq!(timers.remaining(TimerKind::Stun), 1.0);
    }

    #[test]
    fn expiry_is_reported_exactly_once() {
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::Hurt, 0.25);
        timers.arm(TimerKind::Slow, 1.0);

        let first = timers.tick(0.2);
        assert!(first.is_empty());

        let second = timers.tick(0.2);
        assert!(second.contains(TimerKind::Hurt));
        assert!(!second.contains(TimerKind::Slow));
        assert_eq!(timers.remaining(TimerKind::Hurt), 0.0);

        let third = timers.tick(0.2);
        assert!(!third.contains(TimerKind::Hurt));
        assert_eq!(third.iter().count(), 0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn negative_delta_does_not_rewind() {
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::Fade, 0.5);
        timers.tick(-3.0);
        assert_relative_eq!(timers.remaining(TimerKind::Fade), 0.5);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid Stun duration")]
    fn negative_duration_fails_fast_in_debug() {
        TimerSet::default().arm(TimerKind::Stun, -1.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid Slow duration")]
    fn nan_extend_fails_fast_in_debug() {
        TimerSet::default().extend(TimerKind::Slow, f32::NAN);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid tick delta")]
    fn negative_delta_fails_fast_in_debug() {
        TimerSet::default().tick(-3.0);
    }

    #[test]
    fn clear_deactivates() {
        let mut timers = TimerSet::default();
        timers.arm(TimerKind::AttackCooldown, 1.0);
        timers.clear(TimerKind::AttackCooldown);
        assert!(!timers.is_active(TimerKind::AttackCooldown));
        assert!(timers.tick(1.0).is_empty());
    }
}
