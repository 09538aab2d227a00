use bevy_ecs::prelude::*;

/// Sprint resource with exhaustion hysteresis: hitting zero locks sprinting
/// until the pool is full again.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Mana {
    pub current: f32,
    pub max: f32,
    pub drain_rate: f32,
    pub regen_rate: f32,
    pub exhausted: bool,
    pub draining: bool,
    pub regening: bool,
}

impl Mana {
    pub fn new(max: f32, drain_rate: f32, regen_rate: f32) -> Self {
        debug_assert!(
            max >= 0.0 && drain_rate >= 0.0 && regen_rate >= 0.0,
            "negative mana settings max={max} drain={drain_rate} regen={regen_rate}"
        );
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            drain_rate: drain_rate.max(0.0),
            regen_rate: regen_rate.max(0.0),
            exhausted: false,
            draining: false,
            regening: false,
        }
    }

    pub fn can_sprint(&self) -> bool {
        !self.exhausted && self.current > 0.0
    }

    pub fn update(&mut self, dt: f32, sprinting: bool, moving: bool) {
        let dt = dt.max(0.0);
        self.draining = false;
        self.regening = false;

        if sprinting && moving {
            self.current = (self.current - self.drain_rate * dt).max(0.0);
            self.draining = true;
            if self.current <= 0.0 {
                self.exhausted = true;
            }
            return;
        }

        if self.current < self.max {
            self.current = (self.current + self.regen_rate * dt).min(self.max);
            self.regening = true;
        }
        if self.current >= self.max {
            self.exhausted = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprinting_drains_until_exhausted() {
        let mut mana = Mana::new(10.0, 6.0, 2.0);
        for _ in 0..20 {
            mana.update(0.1, true, true);
        }
        assert_eq!(mana.current, 0.0);
        assert!(mana.exhausted);
        assert!(!mana.can_sprint());
    }

    #[test]
    fn exhaustion_clears_only_at_full() {
        let mut mana = Mana::new(10.0, 6.0, 2.0);
        mana.current = 0.0;
        mana.exhausted = true;

        mana.update(2.5, false, true);
        assert!(mana.regening);
        assert!(mana.current > 0.0);
        assert!(mana.exhausted);
        assert!(!mana.can_sprint());

        mana.update(5.0, false, false);
        assert_eq!(mana.current, 10.0);
        assert!(!mana.exhausted);
        assert!(mana.can_sprint());
    }

    #[test]
    fn standing_still_with_sprint_held_regenerates() {
        let mut mana = Mana::new(10.0, 6.0, 2.0);
        mana.current = 5.0;
        mana.update(1.0, true, false);
        assert_eq!(mana.current, 7.0);
        assert!(!mana.draining);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "negative mana settings")]
    fn negative_drain_fails_fast_in_debug() {
        Mana::new(10.0, -6.0, 2.0);
    }
}
