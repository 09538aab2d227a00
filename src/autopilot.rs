use animation::FacingDirection;
use game::{character::player::input::PlayerIntents, report::PlayerReport};

/// Scripted driver standing in for a keyboard. Shoots at anything in sight,
/// raises the guard when something gets close and backs off while the guard
/// is on cooldown.
#[derive(Debug, Default, Clone)]
pub struct Autopilot {
    last: PlayerIntents,
}

impl Autopilot {
    const GUARD_DISTANCE: f32 = 110.0;
    const SIGHT: f32 = 700.0;

    pub fn next(&mut self, report: &PlayerReport) -> PlayerIntents {
        let mut intents = PlayerIntents::default();

        if let Some(dx) = report.nearest_enemy_dx.filter(|_| report.alive) {
            let toward_right = dx >= 0.0;
            let facing_target = (report.facing == FacingDirection::Right) == toward_right;

            if dx.abs() <= Self::GUARD_DISTANCE {
                if report.block_cooldown > 0.0 {
                    intents.move_left = toward_right;
                    intents.move_right = !toward_right;
                    intents.sprint = !report.mana_exhausted;
                } else {
                    intents.block = true;
                }
            } else if dx.abs() <= Self::SIGHT {
                if facing_target {
                    // Release every other frame so each press is a new edge.
                    intents.attack = !self.last.attack;
                } else {
                    intents.move_left = !toward_right;
                    intents.move_right = toward_right;
                }
            }
        }

        self.last = intents;
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(dx: Option<f32>) -> PlayerReport {
        PlayerReport {
            alive: true,
            nearest_enemy_dx: dx,
            ..Default::default()
        }
    }

    #[test]
    fn no_enemy_means_no_input() {
        let mut pilot = Autopilot::default();
        assert_eq!(pilot.next(&report(None)), PlayerIntents::default());
    }

    #[test]
    fn fires_in_pulses_at_a_target_ahead() {
        let mut pilot = Autopilot::default();
        let r = report(Some(400.0));
        assert!(pilot.next(&r).attack);
        assert!(!pilot.next(&r).attack);
        assert!(pilot.next(&r).attack);
    }

    #[test]
    fn turns_before_shooting_behind() {
        let mut pilot = Autopilot::default();
        let intents = pilot.next(&report(Some(-300.0)));
        assert!(intents.move_left && !intents.attack);
    }

    #[test]
    fn guards_up_close_and_retreats_on_cooldown() {
        let mut pilot = Autopilot::default();
        assert!(pilot.next(&report(Some(60.0))).block);

        let mut cooling = report(Some(60.0));
        cooling.block_cooldown = 0.5;
        let intents = pilot.next(&cooling);
        assert!(intents.move_left && !intents.block);
    }

    #[test]
    fn dead_player_gets_nothing() {
        let mut pilot = Autopilot::default();
        let mut r = report(Some(50.0));
        r.alive = false;
        assert_eq!(pilot.next(&r), PlayerIntents::default());
    }
}
