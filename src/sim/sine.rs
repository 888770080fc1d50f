//! Vertical oscillation for sine enemies
//!
//! The y coordinate is recomputed from scratch every tick from the time since
//! spawn; no vertical velocity is integrated.

use super::state::{Enemy, Oscillation};
use crate::consts::shooter::{SINE_AMPLITUDE, SINE_FREQUENCY};

/// Height of an oscillating entity at `now_ms`
#[inline]
pub fn oscillation_height(osc: &Oscillation, now_ms: u64) -> f32 {
    let elapsed = now_ms.saturating_sub(osc.spawn_ms) as f32;
    osc.base_height + SINE_AMPLITUDE * (elapsed * SINE_FREQUENCY).sin()
}

/// Apply oscillation to every registered enemy still in play
pub fn apply(enemies: &mut [Enemy], now_ms: u64) {
    for enemy in enemies.iter_mut().filter(|e| !e.dying) {
        if let Some(osc) = &enemy.oscillation {
            enemy.pos.y = oscillation_height(osc, now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EnemyKind;
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    fn sine_enemy(spawn_ms: u64) -> Enemy {
        Enemy {
            id: 1,
            kind: EnemyKind::Sine,
            pos: Vec2::new(500.0, 300.0),
            vel: Vec2::new(-100.0, 0.0),
            size: 30.0,
            oscillation: Some(Oscillation {
                base_height: 300.0,
                spawn_ms,
            }),
            dying: false,
        }
    }

    #[test]
    fn test_height_at_spawn_is_base() {
        let osc = Oscillation {
            base_height: 200.0,
            spawn_ms: 1000,
        };
        assert_eq!(oscillation_height(&osc, 1000), 200.0);
    }

    #[test]
    fn test_peak_after_quarter_period() {
        let osc = Oscillation {
            base_height: 200.0,
            spawn_ms: 0,
        };
        let quarter = (FRAC_PI_2 / SINE_FREQUENCY).round() as u64;
        let y = oscillation_height(&osc, quarter);
        assert!((y - (200.0 + SINE_AMPLITUDE)).abs() < 0.1);
    }

    #[test]
    fn test_apply_is_stateless() {
        let mut a = vec![sine_enemy(0)];
        let mut b = vec![sine_enemy(0)];

        // Many small steps vs one jump to the same instant
        for t in (0..=900).step_by(16) {
            apply(&mut a, t);
        }
        apply(&mut a, 1000);
        apply(&mut b, 1000);
        assert_eq!(a[0].pos.y, b[0].pos.y);
        // Horizontal axis untouched
        assert_eq!(a[0].pos.x, 500.0);
    }

    #[test]
    fn test_straight_enemies_ignored() {
        let mut enemy = sine_enemy(0);
        enemy.oscillation = None;
        enemy.kind = EnemyKind::Straight;
        let mut list = vec![enemy];
        apply(&mut list, 777);
        assert_eq!(list[0].pos.y, 300.0);
    }
}
