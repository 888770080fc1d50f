//! Entity types shared by the systems
//!
//! Entities are plain data kept in `Vec`s sorted by id; systems mutate them
//! and the stages decide when they live or die.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::{shooter, traversal};

/// Monotonic entity id allocator (ids are never reused within a stage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next_id: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl EntityIds {
    pub fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Drawable outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Square,
}

/// How an entity should look. Missing image assets degrade to a coloured
/// placeholder instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Appearance {
    Sprite(String),
    Placeholder { color: u32 },
}

/// Player in the side-view ladder stage. `pos` is the bottom-centre of the
/// sprite, which sits on the current level's line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walker {
    pub pos: Vec2,
    pub vel: Vec2,
    pub current_level: usize,
    pub jump: Option<JumpArc>,
    /// Red hit tint (cleared by a timer)
    pub hit_tint: bool,
}

impl Walker {
    pub fn new(x: f32, level: usize, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, height),
            vel: Vec2::ZERO,
            current_level: level,
            jump: None,
            hit_tint: false,
        }
    }

    #[inline]
    pub fn jumping(&self) -> bool {
        self.jump.is_some()
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::from_bottom_center(self.pos, Vec2::splat(traversal::PLAYER_SIZE))
            .scaled(traversal::PLAYER_HITBOX_SCALE)
    }
}

/// An in-flight jump, timed from its start on the virtual clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpArc {
    pub start_ms: u64,
}

/// Player in the shooter stage (`pos` is the centre)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flyer {
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: Health,
    /// Fraction of arena width the flyer may reach; 1.0 after victory
    pub movement_bound: f32,
}

impl Flyer {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            health: Health::new(shooter::PLAYER_MAX_HP),
            movement_bound: shooter::PLAYER_MOVEMENT_BOUND,
        }
    }

    pub fn size() -> Vec2 {
        Vec2::new(shooter::PLAYER_WIDTH, shooter::PLAYER_HEIGHT)
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.pos, Self::size())
    }

    /// Muzzle position bullets leave from
    pub fn nose(&self) -> Vec2 {
        self.pos + Vec2::new(shooter::PLAYER_WIDTH / 2.0, 0.0)
    }
}

/// Outcome of a hit attempt against `Health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Invulnerable or already dead
    Ignored,
    /// HP went down and an invulnerability window started
    Damaged,
    /// HP reached zero
    Depleted,
}

/// Hit points with a post-hit invulnerability window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub hp: u8,
    pub max_hp: u8,
    /// Virtual time the invulnerability window ends
    pub invulnerable_until: Option<u64>,
}

impl Health {
    pub fn new(max_hp: u8) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            invulnerable_until: None,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    pub fn is_invulnerable(&self, now_ms: u64) -> bool {
        self.invulnerable_until.is_some_and(|until| now_ms < until)
    }

    /// Clear an expired window
    pub fn expire(&mut self, now_ms: u64) {
        if self.invulnerable_until.is_some() && !self.is_invulnerable(now_ms) {
            self.invulnerable_until = None;
        }
    }

    /// Apply one point of damage unless protected
    pub fn take_hit(&mut self, now_ms: u64) -> HitOutcome {
        if self.is_dead() || self.is_invulnerable(now_ms) {
            return HitOutcome::Ignored;
        }

        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.invulnerable_until = None;
            return HitOutcome::Depleted;
        }

        self.invulnerable_until = Some(now_ms + shooter::PLAYER_INVULN_MS);
        HitOutcome::Damaged
    }

    /// Visible/hidden flashing while invulnerable
    pub fn flash_visible(&self, now_ms: u64) -> bool {
        match self.invulnerable_until {
            Some(until) if now_ms < until => {
                let elapsed = until - now_ms;
                (elapsed / shooter::PLAYER_FLASH_MS) % 2 == 0
            }
            _ => true,
        }
    }
}

/// Obstacle scrolling along a level in the ladder stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Bottom-centre on the level line
    pub pos: Vec2,
    pub vel: Vec2,
    pub level: usize,
    pub size: f32,
    pub appearance: Appearance,
}

impl Obstacle {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_bottom_center(self.pos, Vec2::splat(self.size))
            .scaled(traversal::OBSTACLE_HITBOX_SCALE)
    }
}

/// Enemy movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Straight,
    Sine,
    Fast,
}

impl EnemyKind {
    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Straight => shooter::ENEMY_COLOR_VIRUS,
            EnemyKind::Sine => shooter::ENEMY_COLOR_CORRUPTION,
            EnemyKind::Fast => shooter::ENEMY_COLOR_FAST,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            EnemyKind::Fast => Shape::Square,
            _ => Shape::Circle,
        }
    }
}

/// Vertical oscillation record for sine enemies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub base_height: f32,
    pub spawn_ms: u64,
}

/// Shooter enemy (`pos` is the centre)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Drawn extent (diameter or side)
    pub size: f32,
    pub oscillation: Option<Oscillation>,
    /// Hit by a bullet; flashing white until removed. Dying enemies no longer
    /// collide and are already accounted for in the wave counters.
    pub dying: bool,
}

impl Enemy {
    pub fn hitbox(&self) -> Aabb {
        Aabb::square(self.pos, self.size)
    }
}

/// Player shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Bullet {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(
            self.pos,
            Vec2::new(shooter::BULLET_WIDTH, shooter::BULLET_HEIGHT),
        )
    }
}

/// Short-lived glitch rectangle drawn over the arena as corruption rises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorruptionRect {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub alpha: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_floor_and_invulnerability() {
        let mut health = Health::new(3);

        assert_eq!(health.take_hit(0), HitOutcome::Damaged);
        assert_eq!(health.hp, 2);

        // Inside the window nothing lands
        for t in [1, 500, shooter::PLAYER_INVULN_MS - 1] {
            assert_eq!(health.take_hit(t), HitOutcome::Ignored);
        }
        assert_eq!(health.hp, 2);

        let t = shooter::PLAYER_INVULN_MS;
        assert_eq!(health.take_hit(t), HitOutcome::Damaged);
        let t = t + shooter::PLAYER_INVULN_MS;
        assert_eq!(health.take_hit(t), HitOutcome::Depleted);
        assert_eq!(health.hp, 0);

        // Dead stays at zero
        assert_eq!(health.take_hit(t + 10_000), HitOutcome::Ignored);
        assert_eq!(health.hp, 0);
    }

    #[test]
    fn test_flash_toggles_during_window() {
        let mut health = Health::new(3);
        health.take_hit(0);
        let samples: Vec<bool> = (0..6).map(|i| health.flash_visible(i * 100 + 50)).collect();
        assert!(samples.contains(&true));
        assert!(samples.contains(&false));
        assert!(health.flash_visible(shooter::PLAYER_INVULN_MS + 1));

        health.expire(shooter::PLAYER_INVULN_MS);
        assert_eq!(health.invulnerable_until, None);
    }

    #[test]
    fn test_entity_ids_monotonic() {
        let mut ids = EntityIds::default();
        let a = ids.next();
        let b = ids.next();
        assert!(b > a);
    }
}
