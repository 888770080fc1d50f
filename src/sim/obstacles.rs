//! Obstacle spawning for the ladder stage
//!
//! Obstacles roll along a level line from one screen edge to the other. Upper
//! levels get more of them and they move faster there.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::outside_horizontal;
use super::levels::LevelLadderSystem;
use super::roulette::{level_weights, pick_weighted};
use super::state::{Appearance, EntityIds, Obstacle, Walker};
use crate::consts::traversal::*;
use crate::ms_to_secs;

/// Extra speed for obstacles on `level`; the bottom tier gets none
pub fn level_boost(levels_count: usize, level: usize) -> f32 {
    levels_count.saturating_sub(1).saturating_sub(level) as f32 * OBSTACLE_SPEED_PER_LEVEL
}

/// Spawns obstacle batches and resolves their hits on the walker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleSpawner {
    /// Image keys the presentation layer managed to load
    icons: Vec<String>,
}

impl ObstacleSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an icon available for obstacles. Without any, obstacles use the
    /// placeholder square.
    pub fn register_icon(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.icons.contains(&key) {
            self.icons.push(key);
        }
    }

    /// Spawn a random-sized batch; returns how many were spawned
    pub fn spawn_batch<R: Rng>(
        &self,
        rng: &mut R,
        levels: &LevelLadderSystem,
        ids: &mut EntityIds,
        out: &mut Vec<Obstacle>,
    ) -> u32 {
        let count = rng.random_range(OBSTACLE_SPAWN_COUNT_MIN..=OBSTACLE_SPAWN_COUNT_MAX);
        for _ in 0..count {
            out.push(self.spawn_one(rng, levels, ids));
        }
        log::debug!("Spawned {} obstacles", count);
        count
    }

    /// Spawn one obstacle just off a random edge, on a weighted-random level
    pub fn spawn_one<R: Rng>(
        &self,
        rng: &mut R,
        levels: &LevelLadderSystem,
        ids: &mut EntityIds,
    ) -> Obstacle {
        let n = levels.levels_count();
        let level = pick_weighted(rng, &level_weights(n)).unwrap_or(levels.bottom());
        let from_left = rng.random_range(0..=1) == 0;

        let boost = level_boost(n, level);
        let speed = rng.random_range(OBSTACLE_SPEED_MIN + boost..=OBSTACLE_SPEED_MAX + boost);

        let width = levels.viewport().width;
        let (x, vx) = if from_left {
            (-OBSTACLE_SIZE, speed)
        } else {
            (width + OBSTACLE_SIZE, -speed)
        };

        let appearance = if self.icons.is_empty() {
            Appearance::Placeholder {
                color: OBSTACLE_PLACEHOLDER_COLOR,
            }
        } else {
            Appearance::Sprite(self.icons[rng.random_range(0..self.icons.len())].clone())
        };

        Obstacle {
            id: ids.next(),
            pos: Vec2::new(x, levels.height(level)),
            vel: Vec2::new(vx, 0.0),
            level,
            size: OBSTACLE_SIZE,
            appearance,
        }
    }
}

/// Move obstacles along their lines (lines may have moved after a resize)
pub fn integrate(obstacles: &mut [Obstacle], levels: &LevelLadderSystem, dt_ms: u64) {
    let dt = ms_to_secs(dt_ms);
    for obstacle in obstacles.iter_mut() {
        obstacle.pos.x += obstacle.vel.x * dt;
        obstacle.pos.y = levels.height(obstacle.level);
    }
}

/// Drop obstacles that are fully past either edge; returns the number removed
pub fn cleanup(obstacles: &mut Vec<Obstacle>, width: f32) -> usize {
    let before = obstacles.len();
    obstacles.retain(|o| !outside_horizontal(o.pos.x, width, o.size * 2.0));
    before - obstacles.len()
}

/// Knock a grounded walker back to the bottom-left corner if any obstacle
/// touches it. Airborne walkers are untouchable. Returns true on a hit.
pub fn resolve_walker_hits(
    walker: &mut Walker,
    obstacles: &[Obstacle],
    levels: &LevelLadderSystem,
) -> bool {
    if walker.jumping() {
        return false;
    }

    let hitbox = walker.hitbox();
    if !obstacles.iter().any(|o| o.hitbox().overlaps(&hitbox)) {
        return false;
    }

    let bottom = levels.bottom();
    log::info!("Hit on level {}, back to level {}", walker.current_level, bottom);
    walker.current_level = bottom;
    walker.pos = Vec2::new(PLAYER_SIZE / 2.0, levels.height(bottom));
    walker.vel = Vec2::ZERO;
    walker.hit_tint = true;
    true
}
