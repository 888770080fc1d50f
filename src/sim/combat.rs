//! Bullets, enemy hits and player damage for the shooter stage
//!
//! These functions only mutate entities and report what died; the stage feeds
//! every reported removal into the wave director so counters stay exact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::{Bullet, Enemy, EntityIds, Flyer, HitOutcome};
use crate::consts::shooter::*;
use crate::{Viewport, ms_to_secs};

/// Spawn one bullet from the flyer's nose
pub fn fire(flyer: &Flyer, ids: &mut EntityIds, bullets: &mut Vec<Bullet>) {
    bullets.push(Bullet {
        id: ids.next(),
        pos: flyer.nose(),
        vel: Vec2::new(BULLET_SPEED, 0.0),
    });
}

pub fn integrate_bullets(bullets: &mut [Bullet], dt_ms: u64) {
    let dt = ms_to_secs(dt_ms);
    for bullet in bullets.iter_mut() {
        bullet.pos += bullet.vel * dt;
    }
}

/// Horizontal drift for every enemy; sine enemies get their y from `sine::apply`
pub fn integrate_enemies(enemies: &mut [Enemy], dt_ms: u64) {
    let dt = ms_to_secs(dt_ms);
    for enemy in enemies.iter_mut() {
        enemy.pos.x += enemy.vel.x * dt;
        if enemy.oscillation.is_none() {
            enemy.pos.y += enemy.vel.y * dt;
        }
    }
}

/// Bullets against enemies. Each bullet kills at most one enemy and each enemy
/// dies at most once; killed enemies are marked dying (they flash and are
/// removed later) and their ids returned. Spent bullets are removed.
pub fn resolve_bullet_hits(bullets: &mut Vec<Bullet>, enemies: &mut [Enemy]) -> Vec<u32> {
    let mut killed = Vec::new();

    bullets.retain(|bullet| {
        let hitbox = bullet.hitbox();
        match enemies
            .iter_mut()
            .find(|e| !e.dying && e.hitbox().overlaps(&hitbox))
        {
            Some(enemy) => {
                enemy.dying = true;
                enemy.vel = Vec2::ZERO;
                killed.push(enemy.id);
                false
            }
            None => true,
        }
    });

    killed
}

/// What enemy contact did to the player this tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHits {
    /// Enemies destroyed by ramming the player
    pub removed: Vec<u32>,
    pub damaged: bool,
    pub depleted: bool,
}

/// Enemies against the player. Contacts are ignored while invulnerable or
/// dead; otherwise the first touching enemy deals damage and is destroyed.
pub fn resolve_player_hits(flyer: &mut Flyer, enemies: &mut Vec<Enemy>, now_ms: u64) -> PlayerHits {
    let mut hits = PlayerHits::default();
    let hitbox = flyer.hitbox();

    let Some(index) = enemies
        .iter()
        .position(|e| !e.dying && e.hitbox().overlaps(&hitbox))
    else {
        return hits;
    };

    match flyer.health.take_hit(now_ms) {
        HitOutcome::Ignored => {}
        outcome => {
            let enemy = enemies.remove(index);
            hits.removed.push(enemy.id);
            hits.damaged = true;
            hits.depleted = outcome == HitOutcome::Depleted;
            log::info!("Player hit by {:?} #{}, HP {}", enemy.kind, enemy.id, flyer.health.hp);
        }
    }

    hits
}

/// Remove an enemy by id; a no-op if it is already gone
pub fn remove_enemy(enemies: &mut Vec<Enemy>, id: u32) -> Option<Enemy> {
    let index = enemies.iter().position(|e| e.id == id)?;
    Some(enemies.remove(index))
}

/// Drop bullets past the right edge
pub fn cleanup_bullets(bullets: &mut Vec<Bullet>, width: f32) {
    bullets.retain(|b| b.pos.x <= width + BULLET_CLEANUP_MARGIN);
}

/// Drop enemies that left the arena (left edge, top or bottom). Returns ids of
/// removed enemies that still counted toward the wave; dying enemies were
/// already accounted for when they were shot.
pub fn cleanup_enemies(enemies: &mut Vec<Enemy>, viewport: Viewport) -> Vec<u32> {
    let mut counted = Vec::new();
    enemies.retain(|e| {
        let gone = e.pos.x < -ENEMY_CLEANUP_MARGIN
            || e.pos.y < -ENEMY_CLEANUP_MARGIN
            || e.pos.y > viewport.height + ENEMY_CLEANUP_MARGIN;
        if gone && !e.dying {
            counted.push(e.id);
        }
        !gone
    });
    counted
}

/// Goal zone shown after the final wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub pos: Vec2,
    pub radius: f32,
    /// Cleared once entered so the exit only triggers once
    pub active: bool,
}

impl Portal {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            pos: Vec2::new(viewport.width * PORTAL_X, viewport.height * PORTAL_Y),
            radius: PORTAL_RADIUS,
            active: true,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::square(self.pos, self.radius * 2.0)
    }

    /// True the first time the flyer touches an active portal
    pub fn try_enter(&mut self, flyer: &Flyer) -> bool {
        if self.active && self.hitbox().overlaps(&flyer.hitbox()) {
            self.active = false;
            return true;
        }
        false
    }
}
