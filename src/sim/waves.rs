//! Wave progression for the shooter stage
//!
//! The director owns the wave table and the per-wave counters. Every path that
//! removes an enemy (bullet kill, player collision, off-screen cleanup) goes
//! through `record_removal`, which is the only place clearance is decided.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::roulette::pick_weighted;
use super::scheduler::{Scheduler, TimerHandle};
use super::state::{CorruptionRect, Enemy, EnemyKind, EntityIds, Oscillation};
use crate::Viewport;
use crate::consts::shooter::*;

/// One row of the wave table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub total_enemies: u32,
    pub spawn_interval_ms: u64,
    pub weights: Vec<(EnemyKind, u32)>,
    pub speed: f32,
    pub size: f32,
    /// Enemies may emerge from spawn points instead of the right edge
    pub from_bins: bool,
}

impl WaveConfig {
    fn new(
        total_enemies: u32,
        spawn_interval_ms: u64,
        weights: &[(EnemyKind, u32)],
        speed: f32,
        size: f32,
        from_bins: bool,
    ) -> Self {
        Self {
            total_enemies,
            spawn_interval_ms,
            weights: weights.to_vec(),
            speed,
            size,
            from_bins,
        }
    }

    /// Roulette over the type weights
    pub fn pick_kind<R: Rng>(&self, rng: &mut R) -> Option<EnemyKind> {
        let weights: Vec<u32> = self.weights.iter().map(|(_, w)| *w).collect();
        pick_weighted(rng, &weights).map(|i| self.weights[i].0)
    }
}

/// The six recycle-bin waves
pub fn standard_waves() -> Vec<WaveConfig> {
    use EnemyKind::*;
    vec![
        WaveConfig::new(8, 1000, &[(Straight, 1)], ENEMY_SPEED_SLOW, ENEMY_SIZE_MEDIUM, false),
        WaveConfig::new(12, 800, &[(Straight, 2), (Sine, 1)], ENEMY_SPEED_SLOW, ENEMY_SIZE_MEDIUM, false),
        WaveConfig::new(15, 700, &[(Straight, 1), (Sine, 2)], ENEMY_SPEED_MEDIUM, ENEMY_SIZE_MEDIUM, true),
        WaveConfig::new(18, 600, &[(Straight, 1), (Sine, 2), (Fast, 1)], ENEMY_SPEED_MEDIUM, ENEMY_SIZE_SMALL, true),
        WaveConfig::new(22, 500, &[(Sine, 2), (Fast, 2)], ENEMY_SPEED_FAST, ENEMY_SIZE_SMALL, true),
        WaveConfig::new(28, 400, &[(Straight, 1), (Sine, 2), (Fast, 3)], ENEMY_SPEED_FAST, ENEMY_SIZE_LARGE, true),
    ]
}

/// Fixed alternate enemy origin ("recycle bin")
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub pos: Vec2,
    /// Briefly lit when an enemy emerges
    pub flashing: bool,
}

/// Lay out spawn points across the right half of the arena, alternating heights
pub fn layout_spawn_points(viewport: Viewport) -> Vec<SpawnPoint> {
    let Viewport { width, height } = viewport;
    let start_x = width * 0.45;
    let spacing = (width * 0.50) / NUM_SPAWN_POINTS as f32;
    (0..NUM_SPAWN_POINTS)
        .map(|i| SpawnPoint {
            pos: Vec2::new(
                start_x + i as f32 * spacing + spacing / 2.0,
                height * 0.3 + if i % 2 == 0 { 0.0 } else { height * 0.25 },
            ),
            flashing: false,
        })
        .collect()
}

/// A cleared wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clearance {
    pub wave: u32,
    /// Last wave in the table: the stage is won
    pub final_wave: bool,
}

/// Freshly spawned enemy and where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawned {
    pub enemy: Enemy,
    /// Index of the spawn point used, if any
    pub spawn_point: Option<usize>,
}

/// Drives wave starts, enemy spawning and clearance detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    table: Vec<WaveConfig>,
    /// 1-based; 0 before the first wave
    current: u32,
    remaining_to_spawn: u32,
    remaining_active: u32,
    /// Started and not yet cleared
    in_progress: bool,
    difficulty: f32,
    spawn_points: Vec<SpawnPoint>,
}

impl WaveDirector {
    pub fn new(table: Vec<WaveConfig>, viewport: Viewport) -> Self {
        Self {
            table,
            current: 0,
            remaining_to_spawn: 0,
            remaining_active: 0,
            in_progress: false,
            difficulty: 0.0,
            spawn_points: layout_spawn_points(viewport),
        }
    }

    pub fn total_waves(&self) -> u32 {
        self.table.len() as u32
    }

    pub fn current_wave(&self) -> u32 {
        self.current
    }

    pub fn config(&self, wave: u32) -> Option<&WaveConfig> {
        wave.checked_sub(1).and_then(|i| self.table.get(i as usize))
    }

    pub fn remaining_to_spawn(&self) -> u32 {
        self.remaining_to_spawn
    }

    pub fn remaining_active(&self) -> u32 {
        self.remaining_active
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Corruption scalar in [0, 1]; 0 on the first wave, 1 on the last
    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub fn rebuild_spawn_points(&mut self, viewport: Viewport) {
        self.spawn_points = layout_spawn_points(viewport);
    }

    pub fn set_point_flash(&mut self, index: usize, flashing: bool) {
        if let Some(point) = self.spawn_points.get_mut(index) {
            point.flashing = flashing;
        }
    }

    /// Begin wave `wave`: reset counters, update difficulty and schedule one
    /// `spawn_event` per enemy at the wave's interval. Unknown waves are
    /// ignored. Returns the spawn timer, if one was needed.
    pub fn start_wave<E: Clone>(
        &mut self,
        wave: u32,
        scheduler: &mut Scheduler<E>,
        spawn_event: E,
    ) -> Option<TimerHandle> {
        let Some(config) = self.config(wave).cloned() else {
            log::warn!("Wave {} is not in the table ({} waves)", wave, self.table.len());
            return None;
        };

        self.current = wave;
        self.remaining_to_spawn = config.total_enemies;
        self.remaining_active = 0;
        self.in_progress = true;
        let last = self.total_waves().saturating_sub(1).max(1);
        self.difficulty = ((wave - 1) as f32 / last as f32).clamp(0.0, 1.0);

        log::info!(
            "Wave {}/{}: {} enemies every {}ms, corruption {:.2}",
            wave,
            self.total_waves(),
            config.total_enemies,
            config.spawn_interval_ms,
            self.difficulty
        );

        if config.total_enemies == 0 {
            return None;
        }
        Some(scheduler.every(
            config.spawn_interval_ms,
            spawn_event,
            Some(config.total_enemies - 1),
        ))
    }

    /// Spawn the next enemy of the current wave. A no-op (None) when nothing
    /// is left to spawn or no wave is running.
    pub fn spawn_enemy<R: Rng>(
        &mut self,
        rng: &mut R,
        viewport: Viewport,
        ids: &mut EntityIds,
        now_ms: u64,
    ) -> Option<Spawned> {
        if !self.in_progress || self.remaining_to_spawn == 0 {
            return None;
        }
        let config = self.config(self.current)?.clone();
        let kind = config.pick_kind(rng).unwrap_or_else(|| {
            log::warn!("Wave {} has no weighted enemy types, spawning Straight", self.current);
            EnemyKind::Straight
        });

        let spawn_point = if config.from_bins
            && !self.spawn_points.is_empty()
            && rng.random_bool(SPAWN_POINT_CHANCE)
        {
            Some(rng.random_range(0..self.spawn_points.len()))
        } else {
            None
        };

        let pos = match spawn_point {
            Some(i) => self.spawn_points[i].pos,
            None => {
                let min_y = ENEMY_SPAWN_Y_MARGIN;
                let max_y = (viewport.height - ENEMY_SPAWN_Y_MARGIN).max(min_y);
                let y = rng.random_range(min_y as i32..=max_y as i32) as f32;
                Vec2::new(viewport.width + config.size, y)
            }
        };

        let (speed, size) = match kind {
            EnemyKind::Fast => (config.speed * FAST_SPEED_MULTIPLIER, config.size * FAST_SHAPE_SCALE),
            _ => (config.speed, config.size),
        };
        let oscillation = (kind == EnemyKind::Sine).then_some(Oscillation {
            base_height: pos.y,
            spawn_ms: now_ms,
        });

        self.remaining_to_spawn -= 1;
        self.remaining_active += 1;

        let enemy = Enemy {
            id: ids.next(),
            kind,
            pos,
            vel: Vec2::new(-speed, 0.0),
            size,
            oscillation,
            dying: false,
        };
        log::debug!(
            "Spawned {:?} #{} at ({:.0}, {:.0}){}",
            kind,
            enemy.id,
            pos.x,
            pos.y,
            if spawn_point.is_some() { " from bin" } else { "" }
        );

        Some(Spawned { enemy, spawn_point })
    }

    /// Account for one enemy leaving play, then re-check clearance
    pub fn record_removal(&mut self) -> Option<Clearance> {
        self.remaining_active = self.remaining_active.saturating_sub(1);
        self.check_clearance()
    }

    /// Report clearance exactly once per wave
    pub fn check_clearance(&mut self) -> Option<Clearance> {
        if !self.in_progress || self.remaining_to_spawn > 0 || self.remaining_active > 0 {
            return None;
        }
        self.in_progress = false;
        let clearance = Clearance {
            wave: self.current,
            final_wave: self.current >= self.total_waves(),
        };
        log::info!("Wave {} cleared", self.current);
        Some(clearance)
    }

    /// Stop the wave without clearing it (game over)
    pub fn abort(&mut self) {
        self.in_progress = false;
        self.remaining_to_spawn = 0;
    }
}

/// Maybe produce a glitch rectangle; likelier and larger as difficulty rises
pub fn corruption_rect<R: Rng>(
    rng: &mut R,
    difficulty: f32,
    viewport: Viewport,
    ids: &mut EntityIds,
) -> Option<CorruptionRect> {
    if difficulty <= 0.0 || rng.random::<f32>() > difficulty * CORRUPTION_CHANCE {
        return None;
    }

    let x = rng.random_range(0.0..=viewport.width.max(0.0));
    let y = rng.random_range(0.0..=viewport.height.max(0.0));
    let w = rng.random_range(10.0..=80.0 * difficulty + 20.0);
    let h = rng.random_range(5.0..=30.0 * difficulty + 10.0);
    let color = CORRUPTION_COLORS[rng.random_range(0..CORRUPTION_COLORS.len())];
    let alpha = rng.random_range(0.1..=0.4 * difficulty + 0.1);

    Some(CorruptionRect {
        id: ids.next(),
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
        color,
        alpha,
    })
}
