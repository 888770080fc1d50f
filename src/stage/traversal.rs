//! Side-view ladder stage: climb from the bottom tier to the top while
//! dodging obstacles

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::{StageCommand, StageId};
use crate::Viewport;
use crate::consts::traversal::*;
use crate::presentation::{Assets, Frame, Hud, Sprite, SpriteKind};
use crate::sim::input::TickInput;
use crate::sim::levels::LevelLadderSystem;
use crate::sim::movement::{JumpGate, MovementController, repin_walker};
use crate::sim::obstacles::{self, ObstacleSpawner};
use crate::sim::scheduler::{Scheduler, TimerHandle};
use crate::sim::state::{EntityIds, Obstacle, Shape, Walker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraversalEvent {
    SpawnObstacles,
    ClearHitTint,
}

#[derive(Debug, Clone)]
pub struct TraversalStage {
    levels: LevelLadderSystem,
    walker: Walker,
    controller: MovementController,
    spawner: ObstacleSpawner,
    obstacles: Vec<Obstacle>,
    scheduler: Scheduler<TraversalEvent>,
    rng: Pcg32,
    ids: EntityIds,
    /// Latest contact normals from an external physics layer
    contact_normals: Vec<Vec2>,
    spawn_timer: Option<TimerHandle>,
    tint_timer: Option<TimerHandle>,
}

impl TraversalStage {
    pub fn new(viewport: Viewport, seed: u64, assets: &Assets) -> Self {
        let levels = LevelLadderSystem::build(NUM_LEVELS, viewport.width, viewport.height);
        let bottom = levels.bottom();
        let walker = Walker::new(PLAYER_SIZE / 2.0, bottom, levels.height(bottom));

        let mut spawner = ObstacleSpawner::new();
        for key in OBSTACLE_ICONS.iter().filter(|k| assets.has(k)) {
            spawner.register_icon(*key);
        }

        Self {
            levels,
            walker,
            controller: MovementController::new(JumpGate::Always),
            spawner,
            obstacles: Vec::new(),
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
            contact_normals: Vec::new(),
            spawn_timer: None,
            tint_timer: None,
        }
    }

    /// Require ground contact before jumping (physics-backed hosts)
    pub fn with_jump_gate(mut self, gate: JumpGate) -> Self {
        self.controller.gate = gate;
        self
    }

    pub fn set_contact_normals(&mut self, normals: Vec<Vec2>) {
        self.contact_normals = normals;
    }

    pub fn walker(&self) -> &Walker {
        &self.walker
    }

    pub fn levels(&self) -> &LevelLadderSystem {
        &self.levels
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn enter(&mut self) {
        self.spawn_timer = Some(
            self.scheduler
                .every(OBSTACLE_SPAWN_MS, TraversalEvent::SpawnObstacles, None),
        );
        log::info!(
            "Traversal: {} levels, starting on level {}",
            self.levels.levels_count(),
            self.walker.current_level
        );
    }

    pub fn update(&mut self, input: &TickInput, dt_ms: u64) -> StageCommand {
        let now = self.scheduler.now_ms() + dt_ms;

        self.controller.update(
            &mut self.walker,
            input,
            &self.levels,
            &self.contact_normals,
            now,
            dt_ms,
        );

        while let Some(event) = self.scheduler.pop_due(now) {
            match event {
                TraversalEvent::SpawnObstacles => {
                    self.spawner.spawn_batch(
                        &mut self.rng,
                        &self.levels,
                        &mut self.ids,
                        &mut self.obstacles,
                    );
                }
                TraversalEvent::ClearHitTint => {
                    self.walker.hit_tint = false;
                    self.tint_timer = None;
                }
            }
        }

        obstacles::integrate(&mut self.obstacles, &self.levels, dt_ms);

        if obstacles::resolve_walker_hits(&mut self.walker, &self.obstacles, &self.levels) {
            self.scheduler.cancel_slot(&mut self.tint_timer);
            self.tint_timer = Some(self.scheduler.after(HIT_TINT_MS, TraversalEvent::ClearHitTint));
        }

        obstacles::cleanup(&mut self.obstacles, self.levels.viewport().width);

        if self.walker.current_level == 0 && !self.walker.jumping() {
            log::info!("Traversal complete at {}ms", self.scheduler.now_ms());
            self.scheduler.cancel_slot(&mut self.spawn_timer);
            return StageCommand::Complete;
        }
        StageCommand::Continue
    }

    pub fn exit(&mut self) {
        self.scheduler.cancel_all();
        self.spawn_timer = None;
        self.tint_timer = None;
    }

    /// Rebuild geometry; the walker keeps its level and any jump in flight
    pub fn resize(&mut self, viewport: Viewport) {
        self.levels.rebuild(viewport);
        repin_walker(&mut self.walker, &self.levels);
        obstacles::integrate(&mut self.obstacles, &self.levels, 0);
    }

    pub fn frame(&self) -> Frame {
        let viewport = self.levels.viewport();
        let mut frame = Frame::new(StageId::Traversal, self.scheduler.now_ms(), viewport);

        for level in self.levels.levels() {
            frame.sprites.push(Sprite::new(
                SpriteKind::LevelLine,
                Vec2::new(viewport.width / 2.0, level.height + level.slant / 2.0),
                Vec2::new(viewport.width, level.slant.abs().max(1.0)),
                Shape::Square,
                LEVEL_LINE_COLOR,
            ));
        }

        for zone in self.levels.ladders() {
            frame.sprites.push(Sprite::new(
                SpriteKind::Ladder,
                zone.pos,
                Vec2::new(zone.width, zone.height),
                Shape::Square,
                LADDER_COLOR,
            ));
        }

        for obstacle in &self.obstacles {
            frame.sprites.push(
                Sprite::new(
                    SpriteKind::Obstacle,
                    obstacle.pos - Vec2::new(0.0, obstacle.size / 2.0),
                    Vec2::splat(obstacle.size),
                    Shape::Square,
                    OBSTACLE_PLACEHOLDER_COLOR,
                )
                .with_id(obstacle.id)
                .with_appearance(obstacle.appearance.clone()),
            );
        }

        frame.sprites.push(
            Sprite::new(
                SpriteKind::Player,
                self.walker.pos - Vec2::new(0.0, PLAYER_SIZE / 2.0),
                Vec2::splat(PLAYER_SIZE),
                Shape::Square,
                PLAYER_COLOR,
            )
            .with_tint(self.walker.hit_tint.then_some(HIT_TINT_COLOR)),
        );

        frame.hud = Hud {
            level: Some(self.walker.current_level),
            ..Hud::default()
        };
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::input::Keys;

    fn stage() -> TraversalStage {
        let mut stage = TraversalStage::new(Viewport::new(800.0, 600.0), 11, &Assets::new());
        stage.enter();
        stage
    }

    fn press(keys: Keys) -> TickInput {
        TickInput {
            held: keys,
            pressed: keys,
        }
    }

    fn up() -> TickInput {
        press(Keys {
            up: true,
            ..Keys::default()
        })
    }

    #[test]
    fn test_starts_bottom_left() {
        let stage = stage();
        assert_eq!(stage.walker().current_level, NUM_LEVELS - 1);
        assert_eq!(stage.walker().pos.x, PLAYER_SIZE / 2.0);
        assert_eq!(stage.walker().pos.y, stage.levels().height(NUM_LEVELS - 1));
    }

    #[test]
    fn test_obstacles_spawn_on_timer() {
        let mut stage = stage();
        stage.update(&TickInput::default(), OBSTACLE_SPAWN_MS - 1);
        assert!(stage.obstacles().is_empty());
        stage.update(&TickInput::default(), 1);
        assert!(!stage.obstacles().is_empty());
    }

    #[test]
    fn test_climb_to_top_completes() {
        let mut stage = stage();
        // Teleport next to each ladder in turn and press up
        for _ in 0..NUM_LEVELS - 1 {
            let level = stage.walker().current_level;
            let x = stage
                .levels()
                .zone_for(crate::sim::levels::ClimbDirection::Up, level)
                .map(|z| z.pos.x)
                .unwrap();
            stage.walker.pos.x = x;
            stage.obstacles.clear();
            let command = stage.update(&up(), 0);
            assert_eq!(stage.walker().current_level, level - 1);
            if level == 1 {
                assert_eq!(command, StageCommand::Complete);
            } else {
                assert_eq!(command, StageCommand::Continue);
            }
        }
    }

    #[test]
    fn test_hit_tint_clears_after_timer() {
        let mut stage = stage();
        stage.walker.current_level = 2;
        stage.walker.pos = Vec2::new(400.0, stage.levels.height(2));
        let spawned = stage.spawner.spawn_one(&mut stage.rng, &stage.levels, &mut stage.ids);
        stage.obstacles.push(Obstacle {
            level: 2,
            pos: Vec2::new(400.0, stage.levels.height(2)),
            vel: Vec2::ZERO,
            ..spawned
        });

        stage.update(&TickInput::default(), TICK_MS);
        assert!(stage.walker().hit_tint);
        assert_eq!(stage.walker().current_level, NUM_LEVELS - 1);
        let frame = stage.frame();
        let player = frame
            .sprites
            .iter()
            .find(|s| s.kind == SpriteKind::Player)
            .unwrap();
        assert_eq!(player.tint, Some(HIT_TINT_COLOR));

        stage.obstacles.clear();
        stage.update(&TickInput::default(), HIT_TINT_MS);
        assert!(!stage.walker().hit_tint);
    }

    #[test]
    fn test_resize_keeps_level() {
        let mut stage = stage();
        stage.walker.current_level = 2;
        stage.walker.pos = Vec2::new(780.0, stage.levels.height(2));

        stage.resize(Viewport::new(400.0, 900.0));
        assert_eq!(stage.walker().current_level, 2);
        assert_eq!(stage.walker().pos.y, stage.levels().height(2));
        assert!(stage.walker().pos.x <= 400.0 - PLAYER_SIZE / 2.0);

        let once = stage.levels().ladders().to_vec();
        stage.resize(Viewport::new(400.0, 900.0));
        assert_eq!(stage.levels().ladders(), once.as_slice());
    }

    #[test]
    fn test_frame_contents() {
        let stage = stage();
        let frame = stage.frame();
        assert_eq!(frame.stage, StageId::Traversal);
        assert_eq!(frame.count(SpriteKind::LevelLine), NUM_LEVELS);
        assert_eq!(frame.count(SpriteKind::Ladder), NUM_LEVELS - 1);
        assert_eq!(frame.count(SpriteKind::Player), 1);
        assert_eq!(frame.hud.level, Some(NUM_LEVELS - 1));
    }

    #[test]
    fn test_exit_cancels_timers() {
        let mut stage = stage();
        stage.exit();
        stage.update(&TickInput::default(), OBSTACLE_SPAWN_MS * 3);
        assert!(stage.obstacles().is_empty());
    }
}
