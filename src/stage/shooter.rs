//! Recycle bin shooter: survive the waves, then fly into the portal
//!
//! Phase flow: Intro -> WaveIntro(n) -> WaveActive(n) -> WaveClearing(n) ->
//! WaveIntro(n + 1) ... -> Victory. GameOver can interrupt any wave. Victory
//! and GameOver are terminal; the session restarts the stage from Intro.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{StageCommand, StageId};
use crate::Viewport;
use crate::consts::shooter::*;
use crate::presentation::{Banner, Frame, Hud, Sprite, SpriteKind};
use crate::sim::combat::{self, Portal};
use crate::sim::input::TickInput;
use crate::sim::movement::{clamp_flyer, update_flyer};
use crate::sim::scheduler::{Scheduler, TimerHandle};
use crate::sim::sine;
use crate::sim::state::{Bullet, CorruptionRect, Enemy, EntityIds, Flyer, Shape};
use crate::sim::waves::{Clearance, Spawned, WaveConfig, WaveDirector, corruption_rect, standard_waves};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShooterPhase {
    /// Delay before the first wave
    Intro,
    /// Wave started, banner showing, nothing spawned yet
    WaveIntro(u32),
    WaveActive(u32),
    /// Pause between a cleared wave and the next
    WaveClearing(u32),
    Victory,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShooterEvent {
    StartWave(u32),
    SpawnEnemy,
    Fire,
    Corruption,
    RemoveEnemy(u32),
    EndPointFlash(usize),
    ExpireCorruption(u32),
    LeaveThroughPortal,
}

#[derive(Debug, Clone)]
pub struct ShooterStage {
    viewport: Viewport,
    phase: ShooterPhase,
    flyer: Flyer,
    bullets: Vec<Bullet>,
    enemies: Vec<Enemy>,
    corruption: Vec<CorruptionRect>,
    director: WaveDirector,
    scheduler: Scheduler<ShooterEvent>,
    rng: Pcg32,
    ids: EntityIds,
    score: u64,
    banners: Vec<Banner>,
    portal: Option<Portal>,
    fire_timer: Option<TimerHandle>,
    spawn_timer: Option<TimerHandle>,
    corruption_timer: Option<TimerHandle>,
    wave_timer: Option<TimerHandle>,
}

impl ShooterStage {
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self::with_waves(viewport, seed, standard_waves())
    }

    pub fn with_waves(viewport: Viewport, seed: u64, waves: Vec<WaveConfig>) -> Self {
        let mut flyer = Flyer::new(Vec2::new(
            viewport.width * PLAYER_START_X,
            viewport.height / 2.0,
        ));
        clamp_flyer(&mut flyer, viewport);

        Self {
            viewport,
            phase: ShooterPhase::Intro,
            flyer,
            bullets: Vec::new(),
            enemies: Vec::new(),
            corruption: Vec::new(),
            director: WaveDirector::new(waves, viewport),
            scheduler: Scheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
            score: 0,
            banners: Vec::new(),
            portal: None,
            fire_timer: None,
            spawn_timer: None,
            corruption_timer: None,
            wave_timer: None,
        }
    }

    pub fn phase(&self) -> ShooterPhase {
        self.phase
    }

    pub fn flyer(&self) -> &Flyer {
        &self.flyer
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn portal(&self) -> Option<&Portal> {
        self.portal.as_ref()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn enter(&mut self) {
        self.fire_timer = Some(self.scheduler.every(FIRE_RATE_MS, ShooterEvent::Fire, None));
        self.corruption_timer = Some(self.scheduler.every(
            CORRUPTION_TICK_MS,
            ShooterEvent::Corruption,
            None,
        ));
        self.wave_timer = Some(self.scheduler.after(STAGE_INTRO_MS, ShooterEvent::StartWave(1)));
        log::info!("Shooter: {} waves", self.director.total_waves());
    }

    pub fn update(&mut self, input: &TickInput, dt_ms: u64) -> StageCommand {
        if self.phase == ShooterPhase::GameOver {
            if input.pressed.restart || input.pressed.start {
                log::info!("Retrying shooter stage");
                return StageCommand::Restart;
            }
        } else {
            update_flyer(&mut self.flyer, input, self.viewport, dt_ms);
        }

        let target = self.scheduler.now_ms() + dt_ms;
        while let Some(event) = self.scheduler.pop_due(target) {
            let at = self.scheduler.now_ms();
            if let Some(command) = self.dispatch(event, at) {
                return command;
            }
        }
        let now = self.scheduler.now_ms();
        self.flyer.health.expire(now);

        combat::integrate_bullets(&mut self.bullets, dt_ms);
        combat::integrate_enemies(&mut self.enemies, dt_ms);
        sine::apply(&mut self.enemies, now);

        self.resolve_collisions(now);

        combat::cleanup_bullets(&mut self.bullets, self.viewport.width);
        for _ in combat::cleanup_enemies(&mut self.enemies, self.viewport) {
            self.count_removal(now);
        }

        self.banners.retain(|b| !b.expired(now));
        StageCommand::Continue
    }

    fn dispatch(&mut self, event: ShooterEvent, now: u64) -> Option<StageCommand> {
        match event {
            ShooterEvent::StartWave(wave) => self.start_wave(wave, now),
            ShooterEvent::SpawnEnemy => self.spawn_enemy(now),
            ShooterEvent::Fire => {
                if !self.flyer.health.is_dead() && !self.is_terminal() {
                    combat::fire(&self.flyer, &mut self.ids, &mut self.bullets);
                }
            }
            ShooterEvent::Corruption => {
                if let Some(rect) = corruption_rect(
                    &mut self.rng,
                    self.director.difficulty(),
                    self.viewport,
                    &mut self.ids,
                ) {
                    self.scheduler.after(
                        CORRUPTION_RECT_LIFETIME_MS,
                        ShooterEvent::ExpireCorruption(rect.id),
                    );
                    self.corruption.push(rect);
                }
            }
            ShooterEvent::RemoveEnemy(id) => {
                combat::remove_enemy(&mut self.enemies, id);
            }
            ShooterEvent::EndPointFlash(index) => self.director.set_point_flash(index, false),
            ShooterEvent::ExpireCorruption(id) => self.corruption.retain(|r| r.id != id),
            ShooterEvent::LeaveThroughPortal => {
                log::info!("Left through the portal");
                return Some(StageCommand::Complete);
            }
        }
        None
    }

    fn is_terminal(&self) -> bool {
        matches!(self.phase, ShooterPhase::Victory | ShooterPhase::GameOver)
    }

    fn start_wave(&mut self, wave: u32, now: u64) {
        self.wave_timer = None;
        if self.is_terminal() {
            return;
        }

        self.spawn_timer = self
            .director
            .start_wave(wave, &mut self.scheduler, ShooterEvent::SpawnEnemy);
        if !self.director.in_progress() {
            return;
        }

        self.phase = ShooterPhase::WaveIntro(wave);
        self.banners
            .push(Banner::timed(format!("WAVE {}", wave), now, WAVE_BANNER_MS));

        if self.spawn_timer.is_none() {
            if let Some(clearance) = self.director.check_clearance() {
                self.on_clearance(clearance, now);
            }
        }
    }

    fn spawn_enemy(&mut self, now: u64) {
        if let Some(Spawned { enemy, spawn_point }) =
            self.director
                .spawn_enemy(&mut self.rng, self.viewport, &mut self.ids, now)
        {
            if let ShooterPhase::WaveIntro(wave) = self.phase {
                self.phase = ShooterPhase::WaveActive(wave);
            }
            if let Some(index) = spawn_point {
                self.director.set_point_flash(index, true);
                self.scheduler
                    .after(SPAWN_POINT_FLASH_MS, ShooterEvent::EndPointFlash(index));
            }
            self.enemies.push(enemy);
        }
        if self.director.remaining_to_spawn() == 0 {
            self.spawn_timer = None;
        }
    }

    fn resolve_collisions(&mut self, now: u64) {
        for id in combat::resolve_bullet_hits(&mut self.bullets, &mut self.enemies) {
            if self.phase != ShooterPhase::GameOver {
                self.score += KILL_SCORE;
            }
            self.scheduler
                .after(ENEMY_HIT_FLASH_MS, ShooterEvent::RemoveEnemy(id));
            self.count_removal(now);
        }

        if self.phase != ShooterPhase::GameOver {
            let hits = combat::resolve_player_hits(&mut self.flyer, &mut self.enemies, now);
            // Game over aborts the wave first so the fatal ram is counted
            // without reporting clearance
            if hits.depleted {
                self.game_over();
            }
            for _ in &hits.removed {
                self.count_removal(now);
            }
        }

        let entered = self
            .portal
            .as_mut()
            .is_some_and(|portal| portal.try_enter(&self.flyer));
        if entered {
            log::info!("Portal entered");
            self.scheduler
                .after(PORTAL_FADE_MS, ShooterEvent::LeaveThroughPortal);
        }
    }

    fn count_removal(&mut self, now: u64) {
        if let Some(clearance) = self.director.record_removal() {
            self.on_clearance(clearance, now);
        }
    }

    fn on_clearance(&mut self, clearance: Clearance, now: u64) {
        self.scheduler.cancel_slot(&mut self.spawn_timer);

        if clearance.final_wave {
            self.victory();
            return;
        }

        self.phase = ShooterPhase::WaveClearing(clearance.wave);
        self.banners
            .push(Banner::timed("WAVE CLEARED!", now, WAVE_CLEARED_BANNER_MS));
        self.wave_timer = Some(
            self.scheduler
                .after(WAVE_PAUSE_MS, ShooterEvent::StartWave(clearance.wave + 1)),
        );
    }

    fn victory(&mut self) {
        log::info!("All {} waves cleared, score {}", self.director.total_waves(), self.score);
        self.phase = ShooterPhase::Victory;
        self.scheduler.cancel_slot(&mut self.fire_timer);
        self.scheduler.cancel_slot(&mut self.corruption_timer);
        self.flyer.movement_bound = 1.0;
        self.portal = Some(Portal::for_viewport(self.viewport));
        self.banners
            .push(Banner::sticky("RECYCLE BIN PURIFIED!\nENTER THE PORTAL"));
    }

    fn game_over(&mut self) {
        log::info!(
            "Game over on wave {}, score {}",
            self.director.current_wave(),
            self.score
        );
        self.phase = ShooterPhase::GameOver;
        self.scheduler.cancel_slot(&mut self.fire_timer);
        self.scheduler.cancel_slot(&mut self.spawn_timer);
        self.scheduler.cancel_slot(&mut self.corruption_timer);
        self.scheduler.cancel_slot(&mut self.wave_timer);
        self.director.abort();
        self.flyer.vel = Vec2::ZERO;
        self.banners.clear();
        self.banners.push(Banner::sticky("SYSTEM CORRUPTED\nGAME OVER"));
        self.banners.push(Banner::sticky("Press SPACE to retry"));
    }

    pub fn exit(&mut self) {
        self.scheduler.cancel_all();
        self.fire_timer = None;
        self.spawn_timer = None;
        self.corruption_timer = None;
        self.wave_timer = None;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.director.rebuild_spawn_points(viewport);
        clamp_flyer(&mut self.flyer, viewport);
        if let Some(portal) = self.portal.as_mut() {
            let active = portal.active;
            *portal = Portal::for_viewport(viewport);
            portal.active = active;
        }
    }

    pub fn frame(&self) -> Frame {
        let now = self.scheduler.now_ms();
        let mut frame = Frame::new(StageId::Shooter, now, self.viewport);

        for point in self.director.spawn_points() {
            frame.sprites.push(
                Sprite::new(
                    SpriteKind::SpawnPoint,
                    point.pos,
                    Vec2::splat(SPAWN_POINT_SIZE),
                    Shape::Square,
                    SPAWN_POINT_COLOR,
                )
                .with_tint(point.flashing.then_some(SPAWN_POINT_FLASH_COLOR)),
            );
        }

        if let Some(portal) = &self.portal {
            frame.sprites.push(Sprite::new(
                SpriteKind::Portal,
                portal.pos,
                Vec2::splat(portal.radius * 2.0),
                Shape::Circle,
                PORTAL_COLOR,
            ));
        }

        for enemy in &self.enemies {
            frame.sprites.push(
                Sprite::new(
                    SpriteKind::Enemy(enemy.kind),
                    enemy.pos,
                    Vec2::splat(enemy.size),
                    enemy.kind.shape(),
                    enemy.kind.color(),
                )
                .with_id(enemy.id)
                .with_tint(enemy.dying.then_some(ENEMY_HIT_FLASH_COLOR)),
            );
        }

        for bullet in &self.bullets {
            frame.sprites.push(
                Sprite::new(
                    SpriteKind::Bullet,
                    bullet.pos,
                    Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
                    Shape::Square,
                    BULLET_COLOR,
                )
                .with_id(bullet.id),
            );
        }

        frame.sprites.push(
            Sprite::new(
                SpriteKind::Player,
                self.flyer.pos,
                Flyer::size(),
                Shape::Square,
                PLAYER_COLOR,
            )
            .with_tint((self.phase == ShooterPhase::GameOver).then_some(GAME_OVER_TINT))
            .with_visible(self.flyer.health.flash_visible(now)),
        );

        for rect in &self.corruption {
            frame.sprites.push(
                Sprite::new(SpriteKind::Corruption, rect.pos, rect.size, Shape::Square, rect.color)
                    .with_id(rect.id)
                    .with_alpha(rect.alpha),
            );
        }

        frame.banners = self.banners.clone();
        let wave = self.director.current_wave();
        frame.hud = Hud {
            hp: Some(self.flyer.health.hp),
            max_hp: Some(self.flyer.health.max_hp),
            score: Some(self.score),
            wave: (wave > 0).then_some((wave, self.director.total_waves())),
            level: None,
            corruption: Some(self.director.difficulty()),
        };
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::input::Keys;
    use proptest::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn stage_with(waves: Vec<WaveConfig>) -> ShooterStage {
        let mut stage = ShooterStage::with_waves(viewport(), 5, waves);
        stage.enter();
        stage
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    /// Run until the current wave has spawned everything, with the flyer
    /// parked in a corner and auto-fire off so nothing dies on its own
    fn spawn_all(stage: &mut ShooterStage) {
        stage.scheduler.cancel_slot(&mut stage.fire_timer);
        stage.flyer.pos = Vec2::new(30.0, 15.0);
        while !matches!(stage.phase, ShooterPhase::WaveActive(_))
            || stage.director.remaining_to_spawn() > 0
        {
            stage.update(&idle(), 100);
        }
        for (i, enemy) in stage.enemies.iter_mut().enumerate() {
            enemy.oscillation = None;
            enemy.vel = Vec2::ZERO;
            enemy.pos = Vec2::new(700.0, 60.0 + i as f32 * 16.0);
            enemy.size = 10.0;
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum Path {
        Shot,
        Rammed,
        OffScreen,
    }

    fn remove_via(stage: &mut ShooterStage, id: u32, path: Path) {
        stage.bullets.clear();
        let Some(enemy) = stage.enemies.iter_mut().find(|e| e.id == id) else {
            return;
        };
        match path {
            Path::Shot => {
                let pos = enemy.pos;
                stage.bullets.push(Bullet {
                    id: 9999,
                    pos,
                    vel: Vec2::ZERO,
                });
            }
            Path::Rammed => {
                enemy.pos = stage.flyer.pos;
                stage.flyer.health.hp = PLAYER_MAX_HP;
                stage.flyer.health.invulnerable_until = None;
            }
            Path::OffScreen => enemy.pos.x = -100.0,
        }
        stage.update(&idle(), 0);
    }

    fn cleared_banners(stage: &ShooterStage) -> usize {
        stage
            .banners
            .iter()
            .filter(|b| b.text == "WAVE CLEARED!")
            .count()
    }

    #[test]
    fn test_first_wave_after_intro_delay() {
        let mut stage = stage_with(standard_waves());
        stage.update(&idle(), STAGE_INTRO_MS - 1);
        assert_eq!(stage.phase(), ShooterPhase::Intro);
        stage.update(&idle(), 1);
        assert_eq!(stage.phase(), ShooterPhase::WaveIntro(1));
        assert!(stage.banners.iter().any(|b| b.text == "WAVE 1"));

        // First enemy one interval later
        let interval = standard_waves()[0].spawn_interval_ms;
        stage.update(&idle(), interval);
        assert_eq!(stage.phase(), ShooterPhase::WaveActive(1));
        assert_eq!(stage.enemies().len(), 1);
    }

    #[test]
    fn test_auto_fire_rate() {
        let mut stage = stage_with(standard_waves());
        stage.update(&idle(), FIRE_RATE_MS * 3);
        assert_eq!(stage.bullets().len(), 3);
        assert!(stage.bullets().iter().all(|b| b.vel == Vec2::new(BULLET_SPEED, 0.0)));
    }

    #[test]
    fn test_mixed_removals_clear_once() {
        let mut stage = stage_with(standard_waves());
        spawn_all(&mut stage);
        let ids: Vec<u32> = stage.enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 8);

        let paths = [Path::Shot, Path::Rammed, Path::OffScreen];
        for (i, id) in ids.iter().enumerate() {
            remove_via(&mut stage, *id, paths[i % 3]);
        }

        assert_eq!(stage.director().remaining_active(), 0);
        assert_eq!(stage.phase(), ShooterPhase::WaveClearing(1));
        assert_eq!(cleared_banners(&stage), 1);
        // 3 shot enemies (indices 0, 3, 6)
        assert_eq!(stage.score(), 3 * KILL_SCORE);

        // Flash removals do not count twice
        stage.update(&idle(), ENEMY_HIT_FLASH_MS);
        assert!(stage.enemies().is_empty());
        assert_eq!(cleared_banners(&stage), 1);

        stage.update(&idle(), WAVE_PAUSE_MS);
        assert_eq!(stage.phase(), ShooterPhase::WaveIntro(2));
    }

    #[test]
    fn test_game_over_cancels_timers_and_restarts() {
        let mut stage = stage_with(standard_waves());
        stage.update(&idle(), STAGE_INTRO_MS + 1000);
        assert_eq!(stage.phase(), ShooterPhase::WaveActive(1));

        let fire = stage.fire_timer.unwrap();
        let spawn = stage.spawn_timer.unwrap();
        let corruption = stage.corruption_timer.unwrap();

        stage.flyer.health.hp = 1;
        stage.enemies[0].pos = stage.flyer.pos;
        stage.enemies[0].oscillation = None;
        assert_eq!(stage.update(&idle(), TICK_MS), StageCommand::Continue);

        assert_eq!(stage.phase(), ShooterPhase::GameOver);
        assert_eq!(stage.flyer().health.hp, 0);
        assert!(!stage.scheduler.is_pending(fire));
        assert!(!stage.scheduler.is_pending(spawn));
        assert!(!stage.scheduler.is_pending(corruption));

        // Nothing spawns or fires any more
        let bullets = stage.bullets().len();
        let spawned = stage.director().remaining_to_spawn();
        for _ in 0..200 {
            assert_eq!(stage.update(&idle(), TICK_MS), StageCommand::Continue);
        }
        assert!(stage.bullets().len() <= bullets);
        assert_eq!(stage.director().remaining_to_spawn(), spawned);
        assert!(stage.banners.iter().any(|b| b.text.contains("GAME OVER")));

        let restart = Keys {
            restart: true,
            ..Keys::default()
        };
        let input = TickInput {
            held: restart,
            pressed: restart,
        };
        assert_eq!(stage.update(&input, TICK_MS), StageCommand::Restart);
    }

    #[test]
    fn test_fatal_ram_counts_removal() {
        let mut stage = stage_with(standard_waves());
        stage.update(&idle(), STAGE_INTRO_MS + 1000);
        assert_eq!(stage.phase(), ShooterPhase::WaveActive(1));
        stage.scheduler.cancel_slot(&mut stage.fire_timer);
        stage.bullets.clear();

        let enemies = stage.enemies().len();
        let active = stage.director().remaining_active();
        stage.flyer.health.hp = 1;
        stage.enemies[0].pos = stage.flyer.pos;
        stage.enemies[0].oscillation = None;
        stage.update(&idle(), 0);

        assert_eq!(stage.phase(), ShooterPhase::GameOver);
        assert_eq!(stage.enemies().len(), enemies - 1);
        assert_eq!(stage.director().remaining_active(), active - 1);
    }

    #[test]
    fn test_fatal_ram_on_last_enemy_is_not_victory() {
        let table = vec![WaveConfig {
            total_enemies: 1,
            ..standard_waves()[0].clone()
        }];
        let mut stage = stage_with(table);
        spawn_all(&mut stage);

        let id = stage.enemies[0].id;
        stage.flyer.health.hp = 1;
        stage.flyer.health.invulnerable_until = None;
        stage.enemies[0].pos = stage.flyer.pos;
        stage.update(&idle(), 0);

        assert_eq!(stage.phase(), ShooterPhase::GameOver);
        assert!(stage.portal().is_none());
        assert_eq!(stage.director().remaining_active(), 0);
        assert!(stage.enemies().iter().all(|e| e.id != id));
    }

    #[test]
    fn test_restart_resets_through_session() {
        use crate::presentation::Assets;
        use crate::stage::{Session, Stage};

        let mut session = Session::starting_at(StageId::Shooter, 9, viewport(), Assets::new());
        if let Stage::Shooter(stage) = session.stage_mut() {
            stage.flyer.health.hp = 0;
            stage.game_over();
        }
        let restart = Keys {
            restart: true,
            ..Keys::default()
        };
        assert_eq!(session.step(restart, TICK_MS), Some(StageId::Shooter));

        let Stage::Shooter(stage) = session.stage() else {
            panic!("expected shooter stage");
        };
        assert_eq!(stage.phase(), ShooterPhase::Intro);
        assert_eq!(stage.flyer().health.hp, PLAYER_MAX_HP);
        assert_eq!(stage.score(), 0);

        for _ in 0..STAGE_INTRO_MS / 100 {
            session.step(Keys::default(), 100);
        }
        let Stage::Shooter(stage) = session.stage() else {
            panic!("expected shooter stage");
        };
        assert_eq!(stage.phase(), ShooterPhase::WaveIntro(1));
    }

    #[test]
    fn test_victory_portal_and_exit() {
        let waves = standard_waves()[..1].to_vec();
        let mut stage = stage_with(waves);
        spawn_all(&mut stage);
        let corruption = stage.corruption_timer.unwrap();

        let ids: Vec<u32> = stage.enemies.iter().map(|e| e.id).collect();
        for id in ids {
            remove_via(&mut stage, id, Path::Shot);
        }

        assert_eq!(stage.phase(), ShooterPhase::Victory);
        assert_eq!(cleared_banners(&stage), 0);
        assert!(!stage.scheduler.is_pending(corruption));
        assert_eq!(stage.flyer().movement_bound, 1.0);
        let portal = *stage.portal().unwrap();
        assert_eq!(portal.pos, Vec2::new(560.0, 300.0));

        // The relaxed bound lets the flyer reach the portal
        let right = Keys {
            right: true,
            ..Keys::default()
        };
        stage.flyer.pos.y = portal.pos.y;
        let mut command = StageCommand::Continue;
        for _ in 0..500 {
            command = stage.update(&TickInput::holding(right), TICK_MS);
            if command != StageCommand::Continue {
                break;
            }
        }
        assert_eq!(command, StageCommand::Complete);
        assert!(!stage.portal().unwrap().active);
    }

    #[test]
    fn test_movement_bound_before_victory() {
        let mut stage = stage_with(standard_waves());
        let right = Keys {
            right: true,
            ..Keys::default()
        };
        for _ in 0..300 {
            stage.update(&TickInput::holding(right), TICK_MS);
        }
        assert!(stage.flyer().pos.x <= viewport().width * PLAYER_MOVEMENT_BOUND);
    }

    #[test]
    fn test_resize_rebuilds_layout() {
        let mut stage = stage_with(standard_waves());
        stage.flyer.pos = Vec2::new(300.0, 580.0);
        stage.resize(Viewport::new(400.0, 300.0));

        assert!(stage.flyer().pos.x <= 400.0 * PLAYER_MOVEMENT_BOUND);
        assert!(stage.flyer().pos.y <= 300.0 - PLAYER_HEIGHT / 2.0);
        assert!(stage.director().spawn_points().iter().all(|p| p.pos.x < 400.0));
        assert_eq!(stage.frame().viewport, Viewport::new(400.0, 300.0));
    }

    #[test]
    fn test_frame_hud() {
        let mut stage = stage_with(standard_waves());
        let frame = stage.frame();
        assert_eq!(frame.hud.hp, Some(PLAYER_MAX_HP));
        assert_eq!(frame.hud.wave, None);
        assert_eq!(frame.count(SpriteKind::SpawnPoint), NUM_SPAWN_POINTS);

        stage.update(&idle(), STAGE_INTRO_MS);
        let frame = stage.frame();
        assert_eq!(frame.hud.wave, Some((1, 6)));
        assert_eq!(frame.hud.score, Some(0));
    }

    proptest! {
        #[test]
        fn prop_any_removal_mix_clears_once(paths in proptest::collection::vec(0u8..3, 8)) {
            let mut stage = stage_with(standard_waves());
            spawn_all(&mut stage);
            let ids: Vec<u32> = stage.enemies.iter().map(|e| e.id).collect();

            for (id, path) in ids.iter().zip(&paths) {
                let path = match path {
                    0 => Path::Shot,
                    1 => Path::Rammed,
                    _ => Path::OffScreen,
                };
                remove_via(&mut stage, *id, path);
            }

            prop_assert_eq!(stage.director().remaining_active(), 0);
            prop_assert_eq!(stage.phase(), ShooterPhase::WaveClearing(1));
            prop_assert_eq!(cleared_banners(&stage), 1);
        }
    }
}
