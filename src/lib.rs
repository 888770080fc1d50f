//! Desktop Escape - simulation core
//!
//! Core modules:
//! - `sim`: Deterministic systems (levels, movement, spawning, waves, combat)
//! - `stage`: Stage state machines built on top of the systems
//! - `presentation`: Per-tick snapshot handed to an external renderer

pub mod presentation;
pub mod sim;
pub mod stage;

pub use presentation::{Frame, PresentationSink};
pub use stage::{Session, StageId};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Default simulation step (~60 Hz)
    pub const TICK_MS: u64 = 16;
    /// Largest step accepted by a single update (prevents tunnelling after a stall)
    pub const MAX_TICK_MS: u64 = 100;

    /// Side-view ladder level constants
    pub mod traversal {
        pub const NUM_LEVELS: usize = 5;
        pub const PLAYER_SIZE: f32 = 50.0;
        /// Hitbox is tighter than the sprite
        pub const PLAYER_HITBOX_SCALE: f32 = 0.8;
        pub const PLAYER_SPEED: f32 = 200.0;
        pub const LEVEL_SLANT: f32 = 30.0;
        pub const LADDER_WIDTH: f32 = 60.0;
        pub const LADDER_MIN_HEIGHT: f32 = 40.0;
        /// Player x snaps onto a ladder when closer than this
        pub const LADDER_SNAP_DISTANCE: f32 = 2.0;
        pub const JUMP_HEIGHT: f32 = 80.0;
        pub const JUMP_DURATION_MS: u64 = 300;
        /// Contact normals below -threshold count as standing on something
        pub const GROUND_NORMAL_THRESHOLD: f32 = 0.5;

        pub const OBSTACLE_SIZE: f32 = 30.0;
        pub const OBSTACLE_HITBOX_SCALE: f32 = 0.8;
        pub const OBSTACLE_SPEED_MIN: f32 = 80.0;
        pub const OBSTACLE_SPEED_MAX: f32 = 160.0;
        pub const OBSTACLE_SPEED_PER_LEVEL: f32 = 20.0;
        pub const OBSTACLE_SPAWN_MS: u64 = 1200;
        pub const OBSTACLE_SPAWN_COUNT_MIN: u32 = 1;
        pub const OBSTACLE_SPAWN_COUNT_MAX: u32 = 3;
        pub const OBSTACLE_PLACEHOLDER_COLOR: u32 = 0xff4444;

        pub const HIT_TINT_MS: u64 = 200;
        pub const HIT_TINT_COLOR: u32 = 0xff0000;

        pub const PLAYER_COLOR: u32 = 0x3399ff;
        pub const LEVEL_LINE_COLOR: u32 = 0xffffff;
        pub const LADDER_COLOR: u32 = 0x00ff00;
        /// Image keys tried for obstacle icons
        pub const OBSTACLE_ICONS: [&str; 4] = ["desktop1", "desktop2", "desktop3", "desktop4"];
    }

    /// Recycle bin shooter constants
    pub mod shooter {
        pub const PLAYER_WIDTH: f32 = 60.0;
        pub const PLAYER_HEIGHT: f32 = 30.0;
        pub const PLAYER_SPEED: f32 = 250.0;
        pub const PLAYER_MAX_HP: u8 = 3;
        pub const PLAYER_INVULN_MS: u64 = 1500;
        /// Flash period while invulnerable (visible/hidden halves)
        pub const PLAYER_FLASH_MS: u64 = 100;
        /// Fraction of the arena width the player may use before victory
        pub const PLAYER_MOVEMENT_BOUND: f32 = 0.4;
        /// Start position as a fraction of the arena width
        pub const PLAYER_START_X: f32 = 0.1;
        pub const PLAYER_COLOR: u32 = 0xffffff;
        pub const GAME_OVER_TINT: u32 = 0xff0000;

        pub const BULLET_WIDTH: f32 = 12.0;
        pub const BULLET_HEIGHT: f32 = 4.0;
        pub const BULLET_SPEED: f32 = 500.0;
        pub const BULLET_CLEANUP_MARGIN: f32 = 20.0;
        pub const FIRE_RATE_MS: u64 = 200;
        pub const BULLET_COLOR: u32 = 0xffff00;

        pub const ENEMY_SIZE_SMALL: f32 = 20.0;
        pub const ENEMY_SIZE_MEDIUM: f32 = 30.0;
        pub const ENEMY_SIZE_LARGE: f32 = 40.0;
        pub const ENEMY_SPEED_SLOW: f32 = 100.0;
        pub const ENEMY_SPEED_MEDIUM: f32 = 160.0;
        pub const ENEMY_SPEED_FAST: f32 = 220.0;
        pub const FAST_SPEED_MULTIPLIER: f32 = 1.5;
        pub const FAST_SHAPE_SCALE: f32 = 0.8;
        pub const ENEMY_COLOR_VIRUS: u32 = 0xff0000;
        pub const ENEMY_COLOR_CORRUPTION: u32 = 0x9900ff;
        pub const ENEMY_COLOR_FAST: u32 = 0xff00ff;
        pub const ENEMY_HIT_FLASH_MS: u64 = 50;
        pub const ENEMY_HIT_FLASH_COLOR: u32 = 0xffffff;
        pub const ENEMY_CLEANUP_MARGIN: f32 = 60.0;
        pub const ENEMY_SPAWN_Y_MARGIN: f32 = 50.0;
        pub const SINE_AMPLITUDE: f32 = 80.0;
        /// Radians per millisecond
        pub const SINE_FREQUENCY: f32 = 0.003;
        pub const KILL_SCORE: u64 = 10;

        pub const NUM_SPAWN_POINTS: usize = 5;
        pub const SPAWN_POINT_SIZE: f32 = 50.0;
        pub const SPAWN_POINT_CHANCE: f64 = 0.3;
        pub const SPAWN_POINT_FLASH_MS: u64 = 200;
        pub const SPAWN_POINT_COLOR: u32 = 0x2ecc71;
        pub const SPAWN_POINT_FLASH_COLOR: u32 = 0xff0000;

        pub const STAGE_INTRO_MS: u64 = 1500;
        pub const WAVE_PAUSE_MS: u64 = 2000;
        pub const WAVE_BANNER_MS: u64 = 1500;
        pub const WAVE_CLEARED_BANNER_MS: u64 = 1800;

        pub const CORRUPTION_TICK_MS: u64 = 200;
        pub const CORRUPTION_CHANCE: f32 = 0.6;
        pub const CORRUPTION_RECT_LIFETIME_MS: u64 = 300;
        pub const CORRUPTION_COLORS: [u32; 6] =
            [0xff0000, 0x00ff00, 0x0000ff, 0xff00ff, 0xffff00, 0x00ffff];

        /// Goal portal placement as fractions of the arena
        pub const PORTAL_X: f32 = 0.7;
        pub const PORTAL_Y: f32 = 0.5;
        pub const PORTAL_RADIUS: f32 = 35.0;
        pub const PORTAL_COLOR: u32 = 0x00ff00;
        /// Fade before leaving through the portal
        pub const PORTAL_FADE_MS: u64 = 1000;
    }

    /// Intro screen constants
    pub mod intro {
        pub const LOADING_MS: u64 = 5000;
        /// Blink half-period of the start prompt
        pub const PROMPT_BLINK_MS: u64 = 500;
        pub const LOADING_IMAGE: &str = "win95Loading";
        pub const LOADING_PLACEHOLDER_COLOR: u32 = 0x008080;
    }
}

/// Size of the drawable area the simulation lays itself out in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Quadratic ease-out, `t` in [0, 1]
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Convert an integration step in milliseconds to seconds
#[inline]
pub fn ms_to_secs(ms: u64) -> f32 {
    ms as f32 / 1000.0
}
