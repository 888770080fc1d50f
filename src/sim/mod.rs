//! Deterministic simulation module
//!
//! All gameplay systems live here. This module must be pure and deterministic:
//! - Virtual clock only (no wall time)
//! - Seeded RNG only
//! - Stable iteration order (entities kept in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod input;
pub mod levels;
pub mod movement;
pub mod obstacles;
pub mod roulette;
pub mod scheduler;
pub mod sine;
pub mod state;
pub mod waves;

pub use collision::Aabb;
pub use combat::{PlayerHits, Portal};
pub use input::{InputTracker, Keys, TickInput};
pub use levels::{ClimbDirection, LadderSide, LadderZone, Level, LevelLadderSystem, LevelSpacing};
pub use movement::{JumpGate, MovementController};
pub use obstacles::ObstacleSpawner;
pub use roulette::pick_weighted;
pub use scheduler::{Scheduler, TimerHandle};
pub use state::{
    Appearance, Bullet, CorruptionRect, Enemy, EnemyKind, EntityIds, Flyer, Health, HitOutcome,
    Obstacle, Shape, Walker,
};
pub use waves::{Clearance, SpawnPoint, WaveConfig, WaveDirector, standard_waves};
