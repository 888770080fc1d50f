//! Player movement: level-pinned walking, ladder climbs and jump arcs for the
//! ladder stage; free four-way flight for the shooter.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::TickInput;
use super::levels::{ClimbDirection, LevelLadderSystem};
use super::state::{Flyer, JumpArc, Walker};
use crate::consts::traversal::*;
use crate::{Viewport, ease_out_quad, ms_to_secs};

/// When a jump is allowed to start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpGate {
    /// Pinned walker: always standing on its level
    #[default]
    Always,
    /// Physics variant: only while a contact normal points up
    RequireContact,
}

/// True when any contact normal points up steeply enough to stand on
pub fn is_grounded(contact_normals: &[Vec2]) -> bool {
    contact_normals
        .iter()
        .any(|n| n.y < -GROUND_NORMAL_THRESHOLD)
}

/// Horizontal direction from held keys; left wins when both are down
#[inline]
pub fn horizontal_axis(input: &TickInput) -> f32 {
    if input.held.left {
        -1.0
    } else if input.held.right {
        1.0
    } else {
        0.0
    }
}

/// Vertical direction from held keys; up wins when both are down
#[inline]
pub fn vertical_axis(input: &TickInput) -> f32 {
    if input.held.up {
        -1.0
    } else if input.held.down {
        1.0
    } else {
        0.0
    }
}

/// Height above the line for a jump `elapsed_ms` in: eased rise over the first
/// half, mirrored fall over the second. `None` once the arc is over.
pub fn jump_offset(elapsed_ms: u64) -> Option<f32> {
    if elapsed_ms >= JUMP_DURATION_MS {
        return None;
    }
    let half = JUMP_DURATION_MS as f32 / 2.0;
    let t = elapsed_ms as f32;
    let progress = if t < half { t / half } else { (JUMP_DURATION_MS as f32 - t) / half };
    Some(JUMP_HEIGHT * ease_out_quad(progress))
}

/// Converts input and level constraints into walker motion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementController {
    pub gate: JumpGate,
}

impl MovementController {
    pub fn new(gate: JumpGate) -> Self {
        Self { gate }
    }

    /// One tick of walker movement.
    ///
    /// `contact_normals` only matters for `JumpGate::RequireContact`.
    pub fn update(
        &self,
        walker: &mut Walker,
        input: &TickInput,
        levels: &LevelLadderSystem,
        contact_normals: &[Vec2],
        now_ms: u64,
        dt_ms: u64,
    ) {
        let width = levels.viewport().width;

        // Velocity is recomputed from scratch every tick
        walker.vel = Vec2::new(horizontal_axis(input) * PLAYER_SPEED, 0.0);
        walker.pos.x = clamp_walker_x(walker.pos.x + walker.vel.x * ms_to_secs(dt_ms), width);

        if !walker.jumping() {
            let direction = if input.climb_up() {
                Some(ClimbDirection::Up)
            } else if input.climb_down() {
                Some(ClimbDirection::Down)
            } else {
                None
            };
            if let Some(direction) = direction {
                match levels.attempt_climb(direction, walker.current_level, walker.pos.x) {
                    Some(climb) => {
                        log::debug!(
                            "Climbed {:?} from level {} to {}",
                            direction,
                            walker.current_level,
                            climb.level
                        );
                        walker.current_level = climb.level;
                        walker.pos.x = climb.x;
                    }
                    None => log::debug!(
                        "Climb {:?} rejected at level {} x={:.1}",
                        direction,
                        walker.current_level,
                        walker.pos.x
                    ),
                }
            }
        }

        if input.pressed.jump {
            self.try_jump(walker, contact_normals, now_ms);
        }

        self.apply_vertical(walker, levels, now_ms);

        if walker.vel.x == 0.0 && levels.is_on_ladder(walker.pos.x, walker.current_level) {
            snap_to_nearby_ladder(walker, levels);
        }
    }

    /// Start a jump unless one is already in flight (or the gate refuses)
    pub fn try_jump(&self, walker: &mut Walker, contact_normals: &[Vec2], now_ms: u64) -> bool {
        if walker.jumping() {
            return false;
        }
        if self.gate == JumpGate::RequireContact && !is_grounded(contact_normals) {
            return false;
        }
        walker.jump = Some(JumpArc { start_ms: now_ms });
        true
    }

    /// Pin to the level line, or follow the jump arc above it
    pub fn apply_vertical(&self, walker: &mut Walker, levels: &LevelLadderSystem, now_ms: u64) {
        let line = levels.height(walker.current_level);
        match walker.jump {
            Some(arc) => match jump_offset(now_ms.saturating_sub(arc.start_ms)) {
                Some(offset) => walker.pos.y = line - offset,
                None => {
                    walker.jump = None;
                    walker.pos.y = line;
                }
            },
            None => walker.pos.y = line,
        }
    }
}

/// Re-pin after a viewport change. The jump, if any, keeps running.
pub fn repin_walker(walker: &mut Walker, levels: &LevelLadderSystem) {
    walker.pos.x = clamp_walker_x(walker.pos.x, levels.viewport().width);
    if !walker.jumping() {
        walker.pos.y = levels.height(walker.current_level);
    }
}

fn clamp_walker_x(x: f32, width: f32) -> f32 {
    let half = PLAYER_SIZE / 2.0;
    x.clamp(half, (width - half).max(half))
}

fn snap_to_nearby_ladder(walker: &mut Walker, levels: &LevelLadderSystem) {
    if let Some(zone) = levels.ladders().iter().find(|z| {
        z.touches(walker.current_level) && (walker.pos.x - z.pos.x).abs() < LADDER_SNAP_DISTANCE
    }) {
        walker.pos.x = zone.pos.x;
    }
}

/// One tick of shooter movement: four-way, clamped to the arena and to the
/// flyer's movement bound.
pub fn update_flyer(flyer: &mut Flyer, input: &TickInput, viewport: Viewport, dt_ms: u64) {
    use crate::consts::shooter::PLAYER_SPEED;

    flyer.vel = Vec2::new(horizontal_axis(input), vertical_axis(input)) * PLAYER_SPEED;
    flyer.pos += flyer.vel * ms_to_secs(dt_ms);
    clamp_flyer(flyer, viewport);
}

/// Keep the flyer inside the arena and left of its movement bound
pub fn clamp_flyer(flyer: &mut Flyer, viewport: Viewport) {
    let half = Flyer::size() / 2.0;
    flyer.pos.x = flyer.pos.x.clamp(half.x, (viewport.width - half.x).max(half.x));
    flyer.pos.y = flyer.pos.y.clamp(half.y, (viewport.height - half.y).max(half.y));

    let max_x = viewport.width * flyer.movement_bound;
    if flyer.pos.x > max_x {
        flyer.pos.x = max_x;
        flyer.vel.x = 0.0;
    }
}
