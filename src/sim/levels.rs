//! Level tiers and the ladders between them
//!
//! Tier 0 is the top of the screen and tier N-1 the bottom. Ladder zone `i`
//! links tier `i + 1` (climbed *from*) to tier `i` (climbed *to*), so climbing
//! up always lowers the tier index.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Viewport;
use crate::consts::traversal::*;

/// Horizontal edge a ladder is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LadderSide {
    Left,
    Right,
}

impl LadderSide {
    pub fn flipped(self) -> Self {
        match self {
            LadderSide::Left => LadderSide::Right,
            LadderSide::Right => LadderSide::Left,
        }
    }
}

/// Side of ladder zone 0; each following zone flips
pub const FIRST_LADDER_SIDE: LadderSide = LadderSide::Left;

/// Which way a climb goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimbDirection {
    Up,
    Down,
}

/// How tier heights are distributed over the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelSpacing {
    /// Spread evenly from the top edge (tier 0) to the bottom edge
    Even,
    /// Fixed gap between tiers, bottom tier `bottom_offset` above the bottom edge
    Gap { gap: f32, bottom_offset: f32 },
}

/// One horizontal traversal tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub index: usize,
    /// Y coordinate of the line the player stands on
    pub height: f32,
    /// Visual slant of the drawn line (right end offset)
    pub slant: f32,
}

/// Region linking two adjacent tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderZone {
    /// Centre of the zone
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Lower tier; climbing up starts here
    pub from_level: usize,
    /// Upper tier; climbing down starts here
    pub to_level: usize,
    pub side: LadderSide,
}

impl LadderZone {
    #[inline]
    pub fn touches(&self, level: usize) -> bool {
        self.from_level == level || self.to_level == level
    }
}

/// Result of a successful climb
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    pub level: usize,
    /// Player x snapped to the ladder
    pub x: f32,
}

/// Owns tier geometry and ladder zones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLadderSystem {
    levels_count: usize,
    spacing: LevelSpacing,
    viewport: Viewport,
    levels: Vec<Level>,
    ladders: Vec<LadderZone>,
}

impl LevelLadderSystem {
    /// Build `levels_count` evenly spaced tiers for the viewport
    pub fn build(levels_count: usize, viewport_w: f32, viewport_h: f32) -> Self {
        Self::with_spacing(
            levels_count,
            Viewport::new(viewport_w, viewport_h),
            LevelSpacing::Even,
        )
    }

    pub fn with_spacing(levels_count: usize, viewport: Viewport, spacing: LevelSpacing) -> Self {
        let mut system = Self {
            levels_count: levels_count.max(1),
            spacing,
            viewport,
            levels: Vec::new(),
            ladders: Vec::new(),
        };
        system.regenerate();
        system
    }

    /// Build directly from zones (tests and hand-authored layouts)
    pub fn from_parts(levels: Vec<Level>, ladders: Vec<LadderZone>, viewport: Viewport) -> Self {
        Self {
            levels_count: levels.len().max(1),
            spacing: LevelSpacing::Even,
            viewport,
            levels,
            ladders,
        }
    }

    /// Regenerate geometry for a new viewport. Tier indices are unchanged, so
    /// the caller's current level stays valid; it must re-pin the player.
    pub fn rebuild(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.regenerate();
        log::debug!(
            "Rebuilt {} levels for {}x{}",
            self.levels_count,
            viewport.width,
            viewport.height
        );
    }

    fn regenerate(&mut self) {
        let n = self.levels_count;
        let Viewport { width, height } = self.viewport;

        self.levels = (0..n)
            .map(|i| {
                let y = match self.spacing {
                    LevelSpacing::Even if n > 1 => (i as f32 * height / (n - 1) as f32).round(),
                    LevelSpacing::Even => height,
                    LevelSpacing::Gap { gap, bottom_offset } => {
                        height - bottom_offset - (n - 1 - i) as f32 * gap
                    }
                };
                let slant = if i % 2 == 0 { LEVEL_SLANT } else { -LEVEL_SLANT };
                Level {
                    index: i,
                    height: y,
                    slant,
                }
            })
            .collect();

        let mut side = FIRST_LADDER_SIDE;
        self.ladders = (0..n.saturating_sub(1))
            .map(|i| {
                let upper = self.levels[i].height;
                let lower = self.levels[i + 1].height;
                let x = match side {
                    LadderSide::Left => LADDER_WIDTH / 2.0,
                    LadderSide::Right => width - LADDER_WIDTH / 2.0,
                };
                let zone = LadderZone {
                    pos: Vec2::new(x, (upper + lower) / 2.0),
                    width: LADDER_WIDTH,
                    height: (lower - upper).abs().max(LADDER_MIN_HEIGHT),
                    from_level: i + 1,
                    to_level: i,
                    side,
                };
                side = side.flipped();
                zone
            })
            .collect();
    }

    pub fn levels_count(&self) -> usize {
        self.levels_count
    }

    /// Index of the bottom tier
    pub fn bottom(&self) -> usize {
        self.levels_count - 1
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn ladders(&self) -> &[LadderZone] {
        &self.ladders
    }

    /// Height of a tier, clamped to the valid range
    pub fn height(&self, level: usize) -> f32 {
        let i = level.min(self.levels.len().saturating_sub(1));
        self.levels.get(i).map_or(self.viewport.height, |l| l.height)
    }

    /// Zone used to climb in `direction` starting from `level`
    pub fn zone_for(&self, direction: ClimbDirection, level: usize) -> Option<&LadderZone> {
        self.ladders.iter().find(|z| match direction {
            ClimbDirection::Up => z.from_level == level,
            ClimbDirection::Down => z.to_level == level,
        })
    }

    /// True when `player_x` is within a ladder width of a zone touching `level`
    pub fn is_on_ladder(&self, player_x: f32, level: usize) -> bool {
        self.ladders
            .iter()
            .any(|z| z.touches(level) && Self::within_reach(z, player_x))
    }

    #[inline]
    fn within_reach(zone: &LadderZone, player_x: f32) -> bool {
        (player_x - zone.pos.x).abs() < zone.width
    }

    /// Try to climb. Up requires the zone whose `from_level` is the current
    /// level, down the zone whose `to_level` is. Returns `None` (and changes
    /// nothing) when the move is not allowed.
    pub fn attempt_climb(
        &self,
        direction: ClimbDirection,
        current_level: usize,
        player_x: f32,
    ) -> Option<Climb> {
        if direction == ClimbDirection::Up && current_level == 0 {
            return None;
        }

        let zone = self.zone_for(direction, current_level)?;
        if !Self::within_reach(zone, player_x) {
            return None;
        }

        let level = match direction {
            ClimbDirection::Up => zone.to_level,
            ClimbDirection::Down => zone.from_level,
        };
        if level >= self.levels_count {
            return None;
        }

        Some(Climb {
            level,
            x: zone.pos.x,
        })
    }
}
