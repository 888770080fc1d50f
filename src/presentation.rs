//! Per-tick snapshot handed to an external renderer
//!
//! The core never draws. After every tick the active stage exports a `Frame`
//! with everything a renderer needs; consumers implement `PresentationSink`.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Viewport;
use crate::sim::state::{Appearance, EnemyKind, Shape};
use crate::stage::StageId;

/// What a sprite represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteKind {
    Player,
    Obstacle,
    Ladder,
    LevelLine,
    Enemy(EnemyKind),
    Bullet,
    SpawnPoint,
    Portal,
    Corruption,
    LoadingScreen,
}

/// One drawable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Entity id, when the thing is an entity
    pub id: Option<u32>,
    pub kind: SpriteKind,
    /// Centre of the drawn box
    pub pos: Vec2,
    pub size: Vec2,
    pub shape: Shape,
    pub appearance: Appearance,
    /// Colour override (hit tint, white death flash)
    pub tint: Option<u32>,
    pub alpha: f32,
    pub visible: bool,
}

impl Sprite {
    pub fn new(kind: SpriteKind, pos: Vec2, size: Vec2, shape: Shape, color: u32) -> Self {
        Self {
            id: None,
            kind,
            pos,
            size,
            shape,
            appearance: Appearance::Placeholder { color },
            tint: None,
            alpha: 1.0,
            visible: true,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn with_tint(mut self, tint: Option<u32>) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Centred text overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    /// Virtual time the banner disappears; `None` stays until replaced
    pub until_ms: Option<u64>,
}

impl Banner {
    pub fn timed(text: impl Into<String>, now_ms: u64, duration_ms: u64) -> Self {
        Self {
            text: text.into(),
            until_ms: Some(now_ms + duration_ms),
        }
    }

    pub fn sticky(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            until_ms: None,
        }
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        self.until_ms.is_some_and(|until| now_ms >= until)
    }
}

/// HUD scalars; fields a stage does not use stay `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub hp: Option<u8>,
    pub max_hp: Option<u8>,
    pub score: Option<u64>,
    /// 1-based wave and total
    pub wave: Option<(u32, u32)>,
    pub level: Option<usize>,
    /// Screen corruption intensity in [0, 1]
    pub corruption: Option<f32>,
}

/// Everything a renderer needs for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub stage: StageId,
    pub time_ms: u64,
    pub viewport: Viewport,
    pub sprites: Vec<Sprite>,
    pub banners: Vec<Banner>,
    pub hud: Hud,
}

impl Frame {
    pub fn new(stage: StageId, time_ms: u64, viewport: Viewport) -> Self {
        Self {
            stage,
            time_ms,
            viewport,
            sprites: Vec::new(),
            banners: Vec::new(),
            hud: Hud::default(),
        }
    }

    pub fn count(&self, kind: SpriteKind) -> usize {
        self.sprites.iter().filter(|s| s.kind == kind).count()
    }
}

/// Consumer of frames (renderer, recorder, test harness)
pub trait PresentationSink {
    fn present(&mut self, frame: &Frame);
}

/// Sink that keeps every frame; handy for replays and tests
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    pub frames: Vec<Frame>,
}

impl PresentationSink for FrameRecorder {
    fn present(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

/// Image keys the presentation layer was able to load. Anything missing is
/// drawn as a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    keys: BTreeSet<String>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    pub fn has(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Sprite when loaded, placeholder otherwise
    pub fn appearance(&self, key: &str, fallback_color: u32) -> Appearance {
        if self.has(key) {
            Appearance::Sprite(key.to_string())
        } else {
            log::debug!("Asset '{}' missing, using placeholder", key);
            Appearance::Placeholder {
                color: fallback_color,
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}
