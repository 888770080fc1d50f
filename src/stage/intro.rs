//! Boot screen: wait for start, show the loading screen, then hand over

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{StageCommand, StageId};
use crate::Viewport;
use crate::consts::intro::*;
use crate::presentation::{Assets, Banner, Frame, Sprite, SpriteKind};
use crate::sim::input::TickInput;
use crate::sim::scheduler::Scheduler;
use crate::sim::state::{Appearance, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntroPhase {
    /// "Starting Windows 95..." with a blinking prompt
    Waiting,
    /// Loading screen shown for `LOADING_MS`
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntroEvent {
    LoadingDone,
}

#[derive(Debug, Clone)]
pub struct IntroStage {
    phase: IntroPhase,
    viewport: Viewport,
    scheduler: Scheduler<IntroEvent>,
    loading_screen: Appearance,
}

impl IntroStage {
    pub fn new(viewport: Viewport, assets: &Assets) -> Self {
        Self {
            phase: IntroPhase::Waiting,
            viewport,
            scheduler: Scheduler::new(),
            loading_screen: assets.appearance(LOADING_IMAGE, LOADING_PLACEHOLDER_COLOR),
        }
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    pub fn enter(&mut self) {
        log::info!("Intro: waiting for start");
    }

    pub fn update(&mut self, input: &TickInput, dt_ms: u64) -> StageCommand {
        if self.phase == IntroPhase::Waiting && input.pressed.start {
            self.phase = IntroPhase::Loading;
            self.scheduler.after(LOADING_MS, IntroEvent::LoadingDone);
            log::info!("Intro: loading");
        }

        let target = self.scheduler.now_ms() + dt_ms;
        while let Some(event) = self.scheduler.pop_due(target) {
            match event {
                IntroEvent::LoadingDone => return StageCommand::Complete,
            }
        }
        StageCommand::Continue
    }

    pub fn exit(&mut self) {
        self.scheduler.cancel_all();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn frame(&self) -> Frame {
        let now = self.scheduler.now_ms();
        let mut frame = Frame::new(StageId::Intro, now, self.viewport);

        match self.phase {
            IntroPhase::Waiting => {
                let blink_on = (now / PROMPT_BLINK_MS) % 2 == 0;
                frame.banners.push(Banner::sticky(if blink_on {
                    "Starting Windows 95..._"
                } else {
                    "Starting Windows 95..."
                }));
                if blink_on {
                    frame.banners.push(Banner::sticky("Press space to START"));
                }
            }
            IntroPhase::Loading => {
                let Viewport { width, height } = self.viewport;
                frame.sprites.push(
                    Sprite::new(
                        SpriteKind::LoadingScreen,
                        self.viewport.center(),
                        Vec2::new(width, height),
                        Shape::Square,
                        LOADING_PLACEHOLDER_COLOR,
                    )
                    .with_appearance(self.loading_screen.clone()),
                );
                if matches!(self.loading_screen, Appearance::Placeholder { .. }) {
                    frame.banners.push(Banner::sticky("Loading..."));
                }
            }
        }
        frame
    }
}
