//! Abstract input snapshot
//!
//! The core never sees a keyboard. The platform layer fills in which keys are
//! held; `InputTracker` derives the edge-triggered "just pressed" set.

use serde::{Deserialize, Serialize};

/// Logical keys the simulation understands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    pub jump: bool,
    pub start: bool,
    pub restart: bool,
}

impl Keys {
    /// Keys down now that were up in `previous`
    pub fn rising_edges(&self, previous: &Keys) -> Keys {
        Keys {
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            up: self.up && !previous.up,
            down: self.down && !previous.down,
            fire: self.fire && !previous.fire,
            jump: self.jump && !previous.jump,
            start: self.start && !previous.start,
            restart: self.restart && !previous.restart,
        }
    }

    pub fn any(&self) -> bool {
        self.left
            || self.right
            || self.up
            || self.down
            || self.fire
            || self.jump
            || self.start
            || self.restart
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Currently held
    pub held: Keys,
    /// Went down this tick
    pub pressed: Keys,
}

impl TickInput {
    /// Input where only `held` is set and nothing was just pressed
    pub fn holding(held: Keys) -> Self {
        Self {
            held,
            pressed: Keys::default(),
        }
    }

    /// Climb up is the up key's rising edge
    #[inline]
    pub fn climb_up(&self) -> bool {
        self.pressed.up
    }

    #[inline]
    pub fn climb_down(&self) -> bool {
        self.pressed.down
    }
}

/// Turns a stream of held-key snapshots into `TickInput`s with rising edges
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: Keys,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, held: Keys) -> TickInput {
        let pressed = held.rising_edges(&self.previous);
        self.previous = held;
        TickInput { held, pressed }
    }

    /// Forget the previous snapshot (stage change), so keys held across the
    /// transition do not count as fresh presses.
    pub fn reset_to(&mut self, held: Keys) {
        self.previous = held;
    }
}
