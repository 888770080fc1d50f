//! Desktop Escape headless runner
//!
//! Plays the whole game with a simple scripted pilot and prints periodic
//! frames as JSON lines. Usage: `desktop-escape [seed] [ticks] [frame_every]`.

use std::io::Write;

use desktop_escape::consts::TICK_MS;
use desktop_escape::presentation::{Assets, Frame, PresentationSink};
use desktop_escape::sim::input::Keys;
use desktop_escape::sim::levels::ClimbDirection;
use desktop_escape::stage::{ShooterPhase, Stage};
use desktop_escape::{Session, StageId, Viewport};

/// Writes each frame as one JSON line
struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> PresentationSink for JsonLines<W> {
    fn present(&mut self, frame: &Frame) {
        match serde_json::to_string(frame) {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{}", line) {
                    log::warn!("Frame write failed: {}", e);
                }
            }
            Err(e) => log::warn!("Frame serialization failed: {}", e),
        }
    }
}

/// Held keys for this tick. Edge-triggered actions are pressed on even
/// ticks and released on odd ones so the input tracker sees fresh presses.
fn pilot(session: &Session, tick: u64) -> Keys {
    let tap = tick % 2 == 0;
    let mut keys = Keys::default();

    match session.stage() {
        Stage::Intro(_) => keys.start = tap,
        Stage::Traversal(stage) => {
            let walker = stage.walker();
            let levels = stage.levels();

            let Some(zone) = levels.zone_for(ClimbDirection::Up, walker.current_level) else {
                return keys;
            };
            let dx = zone.pos.x - walker.pos.x;
            if dx.abs() < 2.0 {
                keys.up = tap;
            } else if dx < 0.0 {
                keys.left = true;
            } else {
                keys.right = true;
            }

            let threatened = stage.obstacles().iter().any(|o| {
                o.level == walker.current_level
                    && (o.pos.x - walker.pos.x).abs() < 90.0
                    && (o.pos.x - walker.pos.x).signum() != o.vel.x.signum()
            });
            keys.jump = threatened && !walker.jumping() && tap;
        }
        Stage::Shooter(stage) => {
            let flyer = stage.flyer();
            match stage.phase() {
                ShooterPhase::GameOver => keys.restart = tap,
                ShooterPhase::Victory => {
                    if let Some(portal) = stage.portal() {
                        let d = portal.pos - flyer.pos;
                        keys.right = d.x > 2.0;
                        keys.left = d.x < -2.0;
                        keys.down = d.y > 2.0;
                        keys.up = d.y < -2.0;
                    }
                }
                _ => {
                    let target = stage
                        .enemies()
                        .iter()
                        .filter(|e| !e.dying && e.pos.x > flyer.pos.x)
                        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));
                    if let Some(enemy) = target {
                        keys.down = enemy.pos.y > flyer.pos.y + 4.0;
                        keys.up = enemy.pos.y < flyer.pos.y - 4.0;
                    }
                }
            }
        }
    }
    keys
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(20_000);
    let frame_every: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60).max(1);

    log::info!("Desktop Escape (headless) starting with seed {}", seed);

    let mut session = Session::new(seed, Viewport::default(), Assets::new());
    let mut sink = JsonLines {
        out: std::io::stdout().lock(),
    };

    for tick in 0..ticks {
        let keys = pilot(&session, tick);
        let before = session.stage_id();
        if let Some(next) = session.step(keys, TICK_MS) {
            if before == StageId::Shooter && next == StageId::Shooter {
                if let Stage::Shooter(stage) = session.stage() {
                    log::info!("Shooter replay (score reset to {})", stage.score());
                }
            }
            sink.present(&session.frame());
        } else if tick % frame_every == 0 {
            sink.present(&session.frame());
        }
    }

    log::info!(
        "Stopped after {} ticks in {:?} ({} stage runs)",
        ticks,
        session.stage_id(),
        session.runs()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by a host page on the web; nothing to run here
}
