//! Waste Sorter entry point
//!
//! Runs a scripted, headless session of the first level and logs what
//! happens. Usage: `waste-sorter [settings.json] [frames]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::sync::Arc;

    use waste_sorter::narrative::{Dispatch, StaticNarrator};
    use waste_sorter::sim::SimEvent;
    use waste_sorter::{LevelSet, Session, Settings};

    env_logger::init();
    log::info!("Waste Sorter (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    let frames: u32 = args.next().and_then(|f| f.parse().ok()).unwrap_or(600);

    let mut session = match Session::new(
        &settings,
        LevelSet::builtin(),
        Arc::new(StaticNarrator),
        Dispatch::Threaded,
    ) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Could not start session: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Level {}/{}: {}",
        session.status().level,
        session.status().level_count,
        session.level_name()
    );

    const FRAME_MS: f64 = 1000.0 / 60.0;
    for frame in 0..frames {
        for (code, down) in script(frame) {
            if *down {
                session.key_down(code);
            } else {
                session.key_up(code);
            }
        }

        let now_ms = f64::from(frame) * FRAME_MS;
        for event in session.step(now_ms) {
            match event {
                SimEvent::ProgressChanged(left) => log::info!("Remaining per zone: {:?}", left),
                other => log::debug!("Frame {}: {:?}", frame, other),
            }
        }

        if session.state().is_sprinting() && frame % 10 == 0 {
            log::debug!("Frame {}: sprinting at vx {:.2}", frame, session.state().player.vel.x);
        }

        let dialogue = session.dialogue();
        if dialogue.visible && !dialogue.loading && frame % 60 == 0 {
            log::info!(
                "[{}] {}",
                dialogue.title.as_deref().unwrap_or("Waste Analysis"),
                dialogue.text
            );
        }

        if session.status().game_over {
            log::info!("Fell out of the world on frame {}", frame);
            break;
        }
    }

    let status = session.status();
    let player = &session.state().player;
    log::info!(
        "Finished: level {} zones {:?} player at ({:.1}, {:.1})",
        status.level,
        status.zone_progress,
        player.rect.x,
        player.rect.y
    );
}

/// Keys pressed (`true`) or released (`false`) on a given frame
#[cfg(not(target_arch = "wasm32"))]
fn script(frame: u32) -> &'static [(&'static str, bool)] {
    match frame {
        10 => &[("KeyF", true)],
        12 => &[("KeyF", false)],
        60 => &[("ArrowRight", true), ("ShiftLeft", true)],
        100 => &[("ArrowRight", false), ("ShiftLeft", false)],
        110 => &[("KeyE", true)],
        113 => &[("KeyE", false)],
        120 => &[("KeyI", true)],
        122 => &[("KeyI", false)],
        130 => &[("KeyE", true)],
        150 => &[("KeyE", false)],
        200 => &[("Space", true)],
        215 => &[("Space", false)],
        _ => &[],
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosted by a web shell; nothing to run standalone
}
