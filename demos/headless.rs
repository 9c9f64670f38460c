//! Headless showcase run.
//!
//! ```text
//! cargo run --example headless -- [models_dir | settings.json]
//! RUST_LOG=info cargo run --example headless -- ../models/fbx
//! ```
//!
//! Plays the initial clip, then presses `2`, `3` and `1` a few seconds apart
//! and logs the cross-fade weights while each switch blends.

use std::path::Path;
use std::time::Duration;

use motion_showcase::app::{Key, Showcase, ShowcaseConfig};
use motion_showcase::utils::{FpsCounter, Timer};

const FRAME: Duration = Duration::from_nanos(16_666_667);
const RUN_FRAMES: u64 = 60 * 12;
const KEY_PRESSES: [(u64, &str); 3] = [(180, "2"), (360, "3"), (540, "1")];

fn load_config(arg: Option<String>) -> anyhow::Result<ShowcaseConfig> {
    let Some(arg) = arg else {
        return Ok(ShowcaseConfig::personalized());
    };
    let path = Path::new(&arg);
    if path.extension().is_some_and(|ext| ext == "json") {
        return Ok(ShowcaseConfig::from_json_file(path)?);
    }
    let mut config = ShowcaseConfig::personalized();
    config.models_dir = path.to_path_buf();
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = load_config(std::env::args().nth(1))?;
    let mut showcase = Showcase::new(config)?;
    showcase.start()?;

    let mut timer = Timer::new();
    let mut fps_counter = FpsCounter::new();
    let mut shown_notices = 0;

    for frame in 0..RUN_FRAMES {
        for (_, key) in KEY_PRESSES.iter().filter(|(at, _)| *at == frame) {
            if showcase.handle_key(&Key::character(*key))? {
                log::info!("Pressed {key}: selected {:?}", showcase.selected());
            }
        }

        let dt = timer.advance(FRAME);
        showcase.tick(dt);

        if let (Some(fade), Some(mixer)) = (showcase.crossfade(), showcase.mixer()) {
            let weight = |handle| mixer.action(handle).map_or(0.0, |a| a.weight);
            log::debug!(
                "t={:.3}s out={:.3} in={:.3}",
                fade.elapsed(),
                weight(fade.from()),
                weight(fade.to())
            );
        }

        let notices = showcase.overlay().notices();
        for notice in notices.iter().skip(shown_notices) {
            log::warn!("{}", notice.text);
        }
        shown_notices = notices.len();

        if let Some(fps) = fps_counter.update(dt) {
            log::info!(
                "{fps:.0} fps, showing {:?}, {} cached",
                showcase.displayed_name(),
                showcase.library().len()
            );
        }

        // Gives the loader thread real time to read files.
        std::thread::sleep(FRAME);
    }

    log::info!("Finished after {:.1}s of showcase time", timer.elapsed.as_secs_f32());
    Ok(())
}
