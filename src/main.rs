/// Entry point and event loop.

use std::fs::File;
use std::time::{Duration, Instant};

use log::{info, warn};

use codeup::config::QuizConfig;
use codeup::domain::catalog::Catalog;
use codeup::sim::engine::ProgressionEngine;
use codeup::sim::session::Session;
use codeup::ui::input::InputState;
use codeup::ui::renderer::Renderer;
use codeup::ui::sound::{play_events, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = QuizConfig::load();
    setup_logging(&config);

    let (catalog, catalog_warning) = load_catalog(&config);
    info!("catalog ready: {} modules", catalog.len());

    let engine = ProgressionEngine::new(catalog)
        .with_hint_mode(config.hint_mode)
        .with_stars_per_answer(config.stars_per_answer);
    let mut session = Session::new(engine);
    if let Some(msg) = catalog_warning {
        session.set_message(&msg, 120);
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = event_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    println!();
    println!("Thanks for playing CodeUp!");
    println!("Stars earned: {}", session.engine.total_stars());
}

/// Logs go to the configured file; the terminal is in raw mode while running.
/// With no log file the logger is never installed and `log` macros are no-ops.
fn setup_logging(config: &QuizConfig) {
    let Some(path) = &config.log_file else { return };
    match File::create(path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: could not open log file {}: {e}", path.display()),
    }
}

/// Configured catalog file, or the built-in modules if it is unset or bad.
fn load_catalog(config: &QuizConfig) -> (Catalog, Option<String>) {
    let Some(path) = &config.catalog_path else {
        return (Catalog::builtin(), None);
    };
    match Catalog::load_file(path) {
        Ok(catalog) => {
            info!("loaded catalog from {}", path.display());
            (catalog, None)
        }
        Err(e) => {
            warn!("{e}; using built-in modules");
            (Catalog::builtin(), Some(format!("Catalog error, using built-in modules: {e}")))
        }
    }
}

fn event_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &QuizConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    loop {
        kb.drain_events();
        for &action in kb.actions() {
            let events = session.apply(action);
            play_events(sound, &events);
            if session.quit {
                return Ok(());
            }
        }

        if last_tick.elapsed() >= tick_rate {
            session.tick();
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }
}
