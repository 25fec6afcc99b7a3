/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::KeyCode;
use tracing_subscriber::EnvFilter;

use config::{GameConfig, LogConfig};
use sim::scheduler::GameClock;
use sim::step;
use sim::world::TurtleAdventureGame;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> anyhow::Result<()> {
    let config = GameConfig::load();
    init_tracing(&config.log)?;

    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let mut game = TurtleAdventureGame::new(config.game.clone(), seed);

    let mut renderer = Renderer::new(config.game.bounds);
    renderer.init().context("terminal init failed")?;

    let sound = SoundEngine::new();
    if sound.is_none() {
        tracing::warn!("no audio output, sound disabled");
    }

    let result = game_loop(&mut game, &mut renderer, sound.as_ref(), config.seed);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    result?;

    println!();
    println!("Thanks for playing Turtle's Adventure!");
    println!("Level {}, {:.1}s survived (seed {})", game.level, game.elapsed_ms() as f64 / 1000.0, game.seed);
    Ok(())
}

/// Log to the configured file only; the terminal belongs to the game.
fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let Some(path) = &log.file else { return Ok(()) };
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
    Ok(())
}

fn game_loop(
    game: &mut TurtleAdventureGame,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    fixed_seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    let mut paused = false;
    // Game time only accumulates while running and not paused.
    let mut clock = GameClock::new(game.params.tick_rate_ms);
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        if kb.any_pressed(KEYS_RESTART) {
            let seed = fixed_seed.unwrap_or_else(rand::random::<u64>);
            *game = TurtleAdventureGame::new(game.params.clone(), seed);
            clock = GameClock::new(game.params.tick_rate_ms);
            paused = false;
        }
        if kb.any_pressed(KEYS_PAUSE) && game.is_running() {
            paused = !paused;
            tracing::info!(paused, "pause toggled");
        }
        if kb.any_pressed(KEYS_LEVEL_UP) {
            game.set_level(game.level.saturating_add(1));
        }
        if kb.any_pressed(KEYS_LEVEL_DOWN) {
            game.set_level(game.level.saturating_sub(1));
        }

        if !paused {
            let viewport = renderer.viewport();
            for &(col, row) in kb.clicks() {
                if let Some(pos) = viewport.to_world(col, row) {
                    game.click(pos.x, pos.y);
                }
            }
        }

        let frame = last_frame.elapsed();
        last_frame = Instant::now();
        if !paused && game.is_running() {
            let now_ms = clock.advance(frame);
            let events = step::advance(game, now_ms);
            if let Some(sfx) = sound {
                for event in &events {
                    sfx.play_event(event);
                }
            }
        }

        renderer.render(game, paused)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::F(1)];
const KEYS_LEVEL_UP: &[KeyCode] = &[KeyCode::Char('+'), KeyCode::Char('=')];
const KEYS_LEVEL_DOWN: &[KeyCode] = &[KeyCode::Char('-'), KeyCode::Char('_')];
