/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_level;
use sim::scene::Scene;
use sim::step;
use sim::world::{Maze, Phase};
use ui::gamepad::GamepadState;
use ui::input::{InputState, PAUSE_KEYS};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    tracing::info!(
        tick_ms = config.speed.tick_rate_ms,
        seed = ?config.seed,
        "starting"
    );

    // A bad layout refuses to start, before the terminal is touched.
    let mut maze = match load_level(&config) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "invalid layout");
            eprintln!("Invalid maze layout: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let result = game_loop(&mut maze, &mut renderer, honor_release, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Maze Chase!");
    println!("Food eaten: {}/{}", maze.food_total - maze.food_remaining, maze.food_total);
}

/// Log to the configured file. The terminal is in raw mode during play, so
/// nothing goes to stderr. Level comes from `RUST_LOG` (default `info`).
fn init_logging(config: &GameConfig) {
    let file = match File::create(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", config.log_file.display());
            eprintln!("Logging disabled.");
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn game_loop(
    maze: &mut Maze,
    renderer: &mut Renderer,
    honor_release: bool,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new(&config.gamepad);
    tracing::info!(gamepad = gp.connected, enhanced_keys = honor_release, "input ready");
    let mut scene = Scene::build(maze, renderer);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            tracing::info!(tick = maze.tick, "interrupted");
            break;
        }
        let any_press = kb.any_key_pressed() || gp.confirm_pressed();
        let pause_press = kb.any_pressed(&PAUSE_KEYS) || gp.pause_pressed();

        match maze.phase {
            Phase::Ready => {
                if any_press {
                    maze.phase = Phase::Playing;
                    last_tick = Instant::now();
                }
            }
            Phase::Playing => {
                if pause_press {
                    maze.phase = Phase::Paused;
                } else if last_tick.elapsed() >= tick_rate {
                    let keys = kb.pressed_keys().union(gp.pressed_keys());
                    let events = step::step(maze, keys);
                    scene.sync(maze, &events, renderer);
                    announce(maze, &events);
                    last_tick = Instant::now();
                }
            }
            Phase::Paused => {
                if pause_press {
                    maze.phase = Phase::Playing;
                    last_tick = Instant::now();
                }
            }
            Phase::Over => {
                if any_press {
                    break;
                }
            }
        }

        renderer.render(maze)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Short HUD notices for notable tick events. End-of-game text is set by the step.
fn announce(maze: &mut Maze, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::PlayerCaught { index } => {
                tracing::info!(adversary = index, "caught by adversary");
            }
            _ if maze.game_over => {}
            GameEvent::CapsuleEaten { .. } => maze.set_message("Power capsule!", 40),
            GameEvent::AdversaryCaptured { index } => {
                maze.set_message(&format!("Adversary {index} sent home"), 40);
            }
            GameEvent::AdversaryRecovered { index } => {
                tracing::debug!(adversary = index, "adversary dangerous again");
            }
            _ => {}
        }
    }
}
