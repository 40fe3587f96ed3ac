//! Parachute Drop headless runner
//!
//! Plays a scripted session against the simulation at 60 fps and prints the
//! leaderboard. Run with `RUST_LOG=info` (or `debug`) to follow along.
//!
//! Usage: `parachute-drop [config.json]`, or `parachute-drop --print-config`
//! to dump the default configuration as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use parachute_drop::presenter::LogPresenter;
    use parachute_drop::{Config, Engine};

    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(flag) if flag == "--print-config" => {
            match Config::default().to_json() {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Could not serialize config: {e}"),
            }
            return;
        }
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let mut engine = match Engine::new(config, seed, LogPresenter) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid config: {e}");
            std::process::exit(1);
        }
    };
    log::info!("Parachute Drop (native) starting with seed {seed}");

    // (frame, command)
    let script: &[(u32, Command)] = &[
        (0, Command::Spawn("ada")),
        (30, Command::Spawn("grace")),
        (45, Command::Cut("grace")),
        (90, Command::Spawn("linus")),
        (120, Command::Spawn("ada")),
        (150, Command::Spawn("margaret")),
        (400, Command::Cut("margaret")),
        (1500, Command::AbdicateWinner),
        (1600, Command::Spawn("ken")),
    ];

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES: u32 = 60 * 60;

    let mut next = 0;
    for frame in 0..FRAMES {
        while let Some((at, command)) = script.get(next) {
            if *at > frame {
                break;
            }
            let ok = match command {
                Command::Spawn(name) => engine.spawn(name, None),
                Command::Cut(name) => engine.request_cut(name),
                Command::AbdicateWinner => match engine.winner().map(|d| d.name.clone()) {
                    Some(name) => engine.abdicate(&name),
                    None => false,
                },
            };
            log::info!("frame {frame}: {command:?} -> {ok}");
            next += 1;
        }
        engine.frame(frame as f64 * FRAME_MS);
    }

    println!("Session leaderboard:");
    if engine.scores().is_empty() {
        println!("  (no winning landings)");
    }
    for (rank, entry) in engine.scores().entries().iter().enumerate() {
        println!(
            "  {:>2}. {:<12} {:>5.1}  at {:>6.1}s",
            rank + 1,
            entry.name,
            entry.score,
            entry.at_ms / 1000.0
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
enum Command {
    Spawn(&'static str),
    Cut(&'static str),
    AbdicateWinner,
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}
