//! Flappy Evo entry point
//!
//! Mode selection and the thin terminal frontends: interactive play,
//! headless or visualized training, and champion replay. All presentation
//! here reads frame snapshots; nothing mutates the simulation besides the
//! decision providers.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal;
use rand::Rng;

use flappy_evo::evo::Trainer;
use flappy_evo::persistence::{self, ChampionArtifact, SaveOutcome};
use flappy_evo::policy::HumanInput;
use flappy_evo::sim::{DecisionPolicy, RoundPhase, RoundState, tick};
use flappy_evo::{Config, HighScore};

/// Frame pacing for interactive modes (~30 fps)
const FRAME: Duration = Duration::from_millis(33);

#[derive(Parser, Debug)]
#[command(name = "flappy-evo")]
#[command(about = "A side-scrolling reflex game with human play and neuro-evolution training")]
struct Cli {
    /// JSON config overriding training and fitness defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a round yourself; space flaps, q quits
    Play,
    /// Evolve a population of policies and store the champion
    Train {
        /// Run seed; drawn at random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Override the configured generation cap
        #[arg(long)]
        generations: Option<u32>,
        /// Show a live status line while training (q interrupts)
        #[arg(long, short)]
        visualize: bool,
    },
    /// Replay the stored champion policy
    Trained {
        /// Round seed; drawn at random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Pace the replay at game speed with a status line
        #[arg(long, short)]
        visualize: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path).context("loading config")?,
        None => Config::default(),
    };
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Play => play(),
        Commands::Train {
            seed,
            generations,
            visualize,
        } => train(&config, seed, generations, visualize),
        Commands::Trained { seed, visualize } => trained(seed, visualize),
    }
}

/// Raw terminal mode, restored on drop even when a round errors out.
struct RawMode;

impl RawMode {
    fn enable() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enabling raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn play() -> anyhow::Result<()> {
    let mut high = HighScore::load();
    let _raw = RawMode::enable()?;
    print!("space to flap, q to quit\r\n");
    io::stdout().flush().ok();
    loop {
        let Some(score) = play_round()? else { break };
        print!("\r\nround over - score {score}");
        if high.record(score) {
            high.save();
            print!(" (new best)");
        }
        print!("  best {}\r\n", high.best);
        print!("space for another round, q to quit\r\n");
        io::stdout().flush().ok();
        if !wait_for_restart()? {
            break;
        }
    }
    Ok(())
}

/// One interactive round. Returns the final score, or `None` on quit.
fn play_round() -> anyhow::Result<Option<u32>> {
    let mut state = RoundState::human(rand::rng().random());
    let mut human = HumanInput::new();
    while state.phase == RoundPhase::Running {
        let frame_start = Instant::now();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match key.code {
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => human.request_impulse(),
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(None),
                    _ => {}
                }
            }
        }
        let mut providers: [&mut dyn DecisionPolicy; 1] = [&mut human];
        tick(&mut state, &mut providers);
        status_line(&state);
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
    Ok(Some(state.score))
}

fn wait_for_restart() -> anyhow::Result<bool> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => return Ok(true),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
                _ => {}
            }
        }
    }
}

fn status_line(state: &RoundState) {
    let snap = state.snapshot();
    let y = snap.agents.first().map(|a| a.pos.y).unwrap_or_default();
    print!(
        "\rscore {:>3}  height {:>6.1}  survivors {:>3}   ",
        snap.score, y, snap.survivors
    );
    io::stdout().flush().ok();
}

fn train(
    config: &Config,
    seed: Option<u64>,
    generations: Option<u32>,
    visualize: bool,
) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let generations = generations.unwrap_or(config.generation_cap);
    log::info!(
        "training: population {}, cap {generations} generations, seed {seed}",
        config.population
    );

    let raw = if visualize {
        Some(RawMode::enable()?)
    } else {
        None
    };
    let mut trainer = Trainer::new(config.clone(), seed);
    let mut observe = |state: &RoundState| {
        if visualize {
            let snap = state.snapshot();
            print!(
                "\rgen {:>3}  score {:>3}  survivors {:>3}  best {:>8.1}   ",
                snap.generation,
                snap.score,
                snap.survivors,
                state.best_fitness()
            );
            io::stdout().flush().ok();
        }
    };
    let mut cancel = || visualize && quit_requested();
    let summary = trainer.run(generations, &mut observe, &mut cancel);
    drop(raw);
    if visualize {
        println!();
    }

    if summary.cancelled {
        log::info!(
            "training interrupted after {} generations",
            summary.generations_run
        );
    } else if summary.target_reached {
        log::info!(
            "fitness target reached after {} generations",
            summary.generations_run
        );
    }

    match trainer.champion.as_ref() {
        Some(champion) => {
            let artifact = ChampionArtifact::from(champion);
            match persistence::save_champion(&artifact) {
                Ok(SaveOutcome::Saved) => log::info!(
                    "saved champion with fitness {:.1} (generation {})",
                    artifact.fitness,
                    artifact.generation
                ),
                Ok(SaveOutcome::KeptExisting { fitness }) => {
                    log::info!("stored champion (fitness {fitness:.1}) remains; not overwriting")
                }
                Err(err) => log::warn!("could not persist champion: {err}"),
            }
        }
        None => log::warn!("no champion produced; nothing to save"),
    }
    Ok(())
}

/// Drain pending key events; true once q/escape shows up.
fn quit_requested() -> bool {
    loop {
        match event::poll(Duration::ZERO) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key))
                    if key.kind != KeyEventKind::Release
                        && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) =>
                {
                    return true;
                }
                Ok(_) => {}
                Err(_) => return false,
            },
            _ => return false,
        }
    }
}

fn trained(seed: Option<u64>, visualize: bool) -> anyhow::Result<()> {
    let artifact = persistence::load_champion()
        .context("no trained champion to replay (run `flappy-evo train` first)")?;
    log::info!(
        "replaying champion: fitness {:.1} from generation {}",
        artifact.fitness,
        artifact.generation
    );
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut network = artifact.network;
    let mut state = RoundState::human(seed);

    let raw = if visualize {
        Some(RawMode::enable()?)
    } else {
        None
    };
    let mut interrupted = false;
    while state.phase == RoundPhase::Running {
        let frame_start = Instant::now();
        if visualize && quit_requested() {
            interrupted = true;
            break;
        }
        let mut providers: [&mut dyn DecisionPolicy; 1] = [&mut network];
        tick(&mut state, &mut providers);
        if visualize {
            status_line(&state);
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME {
                std::thread::sleep(FRAME - elapsed);
            }
        }
    }
    drop(raw);
    if visualize {
        println!();
    }
    if interrupted {
        log::info!("replay interrupted");
    }
    println!(
        "final score: {} ({} ticks survived)",
        state.score, state.tick_count
    );
    Ok(())
}
