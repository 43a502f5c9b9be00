#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the embedded tower defence engine.

mod stdio;

use std::{
    fs,
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use etd_core::{EngineConfig, Event, InputEvent, MovementSchedule};
use etd_simulation::{Simulation, TickClock};
use etd_terminal::{ByteChannel, InputDecoder, Renderer, Terminal, TerminalError};
use etd_world::{query, MapLayout};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::stdio::StdioChannel;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "etd", about = "Terminal tower defence")]
struct Cli {
    /// Text map to play on instead of the built-in one.
    #[arg(long, global = true)]
    map: Option<PathBuf>,
    /// TOML file overriding engine parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Seed of the simulation random number generator.
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Order in which bots move.
    #[arg(long, global = true, value_enum)]
    schedule: Option<ScheduleArg>,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Mode {
    /// Play interactively on this terminal.
    Play,
    /// Run the simulation without a display and print a summary.
    Headless {
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 1_000)]
        ticks: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScheduleArg {
    RoundRobin,
    FullPass,
}

impl From<ScheduleArg> for MovementSchedule {
    fn from(value: ScheduleArg) -> Self {
        match value {
            ScheduleArg::RoundRobin => MovementSchedule::RoundRobin,
            ScheduleArg::FullPass => MovementSchedule::FullPass,
        }
    }
}

/// Entry point for the command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = load_config(&cli)?;
    let layout = load_layout(cli.map.as_ref())?;
    let simulation = Simulation::new(layout, &config);

    match cli.mode.unwrap_or(Mode::Play) {
        Mode::Play => play(simulation, Duration::from_millis(config.tick_interval_ms)),
        Mode::Headless { ticks } => {
            headless(simulation, ticks);
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EngineConfig::from_toml_str(&source)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if let Some(schedule) = cli.schedule {
        config.schedule = schedule.into();
    }
    Ok(config)
}

fn load_layout(path: Option<&PathBuf>) -> Result<MapLayout> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read map {}", path.display()))?;
            MapLayout::parse(&source).with_context(|| format!("invalid map {}", path.display()))
        }
        None => MapLayout::builtin().context("built-in map is malformed"),
    }
}

fn headless(mut simulation: Simulation, ticks: u64) {
    let mut events = Vec::new();
    let (mut spawned, mut destroyed, mut relocated) = (0_u64, 0_u64, 0_u64);

    for _ in 0..ticks {
        events.clear();
        simulation.tick(&mut events);
        for event in &events {
            match event {
                Event::BotSpawned { .. } => spawned += 1,
                Event::BotDestroyed { .. } => destroyed += 1,
                Event::BotRelocated { .. } => relocated += 1,
                Event::LevelAdvanced { level } => info!(level, "level advanced"),
                _ => {}
            }
        }
    }

    let world = simulation.world();
    let live = query::bots(world).iter().filter(|bot| bot.is_live()).count();
    info!(ticks, spawned, destroyed, relocated, "headless run completed");
    println!(
        "tick {}: level {}, gold {}, live bots {}, spawned {}, destroyed {}, relocated {}",
        query::tick_index(world),
        query::level_index(world) + 1,
        query::gold(world),
        live,
        spawned,
        destroyed,
        relocated,
    );
}

fn play(mut simulation: Simulation, tick_interval: Duration) -> Result<()> {
    let channel = StdioChannel::spawn().context("failed to start input reader")?;
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut terminal = Terminal::new(channel);

    let result = run_session(&mut simulation, &mut terminal, tick_interval);

    if let Err(err) = terminal.leave() {
        error!(?err, "failed to restore the terminal");
    }
    if let Err(err) = disable_raw_mode() {
        error!(?err, "failed to disable raw mode");
    }
    info!(
        ticks = query::tick_index(simulation.world()),
        "session ended"
    );
    result
}

fn run_session<C: ByteChannel>(
    simulation: &mut Simulation,
    terminal: &mut Terminal<C>,
    tick_interval: Duration,
) -> Result<()> {
    terminal.enter()?;
    terminal.request_size()?;

    let mut renderer = Renderer::new();
    let mut decoder = InputDecoder::new();
    let mut clock = TickClock::new(tick_interval);
    let mut buffer = [0_u8; 64];
    let mut inputs = Vec::new();
    let mut events = Vec::new();
    renderer.render(terminal, simulation.world(), &events)?;

    let mut last_poll = Instant::now();
    loop {
        let received = match terminal.channel_mut().receive(&mut buffer) {
            Ok(received) => received,
            Err(TerminalError::Disconnected) => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        decoder.feed_all(&buffer[..received], &mut inputs);

        events.clear();
        for input in inputs.drain(..) {
            if input == InputEvent::Quit {
                return Ok(());
            }
            simulation.handle_input(input, &mut events);
        }

        let now = Instant::now();
        if clock.advance(now - last_poll) {
            simulation.tick(&mut events);
        }
        last_poll = now;

        if !events.is_empty() {
            renderer.render(terminal, simulation.world(), &events)?;
        }
        thread::sleep(clock.remaining().min(POLL_INTERVAL));
    }
}
