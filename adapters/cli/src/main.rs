#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that connects the Isle Agent to a game server.

mod recording;
mod transport;

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    net::TcpStream,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use isle_agent_core::{VIEW_REACH, WORKING_RADIUS};
use isle_agent_rendering::{Presenter, TextPresenter, TurnFrame};
use isle_agent_system_planner::{Config, Planner};
use isle_agent_world::MAX_WORKING_RADIUS;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use recording::{read_records, replay, Recorder, TurnRecord};
use transport::Session;

#[derive(Parser)]
#[command(name = "isle-agent")]
#[command(about = "Autonomous treasure-hunting agent", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a game server and play until it hangs up
    Play {
        /// Server host name
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Server port
        #[arg(short, long)]
        port: u16,

        /// Half-width of the belief map
        #[arg(long, default_value_t = WORKING_RADIUS, value_parser = radius_parser())]
        radius: i32,

        /// Print every turn to stdout
        #[arg(long)]
        render: bool,

        /// Write a JSON-lines recording of the game
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Feed a recording into a fresh agent and compare its actions
    Replay {
        /// Recording produced by `play --record`
        path: PathBuf,

        /// Half-width of the belief map
        #[arg(long, default_value_t = WORKING_RADIUS, value_parser = radius_parser())]
        radius: i32,
    },
}

fn radius_parser() -> clap::builder::RangedI64ValueParser<i32> {
    clap::value_parser!(i32).range(i64::from(VIEW_REACH)..=i64::from(MAX_WORKING_RADIUS))
}

/// Entry point for the Isle Agent command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Play {
            host,
            port,
            radius,
            render,
            record,
        } => play(&host, port, radius, render, record.as_deref()),
        Commands::Replay { path, radius } => replay_file(&path, radius),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn planner_config(radius: i32) -> Config {
    Config::new(isle_agent_world::Config::new(radius))
}

fn play(host: &str, port: u16, radius: i32, render: bool, record: Option<&Path>) -> Result<()> {
    let stream = TcpStream::connect((host, port))
        .with_context(|| format!("failed to connect to {host}:{port}"))?;
    info!("connected to {host}:{port}");
    let reader = stream
        .try_clone()
        .context("failed to split the connection")?;
    let mut session = Session::new(BufReader::new(reader), stream);

    let mut presenter = render.then(|| TextPresenter::new(io::stdout()));
    let mut recorder = match record {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create recording {}", path.display()))?;
            Some(Recorder::new(Box::new(BufWriter::new(file))))
        }
        None => None,
    };

    let mut planner = Planner::new(planner_config(radius));
    let turns = run_session(
        &mut session,
        &mut planner,
        presenter.as_mut().map(|presenter| presenter as &mut dyn Presenter),
        recorder.as_mut(),
    )?;
    info!("game over after {turns} turns");
    Ok(())
}

/// Plays turns until the server closes the stream and returns the number of
/// turns played.
fn run_session<R: Read, W: Write>(
    session: &mut Session<R, W>,
    planner: &mut Planner,
    mut presenter: Option<&mut dyn Presenter>,
    mut recorder: Option<&mut Recorder>,
) -> Result<u64> {
    let mut turn = 0;

    while let Some(observation) = session.read_observation()? {
        let action = planner.next_action(observation.clone());
        session.send_action(action)?;

        if let Some(recorder) = recorder.as_mut() {
            recorder.record(&TurnRecord::new(turn, &observation, action))?;
        }
        if let Some(presenter) = presenter.as_mut() {
            presenter.present(&TurnFrame {
                turn,
                observation: &observation,
                action,
                world: planner.world(),
            })?;
        }

        turn += 1;
    }

    Ok(turn)
}

fn replay_file(path: &Path, radius: i32) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("failed to open recording {}", path.display()))?;
    let records = read_records(BufReader::new(file))?;
    info!("replaying {} turns from {}", records.len(), path.display());

    match replay(&records, planner_config(radius))? {
        None => println!("all {} turns match the recording", records.len()),
        Some(divergence) => println!(
            "turn {} diverges: recorded {} but the agent chose {}",
            divergence.turn,
            divergence.recorded.symbol(),
            divergence.replayed.symbol()
        ),
    }
    Ok(())
}
