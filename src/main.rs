use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};
use sea_battle::{
    init_logging, init_logging_with, Action, BattleApi, Event, Identity, Point, Seat, Session,
    SessionConfig, SessionHub, Skeleton, TcpTransport, DEFAULT_MAX_SESSIONS,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Overrides the level taken from SEA_BATTLE_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept TCP clients and host their sessions.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, help = "Reject repeated shots at an already-hit cell")]
        dedupe_shots: bool,
        #[arg(long, default_value_t = 300, help = "Seconds a connection may stay silent")]
        idle_timeout: u64,
        #[arg(long, default_value_t = DEFAULT_MAX_SESSIONS)]
        max_sessions: usize,
    },
    /// Play a scripted game locally and print its action and event log as JSON.
    Demo,
    /// Rebuild a session from a JSON action log and print its final state.
    Replay {
        /// File with `{ "owner": .., "config": .., "actions": [..] }`.
        file: String,
    },
}

/// Ordered log of accepted actions; enough to rebuild a session.
#[derive(Serialize, Deserialize)]
struct ActionLog {
    owner: Identity,
    #[serde(default)]
    config: SessionConfig,
    actions: Vec<Action>,
    #[serde(default)]
    events: Vec<Event>,
}

/// The shape used by the reference scenario: a column, a row and a corner.
fn board_a() -> Vec<Point> {
    let mut cells: Vec<Point> = (1..=10).map(|y| Point::new(1, y)).collect();
    cells.extend((2..=10).map(|x| Point::new(x, 1)));
    cells.push(Point::new(10, 10));
    cells
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.log_level {
        Some(level) => init_logging_with(
            level
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid log level: {}", level))?,
        ),
        None => init_logging(),
    }

    match cli.command {
        Commands::Serve {
            bind,
            dedupe_shots,
            idle_timeout,
            max_sessions,
        } => {
            let config = if dedupe_shots {
                SessionConfig::dedupe_shots()
            } else {
                SessionConfig::default()
            };
            let hub = Arc::new(SessionHub::with_limits(config, max_sessions));
            let listener = TcpListener::bind(&bind).await?;
            info!("Listening on {}", listener.local_addr()?);
            loop {
                let (stream, addr) = listener.accept().await?;
                info!("Client connected from {}", addr);
                let hub = Arc::clone(&hub);
                let transport = TcpTransport::with_timeout(stream, Duration::from_secs(idle_timeout));
                tokio::spawn(async move {
                    let mut skeleton = Skeleton::new(hub, transport);
                    if let Err(e) = skeleton.run().await {
                        error!("Connection {} ended with an error: {}", addr, e);
                    }
                });
            }
        }
        Commands::Demo => {
            let owner = Identity::from(1u64);
            let p1 = owner;
            let p2 = Identity::from(2u64);
            let hub = Arc::new(SessionHub::new());
            let session = hub.create_session(owner).await?;
            let mut seat1 = Seat::new(Arc::clone(&hub), session, p1);
            let mut seat2 = Seat::new(Arc::clone(&hub), session, p2);

            seat1.register_board(board_a()).await?;
            seat2.register_board(board_a()).await?;
            info!("Started: {}, {} to move", seat1.is_started().await?, seat1.active_player().await?);

            // A miss hands the turn over, then every hit keeps it.
            seat1.take_shot(Point::new(5, 5)).await?;
            for p in board_a() {
                seat2.take_shot(p).await?;
            }

            let snapshot = hub.snapshot(session).await?;
            let log = ActionLog {
                owner,
                config: snapshot.config,
                actions: snapshot.history,
                events: snapshot.events,
            };
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
        Commands::Replay { file } => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file, e))?;
            let log: ActionLog = serde_json::from_str(&text)?;
            let session = Session::replay(log.owner, log.config, &log.actions)?;
            if !log.events.is_empty() && log.events != session.events() {
                return Err(anyhow::anyhow!("Recorded events do not match the replayed session"));
            }
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        }
    }
    Ok(())
}
