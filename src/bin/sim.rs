use std::sync::Arc;

use clap::Parser;
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use sea_battle::{
    init_logging, random_cells, BattleApi, Identity, InMemoryTransport, Point, RemoteSeat,
    SessionHub, SessionStatus, Skeleton, Stub,
};
use serde_json::json;

/// Play one full game between two scripted players over in-memory connections.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for player 1's board and firing order.
    seed1: Option<u64>,
    /// Seed for player 2's board and firing order.
    seed2: Option<u64>,
    #[arg(long, default_value_t = 10)]
    grid: u32,
}

/// A scripted player: fires at every grid cell once, in a seeded order.
struct Shooter {
    seat: RemoteSeat<InMemoryTransport>,
    targets: Vec<Point>,
    shots: usize,
}

impl Shooter {
    fn new(seat: RemoteSeat<InMemoryTransport>, rng: &mut SmallRng, grid: u32) -> Self {
        let mut targets: Vec<Point> = (0..grid)
            .flat_map(|x| (0..grid).map(move |y| Point::new(x, y)))
            .collect();
        targets.shuffle(rng);
        Self {
            seat,
            targets,
            shots: 0,
        }
    }

    async fn fire(&mut self) -> anyhow::Result<()> {
        let target = self
            .targets
            .pop()
            .ok_or_else(|| anyhow::anyhow!("{} ran out of targets", self.seat.caller()))?;
        self.seat.take_shot(target).await?;
        self.shots += 1;
        Ok(())
    }
}

fn connect(hub: &Arc<SessionHub>, caller: Identity) -> Stub<InMemoryTransport> {
    let (server, client) = InMemoryTransport::pair();
    let hub = Arc::clone(hub);
    tokio::spawn(async move {
        let mut skeleton = Skeleton::new(hub, server);
        if let Err(e) = skeleton.run().await {
            log::error!("Skeleton ended with an error: {}", e);
        }
    });
    Stub::new(client, caller)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let mut seed_rng = rand::rng();
    let seed1 = args.seed1.unwrap_or_else(|| seed_rng.random());
    let seed2 = args.seed2.unwrap_or_else(|| seed_rng.random());
    let mut rng1 = SmallRng::seed_from_u64(seed1);
    let mut rng2 = SmallRng::seed_from_u64(seed2);

    let p1 = Identity::from(1u64);
    let p2 = Identity::from(2u64);
    let hub = Arc::new(SessionHub::new());

    let mut stub1 = connect(&hub, p1);
    let session = stub1.create_session().await?;
    let mut seat1 = stub1.bind(session);
    let mut seat2 = connect(&hub, p2).bind(session);

    let board1 = random_cells(&mut rng1, args.grid, args.grid)
        .ok_or_else(|| anyhow::anyhow!("Grid {}x{} is too small", args.grid, args.grid))?;
    let board2 = random_cells(&mut rng2, args.grid, args.grid)
        .ok_or_else(|| anyhow::anyhow!("Grid {}x{} is too small", args.grid, args.grid))?;
    seat1.register_board(board1).await?;
    seat2.register_board(board2).await?;

    let mut shooter1 = Shooter::new(seat1, &mut rng1, args.grid);
    let mut shooter2 = Shooter::new(seat2, &mut rng2, args.grid);

    while shooter1.seat.status().await? == SessionStatus::InProgress {
        if shooter1.seat.active_player().await? == p1 {
            shooter1.fire().await?;
        } else {
            shooter2.fire().await?;
        }
    }

    let winner = hub.winner(session).await?;
    let winner = match winner {
        Some(id) if id == p1 => Some("player1"),
        Some(id) if id == p2 => Some("player2"),
        _ => None,
    };
    let hits1 = shooter1.seat.hit_count(p1).await?;
    let hits2 = shooter1.seat.hit_count(p2).await?;

    let result = json!({
        "seeds": [seed1, seed2],
        "player1": {"shots": shooter1.shots, "hits_taken": hits1},
        "player2": {"shots": shooter2.shots, "hits_taken": hits2},
        "shots": shooter1.shots + shooter2.shots,
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
