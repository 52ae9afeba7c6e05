//! romania — a colony of threaded ants searching Arad → Bucharest.
//!
//! Usage:
//!
//! ```text
//! romania [ants=N] [out=DIR] [name=value ...]
//! romania [ants=N] [out=DIR] topology start destination max_cycles ...
//! ```
//!
//! Any `name=value` pair other than `ants` and `out` is a colony parameter.
//! Bare values are taken positionally.  Set `RUST_LOG` to tune logging.

mod ant;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aco_core::{ColonyConfig, WorkerId};
use aco_graph::shortest_distance;
use aco_output::{ColonyOutputObserver, CsvWriter};
use aco_sim::{ColonyBuilder, Notice};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_ANTS: usize = 10;
const DEFAULT_OUT:  &str  = "output/romania";
/// Upper bound on the whole run.
const RUN_LIMIT: Duration = Duration::from_secs(600);

// ── Notice fan-out ────────────────────────────────────────────────────────────

/// Copies every colony notice into one channel per ant.
#[derive(Default)]
struct Broadcast {
    inboxes: Mutex<Vec<Sender<Notice>>>,
}

impl Broadcast {
    fn subscribe(&self) -> Receiver<Notice> {
        let (tx, rx) = unbounded();
        self.inboxes.lock().unwrap_or_else(PoisonError::into_inner).push(tx);
        rx
    }

    fn send(&self, notice: Notice) {
        for tx in self.inboxes.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            let _ = tx.send(notice);
        }
    }
}

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    ants:   usize,
    out:    PathBuf,
    config: ColonyConfig,
}

fn parse_args() -> Result<Args> {
    let mut ants = DEFAULT_ANTS;
    let mut out = PathBuf::from(DEFAULT_OUT);
    let mut pairs = Vec::new();
    let mut positional = Vec::new();

    for arg in std::env::args().skip(1) {
        match arg.split_once('=') {
            Some(("ants", n)) => ants = n.trim().parse().context("ants must be a positive integer")?,
            Some(("out", dir)) => out = PathBuf::from(dir.trim()),
            Some((name, value)) => pairs.push((name.trim().to_owned(), value.to_owned())),
            None => positional.push(arg),
        }
    }
    if ants == 0 {
        bail!("ants must be a positive integer");
    }
    if !pairs.is_empty() && !positional.is_empty() {
        bail!("mix of positional and name=value colony parameters");
    }

    let config = if positional.is_empty() {
        ColonyConfig::from_pairs(pairs)?
    } else {
        ColonyConfig::from_positional(&positional)?
    };
    Ok(Args { ants, out, config })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "romania=info,aco_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Args { ants, out, config } = parse_args()?;
    println!("=== romania — ant colony optimisation ===");
    println!(
        "Topology: {}  |  {} → {}  |  Ants: {ants}  |  Cycles: {}  |  Algorithm: {}",
        config.topology, config.start, config.destination, config.max_cycles, config.algorithm
    );
    println!();

    // 1. Output.
    std::fs::create_dir_all(&out)?;
    let observer = ColonyOutputObserver::new(CsvWriter::new(&out)?);
    let output_errors = observer.errors();

    // 2. Colony.
    let broadcast = Arc::new(Broadcast::default());
    let sink = Arc::clone(&broadcast);
    let colony = ColonyBuilder::new(config)
        .notices(move |notice: Notice| sink.send(notice))
        .observer(observer)
        .build()?;
    let graph = Arc::clone(colony.graph());
    println!("Graph: {} nodes, {} roads", graph.node_count(), graph.edge_count());

    // 3. Start the arrival wait, then release the ants.
    let t0 = Instant::now();
    colony.start()?;
    let mut handles = Vec::with_capacity(ants);
    for i in 0..ants {
        let id = WorkerId::new(format!("{i:03}"));
        handles.push(ant::spawn(Arc::clone(&colony), id, broadcast.subscribe())?);
    }
    info!(ants, "ants released");

    // 4. Run.
    if !colony.wait_finished(RUN_LIMIT) {
        warn!(limit_s = RUN_LIMIT.as_secs(), "run limit reached; stopping the colony");
        colony.stop();
    }
    let answered: usize = handles.into_iter().map(|h| h.join().unwrap_or(0)).sum();
    let elapsed = t0.elapsed();

    if let Some(e) = output_errors.take() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks             : {}", colony.tick().0);
    println!("  cycles            : {} of {}", colony.cycle().0.min(colony.max_cycles()), colony.max_cycles());
    println!("  notices answered  : {answered}");
    match colony.termination() {
        Some(reason) => println!("  termination       : {reason}"),
        None => println!("  termination       : stopped"),
    }
    let optimum = shortest_distance(&graph, colony.start_node(), colony.destination_node())?;
    match colony.best_path() {
        Ok(best) => {
            println!("  best path         : {best}");
            println!("  best distance     : {:.0} km (optimum {optimum:.0} km)", best.total_distance());
        }
        Err(_) => println!("  no ant reached the destination (optimum {optimum:.0} km)"),
    }
    println!();

    println!("{:<16} {:<16} {:>8} {:>12}", "From", "To", "Km", "Pheromone");
    println!("{}", "-".repeat(56));
    for id in graph.edge_ids() {
        let edge = graph.edge(id);
        let (a, b) = edge.endpoints();
        println!(
            "{:<16} {:<16} {:>8.0} {:>12.4}",
            graph.node_name(a),
            graph.node_name(b),
            edge.distance(),
            edge.pheromone(),
        );
    }
    Ok(())
}
