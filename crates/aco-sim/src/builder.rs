//! Fluent builder for constructing a [`Colony`].

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Condvar, Mutex};

use aco_algorithm::{Algorithm, PolicyParams};
use aco_core::ColonyConfig;
use aco_graph::{PheromoneGraph, topology};
use aco_sync::{ActionBarrier, CancelToken, WorkerCoordinator};
use tracing::info;

use crate::{Colony, ColonyObserver, NoopObserver, NoopSink, NoticeSink, SimResult, WorkerLocator};

/// Fluent builder for [`Colony`].
///
/// # Required inputs
///
/// - [`ColonyConfig`] — topology and algorithm names, coefficients, timeouts
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                 |
/// |-----------------|-----------------------------------------|
/// | `.notices(s)`   | [`NoopSink`]                            |
/// | `.observer(o)`  | [`NoopObserver`]                        |
/// | `.graph(g)`     | the topology registered as `config.topology` |
///
/// # Example
///
/// ```rust,ignore
/// let colony = ColonyBuilder::new(ColonyConfig::from_pairs(args)?)
///     .notices(move |notice| { let _ = tx.send(notice); })
///     .build()?;
/// colony.start()?;
/// colony.wait_finished(Duration::from_secs(600));
/// ```
pub struct ColonyBuilder {
    config:   ColonyConfig,
    notices:  Option<Box<dyn NoticeSink>>,
    observer: Option<Box<dyn ColonyObserver>>,
    graph:    Option<PheromoneGraph>,
}

impl ColonyBuilder {
    pub fn new(config: ColonyConfig) -> Self {
        Self { config, notices: None, observer: None, graph: None }
    }

    /// Where `TimeAdvanced` and `NewCycle` notices go.
    pub fn notices<S: NoticeSink + 'static>(mut self, sink: S) -> Self {
        self.notices = Some(Box::new(sink));
        self
    }

    pub fn observer<O: ColonyObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Use `graph` instead of looking `config.topology` up in the registry.
    pub fn graph(mut self, graph: PheromoneGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Validate the configuration against the registries and assemble the
    /// colony.  Every configuration error surfaces here, before any thread
    /// is started.
    pub fn build(self) -> SimResult<Arc<Colony>> {
        let config = self.config;
        config.validate()?;

        // ── Resolve names ─────────────────────────────────────────────────
        let graph = match self.graph {
            Some(g) => g,
            None => topology(&config.topology)?,
        };
        let graph = Arc::new(graph);
        let start = graph.require_node(&config.start)?;
        let destination = graph.require_node(&config.destination)?;

        let policy = aco_algorithm::policy(&config.algorithm, &PolicyParams::from_config(&config))?;
        let algorithm = Arc::new(Algorithm::new(Arc::clone(&graph), policy, destination, config.max_cycles)?);

        // ── Coordination ──────────────────────────────────────────────────
        let cancel = CancelToken::new();
        let coordinator = WorkerCoordinator::new(cancel.clone());
        let barrier = ActionBarrier::new(config.action_threads)?;
        let locator = Arc::new(WorkerLocator::new(Arc::clone(&graph)));

        info!(
            topology = graph.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            algorithm = algorithm.name(),
            start = %config.start,
            destination = %config.destination,
            "colony built"
        );

        Ok(Arc::new(Colony {
            graph,
            start,
            destination,
            algorithm,
            coordinator,
            locator,
            barrier,
            cancel,
            notices:     self.notices.unwrap_or_else(|| Box::new(NoopSink)),
            observer:    Mutex::new(self.observer.unwrap_or_else(|| Box::new(NoopObserver))),
            tick:        AtomicU64::new(0),
            ticking:     Mutex::new(()),
            clock:       Mutex::new(None),
            finished:    Mutex::new(false),
            finished_cv: Condvar::new(),
            config,
        }))
    }
}
