//! Unit tests for aco-algorithm.

#[cfg(test)]
mod policy_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use aco_graph::{GraphBuilder, INITIAL_PHEROMONE, Path, topology};

    use crate::{AlgoError, AntCycle, PheromonePolicy, PolicyParams, StochasticGreedy, policy, ALGORITHMS};

    #[test]
    fn ant_cycle_evaporates_then_deposits() {
        let mut b = GraphBuilder::new("seeded").initial_pheromone(2.0);
        for name in ["A", "B", "C"] {
            b.add_node(name).unwrap();
        }
        b.add_road("A", "B", 1.0).unwrap();
        b.add_road("B", "C", 3.0).unwrap();
        b.add_road("A", "C", 10.0).unwrap();
        let graph = b.build();
        let path = Arc::new(Path::from_names(&graph, &["A", "B", "C"]).unwrap());

        let mut solutions = HashMap::new();
        for &edge in path.edges() {
            solutions.entry(edge).or_insert_with(Vec::new).push(Arc::clone(&path));
        }

        let policy = AntCycle::new(0.5, 100.0).unwrap();
        policy.end_of_cycle(&graph, &solutions);

        let ab = graph.edge_between(graph.node_id("A").unwrap(), graph.node_id("B").unwrap()).unwrap();
        let ac = graph.edge_between(graph.node_id("A").unwrap(), graph.node_id("C").unwrap()).unwrap();
        assert!((graph.pheromone(ab).unwrap() - (0.5 * 2.0 + 100.0 / 4.0)).abs() < 1e-9);
        assert!((graph.pheromone(ac).unwrap() - 1.0).abs() < 1e-12, "unused edges only evaporate");
    }

    #[test]
    fn ant_cycle_deposits_once_per_solution() {
        let graph = topology("diamond").unwrap();
        let path = Arc::new(Path::from_names(&graph, &["A", "B", "C", "D"]).unwrap());
        let mut solutions = HashMap::new();
        for &edge in path.edges() {
            solutions.insert(edge, vec![Arc::clone(&path), Arc::clone(&path)]);
        }

        AntCycle::new(1.0, 3.0).unwrap().end_of_cycle(&graph, &solutions);
        let first = path.edges()[0];
        assert!((graph.pheromone(first).unwrap() - (INITIAL_PHEROMONE + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn ant_cycle_rejects_bad_parameters() {
        assert!(matches!(AntCycle::new(1.5, 1.0), Err(AlgoError::Config(_))));
        assert!(matches!(AntCycle::new(-0.1, 1.0), Err(AlgoError::Config(_))));
        assert!(matches!(AntCycle::new(0.5, 0.0), Err(AlgoError::Config(_))));
        assert!(matches!(AntCycle::new(0.5, f64::NAN), Err(AlgoError::Config(_))));
    }

    #[test]
    fn greedy_leaves_pheromone_alone() {
        let graph = topology("diamond").unwrap();
        let path = Arc::new(Path::from_names(&graph, &["A", "B", "C", "D"]).unwrap());
        let solutions = path.edges().iter().map(|&e| (e, vec![Arc::clone(&path)])).collect();

        StochasticGreedy.end_of_cycle(&graph, &solutions);
        assert!(graph.edge_ids().all(|e| graph.pheromone(e).unwrap() == INITIAL_PHEROMONE));
    }

    #[test]
    fn registry_builds_by_name() {
        let params = PolicyParams { retention: 0.5, q: 100.0 };
        for (name, _) in ALGORITHMS {
            assert_eq!(policy(name, &params).unwrap().name(), *name);
        }
        assert!(matches!(policy("max-min", &params), Err(AlgoError::UnknownAlgorithm(n)) if n == "max-min"));
    }

    #[test]
    fn registry_forwards_parameter_errors() {
        let params = PolicyParams { retention: 2.0, q: 100.0 };
        assert!(matches!(policy("ant-cycle", &params), Err(AlgoError::Config(_))));
        assert!(policy("stochastic-greedy", &params).is_ok());
    }
}

#[cfg(test)]
mod algorithm_tests {
    use std::sync::Arc;
    use std::thread;

    use aco_core::{Cycle, EdgeId, WorkerId};
    use aco_graph::{INITIAL_PHEROMONE, PheromoneGraph, topology};

    use crate::{AlgoError, Algorithm, AntCycle, StochasticGreedy, TerminationReason};

    fn diamond_with(max_cycles: u32) -> Algorithm {
        let graph = Arc::new(topology("diamond").unwrap());
        let destination = graph.node_id("D").unwrap();
        Algorithm::new(graph, Box::new(AntCycle::new(0.5, 100.0).unwrap()), destination, max_cycles).unwrap()
    }

    fn edge(graph: &PheromoneGraph, a: &str, b: &str) -> EdgeId {
        graph.edge_between(graph.node_id(a).unwrap(), graph.node_id(b).unwrap()).unwrap()
    }

    /// Walk `route` edge by edge, one iteration per step, then report it.
    fn walk(algo: &Algorithm, worker: &WorkerId, route: &[&str]) {
        for pair in route.windows(2) {
            algo.on_traversal(worker, edge(algo.graph(), pair[0], pair[1])).unwrap();
            assert!(!algo.advance_iteration());
        }
        algo.on_path_completed(worker, route).unwrap();
    }

    #[test]
    fn starts_in_first_cycle_without_best() {
        let algo = diamond_with(5);
        assert_eq!(algo.cycle(), Cycle::FIRST);
        assert_eq!(algo.termination(), None);
        assert!(matches!(algo.best_path(), Err(AlgoError::NotFound)));
        assert_eq!(algo.best_distance(), None);
        assert_eq!(algo.name(), "ant-cycle");
    }

    #[test]
    fn rejects_zero_cycles() {
        let graph = Arc::new(topology("diamond").unwrap());
        let d = graph.node_id("D").unwrap();
        assert!(matches!(Algorithm::new(graph, Box::new(StochasticGreedy), d, 0), Err(AlgoError::Config(_))));
    }

    #[test]
    fn quiet_iteration_closes_the_cycle() {
        let algo = diamond_with(5);
        let ant = WorkerId::new("ant-1");
        algo.on_traversal(&ant, edge(algo.graph(), "A", "B")).unwrap();
        assert!(!algo.advance_iteration());
        assert_eq!(algo.cycle(), Cycle(1));
        assert!(algo.advance_iteration());
        assert_eq!(algo.cycle(), Cycle(2));
    }

    #[test]
    fn best_path_tracks_shortest_solution() {
        let algo = diamond_with(5);
        walk(&algo, &WorkerId::new("slow"), &["A", "D", "C"]);
        assert!(matches!(algo.best_path(), Err(AlgoError::NotFound)), "A,D,C does not end at D");

        algo.on_path_completed(&WorkerId::new("long"), &["A", "D", "C", "D"]).unwrap();
        assert_eq!(algo.best_distance(), Some(7.0));

        algo.on_path_completed(&WorkerId::new("short"), &["A", "B", "C", "D"]).unwrap();
        let best = algo.best_path().unwrap();
        assert_eq!(best.label(), "A, B, C, D");
        assert_eq!(best.total_distance(), 3.0);
    }

    #[test]
    fn equal_length_solution_keeps_incumbent() {
        let mut b = aco_graph::GraphBuilder::new("square");
        for name in ["S", "L", "R", "T"] {
            b.add_node(name).unwrap();
        }
        b.add_road("S", "L", 1.0).unwrap();
        b.add_road("L", "T", 1.0).unwrap();
        b.add_road("S", "R", 1.0).unwrap();
        b.add_road("R", "T", 1.0).unwrap();
        let graph = Arc::new(b.build());
        let t = graph.node_id("T").unwrap();
        let algo = Algorithm::new(graph, Box::new(StochasticGreedy), t, 5).unwrap();

        algo.on_path_completed(&WorkerId::new("left"), &["S", "L", "T"]).unwrap();
        algo.on_path_completed(&WorkerId::new("right"), &["S", "R", "T"]).unwrap();
        assert_eq!(algo.best_path().unwrap().label(), "S, L, T");
    }

    #[test]
    fn only_first_completion_counts() {
        let algo = diamond_with(5);
        let ant = WorkerId::new("ant");
        assert!(algo.on_path_completed(&ant, &["A", "D", "C", "D"]).unwrap());
        assert!(!algo.on_path_completed(&ant, &["A", "B", "C", "D"]).unwrap());
        assert_eq!(algo.best_distance(), Some(7.0));

        // A new cycle lets the worker report again.
        assert!(algo.advance_iteration());
        assert!(algo.on_path_completed(&ant, &["A", "B", "C", "D"]).unwrap());
        assert_eq!(algo.best_distance(), Some(3.0));
    }

    #[test]
    fn invalid_paths_leave_state_untouched() {
        let algo = diamond_with(5);
        let ant = WorkerId::new("ant");
        assert!(matches!(algo.on_path_completed(&ant, &["A", "C", "D"]), Err(AlgoError::InvalidPath(_))));
        assert!(matches!(algo.on_path_completed(&ant, &["A", "Z"]), Err(AlgoError::InvalidPath(_))));
        assert!(matches!(algo.on_path_completed(&ant, &["A", "D"]), Err(AlgoError::InvalidPath(_))));
        assert!(matches!(algo.on_traversal(&ant, EdgeId(99)), Err(AlgoError::UnknownEdge(_))));

        // The failed reports did not consume the worker's completion.
        assert!(algo.on_path_completed(&ant, &["A", "B", "C", "D"]).unwrap());
    }

    #[test]
    fn cycle_boundary_applies_policy_to_solutions() {
        let algo = diamond_with(5);
        walk(&algo, &WorkerId::new("ant"), &["A", "B", "C", "D"]);
        assert!(algo.advance_iteration());

        let graph = algo.graph();
        let used = 0.5 * INITIAL_PHEROMONE + 100.0 / 3.0;
        assert!((graph.pheromone(edge(graph, "A", "B")).unwrap() - used).abs() < 1e-9);
        assert!((graph.pheromone(edge(graph, "C", "D")).unwrap() - used).abs() < 1e-9);
        assert!(graph.pheromone(edge(graph, "A", "D")).unwrap() < INITIAL_PHEROMONE);
    }

    #[test]
    fn cycles_exhaust_at_max() {
        let algo = diamond_with(3);
        let ants = [WorkerId::new("a"), WorkerId::new("b")];
        let routes: [&[&str]; 2] = [&["A", "B", "C", "D"], &["A", "D", "C", "B"]];

        for round in 1..=3u32 {
            assert_eq!(algo.termination(), None, "still running in cycle {round}");
            for (ant, route) in ants.iter().zip(routes) {
                algo.on_path_completed(ant, route).unwrap();
            }
            assert!(algo.advance_iteration());
        }
        assert_eq!(algo.termination(), Some(TerminationReason::CyclesExhausted));
        assert_eq!(algo.cycle(), Cycle(4));
    }

    #[test]
    fn identical_reports_stagnate_after_first_cycle() {
        let algo = diamond_with(10);
        let ants: Vec<_> = (0..3).map(|i| WorkerId::new(format!("ant-{i}"))).collect();

        for ant in &ants {
            algo.on_path_completed(ant, &["A", "B", "C", "D"]).unwrap();
        }
        assert!(algo.advance_iteration());
        assert_eq!(algo.termination(), None, "the first cycle never stagnates");

        for ant in &ants {
            algo.on_path_completed(ant, &["A", "B", "C", "D"]).unwrap();
        }
        assert!(algo.advance_iteration());
        assert_eq!(algo.termination(), Some(TerminationReason::Stagnation));
    }

    #[test]
    fn single_report_does_not_stagnate() {
        let algo = diamond_with(10);
        let ant = WorkerId::new("solo");
        for _ in 0..3 {
            algo.on_path_completed(&ant, &["A", "B", "C", "D"]).unwrap();
            assert!(algo.advance_iteration());
        }
        assert_eq!(algo.termination(), None);
    }

    #[test]
    fn reversed_paths_differ() {
        let algo = diamond_with(10);
        for _ in 0..2 {
            algo.on_path_completed(&WorkerId::new("fwd"), &["A", "B", "C", "D"]).unwrap();
            algo.on_path_completed(&WorkerId::new("rev"), &["D", "C", "B", "A"]).unwrap();
            algo.advance_iteration();
        }
        assert_eq!(algo.termination(), None);
    }

    #[test]
    fn departed_worker_no_longer_holds_cycle_open() {
        let algo = diamond_with(5);
        let ant = WorkerId::new("ant");
        algo.on_traversal(&ant, edge(algo.graph(), "A", "B")).unwrap();
        algo.on_worker_removed(&ant);
        assert!(algo.advance_iteration());
    }

    #[test]
    fn concurrent_reports_are_all_recorded() {
        let algo = Arc::new(diamond_with(5));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let algo = Arc::clone(&algo);
                thread::spawn(move || {
                    let ant = WorkerId::new(format!("ant-{i}"));
                    let route: &[&str] = if i % 2 == 0 { &["A", "B", "C", "D"] } else { &["A", "D", "C", "D"] };
                    algo.on_path_completed(&ant, route).unwrap()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(algo.best_distance(), Some(3.0));
    }
}
