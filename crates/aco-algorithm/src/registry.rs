//! Algorithm registry: a fixed table from name to policy factory.

use crate::{AlgoError, AlgoResult, AntCycle, PheromonePolicy, PolicyParams, StochasticGreedy};

type Factory = fn(&PolicyParams) -> AlgoResult<Box<dyn PheromonePolicy>>;

/// Every registered algorithm.
pub const ALGORITHMS: &[(&str, Factory)] = &[
    ("ant-cycle", |params| Ok(Box::new(AntCycle::from_params(params)?))),
    ("stochastic-greedy", |_| Ok(Box::new(StochasticGreedy))),
];

/// Build the policy registered as `name`.
pub fn policy(name: &str, params: &PolicyParams) -> AlgoResult<Box<dyn PheromonePolicy>> {
    let (_, factory) = ALGORITHMS
        .iter()
        .find(|(key, _)| *key == name)
        .ok_or_else(|| AlgoError::UnknownAlgorithm(name.to_owned()))?;
    factory(params)
}
