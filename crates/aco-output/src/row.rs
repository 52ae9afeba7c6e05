//! Plain data row types written by output backends.

/// State of the colony at one cycle boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummaryRow {
    pub cycle:         u32,
    /// Tick that closed the cycle.
    pub tick:          u64,
    pub population:    u64,
    /// Length of the best path so far; `None` before the first solution.
    pub best_distance: Option<f64>,
    /// Node names of the best path, comma separated.
    pub best_path:     Option<String>,
    /// Set on the boundary at which the algorithm terminated.
    pub termination:   Option<String>,
}

/// Pheromone on one edge after a cycle's update.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneRow {
    pub cycle:     u32,
    pub from:      String,
    pub to:        String,
    pub distance:  f64,
    pub pheromone: f64,
}
