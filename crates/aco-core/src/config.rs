//! Colony configuration and its parameter table.
//!
//! Parameters arrive as `name = value` strings (or positionally, in the
//! order of [`POSITIONAL`]).  Each known name maps to a pure validator that
//! parses the raw value and stores it in a [`ColonyConfig`].  Names that refer
//! to registries (topology, start/destination nodes, algorithm) are only
//! checked for shape here; `aco-sim` resolves them when the colony is built.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::{AcoError, AcoResult};

// ── ColonyConfig ──────────────────────────────────────────────────────────────

/// Everything needed to build a colony.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColonyConfig {
    /// Registered topology name.
    pub topology: String,

    /// Node every worker starts each cycle from.
    pub start: String,

    /// Node that ends a solution path.  Must differ from `start`.
    pub destination: String,

    /// The colony terminates once this many cycles have closed.
    pub max_cycles: u32,

    /// Pheromone retention factor ρ in `[0, 1]` (1 − evaporation rate).
    pub retention: f64,

    /// Pheromone exponent α in the workers' transition rule.
    pub alpha: f64,

    /// Visibility (1 / distance) exponent β in the workers' transition rule.
    pub beta: f64,

    /// Pheromone deposit constant Q.
    pub q: f64,

    /// Registered algorithm name.
    pub algorithm: String,

    /// Idle time without a new arrival after which the first tick fires.
    pub arrival_idle_timeout: Duration,

    /// Target wall-clock period of one tick.  Zero runs ticks back to back.
    pub tick_period: Duration,

    /// Upper bound on one response wait.  `None` waits indefinitely.
    pub response_timeout: Option<Duration>,

    /// Interval after which the action barrier logs that it is still waiting.
    pub action_deadline: Duration,

    /// Threads in the action execution pool.
    pub action_threads: usize,

    /// Root seed handed to worker RNGs.
    pub seed: u64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            topology:             "romania".into(),
            start:                "Arad".into(),
            destination:          "Bucharest".into(),
            max_cycles:           30,
            retention:            0.5,
            alpha:                1.0,
            beta:                 1.0,
            q:                    100.0,
            algorithm:            "ant-cycle".into(),
            arrival_idle_timeout: Duration::from_secs(5),
            tick_period:          Duration::ZERO,
            response_timeout:     Some(Duration::from_secs(10)),
            action_deadline:      Duration::from_secs(30),
            action_threads:       4,
            seed:                 42,
        }
    }
}

impl ColonyConfig {
    /// Apply one `name = raw` parameter through the [`PARAMETERS`] table.
    pub fn set(&mut self, name: &str, raw: &str) -> AcoResult<()> {
        let param = PARAMETERS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| AcoError::UnknownParameter(name.to_owned()))?;
        (param.apply)(self, raw.trim())
    }

    /// Start from defaults and apply every pair in order.
    pub fn from_pairs<I, N, V>(pairs: I) -> AcoResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (name, raw) in pairs {
            config.set(name.as_ref(), raw.as_ref())?;
        }
        Ok(config)
    }

    /// Start from defaults and apply values in [`POSITIONAL`] order.
    ///
    /// Fewer values than positions leaves the trailing parameters at their
    /// defaults.
    pub fn from_positional<S: AsRef<str>>(values: &[S]) -> AcoResult<Self> {
        if values.len() > POSITIONAL.len() {
            return Err(AcoError::TooManyParameters {
                expected: POSITIONAL.len(),
                got:      values.len(),
            });
        }
        Self::from_pairs(POSITIONAL.iter().zip(values))
    }

    /// Cross-field checks that no single parameter validator can make.
    pub fn validate(&self) -> AcoResult<()> {
        if self.start == self.destination {
            return Err(AcoError::Config {
                param:  "destination",
                reason: format!("must differ from start node `{}`", self.start),
            });
        }
        Ok(())
    }
}

// ── Parameter table ───────────────────────────────────────────────────────────

/// One configurable parameter: its name and a validating setter.
#[derive(Clone, Copy)]
pub struct Parameter {
    pub name:  &'static str,
    pub apply: fn(&mut ColonyConfig, &str) -> AcoResult<()>,
}

/// Order in which positional parameters are interpreted.
pub const POSITIONAL: &[&str] = &[
    "topology",
    "start",
    "destination",
    "max_cycles",
    "retention",
    "alpha",
    "beta",
    "q",
    "algorithm",
    "arrival_wait_secs",
    "tick_period_ms",
    "response_wait_secs",
];

/// Every parameter a [`ColonyConfig`] accepts.
pub const PARAMETERS: &[Parameter] = &[
    Parameter { name: "topology", apply: |c, raw| {
        c.topology = non_empty("topology", raw)?;
        Ok(())
    }},
    Parameter { name: "start", apply: |c, raw| {
        c.start = non_empty("start", raw)?;
        Ok(())
    }},
    Parameter { name: "destination", apply: |c, raw| {
        c.destination = non_empty("destination", raw)?;
        Ok(())
    }},
    Parameter { name: "max_cycles", apply: |c, raw| {
        c.max_cycles = parse_checked("max_cycles", raw, |v: &u32| *v > 0, "must be greater than 0")?;
        Ok(())
    }},
    Parameter { name: "retention", apply: |c, raw| {
        c.retention = parse_checked("retention", raw, |v: &f64| (0.0..=1.0).contains(v), "must be in [0, 1]")?;
        Ok(())
    }},
    Parameter { name: "alpha", apply: |c, raw| {
        c.alpha = parse_checked("alpha", raw, non_negative, "must be finite and >= 0")?;
        Ok(())
    }},
    Parameter { name: "beta", apply: |c, raw| {
        c.beta = parse_checked("beta", raw, non_negative, "must be finite and >= 0")?;
        Ok(())
    }},
    Parameter { name: "q", apply: |c, raw| {
        c.q = parse_checked("q", raw, |v: &f64| v.is_finite() && *v > 0.0, "must be finite and > 0")?;
        Ok(())
    }},
    Parameter { name: "algorithm", apply: |c, raw| {
        c.algorithm = non_empty("algorithm", raw)?;
        Ok(())
    }},
    Parameter { name: "arrival_wait_secs", apply: |c, raw| {
        let secs = parse_checked("arrival_wait_secs", raw, |v: &f64| v.is_finite() && *v > 0.0, "must be > 0")?;
        c.arrival_idle_timeout = seconds("arrival_wait_secs", secs)?;
        Ok(())
    }},
    Parameter { name: "tick_period_ms", apply: |c, raw| {
        let ms: u64 = parse_checked("tick_period_ms", raw, |_| true, "")?;
        c.tick_period = Duration::from_millis(ms);
        Ok(())
    }},
    Parameter { name: "response_wait_secs", apply: |c, raw| {
        let secs = parse_checked("response_wait_secs", raw, non_negative, "must be >= 0")?;
        c.response_timeout = if secs > 0.0 { Some(seconds("response_wait_secs", secs)?) } else { None };
        Ok(())
    }},
    Parameter { name: "action_deadline_secs", apply: |c, raw| {
        let secs = parse_checked("action_deadline_secs", raw, |v: &f64| v.is_finite() && *v > 0.0, "must be > 0")?;
        c.action_deadline = seconds("action_deadline_secs", secs)?;
        Ok(())
    }},
    Parameter { name: "action_threads", apply: |c, raw| {
        c.action_threads = parse_checked("action_threads", raw, |v: &usize| *v > 0, "must be at least 1")?;
        Ok(())
    }},
    Parameter { name: "seed", apply: |c, raw| {
        c.seed = parse_checked("seed", raw, |_| true, "")?;
        Ok(())
    }},
];

// ── Validator helpers ─────────────────────────────────────────────────────────

fn non_negative(v: &f64) -> bool {
    v.is_finite() && *v >= 0.0
}

fn non_empty(param: &'static str, raw: &str) -> AcoResult<String> {
    if raw.is_empty() {
        return Err(AcoError::Config { param, reason: "must not be empty".into() });
    }
    Ok(raw.to_owned())
}

/// Convert a validated seconds value, rejecting ones no `Duration` can hold.
fn seconds(param: &'static str, secs: f64) -> AcoResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| AcoError::Config { param, reason: format!("{secs}: {e}") })
}

fn parse_checked<T>(
    param:  &'static str,
    raw:    &str,
    check:  impl Fn(&T) -> bool,
    reason: &str,
) -> AcoResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = raw
        .parse::<T>()
        .map_err(|e| AcoError::Config { param, reason: format!("cannot parse `{raw}`: {e}") })?;
    if !check(&value) {
        return Err(AcoError::Config { param, reason: format!("`{raw}` {reason}") });
    }
    Ok(value)
}
