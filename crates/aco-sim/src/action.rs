//! The action catalog.
//!
//! Workers submit loosely typed [`ActionDescriptor`]s; the catalog turns each
//! into a typed [`Action`] or rejects it before anything is queued.
//!
//! | Kind             | Arguments          | Effect at execution                          |
//! |------------------|--------------------|----------------------------------------------|
//! | `move_to`        | node atom          | walk the road from the current node          |
//! | `return_to_nest` | list of node atoms | report the walked path, go back to the start |
//! | `ready`          | none               | nothing; acknowledges the notice             |

use std::fmt;
use std::sync::Arc;

use aco_algorithm::Algorithm;
use aco_core::{NodeId, WorkerId};
use aco_graph::GraphError;
use tracing::debug;

use crate::{SimError, SimResult, WorkerLocator};

// ── Descriptor ────────────────────────────────────────────────────────────────

/// One argument of a submitted action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionArg {
    Atom(String),
    Number(f64),
    List(Vec<ActionArg>),
}

impl ActionArg {
    pub fn atom(name: impl Into<String>) -> Self {
        ActionArg::Atom(name.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            ActionArg::Atom(_) => "atom",
            ActionArg::Number(_) => "number",
            ActionArg::List(_) => "list",
        }
    }
}

impl fmt::Display for ActionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionArg::Atom(a) => f.write_str(a),
            ActionArg::Number(n) => write!(f, "{n}"),
            ActionArg::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// An action as a worker submits it: a kind name plus untyped arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDescriptor {
    pub name: String,
    pub args: Vec<ActionArg>,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>, args: Vec<ActionArg>) -> Self {
        Self { name: name.into(), args }
    }

    pub fn move_to(node: impl Into<String>) -> Self {
        Self::new("move_to", vec![ActionArg::atom(node)])
    }

    pub fn return_to_nest<S: AsRef<str>>(nodes: &[S]) -> Self {
        let list = nodes.iter().map(|n| ActionArg::atom(n.as_ref())).collect();
        Self::new("return_to_nest", vec![ActionArg::List(list)])
    }

    pub fn ready() -> Self {
        Self::new("ready", Vec::new())
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

// ── Typed actions ─────────────────────────────────────────────────────────────

/// A validated action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MoveTo(String),
    ReturnToNest(Vec<String>),
    Ready,
}

type Parser = fn(&[ActionArg]) -> Result<Action, String>;

/// Every recognised action kind.
pub const CATALOG: &[(&str, Parser)] = &[
    ("move_to", parse_move_to),
    ("return_to_nest", parse_return_to_nest),
    ("ready", parse_ready),
];

impl Action {
    /// Check `descriptor` against the catalog.  The error is a reason
    /// suitable for [`SimError::Protocol`].
    pub fn parse(descriptor: &ActionDescriptor) -> Result<Action, String> {
        let (_, parser) = CATALOG
            .iter()
            .find(|(name, _)| *name == descriptor.name)
            .ok_or_else(|| format!("unknown action kind `{}`", descriptor.name))?;
        parser(&descriptor.args)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::MoveTo(_) => "move_to",
            Action::ReturnToNest(_) => "return_to_nest",
            Action::Ready => "ready",
        }
    }
}

fn expect_arity(kind: &str, args: &[ActionArg], arity: usize) -> Result<(), String> {
    if args.len() == arity {
        Ok(())
    } else {
        Err(format!("`{kind}` takes {arity} argument(s), got {}", args.len()))
    }
}

fn parse_move_to(args: &[ActionArg]) -> Result<Action, String> {
    expect_arity("move_to", args, 1)?;
    match &args[0] {
        ActionArg::Atom(node) => Ok(Action::MoveTo(node.clone())),
        other => Err(format!("`move_to` expects a node atom, got a {}", other.kind())),
    }
}

fn parse_return_to_nest(args: &[ActionArg]) -> Result<Action, String> {
    expect_arity("return_to_nest", args, 1)?;
    let ActionArg::List(items) = &args[0] else {
        return Err(format!("`return_to_nest` expects a list, got a {}", args[0].kind()));
    };
    items
        .iter()
        .map(|item| match item {
            ActionArg::Atom(node) => Ok(node.clone()),
            other => Err(format!("`return_to_nest` list holds a {}, expected node atoms", other.kind())),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Action::ReturnToNest)
}

fn parse_ready(args: &[ActionArg]) -> Result<Action, String> {
    expect_arity("ready", args, 0)?;
    Ok(Action::Ready)
}

// ── Execution ─────────────────────────────────────────────────────────────────

/// The shared state an action touches when it runs on the barrier pool.
#[derive(Clone)]
pub(crate) struct ActionContext {
    pub(crate) algorithm: Arc<Algorithm>,
    pub(crate) locator:   Arc<WorkerLocator>,
    pub(crate) start:     NodeId,
}

impl ActionContext {
    pub(crate) fn execute(&self, worker: &WorkerId, action: Action) -> SimResult<()> {
        match action {
            Action::MoveTo(name) => {
                let graph = self.algorithm.graph();
                let to = graph.require_node(&name)?;
                let from = self
                    .locator
                    .position(worker)
                    .ok_or_else(|| SimError::protocol(worker, "moved while not in the colony"))?;
                let edge = graph.edge_between(from, to).ok_or_else(|| GraphError::NoEdge {
                    from: graph.node_name(from).to_owned(),
                    to:   name.clone(),
                })?;
                self.algorithm.on_traversal(worker, edge)?;
                self.locator.move_to(worker, to);
                debug!(worker = %worker, from = graph.node_name(from), to = %name, "moved");
            }
            Action::ReturnToNest(nodes) => {
                let counted = self.algorithm.on_path_completed(worker, &nodes)?;
                self.locator.move_to(worker, self.start);
                debug!(worker = %worker, steps = nodes.len(), counted, "returned to nest");
            }
            Action::Ready => {}
        }
        Ok(())
    }
}
