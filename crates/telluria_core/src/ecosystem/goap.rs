//! Goal-oriented action planning: A* over predicate world-states.
//!
//! State is a `{predicate → literal}` map with a canonical sorted-key
//! serialisation used to key the closed set, so revisiting a state at
//! higher cost is discarded and effect cycles cannot loop the search.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoapError {
    #[error("unsupported literal shape: {0}")]
    UnsupportedLiteral(String),
}

/// The only value shapes a predicate may take.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Literal {
    /// Accepts booleans, integers and strings; everything else is
    /// rejected at construction.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, GoapError> {
        match value {
            serde_json::Value::Bool(b) => Ok(Literal::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Literal::Int)
                .ok_or_else(|| GoapError::UnsupportedLiteral(n.to_string())),
            serde_json::Value::String(s) => Ok(Literal::Str(s.clone())),
            other => Err(GoapError::UnsupportedLiteral(other.to_string())),
        }
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Int(i)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

/// Sorted keys make serialisation canonical for free.
pub type WorldState = BTreeMap<String, Literal>;

pub fn state_of<const N: usize>(pairs: [(&str, Literal); N]) -> WorldState {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoapAction {
    pub name: String,
    pub cost: f64,
    pub preconditions: WorldState,
    pub effects: WorldState,
}

impl GoapAction {
    pub fn new(
        name: impl Into<String>,
        cost: f64,
        preconditions: WorldState,
        effects: WorldState,
    ) -> Self {
        Self {
            name: name.into(),
            cost,
            preconditions,
            effects,
        }
    }

    fn applicable(&self, state: &WorldState) -> bool {
        self.preconditions
            .iter()
            .all(|(k, v)| state.get(k) == Some(v))
    }

    fn apply(&self, state: &WorldState) -> WorldState {
        let mut next = state.clone();
        for (k, v) in &self.effects {
            next.insert(k.clone(), v.clone());
        }
        next
    }
}

fn satisfies(state: &WorldState, goal: &WorldState) -> bool {
    goal.iter().all(|(k, v)| state.get(k) == Some(v))
}

fn canonical_key(state: &WorldState) -> String {
    serde_json::to_string(state).unwrap_or_default()
}

struct OpenNode {
    f: f64,
    g: f64,
    state: WorldState,
    path: Vec<usize>,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap on f.
        other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cap on node expansions before the search gives up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 10_000;

/// A* from `start` to any state satisfying every goal predicate.
/// Returns the cheapest action sequence found, or empty when no plan
/// exists within the expansion budget.
pub fn plan(start: &WorldState, goal: &WorldState, actions: &[GoapAction]) -> Vec<GoapAction> {
    plan_with_budget(start, goal, actions, DEFAULT_MAX_EXPANSIONS)
}

pub fn plan_with_budget(
    start: &WorldState,
    goal: &WorldState,
    actions: &[GoapAction],
    max_expansions: usize,
) -> Vec<GoapAction> {
    if satisfies(start, goal) {
        return Vec::new();
    }
    // Trivially positive heuristic: one cheapest action still to pay.
    let min_cost = actions
        .iter()
        .map(|a| a.cost)
        .fold(f64::INFINITY, f64::min);
    if !min_cost.is_finite() {
        return Vec::new();
    }
    let h = |state: &WorldState| if satisfies(state, goal) { 0.0 } else { min_cost };

    let mut open = BinaryHeap::new();
    let mut best_cost: HashMap<String, f64> = HashMap::new();
    best_cost.insert(canonical_key(start), 0.0);
    open.push(OpenNode {
        f: h(start),
        g: 0.0,
        state: start.clone(),
        path: Vec::new(),
    });

    let mut expansions = 0;
    while let Some(node) = open.pop() {
        if satisfies(&node.state, goal) {
            return node.path.iter().map(|&i| actions[i].clone()).collect();
        }
        expansions += 1;
        if expansions > max_expansions {
            tracing::warn!(max_expansions, "plan search exhausted its budget");
            return Vec::new();
        }

        for (i, action) in actions.iter().enumerate() {
            if !action.applicable(&node.state) {
                continue;
            }
            let next_state = action.apply(&node.state);
            let g = node.g + action.cost;
            let key = canonical_key(&next_state);
            // Discard revisits that are no cheaper.
            if best_cost.get(&key).map(|&c| g >= c).unwrap_or(false) {
                continue;
            }
            best_cost.insert(key, g);
            let mut path = node.path.clone();
            path.push(i);
            open.push(OpenNode {
                f: g + h(&next_state),
                g,
                state: next_state,
                path,
            });
        }
    }
    Vec::new()
}
