//! Dependency graph over model entities.
//!
//! # Edge Direction
//!
//! ```text
//! A → B  means  "B depends on A"  (A is a precedent of B)
//! ```
//!
//! This makes "what breaks if I change X?" trivial: follow outgoing edges.
//! Units are not nodes; they are static lookups and cannot form cycles.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::ModelError;

/// Identifies one entity node in the evaluation graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Constant(String),
    Calculation(String),
    Instance(String),
    Claim(String),
    Question(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(id) => write!(f, "constant:{id}"),
            Self::Calculation(id) => write!(f, "calculation:{id}"),
            Self::Instance(id) => write!(f, "instance:{id}"),
            Self::Claim(id) => write!(f, "claim:{id}"),
            Self::Question(id) => write!(f, "question:{id}"),
        }
    }
}

/// Dependency graph with bidirectional adjacency.
///
/// # Invariants
///
/// 1. **Bidirectional consistency:** If A ∈ preds[B] then B ∈ succs[A], and vice versa.
/// 2. **No dangling entries:** Empty sets are removed, not stored.
/// 3. **No duplicate edges:** Set semantics enforced by FxHashSet.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    /// For each node B, the nodes A it depends on.
    preds: FxHashMap<NodeId, FxHashSet<NodeId>>,
    /// For each node A, the nodes B that depend on it.
    succs: FxHashMap<NodeId, FxHashSet<NodeId>>,
    /// All registered nodes, including ones with no edges.
    nodes: BTreeSet<NodeId>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with the given precedents. Replaces prior edges.
    pub fn insert(&mut self, node: NodeId, new_preds: impl IntoIterator<Item = NodeId>) {
        if let Some(old_preds) = self.preds.remove(&node) {
            for pred in old_preds {
                if let Some(deps) = self.succs.get_mut(&pred) {
                    deps.remove(&node);
                    if deps.is_empty() {
                        self.succs.remove(&pred);
                    }
                }
            }
        }

        let new_preds: FxHashSet<NodeId> = new_preds.into_iter().collect();
        for pred in &new_preds {
            self.nodes.insert(pred.clone());
            self.succs.entry(pred.clone()).or_default().insert(node.clone());
        }
        if !new_preds.is_empty() {
            self.preds.insert(node.clone(), new_preds);
        }
        self.nodes.insert(node);
    }

    /// The nodes this node directly depends on.
    pub fn precedents(&self, node: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.preds.get(node).into_iter().flat_map(|s| s.iter())
    }

    /// The nodes that directly depend on this node.
    pub fn dependents(&self, node: &NodeId) -> impl Iterator<Item = &NodeId> {
        self.succs.get(node).into_iter().flat_map(|s| s.iter())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Everything transitively downstream of `node`, sorted. This is the set
    /// an input edit can change; nothing outside it may move.
    pub fn reachable_dependents(&self, node: &NodeId) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<&NodeId> = self.dependents(node).collect();
        while let Some(next) = stack.pop() {
            if out.insert(next.clone()) {
                stack.extend(self.dependents(next));
            }
        }
        out
    }

    /// Topological order of all nodes via Kahn's algorithm.
    ///
    /// Ready nodes are drained in sorted order for determinism. Fails with
    /// `CyclicDependency` naming the nodes left unordered.
    pub fn topo_order(&self) -> Result<Vec<NodeId>, ModelError> {
        let mut in_degree: FxHashMap<&NodeId, usize> = self
            .nodes
            .iter()
            .map(|n| (n, self.preds.get(n).map_or(0, |p| p.len())))
            .collect();

        let mut ready: BTreeSet<&NodeId> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for dep in self.dependents(node) {
                let d = in_degree.get_mut(dep).map(|d| {
                    *d -= 1;
                    *d
                });
                if d == Some(0) {
                    ready.insert(dep);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let ordered: FxHashSet<&NodeId> = order.iter().collect();
            let cycle: Vec<String> = self
                .nodes
                .iter()
                .filter(|n| !ordered.contains(n))
                .map(|n| n.to_string())
                .collect();
            return Err(ModelError::CyclicDependency { nodes: cycle });
        }

        Ok(order)
    }
}
