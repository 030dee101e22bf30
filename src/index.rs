//! Parent/child indexes over a [`ComputeGraph`].
//!
//! [`TreeIndex`] is built in one pass over the edges and answers the structural questions the
//! engine and the path aggregators keep asking: who is this node's parent, through which edge,
//! and what are its children. Ornamental nodes and arrow edges never enter the index.
//!
//! The index enforces the tree shape. An edge whose endpoint is missing is recorded as dangling;
//! a second incoming edge to a node that already has a parent is recorded as conflicting. Neither
//! kind enters the maps, so every indexed node has at most one parent and a walk from a root can
//! never come back to a node it already visited.

use parking_lot::RwLock;
use petgraph::{algo::tarjan_scc, graph::DiGraph};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use crate::{
    compute::ComputeGraph,
    properties::{EdgeId, NodeId},
};

/// Caller-supplied identity of a tree state. Equal revisions must mean equal structure.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(&self) -> Revision {
        Revision(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeIndex {
    children: BTreeMap<NodeId, Vec<(EdgeId, NodeId)>>,
    parents: BTreeMap<NodeId, NodeId>,
    incoming: BTreeMap<NodeId, EdgeId>,
    roots: Vec<NodeId>,
    dangling: Vec<(EdgeId, NodeId)>,
    conflicting: Vec<(EdgeId, NodeId)>,
    cycles: Vec<Vec<NodeId>>,
}

impl TreeIndex {
    pub fn build(graph: &ComputeGraph) -> TreeIndex {
        let mut index = TreeIndex::default();
        let mut structural = Vec::new();

        for (edge_id, edge) in graph.edges.iter() {
            if edge.kind.is_ornamental() {
                continue;
            }
            let source = graph.nodes.get(&edge.source);
            let target = graph.nodes.get(&edge.target);
            let (source, target) = match (source, target) {
                (Some(source), Some(target)) => (source, target),
                (None, _) => {
                    index.dangling.push((edge_id.clone(), edge.source.clone()));
                    continue;
                }
                (_, None) => {
                    index.dangling.push((edge_id.clone(), edge.target.clone()));
                    continue;
                }
            };
            if source.kind.is_ornamental() || target.kind.is_ornamental() {
                continue;
            }
            structural.push((edge.source.clone(), edge.target.clone()));

            if index.parents.contains_key(&edge.target) {
                index
                    .conflicting
                    .push((edge_id.clone(), edge.target.clone()));
                continue;
            }
            index
                .parents
                .insert(edge.target.clone(), edge.source.clone());
            index
                .incoming
                .insert(edge.target.clone(), edge_id.clone());
            index
                .children
                .entry(edge.source.clone())
                .or_default()
                .push((edge_id.clone(), edge.target.clone()));
        }

        index.roots = graph
            .nodes
            .values()
            .filter(|node| !node.kind.is_ornamental() && !index.parents.contains_key(&node.id))
            .map(|node| node.id.clone())
            .collect();
        index.cycles = find_cycles(&structural);
        index
    }

    /// Nodes with no incoming structural edge, in id order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, node: &str) -> &[(EdgeId, NodeId)] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_nodes<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.children(node).iter().map(|(_, child)| child)
    }

    pub fn is_leaf(&self, node: &str) -> bool {
        self.children(node).is_empty()
    }

    pub fn parent(&self, node: &str) -> Option<&NodeId> {
        self.parents.get(node)
    }

    /// The unique indexed edge leading into `node`.
    pub fn parent_edge(&self, node: &str) -> Option<&EdgeId> {
        self.incoming.get(node)
    }

    /// Edges skipped because an endpoint is missing, with the missing node id.
    pub fn dangling(&self) -> &[(EdgeId, NodeId)] {
        &self.dangling
    }

    /// Edges skipped because their target already had a parent.
    pub fn conflicting(&self) -> &[(EdgeId, NodeId)] {
        &self.conflicting
    }

    /// Node sets forming a directed cycle among the structural edges, including the conflicting
    /// ones.
    pub fn cycles(&self) -> &[Vec<NodeId>] {
        &self.cycles
    }
}

fn find_cycles(edges: &[(NodeId, NodeId)]) -> Vec<Vec<NodeId>> {
    let mut graph = DiGraph::<NodeId, ()>::new();
    let mut id_to_index = BTreeMap::new();
    for (source, sink) in edges.iter() {
        for id in [source, sink] {
            if !id_to_index.contains_key(id) {
                let index = graph.add_node(id.clone());
                id_to_index.insert(id.clone(), index);
            }
        }
    }
    let mut self_loops = BTreeSet::new();
    for (source, sink) in edges.iter() {
        if source == sink {
            self_loops.insert(source.clone());
        }
        graph.add_edge(id_to_index[source], id_to_index[sink], ());
    }

    let mut cycles = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || self_loops.contains(&graph[component[0]])
        })
        .map(|component| {
            let mut ids = component
                .into_iter()
                .map(|idx| graph[idx].clone())
                .collect::<Vec<_>>();
            ids.sort();
            ids
        })
        .collect::<Vec<_>>();
    cycles.sort();
    cycles
}

/// Holds the index for the most recent [`Revision`]. Asking for the same revision again returns
/// the shared index; any other revision rebuilds it.
#[derive(Debug, Default)]
pub struct IndexCache {
    slot: RwLock<Option<(Revision, Arc<TreeIndex>)>>,
}

impl IndexCache {
    pub fn new() -> Self {
        IndexCache::default()
    }

    pub fn get_or_build(&self, revision: Revision, graph: &ComputeGraph) -> Arc<TreeIndex> {
        if let Some((cached, index)) = self.slot.read().as_ref() {
            if *cached == revision {
                return index.clone();
            }
        }
        tracing::debug!("Building tree index for {:?}", revision);
        let index = Arc::new(TreeIndex::build(graph));
        *self.slot.write() = Some((revision, index.clone()));
        index
    }

    pub fn revision(&self) -> Option<Revision> {
        self.slot.read().as_ref().map(|(revision, _)| *revision)
    }

    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}
