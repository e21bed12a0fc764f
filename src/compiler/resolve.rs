use crate::graph::{Graph, Node, NodeId, PortId};
use ahash::AHashMap;
use itertools::Itertools;

/// Resolves port-based connections into label-based `next`/`previous` lists.
pub(super) struct ConnectionResolver<'a> {
    labels: AHashMap<&'a NodeId, &'a str>,
    /// source port -> target nodes, in edge order
    downstream: AHashMap<&'a PortId, Vec<&'a NodeId>>,
    /// target port -> source nodes, in edge order
    upstream: AHashMap<&'a PortId, Vec<&'a NodeId>>,
}

impl<'a> ConnectionResolver<'a> {
    pub(super) fn new(graph: &'a Graph) -> Self {
        let labels = graph
            .nodes()
            .iter()
            .map(|n| (n.id(), n.label.as_str()))
            .collect();

        let mut downstream: AHashMap<&PortId, Vec<&NodeId>> = AHashMap::new();
        let mut upstream: AHashMap<&PortId, Vec<&NodeId>> = AHashMap::new();
        for edge in graph.edges() {
            downstream
                .entry(edge.source_port())
                .or_default()
                .push(edge.target());
            upstream
                .entry(edge.target_port())
                .or_default()
                .push(edge.source());
        }

        Self {
            labels,
            downstream,
            upstream,
        }
    }

    pub(super) fn next(&self, node: &Node) -> Vec<String> {
        self.names_on(&self.downstream, node.output_port())
    }

    pub(super) fn previous(&self, node: &Node) -> Vec<String> {
        self.names_on(&self.upstream, node.input_port())
    }

    fn names_on(
        &self,
        connections: &AHashMap<&'a PortId, Vec<&'a NodeId>>,
        port: Option<&PortId>,
    ) -> Vec<String> {
        let Some(peers) = port.and_then(|p| connections.get(p)) else {
            return Vec::new();
        };
        peers
            .iter()
            // Edges to nodes that no longer exist are dropped.
            .filter_map(|id| self.labels.get(id).copied())
            .unique()
            .map(str::to_string)
            .collect()
    }
}
