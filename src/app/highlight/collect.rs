use std::collections::HashSet;

use super::super::graph::SimGraph;

const RELATED_NODE_LIMIT: usize = 280;

/// Adds `selected`'s incident edges and the nodes on their far side, both
/// directions. Stops growing once the node set reaches the limit.
pub(super) fn collect_direct_neighbors(
    graph: &SimGraph,
    selected: usize,
    nodes: &mut HashSet<usize>,
    edges: &mut HashSet<usize>,
) {
    let incident = graph.edges.iter().enumerate().filter_map(|(index, edge)| {
        match (edge.source == selected, edge.target == selected) {
            (true, _) => Some((index, edge.target)),
            (false, true) => Some((index, edge.source)),
            (false, false) => None,
        }
    });

    for (edge, other) in incident {
        if nodes.len() >= RELATED_NODE_LIMIT {
            break;
        }
        edges.insert(edge);
        nodes.insert(other);
    }
}
