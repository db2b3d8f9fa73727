use std::collections::{HashSet, VecDeque};

use super::super::graph::SimGraph;

/// Node indices on a shortest undirected route from `target` back to
/// `center`, both ends included. `None` when they are disconnected.
pub(super) fn route_to_center(graph: &SimGraph, center: usize, target: usize) -> Option<Vec<usize>> {
    let count = graph.nodes.len();
    if center >= count || target >= count {
        return None;
    }

    let mut came_from = vec![usize::MAX; count];
    came_from[center] = center;
    let mut frontier = VecDeque::from([center]);
    while let Some(node) = frontier.pop_front() {
        if node == target {
            break;
        }
        for &next in &graph.neighbors[node] {
            if came_from[next] == usize::MAX {
                came_from[next] = node;
                frontier.push_back(next);
            }
        }
    }

    if came_from[target] == usize::MAX {
        return None;
    }
    let mut route = vec![target];
    let mut cursor = target;
    while cursor != center {
        cursor = came_from[cursor];
        route.push(cursor);
    }
    Some(route)
}

/// Every edge joining two consecutive nodes of `route`, in either direction.
pub(super) fn edges_along(graph: &SimGraph, route: &[usize]) -> HashSet<usize> {
    let hops = route
        .windows(2)
        .map(|hop| (hop[0].min(hop[1]), hop[0].max(hop[1])))
        .collect::<HashSet<_>>();

    graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| {
            let key = (edge.source.min(edge.target), edge.source.max(edge.target));
            hops.contains(&key)
        })
        .map(|(index, _)| index)
        .collect()
}
