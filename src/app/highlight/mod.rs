use std::collections::HashSet;

mod collect;
mod paths;

use self::collect::collect_direct_neighbors;
use self::paths::{edges_along, route_to_center};
use super::graph::SimGraph;

/// Nodes and edges emphasized while a node is selected. Edge entries are
/// indices into `SimGraph::edges`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct HighlightState {
    pub(in crate::app) related_nodes: HashSet<usize>,
    pub(in crate::app) related_edges: HashSet<usize>,
    pub(in crate::app) center_path_nodes: HashSet<usize>,
    pub(in crate::app) center_path_edges: HashSet<usize>,
}

impl HighlightState {
    pub(in crate::app) fn node_emphasis(&self, index: usize) -> bool {
        self.related_nodes.contains(&index) || self.center_path_nodes.contains(&index)
    }

    pub(in crate::app) fn edge_emphasis(&self, edge: usize) -> bool {
        self.related_edges.contains(&edge) || self.center_path_edges.contains(&edge)
    }
}

pub(in crate::app) fn build_highlight_state(graph: &SimGraph, selected_id: &str) -> Option<HighlightState> {
    let selected = graph.index_of(selected_id)?;

    let mut related_nodes = HashSet::from([selected]);
    let mut related_edges = HashSet::new();
    collect_direct_neighbors(graph, selected, &mut related_nodes, &mut related_edges);

    let route = graph
        .center_id()
        .and_then(|center| graph.index_of(center))
        .and_then(|center| route_to_center(graph, center, selected))
        .unwrap_or_default();
    let center_path_edges = edges_along(graph, &route);
    let center_path_nodes = route.into_iter().collect();

    Some(HighlightState {
        related_nodes,
        related_edges,
        center_path_nodes,
        center_path_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::{SnapshotMode, transform};
    use crate::source::GraphSnapshot;

    fn chain() -> SimGraph {
        let snapshot: GraphSnapshot = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "a", "type": "function"},
                    {"id": "b", "type": "function"},
                    {"id": "c", "type": "function"},
                    {"id": "d", "type": "function"},
                    {"id": "e", "type": "document"}
                ],
                "edges": [
                    {"source": "a", "target": "b", "type": "CALLS"},
                    {"source": "c", "target": "b", "type": "CALLS"},
                    {"source": "c", "target": "d", "type": "CALLS"},
                    {"source": "e", "target": "d", "type": "DOCUMENTS"}
                ]
            }"#,
        )
        .unwrap();
        transform(&snapshot.nodes, &snapshot.edges)
    }

    #[test]
    fn selection_highlights_both_directions() {
        let graph = chain();
        let state = build_highlight_state(&graph, "b").unwrap();

        assert_eq!(state.related_nodes, HashSet::from([0, 1, 2]));
        assert_eq!(state.related_edges, HashSet::from([0, 1]));
        assert!(state.center_path_nodes.is_empty());
        assert!(build_highlight_state(&graph, "ghost").is_none());
    }

    #[test]
    fn focused_mode_traces_path_from_center() {
        let graph = chain().with_mode(SnapshotMode::Focused {
            center: "a".to_owned(),
        });
        let state = build_highlight_state(&graph, "e").unwrap();

        assert_eq!(state.center_path_nodes, HashSet::from([0, 1, 2, 3, 4]));
        assert_eq!(state.center_path_edges, HashSet::from([0, 1, 2, 3]));
        assert!(state.edge_emphasis(0));
        assert!(!state.related_edges.contains(&0));
    }
}
