mod adapter;
mod pointer;
mod search;
mod view;

use eframe::egui::{Rect, Vec2, pos2};
use tracing::{debug, info};

use crate::layout::{hierarchy_ranks, rank_offsets};
use crate::source::GraphSnapshot;

pub(in crate::app) use adapter::{SimGraph, SimNode, SnapshotMode, transform};
pub(in crate::app) use search::SearchHit;
pub(in crate::app) use view::FrameOutput;

use super::highlight::{HighlightState, build_highlight_state};
use super::hit::HitSurface;
use super::interaction::LayoutMode;
use super::physics::{ForceConfig, QuadtreeCell, Simulation};
use search::SearchCache;

/// Everything that belongs to one rendered snapshot: positions, the
/// simulation moving them and the hit surface derived from them. Replaced
/// wholesale when a new snapshot is applied.
pub(in crate::app) struct GraphView {
    graph: SimGraph,
    simulation: Simulation,
    hit_surface: HitSurface,
    highlight: Option<(String, Option<HighlightState>)>,
    search: SearchCache,
    drag: Option<usize>,
    quadtree_cells: Vec<QuadtreeCell>,
    canvas_size: Vec2,
}

impl GraphView {
    pub(in crate::app) fn new(
        snapshot: &GraphSnapshot,
        mode: SnapshotMode,
        layout: LayoutMode,
        config: ForceConfig,
    ) -> Self {
        let graph = transform(&snapshot.nodes, &snapshot.edges).with_mode(mode);
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            self_loops = graph.repairs.self_loops,
            dangling_edges = graph.repairs.dangling_edges,
            duplicate_nodes = graph.repairs.duplicate_nodes,
            "snapshot applied"
        );

        let simulation = Simulation::new(&graph, config);
        let mut view = Self {
            graph,
            simulation,
            hit_surface: HitSurface::default(),
            highlight: None,
            search: SearchCache::default(),
            drag: None,
            quadtree_cells: Vec::new(),
            canvas_size: Vec2::ZERO,
        };
        view.apply_layout(layout);
        view
    }

    pub(in crate::app) fn graph(&self) -> &SimGraph {
        &self.graph
    }

    pub(in crate::app) fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub(in crate::app) fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub(in crate::app) fn search_hits(&self) -> &[SearchHit] {
        self.search.hits()
    }

    pub(in crate::app) fn refresh_search(&mut self, query: &str) {
        self.search.refresh(&self.graph, query);
    }

    pub(in crate::app) fn set_force_config(&mut self, config: ForceConfig) {
        if self.simulation.config() != config {
            self.simulation.set_config(&self.graph, config);
        }
    }

    pub(in crate::app) fn restart_layout(&mut self) {
        self.simulation.reset(&self.graph);
    }

    pub(in crate::app) fn apply_layout(&mut self, layout: LayoutMode) {
        let targets = match layout {
            LayoutMode::Force => None,
            LayoutMode::Hierarchy => {
                let edges = self
                    .graph
                    .edges
                    .iter()
                    .map(|edge| (edge.source, edge.target))
                    .collect::<Vec<_>>();
                let ranks = hierarchy_ranks(self.graph.nodes.len(), &edges);
                debug!(
                    levels = ranks.iter().copied().max().map_or(0, |rank| rank + 1),
                    "hierarchy ranks computed"
                );
                Some(rank_offsets(&ranks))
            }
        };
        self.simulation.set_rank_targets(targets);
    }

    /// World-space box around every finite node including its radius.
    pub(in crate::app) fn world_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for node in self.graph.nodes.iter().filter(|node| node.is_finite()) {
            let extent = Vec2::splat(node.size);
            let node_rect = Rect::from_min_max(
                pos2(node.pos.x, node.pos.y) - extent,
                pos2(node.pos.x, node.pos.y) + extent,
            );
            bounds = Some(bounds.map_or(node_rect, |current| current.union(node_rect)));
        }
        bounds
    }

    fn refresh_highlight(&mut self, selected: Option<&str>) {
        let Some(selected) = selected else {
            self.highlight = None;
            return;
        };
        if self
            .highlight
            .as_ref()
            .is_some_and(|(cached, _)| cached == selected)
        {
            return;
        }
        let state = build_highlight_state(&self.graph, selected);
        self.highlight = Some((selected.to_owned(), state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EntityType, demo_graph};

    fn demo_view(layout: LayoutMode) -> GraphView {
        let snapshot = demo_graph().sample(EntityType::Function, 40, None);
        GraphView::new(
            &snapshot,
            SnapshotMode::Sample,
            layout,
            ForceConfig::default(),
        )
    }

    #[test]
    fn bounds_cover_every_node_circle() {
        let view = demo_view(LayoutMode::Force);
        let bounds = view.world_bounds().unwrap();
        for node in &view.graph().nodes {
            assert!(bounds.left() <= node.pos.x - node.size + 1e-3);
            assert!(bounds.right() >= node.pos.x + node.size - 1e-3);
            assert!(bounds.top() <= node.pos.y - node.size + 1e-3);
            assert!(bounds.bottom() >= node.pos.y + node.size - 1e-3);
        }
    }

    #[test]
    fn hierarchy_layout_levels_nodes_after_a_tick() {
        let mut view = demo_view(LayoutMode::Hierarchy);
        view.simulation.tick(&mut view.graph);

        let mut rows = view
            .graph()
            .nodes
            .iter()
            .map(|node| node.pos.y)
            .collect::<Vec<_>>();
        rows.sort_by(f32::total_cmp);
        rows.dedup_by(|a, b| (*a - *b).abs() < 1e-3);
        assert!(rows.len() >= 2);
        for pair in rows.windows(2) {
            let levels = (pair[1] - pair[0]) / crate::layout::LEVEL_GAP;
            assert!((levels - levels.round()).abs() < 1e-3, "{levels}");
        }

        view.apply_layout(LayoutMode::Force);
        assert!(view.simulation().is_running());
    }

    #[test]
    fn highlight_is_rebuilt_only_when_selection_changes() {
        let mut view = demo_view(LayoutMode::Force);
        let first = view.graph().nodes[0].id.clone();
        view.refresh_highlight(Some(&first));
        assert!(matches!(&view.highlight, Some((id, Some(_))) if *id == first));

        view.refresh_highlight(Some("not-in-snapshot"));
        assert!(matches!(&view.highlight, Some((_, None))));

        view.refresh_highlight(None);
        assert!(view.highlight.is_none());
    }
}
