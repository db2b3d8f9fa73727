use eframe::egui::{Color32, Pos2};

use super::graph::SimGraph;
use super::render_utils::ViewTransform;

const FALLBACK_RADIUS: f32 = 40.0;

fn id_color(index: usize) -> Color32 {
    let key = (index as u32).wrapping_add(1) & 0x00ff_ffff;
    Color32::from_rgb((key >> 16) as u8, (key >> 8) as u8, key as u8)
}

fn color_index(color: Color32) -> Option<usize> {
    if color.a() == 0 {
        return None;
    }
    let key = (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b());
    key.checked_sub(1).map(|index| index as usize)
}

/// Off-screen pointer-area surface. Every finite node is rasterized in
/// z-order with a color encoding its index, so the last painted (smallest)
/// node owns overlapping pixels, matching what the canvas shows on top.
#[derive(Default)]
pub(in crate::app) struct HitSurface {
    origin: Pos2,
    width: usize,
    height: usize,
    cells: Vec<Color32>,
    painted: usize,
    skipped: usize,
}

impl HitSurface {
    pub(in crate::app) fn painted(&self) -> usize {
        self.painted
    }

    pub(in crate::app) fn skipped(&self) -> usize {
        self.skipped
    }

    pub(in crate::app) fn paint(&mut self, graph: &SimGraph, view: ViewTransform) {
        let rect = view.rect;
        self.origin = rect.min;
        self.width = rect.width().max(0.0).ceil() as usize;
        self.height = rect.height().max(0.0).ceil() as usize;
        self.cells.clear();
        self.cells
            .resize(self.width * self.height, Color32::TRANSPARENT);
        self.painted = 0;
        self.skipped = 0;

        for &index in &graph.z_order {
            let Some(node) = graph.nodes.get(index) else {
                continue;
            };
            if !node.is_finite() {
                self.skipped += 1;
                continue;
            }

            let center = view.world_to_screen(node.pos);
            let radius = node.size * view.zoom;
            if self.fill_disk(center, radius, id_color(index)) {
                self.painted += 1;
            }
        }
    }

    /// Returns whether any pixel of the disk landed on the surface.
    fn fill_disk(&mut self, center: Pos2, radius: f32, color: Color32) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }

        let local_x = center.x - self.origin.x;
        let local_y = center.y - self.origin.y;
        let min_x = (local_x - radius).floor().max(0.0) as usize;
        let min_y = (local_y - radius).floor().max(0.0) as usize;
        let max_x = (local_x + radius).ceil().min(self.width as f32) as usize;
        let max_y = (local_y + radius).ceil().min(self.height as f32) as usize;
        let radius_sq = radius * radius;

        let mut any = false;
        for y in min_y..max_y {
            let dy = y as f32 + 0.5 - local_y;
            let row = y * self.width;
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - local_x;
                if dx * dx + dy * dy <= radius_sq {
                    self.cells[row + x] = color;
                    any = true;
                }
            }
        }

        // Tiny disks at low zoom still own the pixel under their center.
        if let Some(cell) = self.cell_index(center) {
            self.cells[cell] = color;
            any = true;
        }
        any
    }

    fn cell_index(&self, pointer: Pos2) -> Option<usize> {
        let local = pointer - self.origin;
        if !local.x.is_finite() || !local.y.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let x = local.x.floor() as usize;
        let y = local.y.floor() as usize;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub(in crate::app) fn sample(&self, pointer: Pos2) -> Option<usize> {
        let cell = self.cell_index(pointer)?;
        color_index(self.cells[cell])
    }
}

/// Nearest finite node by distance to its visual boundary, accepted when
/// that distance is under `40 / sqrt(zoom)` graph units.
pub(in crate::app) fn proximity_pick(graph: &SimGraph, view: ViewTransform, pointer: Pos2) -> Option<usize> {
    let world = view.screen_to_world(pointer);
    if !world.x.is_finite() || !world.y.is_finite() {
        return None;
    }
    let threshold = FALLBACK_RADIUS / view.zoom.max(f32::EPSILON).sqrt();

    graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_finite())
        .map(|(index, node)| {
            let edge_distance = ((node.pos - world).length() - node.size).max(0.0);
            (index, edge_distance)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, distance)| *distance < threshold)
        .map(|(index, _)| index)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum HitSource {
    Surface,
    Proximity,
}

/// Click resolution: the painted surface first, then the proximity
/// fallback for clicks that land on background.
pub(in crate::app) fn resolve_click(
    surface: &HitSurface,
    graph: &SimGraph,
    view: ViewTransform,
    pointer: Pos2,
) -> Option<(usize, HitSource)> {
    if let Some(index) = surface.sample(pointer)
        && index < graph.nodes.len()
    {
        return Some((index, HitSource::Surface));
    }
    proximity_pick(graph, view, pointer).map(|index| (index, HitSource::Proximity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::transform;
    use crate::app::physics::{ForceConfig, Simulation};
    use crate::source::{EntityType, GraphSnapshot, demo_graph};
    use eframe::egui::{Rect, Vec2, pos2, vec2};

    fn graph_from(json: &str) -> SimGraph {
        let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
        transform(&snapshot.nodes, &snapshot.edges)
    }

    fn view(zoom: f32) -> ViewTransform {
        ViewTransform {
            rect: Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)),
            pan: Vec2::ZERO,
            zoom,
        }
    }

    fn pair_graph() -> SimGraph {
        let mut graph = graph_from(
            r#"{
                "nodes": [
                    {"id": "hub", "name": "hub", "type": "class", "degree": 40},
                    {"id": "leaf", "name": "leaf", "type": "function", "degree": 1}
                ],
                "edges": []
            }"#,
        );
        graph.nodes[0].pos = vec2(0.0, 0.0);
        graph.nodes[1].pos = vec2(12.0, 0.0);
        graph
    }

    #[test]
    fn id_colors_round_trip() {
        for index in [0, 1, 255, 256, 70_000] {
            assert_eq!(color_index(id_color(index)), Some(index));
        }
        assert_eq!(color_index(Color32::TRANSPARENT), None);
    }

    #[test]
    fn smaller_node_wins_where_circles_overlap() {
        let graph = pair_graph();
        let view = view(1.0);
        let mut surface = HitSurface::default();
        surface.paint(&graph, view);

        assert_eq!(surface.painted(), 2);
        let leaf_center = view.world_to_screen(graph.nodes[1].pos);
        assert_eq!(surface.sample(leaf_center), Some(1));
        let hub_only = view.world_to_screen(vec2(-20.0, 0.0));
        assert_eq!(surface.sample(hub_only), Some(0));
        assert_eq!(surface.sample(pos2(5.0, 5.0)), None);
        assert_eq!(surface.sample(pos2(-5.0, 5.0)), None);
    }

    #[test]
    fn settled_layout_resolves_every_center_on_the_surface() {
        let snapshot = demo_graph().sample(EntityType::Function, 80, None);
        let mut graph = transform(&snapshot.nodes, &snapshot.edges);
        let mut simulation = Simulation::new(&graph, ForceConfig::default());
        for _ in 0..5_000 {
            simulation.tick(&mut graph);
            if simulation.is_settled() {
                break;
            }
        }
        assert!(simulation.is_settled());

        let extent = graph
            .nodes
            .iter()
            .map(|node| node.pos.x.abs().max(node.pos.y.abs()) + node.size)
            .fold(1.0_f32, f32::max);
        let view = view((280.0 / extent).min(1.0));
        let mut surface = HitSurface::default();
        surface.paint(&graph, view);
        assert_eq!(surface.painted(), graph.nodes.len());

        for (index, node) in graph.nodes.iter().enumerate() {
            let center = view.world_to_screen(node.pos);
            assert_eq!(
                resolve_click(&surface, &graph, view, center),
                Some((index, HitSource::Surface)),
                "{}",
                node.id
            );
        }
    }

    #[test]
    fn background_click_falls_back_to_nearby_node() {
        let mut graph = pair_graph();
        graph.nodes.truncate(1);
        graph.z_order = vec![0];
        let size = graph.nodes[0].size;

        let near = view(1.0);
        let mut surface = HitSurface::default();
        surface.paint(&graph, near);
        let click = near.world_to_screen(vec2(size + 35.0, 0.0));
        assert_eq!(surface.sample(click), None);
        assert_eq!(
            resolve_click(&surface, &graph, near, click),
            Some((0, HitSource::Proximity))
        );

        let far = near.world_to_screen(vec2(size + 45.0, 0.0));
        assert_eq!(resolve_click(&surface, &graph, near, far), None);

        // Zooming in tightens the tolerance to 40 / sqrt(4) = 20 units.
        let zoomed = view(4.0);
        surface.paint(&graph, zoomed);
        let click = zoomed.world_to_screen(vec2(size + 25.0, 0.0));
        assert_eq!(resolve_click(&surface, &graph, zoomed, click), None);
        let click = zoomed.world_to_screen(vec2(size + 15.0, 0.0));
        assert_eq!(
            resolve_click(&surface, &graph, zoomed, click),
            Some((0, HitSource::Proximity))
        );
    }

    #[test]
    fn non_finite_nodes_are_skipped_not_painted() {
        let mut graph = pair_graph();
        graph.nodes[1].pos = vec2(f32::NAN, 3.0);
        let view = view(1.0);
        let mut surface = HitSurface::default();
        surface.paint(&graph, view);

        assert_eq!(surface.painted(), 1);
        assert_eq!(surface.skipped(), 1);
        assert_eq!(proximity_pick(&graph, view, view.world_to_screen(vec2(40.0, 0.0))), Some(0));
    }
}
