use eframe::egui::{Align2, Color32, FontId, Painter, Sense, Stroke, Ui, pos2, vec2};

use super::super::interaction::{Command, InteractionState};
use super::super::physics::TickReport;
use super::super::render::{PaintState, RenderCounts, paint_graph};
use super::super::render_utils::{ViewTransform, draw_background};
use super::GraphView;

/// What one canvas frame produced.
pub(in crate::app) struct FrameOutput {
    pub(in crate::app) commands: Vec<Command>,
    pub(in crate::app) tick: TickReport,
    pub(in crate::app) render: RenderCounts,
    pub(in crate::app) hit_painted: usize,
    pub(in crate::app) hit_skipped: usize,
    pub(in crate::app) animating: bool,
}

impl GraphView {
    /// One frame: advance the layout, repaint the hit surface from the new
    /// positions, read pointer input against it, then draw.
    pub(in crate::app) fn draw(
        &mut self,
        ui: &mut Ui,
        interaction: &InteractionState,
        search_query: &str,
        show_quadtree_overlay: bool,
    ) -> FrameOutput {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.canvas_size = rect.size();
        let camera = interaction.camera();
        let view = ViewTransform {
            rect,
            pan: camera.pan(),
            zoom: camera.zoom(),
        };
        let painter = ui.painter_at(rect);
        draw_background(&painter, view);

        let tick = self.simulation.tick(&mut self.graph);
        self.hit_surface.paint(&self.graph, view);

        let mut commands = Vec::new();
        let hovered = self.handle_pointer(ui, &response, view, interaction, &mut commands);

        if show_quadtree_overlay {
            self.paint_quadtree(&painter, view);
        }

        self.refresh_highlight(interaction.selected());
        self.refresh_search(search_query);
        let search_matches = self.search.matches();

        let state = PaintState {
            selected: interaction.selected().and_then(|id| self.graph.index_of(id)),
            hovered,
            center: self
                .graph
                .center_id()
                .and_then(|center| self.graph.index_of(center)),
            highlight: self
                .highlight
                .as_ref()
                .and_then(|(_, highlight)| highlight.as_ref()),
            search_matches: search_matches.as_deref(),
        };
        let render = paint_graph(&painter, &self.graph, view, state);

        if let Some(index) = hovered {
            self.paint_hover_summary(&painter, index, view);
        }

        FrameOutput {
            commands,
            tick,
            render,
            hit_painted: self.hit_surface.painted(),
            hit_skipped: self.hit_surface.skipped(),
            animating: self.simulation.is_running() || self.drag.is_some(),
        }
    }

    fn paint_quadtree(&mut self, painter: &Painter, view: ViewTransform) {
        self.simulation
            .quadtree_cells(&self.graph, &mut self.quadtree_cells);

        for cell in &self.quadtree_cells {
            let min = view.world_to_screen(cell.min);
            let max = view.world_to_screen(cell.min + vec2(cell.side, cell.side));

            let alpha = if cell.is_leaf { 110 } else { 55 };
            let line_width = (1.4_f32 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
            let stroke = Stroke::new(
                line_width,
                Color32::from_rgba_unmultiplied(106, 198, 255, alpha),
            );
            let corners = [
                min,
                pos2(max.x, min.y),
                max,
                pos2(min.x, max.y),
            ];
            for side in 0..4 {
                painter.line_segment([corners[side], corners[(side + 1) % 4]], stroke);
            }
        }
    }

    fn paint_hover_summary(&self, painter: &Painter, index: usize, view: ViewTransform) {
        let Some(node) = self.graph.nodes.get(index) else {
            return;
        };

        let mut text = format!("{}  |  {}  |  degree {}", node.name, node.kind.label(), node.degree);
        if let Some(qualified) = &node.qualified_name {
            text.push_str(&format!("\n{qualified}"));
        }
        if let Some(path) = &node.file_path {
            text.push_str(&format!("\n{path}"));
        }
        painter.text(
            view.rect.left_top() + vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            text,
            FontId::proportional(13.0),
            Color32::from_gray(240),
        );
    }
}
