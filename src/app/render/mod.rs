mod lod;
mod style;

use std::collections::HashSet;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2};

use super::graph::SimGraph;
use super::highlight::HighlightState;
use super::render_utils::{
    ViewTransform, blend_color, circle_visible, dim_color, edge_visible, with_alpha,
};
pub(in crate::app) use lod::DetailLevel;
use lod::{NodeDecoration, node_decoration, shows_edge_labels};
pub(in crate::app) use style::{node_color, node_icon};
use style::{EdgeStyle, LinePattern, arrow_head, edge_style};

/// Per-frame inputs besides positions.
#[derive(Clone, Copy, Default)]
pub(in crate::app) struct PaintState<'a> {
    pub(in crate::app) selected: Option<usize>,
    pub(in crate::app) hovered: Option<usize>,
    pub(in crate::app) center: Option<usize>,
    pub(in crate::app) highlight: Option<&'a HighlightState>,
    pub(in crate::app) search_matches: Option<&'a HashSet<usize>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct RenderCounts {
    pub(in crate::app) painted_nodes: usize,
    pub(in crate::app) skipped_nodes: usize,
    pub(in crate::app) painted_edges: usize,
}

struct LabelJob {
    anchor: Pos2,
    decoration: NodeDecoration,
    emphasized: bool,
}

pub(in crate::app) fn paint_graph(
    painter: &Painter,
    graph: &SimGraph,
    view: ViewTransform,
    state: PaintState<'_>,
) -> RenderCounts {
    let mut counts = RenderCounts::default();
    let rect = view.rect;
    let zoom = view.zoom;
    let zoom_sqrt = zoom.sqrt();

    let screen = graph
        .nodes
        .iter()
        .map(|node| node.is_finite().then(|| view.world_to_screen(node.pos)))
        .collect::<Vec<_>>();

    let highlight_active = state.highlight.is_some();
    let edge_labels = shows_edge_labels(zoom);

    for (edge_index, edge) in graph.edges.iter().enumerate() {
        let (Some(start), Some(end)) = (screen[edge.source], screen[edge.target]) else {
            continue;
        };
        if !edge_visible(rect, start, end, 4.0) {
            continue;
        }

        let style = edge_style(edge.relation);
        let emphasized = state
            .highlight
            .is_some_and(|highlight| highlight.edge_emphasis(edge_index));
        let color = if emphasized {
            blend_color(style.color, Color32::WHITE, 0.25)
        } else if highlight_active {
            dim_color(style.color, 0.35)
        } else {
            with_alpha(style.color, 200)
        };
        let width = style.width * zoom_sqrt.clamp(0.6, 2.0) * if emphasized { 1.8 } else { 1.0 };
        let target_radius = graph.nodes[edge.target].size * zoom;

        paint_edge(painter, start, end, target_radius, style, Stroke::new(width, color));

        if edge_labels {
            let mid = start + (end - start) * 0.5;
            painter.text(
                mid,
                Align2::CENTER_CENTER,
                edge.relation.label(),
                FontId::proportional(9.5),
                if highlight_active && !emphasized {
                    Color32::from_gray(120)
                } else {
                    Color32::from_gray(220)
                },
            );
        }
        counts.painted_edges += 1;
    }

    let mut labels = Vec::new();
    for &index in &graph.z_order {
        let node = &graph.nodes[index];
        let Some(position) = screen[index] else {
            counts.skipped_nodes += 1;
            continue;
        };
        let radius = node.size * zoom;
        if !circle_visible(rect, position, radius + 40.0) {
            continue;
        }

        let is_selected = state.selected == Some(index);
        let is_hovered = state.hovered == Some(index);
        let is_match = state
            .search_matches
            .is_some_and(|matches| matches.contains(&index));
        let related = state
            .highlight
            .is_some_and(|highlight| highlight.node_emphasis(index));

        let base = node_color(node.kind);
        let color = if is_selected || related || !highlight_active {
            base
        } else {
            dim_color(base, 0.4)
        };

        if is_selected || is_hovered {
            painter.circle_stroke(
                position,
                radius + 5.0,
                Stroke::new(6.0, with_alpha(base, if is_selected { 110 } else { 70 })),
            );
        }
        painter.circle_filled(position, radius, color);
        painter.circle_stroke(
            position,
            radius,
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(10, 12, 16, 200)),
        );
        if state.center == Some(index) {
            painter.circle_stroke(
                position,
                radius + 2.5,
                Stroke::new(1.5, Color32::from_gray(235)),
            );
        }
        if is_match {
            painter.circle_stroke(
                position,
                radius + 3.5,
                Stroke::new(2.0, Color32::from_rgb(103, 196, 255)),
            );
        }

        let emphasized = is_selected || is_hovered;
        let decoration = node_decoration(node, zoom, emphasized);
        if let Some(icon) = decoration.icon {
            painter.text(
                position,
                Align2::CENTER_CENTER,
                icon,
                FontId::proportional((radius * 0.9).max(8.0)),
                Color32::from_rgb(16, 18, 24),
            );
        }
        if decoration.label.is_some() {
            labels.push(LabelJob {
                anchor: position + vec2(0.0, radius + 4.0),
                decoration,
                emphasized,
            });
        }
        counts.painted_nodes += 1;
    }

    for job in labels {
        paint_label(painter, job);
    }

    counts
}

fn paint_edge(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    style: EdgeStyle,
    stroke: Stroke,
) {
    let head_length = (7.0 + stroke.width * 2.0).min(16.0);
    let head = style
        .arrow
        .then(|| arrow_head(start, end, target_radius, head_length))
        .flatten();
    let line_end =
        head.map(|[_, left, right]| pos2((left.x + right.x) * 0.5, (left.y + right.y) * 0.5));
    let points = [start, line_end.unwrap_or(end)];

    match style.pattern {
        LinePattern::Solid => {
            painter.line_segment(points, stroke);
        }
        LinePattern::Dashed => {
            painter.extend(Shape::dashed_line(&points, stroke, 8.0, 5.0));
        }
        LinePattern::Dotted => {
            painter.extend(Shape::dotted_line(
                &points,
                stroke.color,
                6.0,
                (stroke.width * 0.8).max(0.8),
            ));
        }
    }

    if let Some([tip, left, right]) = head {
        painter.add(Shape::convex_polygon(
            vec![tip, left, right],
            stroke.color,
            Stroke::NONE,
        ));
    }
}

fn paint_label(painter: &Painter, job: LabelJob) {
    let Some(text) = job.decoration.label else {
        return;
    };
    let text_color = if job.emphasized {
        Color32::WHITE
    } else {
        Color32::from_gray(225)
    };

    let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), text_color);
    let size = galley.size();
    let mut rect = Rect::from_min_size(pos2(job.anchor.x - size.x * 0.5, job.anchor.y), size);
    painter.rect_filled(rect.expand(2.0), 3.0, Color32::from_black_alpha(170));
    painter.galley(rect.min, galley, text_color);

    if let Some(signature) = job.decoration.signature {
        let galley = painter.layout_no_wrap(
            signature,
            FontId::monospace(10.0),
            Color32::from_gray(170),
        );
        let size = galley.size();
        rect = Rect::from_min_size(pos2(job.anchor.x - size.x * 0.5, rect.max.y + 4.0), size);
        painter.rect_filled(rect.expand(2.0), 3.0, Color32::from_black_alpha(150));
        painter.galley(rect.min, galley, Color32::from_gray(170));
    }
}
