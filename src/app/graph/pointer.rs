use eframe::egui::{self, PointerButton, Response, Ui, Vec2};
use tracing::debug;

use super::super::hit::{HitSource, resolve_click};
use super::super::interaction::{Command, InteractionState};
use super::super::render_utils::ViewTransform;
use super::GraphView;

const WHEEL_ZOOM_RATE: f32 = 0.0018;

impl GraphView {
    /// Turns this frame's pointer input into commands. Node drags move the
    /// node directly while the layout is frozen. Returns the hovered node.
    pub(super) fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &Response,
        view: ViewTransform,
        interaction: &InteractionState,
        commands: &mut Vec<Command>,
    ) -> Option<usize> {
        self.handle_wheel(ui, response, view, commands);
        self.handle_drag(ui, response, view, commands);

        let hovered = if let Some(index) = self.drag {
            Some(index)
        } else if response.hovered() {
            ui.input(|input| input.pointer.hover_pos())
                .filter(|pointer| view.rect.contains(*pointer))
                .and_then(|pointer| self.hit_surface.sample(pointer))
        } else {
            None
        };

        let hovered_id = hovered.map(|index| self.graph.nodes[index].id.as_str());
        if hovered_id != interaction.hovered() {
            commands.push(Command::HoverNode(hovered_id.map(str::to_owned)));
        }

        if self.drag.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let picked = resolve_click(&self.hit_surface, &self.graph, view, pointer);
            if let Some((index, HitSource::Proximity)) = picked {
                debug!(node = %self.graph.nodes[index].id, "click resolved by proximity");
            }
            let id = picked.map(|(index, _)| self.graph.nodes[index].id.clone());
            commands.push(Command::SelectNode(id));
        }

        hovered
    }

    fn handle_wheel(
        &self,
        ui: &Ui,
        response: &Response,
        view: ViewTransform,
        commands: &mut Vec<Command>,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| view.rect.center());
        commands.push(Command::ZoomAt {
            factor: (1.0 + scroll * WHEEL_ZOOM_RATE).clamp(0.85, 1.15),
            anchor: pointer - view.rect.center(),
        });
    }

    fn handle_drag(
        &mut self,
        ui: &Ui,
        response: &Response,
        view: ViewTransform,
        commands: &mut Vec<Command>,
    ) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
            && let Some(index) = self.hit_surface.sample(origin)
        {
            debug!(node = %self.graph.nodes[index].id, "node drag started");
            self.drag = Some(index);
            self.simulation.freeze();
        }

        if let Some(index) = self.drag {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.simulation
                    .pin(&mut self.graph, index, view.screen_to_world(pointer));
            }
        } else if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                commands.push(Command::Pan(delta));
            }
        }

        if response.drag_stopped() && self.drag.take().is_some() {
            self.simulation.thaw();
        }
    }
}
