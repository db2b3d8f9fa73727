use eframe::egui::{self, Align, Align2, Context, Layout, RichText, Ui};

use super::super::interaction::{Command, ViewMode};
use super::super::render::DetailLevel;
use super::super::{ExplorerApp, GraphStatus};

const HELP_ROWS: [(&str, &str); 7] = [
    ("Esc", "Clear selection and close this overlay"),
    ("Ctrl+F / Cmd+F", "Focus search"),
    ("+ or =", "Zoom in"),
    ("-", "Zoom out"),
    ("0", "Zoom to fit"),
    ("H", "Toggle force and hierarchy layout"),
    ("?", "Toggle this overlay"),
];

impl ExplorerApp {
    /// Lays out every panel for this frame. Returns whether the canvas still
    /// wants frames because the layout is moving or a node is being dragged.
    pub(in crate::app) fn show(&mut self, ctx: &Context) -> bool {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("controls_scroll")
                    .show(ui, |ui| self.draw_controls(ui));
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        let mut animating = false;
        egui::CentralPanel::default().show(ctx, |ui| animating = self.draw_canvas(ui));

        self.draw_help(ctx);
        self.draw_diagnostics_window(ctx);
        animating
    }

    fn mode_text(&self) -> String {
        match self.interaction.mode() {
            ViewMode::Overview => format!(
                "Overview: top {} {}s",
                self.interaction.filters().limit,
                self.interaction.filters().entity_type.label()
            ),
            ViewMode::Focused { center } => {
                let name = self
                    .view
                    .as_ref()
                    .and_then(|view| {
                        let graph = view.graph();
                        graph.index_of(center).map(|index| graph.nodes[index].name.clone())
                    })
                    .unwrap_or_else(|| center.clone());
                format!("Focused on {name}")
            }
        }
    }

    fn draw_top_bar(&mut self, ui: &mut Ui) {
        let mode_text = self.mode_text();
        let focused = matches!(self.interaction.mode(), ViewMode::Focused { .. });
        let detail_level = DetailLevel::for_scale(self.interaction.camera().zoom());

        ui.horizontal(|ui| {
            ui.heading("codegraph-explorer");
            ui.separator();

            if ui
                .add_enabled(focused, egui::Button::new("Back to overview"))
                .on_hover_text("Return to the sampled overview with the last filters.")
                .clicked()
            {
                self.pending.push(Command::Back);
            }
            ui.label(mode_text);
            ui.separator();
            ui.label(format!("layout: {}", self.interaction.layout().label()));
            ui.label(format!("detail: {detail_level:?}"));
            ui.label(format!("zoom: {:.2}", self.interaction.camera().zoom()));
            if let Some(view) = &self.view {
                ui.label(format!(
                    "nodes: {}  edges: {}",
                    view.graph().nodes.len(),
                    view.graph().edges.len()
                ));
            }
            if self.fetcher.in_flight() > 0 {
                ui.spinner();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui
                    .button("?")
                    .on_hover_text("Keyboard shortcuts")
                    .clicked()
                {
                    self.pending.push(Command::ToggleHelp);
                }
                if self.show_diagnostics
                    && let Some(fps_text) = self.diagnostics.fps_display_text()
                {
                    ui.label(fps_text);
                }
            });
        });
    }

    fn draw_canvas(&mut self, ui: &mut Ui) -> bool {
        match &self.status {
            GraphStatus::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading code graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
                false
            }
            GraphStatus::Empty => {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("No graph data");
                    ui.add_space(6.0);
                    ui.label("Nothing matched. Try another entity type or project, or raise the limit.");
                });
                false
            }
            GraphStatus::Error(message) => {
                let mut retry = false;
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Unable to load graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.pending.push(Command::Retry);
                }
                false
            }
            GraphStatus::Ready => {
                let Some(view) = self.view.as_mut() else {
                    return false;
                };
                let frame = view.draw(
                    ui,
                    &self.interaction,
                    &self.search,
                    self.show_quadtree_overlay,
                );
                self.diagnostics
                    .record_frame(&frame, view.simulation().alpha());
                self.pending.extend(frame.commands.iter().cloned());
                frame.animating
            }
        }
    }

    fn draw_help(&mut self, ctx: &Context) {
        if !self.interaction.help_open() {
            return;
        }

        let mut open = true;
        egui::Window::new("Keyboard shortcuts")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("help_grid")
                    .num_columns(2)
                    .spacing([18.0, 6.0])
                    .show(ui, |ui| {
                        for (keys, action) in HELP_ROWS {
                            ui.label(RichText::new(keys).monospace().strong());
                            ui.label(action);
                            ui.end_row();
                        }
                    });
                ui.add_space(6.0);
                ui.small("Scroll to zoom, drag the background to pan, drag a node to move it.");
            });

        if !open {
            self.pending.push(Command::ToggleHelp);
        }
    }

    fn draw_diagnostics_window(&mut self, ctx: &Context) {
        if !self.show_diagnostics {
            return;
        }

        let lines = self.diagnostics.detail_lines();
        egui::Window::new("Diagnostics")
            .open(&mut self.show_diagnostics)
            .default_pos([360.0, 80.0])
            .resizable(false)
            .show(ctx, |ui| {
                for line in lines {
                    ui.monospace(line);
                }
            });
    }
}
