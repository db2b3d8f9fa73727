use eframe::egui::{self, Id, RichText, Ui};

use crate::source::EntityType;

use super::super::ExplorerApp;
use super::super::interaction::{Command, LayoutMode, ViewMode, ZOOM_STEP};
use super::super::physics::ForceConfig;
use super::super::render::{node_color, node_icon};

const SEARCH_FIELD_ID: &str = "graph_search";
const SEARCH_RESULT_ROWS: usize = 12;
const MIN_LIMIT: usize = 10;
const MAX_LIMIT: usize = 300;

impl ExplorerApp {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();
        self.draw_filters(ui);
        ui.separator();
        self.draw_view_controls(ui);
        ui.separator();
        self.draw_physics_controls(ui);
        draw_legend(ui);
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (name or qualified name)")
            .on_hover_text("Fuzzy-highlight matching nodes in the current graph.");
        let search_response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .id(Id::new(SEARCH_FIELD_ID))
                .hint_text("Ctrl+F"),
        );
        if self.search_focus_requested {
            self.search_focus_requested = false;
            search_response.request_focus();
        }

        if self.search.trim().is_empty() {
            return;
        }
        let Some(view) = self.view.as_mut() else {
            return;
        };
        view.refresh_search(&self.search);

        let hits = view.search_hits();
        if hits.is_empty() {
            ui.small("No matches in the current graph.");
            return;
        }

        ui.small(format!("{} matches", hits.len()));
        for hit in hits.iter().take(SEARCH_RESULT_ROWS) {
            let is_selected = self.interaction.selected() == Some(hit.id.as_str());
            if ui
                .selectable_label(is_selected, hit.name.as_str())
                .on_hover_text(hit.id.as_str())
                .clicked()
            {
                self.pending.push(Command::SelectNode(Some(hit.id.clone())));
            }
        }
    }

    fn draw_filters(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Overview sample").strong());
        let mut changed = false;

        egui::ComboBox::from_label("Entity type")
            .selected_text(self.filters_draft.entity_type.label())
            .show_ui(ui, |ui| {
                for kind in EntityType::SAMPLED {
                    changed |= ui
                        .selectable_value(&mut self.filters_draft.entity_type, kind, kind.label())
                        .changed();
                }
            });

        let project_text = self
            .filters_draft
            .project
            .clone()
            .unwrap_or_else(|| "All projects".to_owned());
        egui::ComboBox::from_label("Project")
            .selected_text(project_text)
            .show_ui(ui, |ui| {
                changed |= ui
                    .selectable_value(&mut self.filters_draft.project, None, "All projects")
                    .changed();
                for project in &self.projects {
                    changed |= ui
                        .selectable_value(
                            &mut self.filters_draft.project,
                            Some(project.clone()),
                            project.as_str(),
                        )
                        .changed();
                }
            });

        let limit_slider = ui
            .add(
                egui::Slider::new(&mut self.filters_draft.limit, MIN_LIMIT..=MAX_LIMIT)
                    .step_by(5.0)
                    .text("Node limit"),
            )
            .on_hover_text("Maximum number of nodes in the sampled overview.");
        changed |= limit_slider.drag_stopped() || (limit_slider.changed() && !limit_slider.dragged());

        if changed {
            self.pending
                .push(Command::SetFilters(self.filters_draft.clone()));
        }
        if matches!(self.interaction.mode(), ViewMode::Focused { .. }) {
            ui.small("Applied when you return to the overview.");
        }
    }

    fn draw_view_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("View").strong());

        ui.horizontal(|ui| {
            let mut layout = self.interaction.layout();
            let force = ui
                .selectable_value(&mut layout, LayoutMode::Force, "Force")
                .on_hover_text("Free force-directed layout.")
                .changed();
            let hierarchy = ui
                .selectable_value(&mut layout, LayoutMode::Hierarchy, "Hierarchy")
                .on_hover_text("Rank nodes top-down along relationship direction (H).")
                .changed();
            if force || hierarchy {
                self.pending.push(Command::SetLayout(layout));
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Zoom in").clicked() {
                self.pending.push(Command::Zoom { factor: ZOOM_STEP });
            }
            if ui.button("Zoom out").clicked() {
                self.pending.push(Command::Zoom {
                    factor: 1.0 / ZOOM_STEP,
                });
            }
            let fit = self.view.as_ref().and_then(|view| {
                let viewport = view.canvas_size();
                (viewport.x > 0.0 && viewport.y > 0.0)
                    .then(|| view.world_bounds())
                    .flatten()
                    .map(|bounds| Command::ZoomToFit { bounds, viewport })
            });
            let fit_clicked = ui
                .add_enabled(fit.is_some(), egui::Button::new("Fit"))
                .on_hover_text("Zoom to fit the whole graph (0).")
                .clicked();
            if fit_clicked && let Some(command) = fit {
                self.pending.push(command);
            }
        });

        let can_explore = self.interaction.mode() == &ViewMode::Overview
            && self.interaction.selected().is_some();
        if ui
            .add_enabled(can_explore, egui::Button::new("Explore connections"))
            .on_hover_text("Focus on the selected node's neighborhood.")
            .clicked()
        {
            self.pending.push(Command::ExploreConnections);
        }

        if ui
            .add_enabled(self.view.is_some(), egui::Button::new("Restart layout"))
            .clicked()
            && let Some(view) = self.view.as_mut()
        {
            view.restart_layout();
        }

        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay")
            .on_hover_text("Draw the Barnes-Hut partitions over the graph canvas.");
        ui.checkbox(&mut self.show_diagnostics, "Diagnostics")
            .on_hover_text("Show frame counters and the FPS readout.");
    }

    fn draw_physics_controls(&mut self, ui: &mut Ui) {
        ui.collapsing("Physics tuning", |ui| {
            let mut config = self.force_config;
            let mut changed = false;

            changed |= ui
                .add(
                    egui::Slider::new(&mut config.charge_scale, 0.2..=3.0)
                        .text("Repulsion")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("How strongly nodes push away from each other.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.link_padding, 10.0..=120.0)
                        .text("Link distance padding")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Extra rest length between connected nodes.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.collision_padding, 0.0..=40.0)
                        .text("Collision padding")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Minimum gap kept between node circles.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut config.radial_strength, 0.0..=1.0)
                        .text("Isolated node pull")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("How firmly unconnected nodes are held on the outer ring.")
                .changed();

            if ui.button("Reset to defaults").clicked() {
                config = ForceConfig::default();
                changed = true;
            }
            if changed {
                self.set_force_config(config);
            }
        });
    }
}

fn draw_legend(ui: &mut Ui) {
    ui.collapsing("Legend", |ui| {
        for kind in EntityType::ALL {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("● {}", node_icon(kind)))
                        .color(node_color(kind))
                        .strong(),
                );
                ui.label(kind.label());
            });
        }
        ui.add_space(4.0);
        ui.small("CALLS solid, DOCUMENTS dashed, EXTENDS thick, CONTAINS dotted without arrow.");
    });
}
