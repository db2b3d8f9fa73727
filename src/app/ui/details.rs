use eframe::egui::{self, RichText, Ui};

use crate::source::{EntityDetail, EntityLink};

use super::super::interaction::{Command, ViewMode};
use super::super::render::node_color;
use super::super::{DetailState, ExplorerApp};

const LINK_ROWS: usize = 40;

impl ExplorerApp {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let mut clicked = None;
        match &self.detail {
            DetailState::Idle => {
                ui.label("Select a node in the graph or from the search results.");
            }
            DetailState::Loading(id) => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading {id}"));
                });
            }
            DetailState::Failed { id, message } => {
                ui.label(RichText::new(format!("Unable to load details for {id}")).strong());
                ui.small(message.as_str());
            }
            DetailState::Ready(detail) => {
                let in_view = |id: &str| {
                    self.view
                        .as_ref()
                        .is_some_and(|view| view.graph().index_of(id).is_some())
                };
                let can_explore = self.interaction.mode() == &ViewMode::Overview;
                if draw_entity(ui, detail, can_explore) {
                    clicked = Some(Command::ExploreConnections);
                }

                ui.separator();
                if let Some(id) = draw_links(ui, "Outgoing", &detail.outgoing, &in_view) {
                    clicked = Some(Command::SelectNode(Some(id)));
                }
                if let Some(id) = draw_links(ui, "Incoming", &detail.incoming, &in_view) {
                    clicked = Some(Command::SelectNode(Some(id)));
                }
            }
        }

        if let Some(command) = clicked {
            self.pending.push(command);
        }
    }
}

/// Returns whether "Explore connections" was clicked.
fn draw_entity(ui: &mut Ui, detail: &EntityDetail, can_explore: bool) -> bool {
    ui.label(
        RichText::new(detail.name.as_str())
            .strong()
            .color(node_color(detail.kind)),
    );
    ui.small(detail.id.as_str());
    ui.add_space(6.0);

    ui.label(format!("Type: {}", detail.kind.label()));
    if let Some(project) = &detail.project {
        ui.label(format!("Project: {project}"));
    }
    if let Some(qualified) = &detail.qualified_name {
        ui.label(format!("Qualified name: {qualified}"));
    }
    if let Some(path) = &detail.file_path {
        ui.label(format!("File: {path}"));
    }
    if let Some(signature) = &detail.signature {
        ui.add_space(4.0);
        ui.monospace(signature.as_str());
    }
    if let Some(docstring) = detail.docstring.as_deref().filter(|doc| !doc.trim().is_empty()) {
        ui.add_space(4.0);
        ui.label(RichText::new(docstring.trim()).italics());
    }

    ui.add_space(6.0);
    ui.add_enabled(can_explore, egui::Button::new("Explore connections"))
        .on_hover_text("Focus on this node's neighborhood.")
        .clicked()
}

fn draw_links(
    ui: &mut Ui,
    title: &str,
    links: &[EntityLink],
    in_view: &dyn Fn(&str) -> bool,
) -> Option<String> {
    let mut clicked = None;
    egui::CollapsingHeader::new(format!("{title} ({})", links.len()))
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui| {
            if links.is_empty() {
                ui.small("None.");
                return;
            }

            for link in links.iter().take(LINK_ROWS) {
                let flag = if in_view(&link.id) { "in view" } else { "not in view" };
                let label = format!("{}  {}  [{flag}]", link.relation.label(), link.name);
                if ui.link(label).on_hover_text(link.id.as_str()).clicked() {
                    clicked = Some(link.id.clone());
                }
            }
            if links.len() > LINK_ROWS {
                ui.small(format!("and {} more", links.len() - LINK_ROWS));
            }
        });
    clicked
}
