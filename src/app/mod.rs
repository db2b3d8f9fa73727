use std::sync::Arc;

use eframe::egui::{self, Context};
use tracing::{debug, info, warn};

use crate::source::{EntityDetail, EntityType, GraphQuery};

mod fetch;
mod graph;
mod highlight;
mod hit;
mod interaction;
mod physics;
mod render;
mod render_utils;
mod ui;

use fetch::{FetchResult, Fetcher};
use graph::{GraphView, SnapshotMode};
use interaction::{Command, Effect, Filters, InteractionState, shortcut_for_key};
use physics::ForceConfig;
use ui::FrameDiagnostics;

/// Startup settings resolved from the command line.
#[derive(Clone, Debug)]
pub struct ExplorerConfig {
    pub entity_type: EntityType,
    pub limit: usize,
    pub project: Option<String>,
    pub initial_node: Option<String>,
}

pub struct ExplorerApp {
    fetcher: Fetcher,
    interaction: InteractionState,
    status: GraphStatus,
    view: Option<GraphView>,
    pending: Vec<Command>,
    detail: DetailState,
    search: String,
    search_focus_requested: bool,
    filters_draft: Filters,
    force_config: ForceConfig,
    projects: Vec<String>,
    diagnostics: FrameDiagnostics,
    show_diagnostics: bool,
    show_quadtree_overlay: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum GraphStatus {
    Loading,
    Ready,
    Empty,
    Error(String),
}

enum DetailState {
    Idle,
    Loading(String),
    Ready(Box<EntityDetail>),
    Failed { id: String, message: String },
}

impl ExplorerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        source: Arc<dyn GraphQuery>,
        config: ExplorerConfig,
    ) -> Self {
        Self::with_repaint(source, config, Some(cc.egui_ctx.clone()))
    }

    fn with_repaint(
        source: Arc<dyn GraphQuery>,
        config: ExplorerConfig,
        repaint: Option<Context>,
    ) -> Self {
        let filters = Filters {
            entity_type: config.entity_type,
            limit: config.limit.max(1),
            project: config.project,
        };
        let fetcher = Fetcher::new(source, repaint);
        let projects = fetcher.projects();
        let (interaction, effects) = InteractionState::new(filters.clone(), config.initial_node);

        let mut app = Self {
            fetcher,
            interaction,
            status: GraphStatus::Loading,
            view: None,
            pending: Vec::new(),
            detail: DetailState::Idle,
            search: String::new(),
            search_focus_requested: false,
            filters_draft: filters,
            force_config: ForceConfig::default(),
            projects,
            diagnostics: FrameDiagnostics::default(),
            show_diagnostics: false,
            show_quadtree_overlay: false,
        };
        app.run_effects(effects, 0.0);
        app
    }

    fn dispatch(&mut self, command: Command, now: f64) {
        let effects = self.interaction.apply(command, now);
        self.run_effects(effects, now);
    }

    fn run_effects(&mut self, effects: Vec<Effect>, now: f64) {
        for effect in effects {
            match effect {
                Effect::Fetch { key, transition } => {
                    if transition || self.view.is_none() {
                        self.status = GraphStatus::Loading;
                        self.view = None;
                        self.diagnostics.clear_graph_counters();
                    }
                    self.fetcher.request_snapshot(key, transition);
                }
                Effect::SelectionChanged(Some(id)) => {
                    self.detail = DetailState::Loading(id.clone());
                    self.fetcher.request_entity(id);
                }
                Effect::SelectionChanged(None) => self.detail = DetailState::Idle,
                Effect::LayoutChanged(layout) => {
                    if let Some(view) = &mut self.view {
                        view.apply_layout(layout);
                    }
                }
                Effect::FocusSearch => self.search_focus_requested = true,
                Effect::FitRequested => self.fit_to_graph(now),
            }
        }
    }

    fn fit_to_graph(&mut self, now: f64) {
        let Some(view) = &self.view else {
            return;
        };
        let Some(bounds) = view.world_bounds() else {
            return;
        };
        let viewport = view.canvas_size();
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }
        self.dispatch(Command::ZoomToFit { bounds, viewport }, now);
    }

    fn handle_fetch_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::Snapshot {
                key,
                transition,
                result,
            } => {
                if &key != self.interaction.query() {
                    self.diagnostics.record_stale_response();
                    debug!(?key, "discarding stale snapshot");
                    return;
                }

                match result {
                    Ok(snapshot) if snapshot.nodes.is_empty() => {
                        info!(?key, "snapshot is empty");
                        self.view = None;
                        self.status = GraphStatus::Empty;
                    }
                    Ok(snapshot) => {
                        let mode = match self.interaction.center_id() {
                            Some(center) => SnapshotMode::Focused {
                                center: center.to_owned(),
                            },
                            None => SnapshotMode::Sample,
                        };
                        debug!(transition, "applying snapshot");
                        self.view = Some(GraphView::new(
                            &snapshot,
                            mode,
                            self.interaction.layout(),
                            self.force_config,
                        ));
                        self.status = GraphStatus::Ready;
                    }
                    Err(error) => {
                        warn!(%error, ?key, "graph fetch failed");
                        self.view = None;
                        self.status = GraphStatus::Error(error.to_string());
                    }
                }
            }
            FetchResult::Entity { id, result } => {
                if self.interaction.selected() != Some(id.as_str()) {
                    self.diagnostics.record_stale_response();
                    debug!(node = %id, "discarding stale entity detail");
                    return;
                }

                self.detail = match result {
                    Ok(detail) => DetailState::Ready(Box::new(detail)),
                    Err(error) => {
                        warn!(%error, node = %id, "entity fetch failed");
                        DetailState::Failed {
                            id,
                            message: error.to_string(),
                        }
                    }
                };
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &Context, now: f64) {
        let text_focused = ctx.wants_keyboard_input();
        let shortcuts = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => shortcut_for_key(*key, *modifiers, text_focused),
                    _ => None,
                })
                .collect::<Vec<_>>()
        });

        for shortcut in shortcuts {
            let effects = self.interaction.apply_shortcut(shortcut, now);
            self.run_effects(effects, now);
        }
    }

    fn set_force_config(&mut self, config: ForceConfig) {
        self.force_config = config;
        if let Some(view) = &mut self.view {
            view.set_force_config(config);
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        self.diagnostics.update_fps_counter(ctx);

        for command in std::mem::take(&mut self.pending) {
            self.dispatch(command, now);
        }
        for result in self.fetcher.poll() {
            self.handle_fetch_result(result);
        }
        self.handle_shortcuts(ctx, now);
        let camera_animating = self.interaction.advance(now);

        let graph_animating = self.show(ctx);
        self.diagnostics.log_if_due(now);

        if camera_animating
            || graph_animating
            || !self.pending.is_empty()
            || self.fetcher.in_flight() > 0
        {
            ctx.request_repaint();
        }
    }
}
