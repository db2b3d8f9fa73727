mod keys;
mod viewport;

use eframe::egui::{Rect, Vec2};
use tracing::{debug, info};

use crate::source::EntityType;

pub(in crate::app) use keys::{Shortcut, shortcut_for_key};
pub(in crate::app) use viewport::{Camera, ZOOM_STEP};

pub(in crate::app) const FOCUS_DEPTH: usize = 2;
pub(in crate::app) const FOCUS_LIMIT: usize = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum ViewMode {
    Overview,
    Focused { center: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) enum LayoutMode {
    #[default]
    Force,
    Hierarchy,
}

impl LayoutMode {
    pub(in crate::app) fn toggled(self) -> Self {
        match self {
            Self::Force => Self::Hierarchy,
            Self::Hierarchy => Self::Force,
        }
    }

    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Force => "force",
            Self::Hierarchy => "hierarchy",
        }
    }
}

/// Overview sampling parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct Filters {
    pub(in crate::app) entity_type: EntityType,
    pub(in crate::app) limit: usize,
    pub(in crate::app) project: Option<String>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            entity_type: EntityType::Function,
            limit: 80,
            project: None,
        }
    }
}

/// Identity of a snapshot request. Responses are applied only while their
/// key is still the current one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) enum QueryKey {
    Sample {
        entity_type: EntityType,
        limit: usize,
        project: Option<String>,
    },
    Neighborhood {
        node_id: String,
        depth: usize,
        limit: usize,
    },
}

impl QueryKey {
    fn sample(filters: &Filters) -> Self {
        Self::Sample {
            entity_type: filters.entity_type,
            limit: filters.limit,
            project: filters.project.clone(),
        }
    }

    fn neighborhood(node_id: &str) -> Self {
        Self::Neighborhood {
            node_id: node_id.to_owned(),
            depth: FOCUS_DEPTH,
            limit: FOCUS_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum Command {
    SelectNode(Option<String>),
    HoverNode(Option<String>),
    /// Animated zoom about the canvas center.
    Zoom { factor: f32 },
    /// Immediate zoom about a point given relative to the canvas center.
    ZoomAt { factor: f32, anchor: Vec2 },
    Pan(Vec2),
    ZoomToFit { bounds: Rect, viewport: Vec2 },
    ToggleLayout,
    SetLayout(LayoutMode),
    ExploreConnections,
    Back,
    SetFilters(Filters),
    Escape,
    ToggleHelp,
    FocusSearch,
    Retry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum Effect {
    Fetch { key: QueryKey, transition: bool },
    SelectionChanged(Option<String>),
    LayoutChanged(LayoutMode),
    FocusSearch,
    FitRequested,
}

/// Interaction state machine. Every gesture and shortcut reaches it as a
/// `Command`; side effects come back as `Effect`s for the app to run.
#[derive(Clone, Debug)]
pub(in crate::app) struct InteractionState {
    mode: ViewMode,
    layout: LayoutMode,
    filters: Filters,
    selected: Option<String>,
    hovered: Option<String>,
    help_open: bool,
    camera: Camera,
    query: QueryKey,
}

impl InteractionState {
    /// Starts in Overview, or Focused around `initial_node` when given. The
    /// returned effects contain the first fetch.
    pub(in crate::app) fn new(filters: Filters, initial_node: Option<String>) -> (Self, Vec<Effect>) {
        let (mode, query) = match &initial_node {
            Some(node_id) => (
                ViewMode::Focused {
                    center: node_id.clone(),
                },
                QueryKey::neighborhood(node_id),
            ),
            None => (ViewMode::Overview, QueryKey::sample(&filters)),
        };

        let mut effects = vec![Effect::Fetch {
            key: query.clone(),
            transition: true,
        }];
        if initial_node.is_some() {
            effects.push(Effect::SelectionChanged(initial_node.clone()));
        }

        let state = Self {
            mode,
            layout: LayoutMode::Force,
            filters,
            selected: initial_node,
            hovered: None,
            help_open: false,
            camera: Camera::default(),
            query,
        };
        (state, effects)
    }

    pub(in crate::app) fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub(in crate::app) fn center_id(&self) -> Option<&str> {
        match &self.mode {
            ViewMode::Overview => None,
            ViewMode::Focused { center } => Some(center),
        }
    }

    pub(in crate::app) fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub(in crate::app) fn filters(&self) -> &Filters {
        &self.filters
    }

    pub(in crate::app) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(in crate::app) fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub(in crate::app) fn help_open(&self) -> bool {
        self.help_open
    }

    pub(in crate::app) fn camera(&self) -> &Camera {
        &self.camera
    }

    pub(in crate::app) fn query(&self) -> &QueryKey {
        &self.query
    }

    /// Advances camera animation. Returns whether a tween is still running.
    pub(in crate::app) fn advance(&mut self, now: f64) -> bool {
        self.camera.advance(now);
        self.camera.is_animating()
    }

    pub(in crate::app) fn apply(&mut self, command: Command, now: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        match command {
            Command::SelectNode(id) => self.select(id, &mut effects),
            Command::HoverNode(id) => self.hovered = id,
            Command::Zoom { factor } => self.camera.zoom_by(factor, now),
            Command::ZoomAt { factor, anchor } => self.camera.zoom_at(factor, anchor),
            Command::Pan(delta) => self.camera.pan_by(delta),
            Command::ZoomToFit { bounds, viewport } => {
                self.camera.zoom_to_fit(bounds, viewport, now);
            }
            Command::ToggleLayout => self.set_layout(self.layout.toggled(), &mut effects),
            Command::SetLayout(layout) => self.set_layout(layout, &mut effects),
            Command::ExploreConnections => self.explore_connections(&mut effects),
            Command::Back => self.back(&mut effects),
            Command::SetFilters(filters) => self.set_filters(filters, &mut effects),
            Command::Escape => {
                self.help_open = false;
                self.select(None, &mut effects);
            }
            Command::ToggleHelp => self.help_open = !self.help_open,
            Command::FocusSearch => effects.push(Effect::FocusSearch),
            Command::Retry => effects.push(Effect::Fetch {
                key: self.query.clone(),
                transition: true,
            }),
        }
        effects
    }

    /// Maps a keyboard shortcut to its command. `0` needs graph bounds, so
    /// it surfaces as `FitRequested` for the caller to complete.
    pub(in crate::app) fn apply_shortcut(&mut self, shortcut: Shortcut, now: f64) -> Vec<Effect> {
        let command = match shortcut {
            Shortcut::Escape => Command::Escape,
            Shortcut::FocusSearch => Command::FocusSearch,
            Shortcut::ZoomIn => Command::Zoom { factor: ZOOM_STEP },
            Shortcut::ZoomOut => Command::Zoom {
                factor: 1.0 / ZOOM_STEP,
            },
            Shortcut::ZoomToFit => return vec![Effect::FitRequested],
            Shortcut::ToggleLayout => Command::ToggleLayout,
            Shortcut::ToggleHelp => Command::ToggleHelp,
        };
        self.apply(command, now)
    }

    fn select(&mut self, id: Option<String>, effects: &mut Vec<Effect>) {
        if self.selected == id {
            return;
        }
        info!(node = id.as_deref().unwrap_or("-"), "selection changed");
        self.selected = id.clone();
        effects.push(Effect::SelectionChanged(id));
    }

    fn set_layout(&mut self, layout: LayoutMode, effects: &mut Vec<Effect>) {
        if self.layout == layout {
            return;
        }
        self.layout = layout;
        effects.push(Effect::LayoutChanged(layout));
    }

    fn explore_connections(&mut self, effects: &mut Vec<Effect>) {
        let Some(selected) = self.selected.clone() else {
            debug!("explore ignored without a selection");
            return;
        };
        if self.mode != ViewMode::Overview {
            debug!("explore ignored outside overview");
            return;
        }

        info!(center = %selected, "exploring connections");
        self.query = QueryKey::neighborhood(&selected);
        self.mode = ViewMode::Focused { center: selected };
        self.camera.reset();
        effects.push(Effect::Fetch {
            key: self.query.clone(),
            transition: true,
        });
    }

    fn back(&mut self, effects: &mut Vec<Effect>) {
        if self.mode == ViewMode::Overview {
            return;
        }

        info!("returning to overview");
        self.mode = ViewMode::Overview;
        self.query = QueryKey::sample(&self.filters);
        self.camera.reset();
        effects.push(Effect::Fetch {
            key: self.query.clone(),
            transition: true,
        });
    }

    fn set_filters(&mut self, filters: Filters, effects: &mut Vec<Effect>) {
        if self.filters == filters {
            return;
        }
        self.filters = filters;
        if self.mode != ViewMode::Overview {
            return;
        }

        self.query = QueryKey::sample(&self.filters);
        effects.push(Effect::Fetch {
            key: self.query.clone(),
            transition: false,
        });
    }
}
