use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::source::{EntityType, RawDegree, RelationType, SnapshotEdge, SnapshotNode};
use crate::util::stable_unit;

pub(in crate::app) const MIN_VISUAL_SIZE: f32 = 10.0;
pub(in crate::app) const MAX_VISUAL_SIZE: f32 = 30.0;

const CONNECTED_SEED_RADIUS: f32 = 100.0;
const CONNECTED_SEED_JITTER: f32 = 100.0;
const ISOLATED_SEED_RADIUS: f32 = 250.0;
const ISOLATED_SEED_JITTER: f32 = 50.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum SnapshotMode {
    Sample,
    Focused { center: String },
}

#[derive(Clone, Debug)]
pub(in crate::app) struct SimNode {
    pub(in crate::app) id: String,
    pub(in crate::app) name: String,
    pub(in crate::app) kind: EntityType,
    pub(in crate::app) degree: u64,
    pub(in crate::app) size: f32,
    pub(in crate::app) isolated: bool,
    pub(in crate::app) pos: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) seed: Vec2,
    pub(in crate::app) file_path: Option<String>,
    pub(in crate::app) qualified_name: Option<String>,
    pub(in crate::app) signature: Option<String>,
}

impl SimNode {
    pub(in crate::app) fn is_finite(&self) -> bool {
        self.pos.x.is_finite() && self.pos.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct SimEdge {
    pub(in crate::app) source: usize,
    pub(in crate::app) target: usize,
    pub(in crate::app) relation: RelationType,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct RepairCounts {
    pub(in crate::app) self_loops: usize,
    pub(in crate::app) dangling_edges: usize,
    pub(in crate::app) duplicate_nodes: usize,
}

/// Simulation-ready snapshot. Positions are owned by the force simulation
/// once it starts ticking.
#[derive(Clone, Debug)]
pub(in crate::app) struct SimGraph {
    pub(in crate::app) nodes: Vec<SimNode>,
    pub(in crate::app) edges: Vec<SimEdge>,
    pub(in crate::app) z_order: Vec<usize>,
    pub(in crate::app) index_by_id: HashMap<String, usize>,
    pub(in crate::app) neighbors: Vec<Vec<usize>>,
    pub(in crate::app) max_degree: u64,
    pub(in crate::app) mode: SnapshotMode,
    pub(in crate::app) repairs: RepairCounts,
}

impl SimGraph {
    pub(in crate::app) fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub(in crate::app) fn with_mode(mut self, mode: SnapshotMode) -> Self {
        self.mode = mode;
        self
    }

    pub(in crate::app) fn center_id(&self) -> Option<&str> {
        match &self.mode {
            SnapshotMode::Sample => None,
            SnapshotMode::Focused { center } => Some(center.as_str()),
        }
    }
}

pub(in crate::app) fn normalize_degree(raw: Option<&RawDegree>) -> u64 {
    let value = match raw {
        Some(RawDegree::Plain(value)) if *value > 0 => *value as u64,
        Some(RawDegree::Float(value)) if value.is_finite() && *value >= 1.0 => *value as u64,
        Some(RawDegree::Pair { low, high }) if *high >= 0 => {
            ((*high as u64) << 32) | (*low as u32 as u64)
        }
        _ => 1,
    };
    value.max(1)
}

pub(in crate::app) fn visual_size(degree: u64, max_degree: u64) -> f32 {
    let ratio = degree as f64 / max_degree.max(1) as f64;
    (MIN_VISUAL_SIZE + (MAX_VISUAL_SIZE - MIN_VISUAL_SIZE) * ratio as f32)
        .clamp(MIN_VISUAL_SIZE, MAX_VISUAL_SIZE)
}

fn seed_position(id: &str, index: usize, count: usize, isolated: bool) -> Vec2 {
    let angle = TAU * index as f32 / count.max(1) as f32;
    let jitter = stable_unit(id);
    let radius = if isolated {
        ISOLATED_SEED_RADIUS + jitter * ISOLATED_SEED_JITTER
    } else {
        CONNECTED_SEED_RADIUS + jitter * CONNECTED_SEED_JITTER
    };
    vec2(angle.cos(), angle.sin()) * radius
}

/// Larger nodes first, so smaller ones are painted (and hit) on top.
pub(in crate::app) fn z_order(nodes: &[SimNode]) -> Vec<usize> {
    let mut order = (0..nodes.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| nodes[*b].size.total_cmp(&nodes[*a].size));
    order
}

pub(in crate::app) fn transform(raw_nodes: &[SnapshotNode], raw_edges: &[SnapshotEdge]) -> SimGraph {
    let mut repairs = RepairCounts::default();
    let mut index_by_id = HashMap::with_capacity(raw_nodes.len());
    let mut accepted = Vec::with_capacity(raw_nodes.len());

    for raw in raw_nodes {
        if index_by_id.contains_key(&raw.id) {
            repairs.duplicate_nodes += 1;
            continue;
        }
        index_by_id.insert(raw.id.clone(), accepted.len());
        accepted.push(raw);
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for raw in raw_edges {
        if raw.source == raw.target {
            repairs.self_loops += 1;
            continue;
        }
        let (Some(&source), Some(&target)) =
            (index_by_id.get(&raw.source), index_by_id.get(&raw.target))
        else {
            repairs.dangling_edges += 1;
            continue;
        };
        edges.push(SimEdge {
            source,
            target,
            relation: raw.relation,
        });
    }

    let mut neighbors = vec![Vec::new(); accepted.len()];
    for edge in &edges {
        neighbors[edge.source].push(edge.target);
        neighbors[edge.target].push(edge.source);
    }
    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }

    let degrees = accepted
        .iter()
        .map(|raw| normalize_degree(raw.degree.as_ref()))
        .collect::<Vec<_>>();
    let max_degree = degrees.iter().copied().max().unwrap_or(0).max(1);

    let count = accepted.len();
    let nodes = accepted
        .iter()
        .zip(degrees)
        .enumerate()
        .map(|(index, (raw, degree))| {
            let isolated = neighbors[index].is_empty();
            let seed = seed_position(&raw.id, index, count, isolated);
            SimNode {
                id: raw.id.clone(),
                name: if raw.name.is_empty() {
                    raw.id.clone()
                } else {
                    raw.name.clone()
                },
                kind: raw.kind,
                degree,
                size: visual_size(degree, max_degree),
                isolated,
                pos: seed,
                velocity: Vec2::ZERO,
                seed,
                file_path: raw.file_path.clone(),
                qualified_name: raw.qualified_name.clone(),
                signature: raw.signature.clone(),
            }
        })
        .collect::<Vec<_>>();

    let z_order = z_order(&nodes);

    SimGraph {
        nodes,
        edges,
        z_order,
        index_by_id,
        neighbors,
        max_degree,
        mode: SnapshotMode::Sample,
        repairs,
    }
}
