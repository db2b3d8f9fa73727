mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, warn};

use super::graph::SimGraph;
use forces::{ChargeParams, CollisionParams, charge_velocity, collision_corrections, jiggle};
pub(in crate::app) use quadtree::QuadtreeCell;
use quadtree::{CellId, QuadTree};

const THETA_SQ: f32 = 0.81;
const ALPHA_TARGET: f32 = 0.0;
const ALPHA_MIN: f32 = 0.001;
const THAW_ALPHA: f32 = 0.3;
const VELOCITY_DECAY: f32 = 0.4;
const CHARGE_BASE: f32 = -150.0;
const MIN_LINK_DISTANCE: f32 = 60.0;
const COLLISION_STRENGTH: f32 = 1.0;
const COLLISION_ITERATIONS: usize = 4;
const RADIAL_RADIUS: f32 = 200.0;
const CENTER_STRENGTH: f32 = 0.05;
const SETTLE_SPEED: f32 = 0.05;
const SETTLE_TICKS: u32 = 20;
const NON_FINITE_RESEED_TICKS: u32 = 30;

/// Tunable force parameters. Defaults are the shipped layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ForceConfig {
    pub(in crate::app) charge_scale: f32,
    pub(in crate::app) link_padding: f32,
    pub(in crate::app) collision_padding: f32,
    pub(in crate::app) radial_strength: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            charge_scale: 1.0,
            link_padding: 40.0,
            collision_padding: 15.0,
            radial_strength: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) struct TickReport {
    pub(in crate::app) ticked: bool,
    pub(in crate::app) max_speed: f32,
    pub(in crate::app) overlap_pairs: usize,
    pub(in crate::app) non_finite: usize,
    pub(in crate::app) reseeded: usize,
    pub(in crate::app) longest_non_finite_streak: u32,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    source: usize,
    target: usize,
    distance: f32,
    strength: f32,
    bias: f32,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    corrections: Vec<Vec2>,
    finite: Vec<usize>,
    finite_mask: Vec<bool>,
    cell_stack: Vec<CellId>,
}

/// Owns the cooling schedule and per-node force parameters for one
/// snapshot. Positions live in the `SimGraph` it is ticked against.
pub(in crate::app) struct Simulation {
    config: ForceConfig,
    alpha: f32,
    alpha_decay: f32,
    charges: Vec<f32>,
    radii: Vec<f32>,
    max_radius: f32,
    links: Vec<Link>,
    rank_targets: Option<Vec<f32>>,
    frozen: bool,
    calm_ticks: u32,
    non_finite_streaks: Vec<u32>,
    scratch: Scratch,
}

impl Simulation {
    pub(in crate::app) fn new(graph: &SimGraph, config: ForceConfig) -> Self {
        let mut simulation = Self {
            config,
            alpha: 1.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            charges: Vec::new(),
            radii: Vec::new(),
            max_radius: 0.0,
            links: Vec::new(),
            rank_targets: None,
            frozen: false,
            calm_ticks: 0,
            non_finite_streaks: Vec::new(),
            scratch: Scratch::default(),
        };
        simulation.reset(graph);
        simulation
    }

    /// Reconfigures every force against the graph's node set and reheats.
    pub(in crate::app) fn reset(&mut self, graph: &SimGraph) {
        let node_count = graph.nodes.len();
        let config = self.config;

        self.charges = graph
            .nodes
            .iter()
            .map(|node| CHARGE_BASE * node.size.sqrt() / 3.0 * config.charge_scale)
            .collect();
        self.radii = graph
            .nodes
            .iter()
            .map(|node| node.size + config.collision_padding)
            .collect();
        self.max_radius = self.radii.iter().copied().fold(0.0, f32::max);

        let mut link_count = vec![0usize; node_count];
        for edge in &graph.edges {
            link_count[edge.source] += 1;
            link_count[edge.target] += 1;
        }
        self.links = graph
            .edges
            .iter()
            .map(|edge| {
                let source_count = link_count[edge.source].max(1) as f32;
                let target_count = link_count[edge.target].max(1) as f32;
                let combined =
                    graph.nodes[edge.source].size + graph.nodes[edge.target].size + config.link_padding;
                Link {
                    source: edge.source,
                    target: edge.target,
                    distance: combined.max(MIN_LINK_DISTANCE),
                    strength: 1.0 / source_count.min(target_count),
                    bias: source_count / (source_count + target_count),
                }
            })
            .collect();

        if self
            .rank_targets
            .as_ref()
            .is_some_and(|targets| targets.len() != node_count)
        {
            self.rank_targets = None;
        }

        self.non_finite_streaks = vec![0; node_count];
        self.frozen = false;
        self.reheat(1.0);
        debug!(
            nodes = node_count,
            links = self.links.len(),
            "simulation reconfigured"
        );
    }

    pub(in crate::app) fn config(&self) -> ForceConfig {
        self.config
    }

    pub(in crate::app) fn set_config(&mut self, graph: &SimGraph, config: ForceConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.reset(graph);
    }

    /// `Some` pins every node's y to its target each tick. `None` releases.
    pub(in crate::app) fn set_rank_targets(&mut self, targets: Option<Vec<f32>>) {
        self.rank_targets = targets.filter(|targets| targets.len() == self.charges.len());
        self.reheat(1.0);
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(in crate::app) fn is_settled(&self) -> bool {
        self.calm_ticks >= SETTLE_TICKS
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        !self.frozen && !self.is_settled()
    }

    pub(in crate::app) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(in crate::app) fn thaw(&mut self) {
        self.frozen = false;
        self.reheat(self.alpha.max(THAW_ALPHA));
    }

    /// Moves a node directly, as a drag does while the layout is frozen.
    pub(in crate::app) fn pin(&mut self, graph: &mut SimGraph, index: usize, pos: Vec2) {
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return;
        }
        let Some(node) = graph.nodes.get_mut(index) else {
            return;
        };
        node.pos = pos;
        node.velocity = Vec2::ZERO;
        if let Some(streak) = self.non_finite_streaks.get_mut(index) {
            *streak = 0;
        }
        self.calm_ticks = 0;
    }

    fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.calm_ticks = 0;
    }

    pub(in crate::app) fn tick(&mut self, graph: &mut SimGraph) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_running() {
            return report;
        }
        if self.charges.len() != graph.nodes.len() {
            self.reset(graph);
        }
        report.ticked = true;

        self.alpha += (ALPHA_TARGET - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;

        self.partition_finite(graph, &mut report);

        self.apply_charge(graph, alpha);
        self.apply_links(graph, alpha);
        report.overlap_pairs = self.apply_collision(graph);
        self.apply_radial(graph, alpha);
        self.apply_centering(graph);

        let retain = 1.0 - VELOCITY_DECAY;
        let mut max_speed = 0.0_f32;
        for &index in &self.scratch.finite {
            let node = &mut graph.nodes[index];
            node.velocity *= retain;
            node.pos += node.velocity;
            if let Some(targets) = &self.rank_targets {
                node.pos.y = targets[index];
                node.velocity.y = 0.0;
            }
            max_speed = max_speed.max(node.velocity.length());
        }
        report.max_speed = max_speed;

        if report.non_finite == 0 && max_speed < SETTLE_SPEED {
            self.calm_ticks += 1;
            if self.calm_ticks == SETTLE_TICKS {
                debug!(alpha = self.alpha, "layout settled");
            }
        } else {
            self.calm_ticks = 0;
        }

        report
    }

    fn partition_finite(&mut self, graph: &mut SimGraph, report: &mut TickReport) {
        let scratch = &mut self.scratch;
        scratch.finite.clear();
        scratch.finite_mask.clear();
        scratch.finite_mask.resize(graph.nodes.len(), false);

        for (index, node) in graph.nodes.iter_mut().enumerate() {
            if node.is_finite() {
                if !node.velocity.x.is_finite() || !node.velocity.y.is_finite() {
                    node.velocity = Vec2::ZERO;
                }
                self.non_finite_streaks[index] = 0;
                scratch.finite.push(index);
                scratch.finite_mask[index] = true;
                continue;
            }

            report.non_finite += 1;
            let streak = &mut self.non_finite_streaks[index];
            *streak += 1;
            report.longest_non_finite_streak = report.longest_non_finite_streak.max(*streak);
            if *streak >= NON_FINITE_RESEED_TICKS {
                warn!(
                    node = %node.id,
                    ticks = *streak,
                    "position stayed non-finite, re-seeding node"
                );
                node.pos = node.seed;
                node.velocity = Vec2::ZERO;
                *streak = 0;
                report.reseeded += 1;
            }
        }
    }

    fn apply_charge(&mut self, graph: &mut SimGraph, alpha: f32) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.positions.extend(graph.nodes.iter().map(|node| node.pos));

        let Some(tree) = QuadTree::build(&scratch.positions, &self.charges, scratch.finite.clone())
        else {
            return;
        };

        let params = ChargeParams {
            alpha,
            theta_sq: THETA_SQ,
        };
        for &index in &scratch.finite {
            graph.nodes[index].velocity += charge_velocity(
                &tree,
                index,
                &scratch.positions,
                &self.charges,
                params,
                &mut scratch.cell_stack,
            );
        }
    }

    fn apply_links(&self, graph: &mut SimGraph, alpha: f32) {
        let mask = &self.scratch.finite_mask;
        for (link_index, link) in self.links.iter().enumerate() {
            if !mask[link.source] || !mask[link.target] {
                continue;
            }

            let source = &graph.nodes[link.source];
            let target = &graph.nodes[link.target];
            let mut delta = (target.pos + target.velocity) - (source.pos + source.velocity);
            if delta.length_sq() <= f32::EPSILON {
                delta = jiggle(link_index, link.target) * 1e-3;
            }
            let distance = delta.length();
            let pull = (distance - link.distance) / distance * alpha * link.strength;
            let correction = delta * pull;

            graph.nodes[link.target].velocity -= correction * link.bias;
            graph.nodes[link.source].velocity += correction * (1.0 - link.bias);
        }
    }

    fn apply_collision(&mut self, graph: &mut SimGraph) -> usize {
        if self.max_radius <= 0.0 {
            return 0;
        }
        let reach = self.max_radius * 2.0;
        let params = CollisionParams {
            strength: COLLISION_STRENGTH,
            max_reach_sq: reach * reach,
        };

        let scratch = &mut self.scratch;
        let mut overlaps = 0;
        for _ in 0..COLLISION_ITERATIONS {
            scratch.predicted.clear();
            scratch
                .predicted
                .extend(graph.nodes.iter().map(|node| node.pos + node.velocity));
            scratch.corrections.clear();
            scratch.corrections.resize(graph.nodes.len(), Vec2::ZERO);

            let Some(tree) =
                QuadTree::build(&scratch.predicted, &self.charges, scratch.finite.clone())
            else {
                return 0;
            };
            overlaps = collision_corrections(
                &tree,
                &scratch.predicted,
                &self.radii,
                params,
                &mut scratch.corrections,
            );
            if overlaps == 0 {
                break;
            }

            for &index in &scratch.finite {
                graph.nodes[index].velocity += scratch.corrections[index];
            }
        }
        overlaps
    }

    fn apply_radial(&self, graph: &mut SimGraph, alpha: f32) {
        let strength = self.config.radial_strength * alpha;
        if strength <= 0.0 {
            return;
        }
        for &index in &self.scratch.finite {
            let node = &mut graph.nodes[index];
            if !node.isolated {
                continue;
            }
            let offset = if node.pos.length_sq() <= f32::EPSILON {
                vec2(1e-6, 0.0)
            } else {
                node.pos
            };
            let radius = offset.length();
            let k = (RADIAL_RADIUS - radius) * strength / radius;
            node.velocity += offset * k;
        }
    }

    fn apply_centering(&self, graph: &mut SimGraph) {
        let finite = &self.scratch.finite;
        if finite.is_empty() {
            return;
        }
        let sum = finite
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + graph.nodes[index].pos);
        let shift = -(sum / finite.len() as f32) * CENTER_STRENGTH;
        for &index in finite {
            graph.nodes[index].pos += shift;
        }
    }

    /// Quadtree over the current finite positions, for the debug overlay.
    pub(in crate::app) fn quadtree_cells(&mut self, graph: &SimGraph, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.positions.extend(graph.nodes.iter().map(|node| node.pos));
        let finite = (0..graph.nodes.len())
            .filter(|&index| graph.nodes[index].is_finite())
            .collect::<Vec<_>>();

        if let Some(tree) = QuadTree::build(&scratch.positions, &self.charges, finite) {
            cells.extend(tree.overlay_cells());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::transform;
    use crate::layout::{hierarchy_ranks, rank_offsets};
    use crate::source::{EntityType, demo_graph};

    fn demo_snapshot() -> SimGraph {
        let snapshot = demo_graph().sample(EntityType::Function, 80, None);
        transform(&snapshot.nodes, &snapshot.edges)
    }

    fn run_until_settled(simulation: &mut Simulation, graph: &mut SimGraph) {
        for _ in 0..5_000 {
            simulation.tick(graph);
            if simulation.is_settled() {
                return;
            }
        }
        panic!("layout did not settle");
    }

    #[test]
    fn settled_layout_keeps_circles_apart() {
        let mut graph = demo_snapshot();
        let mut simulation = Simulation::new(&graph, ForceConfig::default());
        run_until_settled(&mut simulation, &mut graph);

        let padding = ForceConfig::default().collision_padding;
        for (i, a) in graph.nodes.iter().enumerate() {
            assert!(a.is_finite());
            for b in &graph.nodes[i + 1..] {
                let overlap = a.size + b.size - (a.pos - b.pos).length();
                assert!(overlap <= padding, "{} and {} overlap by {overlap}", a.id, b.id);
            }
        }
    }

    #[test]
    fn isolated_nodes_stay_near_the_periphery() {
        let mut graph = demo_snapshot();
        assert!(graph.nodes.iter().any(|node| node.isolated));
        let mut simulation = Simulation::new(&graph, ForceConfig::default());
        run_until_settled(&mut simulation, &mut graph);

        for node in graph.nodes.iter().filter(|node| node.isolated) {
            assert!(node.pos.length() > 60.0, "{} drifted to the center", node.id);
        }
    }

    #[test]
    fn non_finite_node_is_skipped_then_reseeded() {
        let mut graph = demo_snapshot();
        graph.nodes[0].pos = vec2(f32::NAN, 0.0);
        let seed = graph.nodes[0].seed;
        let mut simulation = Simulation::new(&graph, ForceConfig::default());

        for tick in 1..NON_FINITE_RESEED_TICKS {
            let report = simulation.tick(&mut graph);
            assert_eq!(report.non_finite, 1);
            assert_eq!(report.longest_non_finite_streak, tick);
            assert!(graph.nodes[1..].iter().all(|node| node.is_finite()));
        }
        assert!(!graph.nodes[0].is_finite());

        let report = simulation.tick(&mut graph);
        assert_eq!(report.reseeded, 1);
        assert_eq!(graph.nodes[0].pos, seed);
        assert!(!simulation.is_settled());
    }

    #[test]
    fn frozen_layout_does_not_move_until_thawed() {
        let mut graph = demo_snapshot();
        let mut simulation = Simulation::new(&graph, ForceConfig::default());
        for _ in 0..10 {
            simulation.tick(&mut graph);
        }

        simulation.freeze();
        simulation.pin(&mut graph, 3, vec2(500.0, -40.0));
        let before = graph.nodes.iter().map(|node| node.pos).collect::<Vec<_>>();
        let report = simulation.tick(&mut graph);
        assert!(!report.ticked);
        let after = graph.nodes.iter().map(|node| node.pos).collect::<Vec<_>>();
        assert_eq!(before, after);
        assert_eq!(graph.nodes[3].pos, vec2(500.0, -40.0));

        simulation.thaw();
        assert!(simulation.alpha() >= THAW_ALPHA);
        assert!(simulation.tick(&mut graph).ticked);
    }

    #[test]
    fn reset_reheats_a_settled_layout() {
        let mut graph = demo_snapshot();
        let mut simulation = Simulation::new(&graph, ForceConfig::default());
        run_until_settled(&mut simulation, &mut graph);
        assert!(!simulation.is_running());

        simulation.reset(&graph);
        assert_eq!(simulation.alpha(), 1.0);
        assert!(simulation.is_running());
    }

    #[test]
    fn hierarchy_targets_pin_vertical_positions() {
        let mut graph = demo_snapshot();
        let edges = graph
            .edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .collect::<Vec<_>>();
        let offsets = rank_offsets(&hierarchy_ranks(graph.nodes.len(), &edges));
        let mut simulation = Simulation::new(&graph, ForceConfig::default());
        simulation.set_rank_targets(Some(offsets.clone()));

        for _ in 0..15 {
            simulation.tick(&mut graph);
        }
        for (node, target) in graph.nodes.iter().zip(&offsets) {
            assert_eq!(node.pos.y, *target);
        }
    }

    #[test]
    fn link_strength_follows_the_less_connected_end() {
        let graph = demo_snapshot();
        let simulation = Simulation::new(&graph, ForceConfig::default());
        for link in &simulation.links {
            assert!(link.distance >= MIN_LINK_DISTANCE);
            assert!(link.strength > 0.0 && link.strength <= 1.0);
            assert!(link.bias > 0.0 && link.bias < 1.0);
        }
    }
}
