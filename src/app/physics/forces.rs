use eframe::egui::{Vec2, vec2};

use super::quadtree::{CellId, QuadTree};

const DISTANCE_MIN_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) alpha: f32,
    pub(super) theta_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_reach_sq: f32,
}

/// Stable pseudo-random unit vector for pulling coincident points apart.
pub(super) fn jiggle(from: usize, to: usize) -> Vec2 {
    let turns = (from as f32 * 0.618_034 + to as f32 * 0.414_214).fract();
    Vec2::angled(turns * std::f32::consts::TAU)
}

/// Caps the force between points closer than one unit.
fn soften(distance_sq: f32) -> f32 {
    if distance_sq < DISTANCE_MIN_SQ {
        (DISTANCE_MIN_SQ * distance_sq).sqrt()
    } else {
        distance_sq
    }
}

/// Barnes-Hut many-body velocity for one node. Negative charges repel.
/// `stack` is scratch space reused across nodes.
pub(super) fn charge_velocity(
    tree: &QuadTree,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: ChargeParams,
    stack: &mut Vec<CellId>,
) -> Vec2 {
    let point = positions[index];
    let mut velocity = Vec2::ZERO;
    stack.clear();
    stack.push(QuadTree::ROOT);

    while let Some(id) = stack.pop() {
        let cell = tree.cell(id);
        if cell.charge == 0.0 {
            continue;
        }

        if cell.is_leaf() {
            for &other in tree.members(id).iter().filter(|&&other| other != index) {
                let mut toward = positions[other] - point;
                if toward.length_sq() <= f32::EPSILON {
                    toward = jiggle(index, other) * 1e-3;
                }
                velocity += toward * (charges[other] * params.alpha / soften(toward.length_sq()));
            }
            continue;
        }

        let toward = cell.centroid - point;
        let distance_sq = toward.length_sq().max(f32::EPSILON);
        let side = cell.square.side;
        if !cell.square.contains(point) && side * side < params.theta_sq * distance_sq {
            velocity += toward * (cell.charge * params.alpha / soften(distance_sq));
        } else {
            stack.extend(cell.children());
        }
    }
    velocity
}

fn resolve_pair(
    (from, to): (usize, usize),
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    corrections: &mut [Vec2],
) -> bool {
    let reach = radii[from] + radii[to];
    let mut delta = predicted[from] - predicted[to];
    if delta.length_sq() >= reach * reach {
        return false;
    }
    if delta.length_sq() <= f32::EPSILON {
        delta = jiggle(from, to) * 1e-3;
    }

    let distance = delta.length();
    let push = delta * ((reach - distance) / distance * strength);
    let (from_sq, to_sq) = (radii[from].powi(2), radii[to].powi(2));
    let share = to_sq / (from_sq + to_sq);

    corrections[from] += push * share;
    corrections[to] -= push * (1.0 - share);
    true
}

/// Walks every pair of cells close enough to hold overlapping circles and
/// records the velocity corrections that separate them. Returns how many
/// overlapping pairs were found.
pub(super) fn collision_corrections(
    tree: &QuadTree,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    corrections: &mut [Vec2],
) -> usize {
    let mut overlaps = 0;
    let mut pending = vec![(QuadTree::ROOT, QuadTree::ROOT)];

    while let Some((a, b)) = pending.pop() {
        let (cell_a, cell_b) = (tree.cell(a), tree.cell(b));
        if cell_a.square.gap_sq(cell_b.square) > params.max_reach_sq {
            continue;
        }

        match (cell_a.is_leaf(), cell_b.is_leaf()) {
            (true, true) => {
                let (left, right) = (tree.members(a), tree.members(b));
                for (i, &from) in left.iter().enumerate() {
                    let partners = if a == b { &right[i + 1..] } else { right };
                    for &to in partners {
                        overlaps += usize::from(resolve_pair(
                            (from, to),
                            predicted,
                            radii,
                            params.strength,
                            corrections,
                        ));
                    }
                }
            }
            _ if a == b => {
                let children = cell_a.children().collect::<Vec<_>>();
                for (i, &first) in children.iter().enumerate() {
                    pending.push((first, first));
                    pending.extend(children[i + 1..].iter().map(|&second| (first, second)));
                }
            }
            (false, true) => pending.extend(cell_a.children().map(|child| (child, b))),
            (true, false) => pending.extend(cell_b.children().map(|child| (a, child))),
            (false, false) => {
                if cell_a.square.side >= cell_b.square.side {
                    pending.extend(cell_a.children().map(|child| (child, b)));
                } else {
                    pending.extend(cell_b.children().map(|child| (a, child)));
                }
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_charge_pushes_nodes_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let charges = vec![-100.0, -100.0];
        let tree = QuadTree::build(&positions, &charges, vec![0, 1]).unwrap();

        let params = ChargeParams {
            alpha: 1.0,
            theta_sq: 0.81,
        };
        let velocity = charge_velocity(&tree, 0, &positions, &charges, params, &mut Vec::new());

        assert!((velocity.x + 10.0).abs() < 1e-3);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn distant_cluster_is_approximated_by_its_centroid() {
        let mut positions = vec![vec2(0.0, 0.0)];
        positions.extend((0..16).map(|i| vec2(1000.0 + (i % 4) as f32, 1000.0 + (i / 4) as f32)));
        let charges = vec![-1.0; positions.len()];
        let tree = QuadTree::build(&positions, &charges, (0..positions.len()).collect()).unwrap();
        let params = ChargeParams {
            alpha: 1.0,
            theta_sq: 0.81,
        };

        let velocity = charge_velocity(&tree, 0, &positions, &charges, params, &mut Vec::new());
        let exact = (1..positions.len()).fold(Vec2::ZERO, |sum, other| {
            let toward = positions[other] - positions[0];
            sum + toward * (-1.0 / toward.length_sq())
        });

        assert!(velocity.x < 0.0 && velocity.y < 0.0);
        assert!((velocity - exact).length() < exact.length() * 0.01);
    }

    #[test]
    fn overlapping_circles_receive_opposite_corrections() {
        let predicted = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(500.0, 0.0)];
        let radii = vec![20.0, 20.0, 20.0];
        let tree = QuadTree::build(&predicted, &[-1.0; 3], vec![0, 1, 2]).unwrap();
        let mut corrections = vec![Vec2::ZERO; 3];

        let overlaps = collision_corrections(
            &tree,
            &predicted,
            &radii,
            CollisionParams {
                strength: 1.0,
                max_reach_sq: 40.0 * 40.0,
            },
            &mut corrections,
        );

        assert_eq!(overlaps, 1);
        assert!(corrections[0].x < 0.0);
        assert!(corrections[1].x > 0.0);
        assert!((corrections[0].x + corrections[1].x).abs() < 1e-4);
        assert_eq!(corrections[2], Vec2::ZERO);
    }
}
