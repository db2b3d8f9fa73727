use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u8 = 10;

pub(super) type CellId = u32;

/// Axis-aligned square, stored as its top-left corner and side length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) min: Vec2,
    pub(super) side: f32,
}

impl Square {
    /// Smallest padded square around the given points. `None` when any of
    /// them is not finite.
    fn enclosing(points: &[Vec2], indices: &[usize]) -> Option<Self> {
        if indices.iter().any(|&index| !points[index].is_finite()) {
            return None;
        }
        let (lo, hi) = indices.iter().map(|&index| points[index]).fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), point| (lo.min(point), hi.max(point)),
        );
        if !(lo.is_finite() && hi.is_finite()) {
            return None;
        }

        let span = (hi - lo).max(Vec2::splat(1.0));
        let side = span.x.max(span.y) + 2.0;
        Some(Self {
            min: (lo + hi) * 0.5 - Vec2::splat(side * 0.5),
            side,
        })
    }

    pub(super) fn center(self) -> Vec2 {
        self.min + Vec2::splat(self.side * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let local = point - self.min;
        (0.0..=self.side).contains(&local.x) && (0.0..=self.side).contains(&local.y)
    }

    /// Quadrants are numbered row-major: 0 top-left, 3 bottom-right.
    fn quadrant_of(self, point: Vec2) -> usize {
        let center = self.center();
        usize::from(point.x >= center.x) + 2 * usize::from(point.y >= center.y)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let half = self.side * 0.5;
        let step = vec2((quadrant % 2) as f32, (quadrant / 2) as f32) * half;
        Self {
            min: self.min + step,
            side: half,
        }
    }

    /// Squared gap between two squares; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = (self.side + other.side) * 0.5;
        let apart = (self.center() - other.center()).abs() - Vec2::splat(reach);
        apart.max(Vec2::ZERO).length_sq()
    }
}

pub(super) struct Cell {
    pub(super) square: Square,
    /// Charge-weighted centroid of the members.
    pub(super) centroid: Vec2,
    pub(super) charge: f32,
    depth: u8,
    members: Range<usize>,
    children: [Option<CellId>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = CellId> + '_ {
        self.children.iter().flatten().copied()
    }
}

/// Flat Barnes-Hut tree. Cells live in one arena and every cell's members
/// are a contiguous run of `order`, so a leaf never owns its own index list.
pub(super) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

/// One partition of the tree, as drawn by the canvas overlay.
pub(in crate::app) struct QuadtreeCell {
    pub min: Vec2,
    pub side: f32,
    pub depth: usize,
    pub is_leaf: bool,
}

impl QuadTree {
    pub(super) const ROOT: CellId = 0;

    /// Builds over the given node indices only; callers pass finite positions.
    pub(super) fn build(positions: &[Vec2], charges: &[f32], indices: Vec<usize>) -> Option<Self> {
        let square = Square::enclosing(positions, &indices)?;
        let mut tree = Self {
            cells: Vec::with_capacity(indices.len() / LEAF_CAPACITY + 1),
            order: indices,
        };
        tree.subdivide(square, 0..tree.order.len(), 0, positions, charges);
        Some(tree)
    }

    fn subdivide(
        &mut self,
        square: Square,
        members: Range<usize>,
        depth: u8,
        positions: &[Vec2],
        charges: &[f32],
    ) -> CellId {
        let (weighted, weight, charge) = self.order[members.clone()].iter().fold(
            (Vec2::ZERO, 0.0_f32, 0.0_f32),
            |(weighted, weight, charge), &index| {
                let strength = charges.get(index).copied().unwrap_or(0.0);
                (
                    weighted + positions[index] * strength.abs(),
                    weight + strength.abs(),
                    charge + strength,
                )
            },
        );

        let id = self.cells.len() as CellId;
        self.cells.push(Cell {
            square,
            centroid: if weight > 0.0 {
                weighted / weight
            } else {
                square.center()
            },
            charge,
            depth,
            members: members.clone(),
            children: [None; 4],
        });

        if depth >= MAX_DEPTH || members.len() <= LEAF_CAPACITY {
            return id;
        }

        let run = &mut self.order[members.clone()];
        run.sort_by_key(|&index| square.quadrant_of(positions[index]));
        let mut counts = [0_usize; 4];
        for &index in run.iter() {
            counts[square.quadrant_of(positions[index])] += 1;
        }
        // All members in one quadrant: coincident points would recurse forever.
        if counts.iter().filter(|&&count| count > 0).count() <= 1 {
            return id;
        }

        let mut start = members.start;
        for (quadrant, count) in counts.into_iter().enumerate() {
            if count == 0 {
                continue;
            }
            let child = self.subdivide(
                square.quadrant(quadrant),
                start..start + count,
                depth + 1,
                positions,
                charges,
            );
            self.cells[id as usize].children[quadrant] = Some(child);
            start += count;
        }
        id
    }

    pub(super) fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id as usize]
    }

    pub(super) fn members(&self, id: CellId) -> &[usize] {
        &self.order[self.cell(id).members.clone()]
    }

    pub(super) fn overlay_cells(&self) -> impl Iterator<Item = QuadtreeCell> + '_ {
        self.cells.iter().map(|cell| QuadtreeCell {
            min: cell.square.min,
            side: cell.square.side,
            depth: usize::from(cell.depth),
            is_leaf: cell.is_leaf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_and_centroid_aggregate_over_children() {
        let positions = (0..40)
            .map(|i| vec2((i % 8) as f32 * 30.0, (i / 8) as f32 * 30.0))
            .collect::<Vec<_>>();
        let charges = vec![-2.0; positions.len()];
        let tree = QuadTree::build(&positions, &charges, (0..positions.len()).collect()).unwrap();
        let root = tree.cell(QuadTree::ROOT);

        assert!(!root.is_leaf());
        assert!((root.charge + 80.0).abs() < 1e-3);
        assert!((root.centroid.x - 105.0).abs() < 1e-3);
        assert!((root.centroid.y - 60.0).abs() < 1e-3);

        let mut leaf_members = tree
            .overlay_cells()
            .zip(0..)
            .filter(|(cell, _)| cell.is_leaf)
            .flat_map(|(_, id)| tree.members(id).to_vec())
            .collect::<Vec<_>>();
        leaf_members.sort_unstable();
        assert_eq!(leaf_members, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn build_skips_indices_not_passed_in() {
        let positions = vec![vec2(0.0, 0.0), vec2(f32::NAN, 1.0), vec2(10.0, 10.0)];
        let charges = vec![-1.0; 3];
        let tree = QuadTree::build(&positions, &charges, vec![0, 2]).unwrap();

        assert!(tree.cell(QuadTree::ROOT).is_leaf());
        assert_eq!(tree.members(QuadTree::ROOT), &[0, 2]);
        assert!(tree.cell(QuadTree::ROOT).square.contains(vec2(5.0, 5.0)));
        assert!(QuadTree::build(&positions, &charges, vec![0, 1]).is_none());
    }

    #[test]
    fn quadrants_tile_their_parent() {
        let square = Square {
            min: vec2(-10.0, -10.0),
            side: 20.0,
        };
        assert_eq!(square.quadrant_of(vec2(-1.0, -1.0)), 0);
        assert_eq!(square.quadrant_of(vec2(1.0, -1.0)), 1);
        assert_eq!(square.quadrant_of(vec2(-1.0, 1.0)), 2);
        assert_eq!(square.quadrant_of(vec2(1.0, 1.0)), 3);
        assert_eq!(square.quadrant(3).min, vec2(0.0, 0.0));
        assert_eq!(square.gap_sq(square.quadrant(1)), 0.0);
    }
}
