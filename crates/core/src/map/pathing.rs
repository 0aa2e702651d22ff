//! Derived movement masks and the path-solver adapter.
//! This module exists so edge-block accumulation and connectivity rules stay
//! deterministic and local to changed footprints.
//! It does not own the A* machinery; `pather` provides that.

use super::Map;
use crate::pather::{self, CellState, Edge, Graph, SolveOutcome};
use crate::types::*;

impl Map {
    /// Re-derive both mask layers over exactly this footprint. Local, not
    /// global: only the rectangle of a changed item is touched.
    pub(super) fn recompute_masks(&mut self, bounds: Rect) {
        let Some(area) = clip(bounds, self.bounds()) else {
            return;
        };
        for cell in area.cells() {
            let idx = self.index(cell);
            self.path_map[idx] = 0;
            self.vis_map[idx] = 0;
        }
        for id in self.quad.find_items(&self.items, area, 0, 0) {
            let item = &self.items[id];
            for cell in item.bounds.cells() {
                if !area.contains(cell) {
                    continue;
                }
                let idx = self.index(cell);
                self.path_map[idx] |= item.pather_mask(cell);
                self.vis_map[idx] |= item.visibility_mask(cell);
            }
        }
    }

    /// Mark the cells standing units occupy. Callers pass every unit except
    /// the one about to move, then solve.
    pub fn set_path_blocks(&mut self, occupied: &[Pos]) {
        self.unit_blocks.fill(false);
        for &pos in occupied {
            if self.in_bounds(pos) {
                let idx = self.index(pos);
                self.unit_blocks[idx] = true;
            }
        }
    }

    fn raw_mask(&self, kind: ConnectionKind, pos: Pos) -> u8 {
        if !self.in_bounds(pos) {
            return EDGE_ALL;
        }
        let idx = self.index(pos);
        match kind {
            ConnectionKind::Path => {
                self.path_map[idx] | if self.unit_blocks[idx] { EDGE_ALL } else { 0 }
            }
            ConnectionKind::Sight => self.vis_map[idx],
        }
    }

    /// Accumulated block mask at a cell, symmetric seen from either side:
    /// each edge bit is set when this cell blocks it or the neighbor blocks
    /// the opposite edge.
    pub fn path_mask(&self, kind: ConnectionKind, pos: Pos) -> u8 {
        let mut mask = self.raw_mask(kind, pos);
        for (bit, dx, dy) in [(EDGE_N, 0, -1), (EDGE_E, 1, 0), (EDGE_S, 0, 1), (EDGE_W, -1, 0)] {
            let neighbor = Pos { y: pos.y + dy, x: pos.x + dx };
            if self.raw_mask(kind, neighbor) & invert_edge_mask(bit) != 0 {
                mask |= bit;
            }
        }
        mask
    }

    /// Whether a single cardinal step out of `from` crosses an open edge.
    pub fn connected4(&self, kind: ConnectionKind, from: Pos, dx: i32, dy: i32) -> bool {
        let bit = match (dx, dy) {
            (0, -1) => EDGE_N,
            (1, 0) => EDGE_E,
            (0, 1) => EDGE_S,
            (-1, 0) => EDGE_W,
            _ => panic!("connected4 takes a unit cardinal step"),
        };
        self.path_mask(kind, from) & bit == 0
    }

    /// Eight-way connectivity. Diagonal steps require both dog-leg routes
    /// open so blocked corners are never cut.
    pub fn connected8(&self, kind: ConnectionKind, from: Pos, dx: i32, dy: i32) -> bool {
        assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy) && (dx, dy) != (0, 0));
        if dx == 0 || dy == 0 {
            return self.connected4(kind, from, dx, dy);
        }
        let via_x = Pos { y: from.y, x: from.x + dx };
        let via_y = Pos { y: from.y + dy, x: from.x };
        self.connected4(kind, from, dx, 0)
            && self.connected4(kind, via_x, 0, dy)
            && self.connected4(kind, from, 0, dy)
            && self.connected4(kind, via_y, dx, 0)
    }

    /// Shortest walkable route between two in-map cells. Costs are the
    /// shared centi-TU table: 100 orthogonal, 141 diagonal.
    pub fn solve_path(&self, start: Pos, end: Pos) -> PathOutcome {
        assert!(
            self.in_bounds(start) && self.in_bounds(end),
            "solve_path endpoints must be clipped to the map"
        );
        let graph = MapGraph { map: self, kind: ConnectionKind::Path };
        match pather::solve(&graph, to_state(start), to_state(end)) {
            SolveOutcome::Solved { cost, path } => PathOutcome::Solved {
                cost,
                path: path.into_iter().map(to_pos).collect(),
            },
            SolveOutcome::NoSolution => PathOutcome::NoSolution,
            SolveOutcome::StartEndSame => PathOutcome::StartEndSame,
        }
    }
}

fn clip(rect: Rect, to: Rect) -> Option<Rect> {
    if !rect.intersects(&to) {
        return None;
    }
    Some(Rect {
        min: Pos { y: rect.min.y.max(to.min.y), x: rect.min.x.max(to.min.x) },
        max: Pos { y: rect.max.y.min(to.max.y), x: rect.max.x.min(to.max.x) },
    })
}

fn to_state(pos: Pos) -> CellState {
    CellState { y: pos.y as i16, x: pos.x as i16 }
}

fn to_pos(state: CellState) -> Pos {
    Pos { y: i32::from(state.y), x: i32::from(state.x) }
}

struct MapGraph<'a> {
    map: &'a Map,
    kind: ConnectionKind,
}

impl Graph for MapGraph<'_> {
    fn least_cost_estimate(&self, from: CellState, to: CellState) -> u32 {
        let dx = u32::from((from.x - to.x).unsigned_abs());
        let dy = u32::from((from.y - to.y).unsigned_abs());
        let diag = dx.min(dy);
        DIAG_COST * diag + ORTHO_COST * (dx.max(dy) - diag)
    }

    fn adjacent(&self, from: CellState, out: &mut Vec<Edge>) {
        let pos = to_pos(from);
        for (dx, dy) in DIRS8 {
            let to = Pos { y: pos.y + dy, x: pos.x + dx };
            if !self.map.in_bounds(to) {
                continue;
            }
            if !self.map.connected8(self.kind, pos, dx, dy) {
                continue;
            }
            let cost = if dx != 0 && dy != 0 { DIAG_COST } else { ORTHO_COST };
            out.push(Edge { to: to_state(to), cost });
        }
    }
}
