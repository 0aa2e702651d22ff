//! Sight rays and fog-of-war bookkeeping.
//! This module exists to keep line-of-sight rules deterministic and separate
//! from movement planning.
//! It does not own who is looking; callers pass viewer positions in.

use std::mem;

use super::{Map, QuadTree};
use crate::types::*;

/// One fog-of-war contributor: a viewing-team unit's position and sight
/// radius in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewer {
    pub pos: Pos,
    pub sight: i32,
}

/// Cells that changed visibility between the previous query and this one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FowDelta {
    pub newly_seen: Vec<Pos>,
    pub newly_hidden: Vec<Pos>,
}

impl Map {
    /// Whether a straight ray from `from` reaches `to` without crossing a
    /// blocked edge. Walks the Bresenham line and fails fast on the first
    /// blocked step; `kind` picks the mask layer consulted.
    pub fn can_see(&self, from: Pos, to: Pos, kind: ConnectionKind) -> bool {
        if !self.in_bounds(from) || !self.in_bounds(to) {
            return false;
        }
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let sx = dx.signum();
        let sy = dy.signum();
        let total_x = dx.abs();
        let total_y = dy.abs();

        let mut cur = from;
        let mut step_x = 0;
        let mut step_y = 0;
        while step_x < total_x || step_y < total_y {
            let lhs = (1 + 2 * step_x) * total_y;
            let rhs = (1 + 2 * step_y) * total_x;
            let (mx, my) = if lhs == rhs {
                (sx, sy)
            } else if lhs < rhs {
                (sx, 0)
            } else {
                (0, sy)
            };
            if !self.connected8(kind, cur, mx, my) {
                return false;
            }
            cur.x += mx;
            cur.y += my;
            step_x += mx.abs();
            step_y += my.abs();
        }
        true
    }

    /// Recompute the current fog from every viewer, fold it into the
    /// ever-seen layer, and refresh item seen flags. Call once per frame,
    /// before any query that depends on it: the previous-query layer is
    /// replaced each call, so calling twice discards the real delta.
    pub fn generate_seen_unseen(&mut self, viewers: &[Viewer]) -> FowDelta {
        mem::swap(&mut self.fog, &mut self.cached_fog);
        self.fog.fill(false);

        for viewer in viewers {
            if !self.in_bounds(viewer.pos) {
                continue;
            }
            let r = viewer.sight.max(0);
            let min_y = (viewer.pos.y - r).max(0);
            let max_y = (viewer.pos.y + r).min(self.height - 1);
            let min_x = (viewer.pos.x - r).max(0);
            let max_x = (viewer.pos.x + r).min(self.width - 1);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let cell = Pos { y, x };
                    let idx = self.index(cell);
                    if self.fog[idx] {
                        continue;
                    }
                    let dx = cell.x - viewer.pos.x;
                    let dy = cell.y - viewer.pos.y;
                    if dx * dx + dy * dy > r * r {
                        continue;
                    }
                    if self.can_see(viewer.pos, cell, ConnectionKind::Sight) {
                        self.fog[idx] = true;
                    }
                }
            }
        }

        let mut delta = FowDelta::default();
        for cell in self.bounds().cells() {
            let idx = self.index(cell);
            if self.fog[idx] {
                self.past_seen[idx] = true;
            }
            match (self.cached_fog[idx], self.fog[idx]) {
                (false, true) => delta.newly_seen.push(cell),
                (true, false) => delta.newly_hidden.push(cell),
                _ => {}
            }
        }

        QuadTree::mark_visible(&mut self.items, &self.fog, self.width);
        delta
    }

    /// Currently visible to the viewing team, as of the last query.
    pub fn is_seen(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.fog[self.index(pos)]
    }

    /// Visible at the previous query; what "newly" in the delta is relative
    /// to.
    pub fn was_seen_last_query(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.cached_fog[self.index(pos)]
    }

    /// Ever seen. Monotonic: once set, never cleared.
    pub fn was_ever_seen(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.past_seen[self.index(pos)]
    }
}
