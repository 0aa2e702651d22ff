//! Fixed-depth quad-tree index over placed items.
//! This module exists so footprint queries avoid scanning every item.
//! It does not own the items; nodes hold arena handles only.

use slotmap::SlotMap;

use super::MapItem;
use crate::types::*;

/// Five depth levels over the 64x64 grid: 1 + 4 + 16 + 64 + 256 nodes.
pub const NUM_QUAD_NODES: usize = 341;
const QUAD_DEPTH: usize = 5;
const DEPTH_BASE: [usize; QUAD_DEPTH] = [0, 1, 5, 21, 85];

pub struct QuadTree {
    nodes: Vec<Vec<ItemId>>,
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadTree {
    pub fn new() -> Self {
        Self { nodes: vec![Vec::new(); NUM_QUAD_NODES] }
    }

    fn grid_bounds() -> Rect {
        Rect::from_origin_size(Pos { y: 0, x: 0 }, MAP_SIZE, MAP_SIZE)
    }

    /// Node index and depth for a bounding rectangle: the coarsest depth at
    /// which one node cell still fully contains the bounds, so multi-cell
    /// objects live higher in the tree.
    fn calc_node(bounds: Rect) -> (usize, usize) {
        let mut depth = 0;
        let (mut nx, mut ny) = (0, 0);
        while depth + 1 < QUAD_DEPTH {
            let size = MAP_SIZE >> (depth + 1);
            let min_x = bounds.min.x / size;
            let min_y = bounds.min.y / size;
            if min_x != bounds.max.x / size || min_y != bounds.max.y / size {
                break;
            }
            depth += 1;
            nx = min_x;
            ny = min_y;
        }
        (DEPTH_BASE[depth] + (ny as usize) * (1 << depth) + nx as usize, depth)
    }

    pub fn add(&mut self, id: ItemId, bounds: Rect) {
        assert!(
            bounds.is_valid() && Self::grid_bounds().contains_rect(&bounds),
            "item bounds must be clipped to the grid before linking"
        );
        let (node, _) = Self::calc_node(bounds);
        self.nodes[node].push(id);
    }

    /// Splice an item out of its owning node. The node is recomputed from
    /// the bounds, so callers must pass the bounds the item was added with.
    pub fn unlink(&mut self, id: ItemId, bounds: Rect) -> bool {
        let (node, _) = Self::calc_node(bounds);
        let list = &mut self.nodes[node];
        match list.iter().position(|&linked| linked == id) {
            Some(at) => {
                list.remove(at);
                true
            }
            None => false,
        }
    }

    /// All items whose bounds intersect the query rect, filtered by flags:
    /// every `required` bit must be set and no `excluded` bit may be.
    /// Coarse nodes can hold items overlapping any fine cell below them, so
    /// every depth whose node cell intersects the rect is visited.
    pub fn find_items(
        &self,
        items: &SlotMap<ItemId, MapItem>,
        rect: Rect,
        required: u8,
        excluded: u8,
    ) -> Vec<ItemId> {
        assert!(
            rect.is_valid() && Self::grid_bounds().contains_rect(&rect),
            "query rects must be clipped to the grid"
        );
        let mut found = Vec::new();
        for depth in 0..QUAD_DEPTH {
            let size = MAP_SIZE >> depth;
            let stride = 1usize << depth;
            for ny in (rect.min.y / size)..=(rect.max.y / size) {
                for nx in (rect.min.x / size)..=(rect.max.x / size) {
                    let node = DEPTH_BASE[depth] + (ny as usize) * stride + nx as usize;
                    for &id in &self.nodes[node] {
                        let item = &items[id];
                        if !item.bounds.intersects(&rect) {
                            continue;
                        }
                        if item.flags() & required != required || item.flags() & excluded != 0 {
                            continue;
                        }
                        found.push(id);
                    }
                }
            }
        }
        found
    }

    pub fn items_at(&self, items: &SlotMap<ItemId, MapItem>, pos: Pos) -> Vec<ItemId> {
        self.find_items(items, Rect::single(pos), 0, 0)
    }

    /// Refresh every item's seen flag from a fog-of-war array: an item is
    /// seen when any footprint cell is currently visible.
    pub fn mark_visible(items: &mut SlotMap<ItemId, MapItem>, fog: &[bool], width: i32) {
        for (_, item) in items.iter_mut() {
            item.seen = item.bounds.cells().any(|cell| {
                let idx = (cell.y * width + cell.x) as usize;
                idx < fog.len() && fog[idx]
            });
        }
    }
}
