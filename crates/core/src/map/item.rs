//! Placed-object instances and their world placement transforms.
//! This module exists so footprint math lives in one place.
//! It does not own derived mask accumulation; `pathing` recomputes those.

use super::Map;
use crate::content::{self, MapItemDef};
use crate::types::*;

/// Where a definition sits in the world: origin cell plus quarter-turn
/// rotation. Replaces a packed affine matrix with the four admissible
/// transforms spelled out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub origin: Pos,
    pub rot: Rotation,
}

impl Placement {
    pub fn bounds(&self, def: &MapItemDef) -> Rect {
        let (w, h) = if self.rot.swaps_axes() { (def.cy, def.cx) } else { (def.cx, def.cy) };
        Rect::from_origin_size(self.origin, w, h)
    }

    /// Map a world cell inside the bounds back to definition-local
    /// coordinates. None when the cell lies outside the footprint.
    pub fn local_cell(&self, def: &MapItemDef, world: Pos) -> Option<(i32, i32)> {
        let bounds = self.bounds(def);
        if !bounds.contains(world) {
            return None;
        }
        let dx = world.x - bounds.min.x;
        let dy = world.y - bounds.min.y;
        Some(match self.rot.steps() {
            0 => (dx, dy),
            1 => (dy, def.cy - 1 - dx),
            2 => (def.cx - 1 - dx, def.cy - 1 - dy),
            3 => (def.cx - 1 - dy, dx),
            _ => unreachable!("rotation is masked to two bits"),
        })
    }
}

/// One placed object. Owned by the map's item arena; everything else refers
/// to it through its `ItemId` handle.
#[derive(Clone, Debug)]
pub struct MapItem {
    pub def: &'static MapItemDef,
    pub hp: u16,
    pub placement: Placement,
    pub bounds: Rect,
    /// Updated by fog-of-war marking; drives draw/hide decisions upstream.
    pub seen: bool,
}

impl MapItem {
    pub fn flags(&self) -> u8 {
        self.def.flags
    }

    /// Movement-blocking nibble this item contributes at a world cell,
    /// rotated into world orientation.
    pub fn pather_mask(&self, world: Pos) -> u8 {
        match self.placement.local_cell(self.def, world) {
            Some((lx, ly)) => rotate_edge_mask(self.def.pather(lx, ly), self.placement.rot.steps()),
            None => 0,
        }
    }

    pub fn visibility_mask(&self, world: Pos) -> u8 {
        match self.placement.local_cell(self.def, world) {
            Some((lx, ly)) => {
                rotate_edge_mask(self.def.visibility(lx, ly), self.placement.rot.steps())
            }
            None => 0,
        }
    }
}

impl Map {
    pub fn add_item(&mut self, key: &str, origin: Pos, rot: Rotation) -> Result<ItemId, MapError> {
        let def = content::item_def(key).ok_or_else(|| MapError::UnknownDef(key.to_string()))?;
        if rot.steps() != 0 && !def.can_rotate() {
            return Err(MapError::RotationNotAllowed { def: def.key });
        }
        let placement = Placement { origin, rot };
        let bounds = placement.bounds(def);
        if !self.bounds().contains_rect(&bounds) {
            return Err(MapError::OutOfBounds { bounds });
        }

        let id = self.items.insert(MapItem { def, hp: def.hp, placement, bounds, seen: false });
        self.quad.add(id, bounds);
        if def.obscures() {
            for cell in bounds.cells() {
                let idx = self.index(cell);
                self.obscured[idx] += 1;
            }
        }
        self.recompute_masks(bounds);
        Ok(id)
    }

    pub fn delete_item(&mut self, id: ItemId) -> bool {
        let Some(item) = self.items.remove(id) else {
            return false;
        };
        self.quad.unlink(id, item.bounds);
        if item.def.obscures() {
            for cell in item.bounds.cells() {
                let idx = self.index(cell);
                debug_assert!(self.obscured[idx] > 0, "obscured count must stay symmetric");
                self.obscured[idx] = self.obscured[idx].saturating_sub(1);
            }
        }
        self.recompute_masks(item.bounds);
        true
    }

    /// Remove every item whose footprint covers the cell. Returns how many
    /// were removed.
    pub fn delete_at(&mut self, pos: Pos) -> usize {
        let ids = self.quad.items_at(&self.items, pos);
        for id in &ids {
            self.delete_item(*id);
        }
        ids.len()
    }

    pub fn obscured_at(&self, pos: Pos) -> u16 {
        if !self.in_bounds(pos) {
            return 0;
        }
        self.obscured[self.index(pos)]
    }
}
