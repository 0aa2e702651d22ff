//! Tactical battlefield map: placed objects, derived edge masks, fog of war,
//! fire and smoke, ground storage. This file wires the focused map
//! submodules together.

use std::collections::BTreeMap;
use std::hash::Hasher;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use slotmap::SlotMap;
use xxhash_rust::xxh3::Xxh3;

use crate::types::*;

mod damage;
mod item;
mod pathing;
mod pyro;
mod quadtree;
mod save;
mod storage;
mod visibility;

pub use damage::{DamageReport, Explosion};
pub use item::{MapItem, Placement};
pub use pyro::{MAX_PYRO_DURATION, Pyro};
pub use quadtree::{NUM_QUAD_NODES, QuadTree};
pub use save::{DebrisSave, ItemSave, MapSave};
pub use storage::Storage;
pub use visibility::{FowDelta, Viewer};

pub struct Map {
    width: i32,
    height: i32,
    items: SlotMap<ItemId, MapItem>,
    quad: QuadTree,
    path_map: Vec<u8>,
    vis_map: Vec<u8>,
    unit_blocks: Vec<bool>,
    obscured: Vec<u16>,
    pyro: Vec<Pyro>,
    fog: Vec<bool>,
    cached_fog: Vec<bool>,
    past_seen: Vec<bool>,
    storages: BTreeMap<Pos, Storage>,
    rng: ChaCha8Rng,
    log: Vec<LogEvent>,
}

impl Map {
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        assert!(
            width >= 1 && width <= MAP_SIZE && height >= 1 && height <= MAP_SIZE,
            "map dimensions must fit the {MAP_SIZE}x{MAP_SIZE} grid"
        );
        let cells = (width * height) as usize;
        Self {
            width,
            height,
            items: SlotMap::with_key(),
            quad: QuadTree::new(),
            path_map: vec![0; cells],
            vis_map: vec![0; cells],
            unit_blocks: vec![false; cells],
            obscured: vec![0; cells],
            pyro: vec![Pyro::None; cells],
            fog: vec![false; cells],
            cached_fog: vec![false; cells],
            past_seen: vec![false; cells],
            storages: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            log: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Pos { y: 0, x: 0 }, self.width, self.height)
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    pub fn item(&self, id: ItemId) -> Option<&MapItem> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &MapItem)> {
        self.items.iter()
    }

    /// Spatially indexed lookup of placed items overlapping a rect, filtered
    /// by definition flags. The rect must already be clipped to the grid.
    pub fn find_items(&self, rect: Rect, required_flags: u8, excluded_flags: u8) -> Vec<ItemId> {
        self.quad.find_items(&self.items, rect, required_flags, excluded_flags)
    }

    pub fn items_at(&self, pos: Pos) -> Vec<ItemId> {
        self.quad.items_at(&self.items, pos)
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    /// Deterministic digest of all simulation-relevant map state.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_i32(self.width);
        hasher.write_i32(self.height);

        for (_, item) in self.items.iter() {
            hasher.write(item.def.key.as_bytes());
            hasher.write_u16(item.hp);
            hasher.write_i32(item.placement.origin.x);
            hasher.write_i32(item.placement.origin.y);
            hasher.write_u8(item.placement.rot.steps());
        }

        for state in &self.pyro {
            hasher.write_u8(state.pack());
        }
        for (seen, ever) in self.fog.iter().zip(&self.past_seen) {
            hasher.write_u8(u8::from(*seen) << 1 | u8::from(*ever));
        }
        for (pos, storage) in &self.storages {
            hasher.write_i32(pos.x);
            hasher.write_i32(pos.y);
            for (clip, count) in storage.clips() {
                hasher.write(clip.as_bytes());
                hasher.write_u32(*count);
            }
        }
        hasher.finish()
    }
}
