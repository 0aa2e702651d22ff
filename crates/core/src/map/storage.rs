//! Ground storage piles used for resupply.
//! This module exists so clip bookkeeping stays separate from item damage
//! and pathing concerns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Map;
use crate::types::*;

/// One pile of ground debris: clip counts keyed by clip definition key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    clips: BTreeMap<String, u32>,
}

impl Storage {
    pub fn count(&self, clip: &str) -> u32 {
        self.clips.get(clip).copied().unwrap_or(0)
    }

    pub fn clips(&self) -> impl Iterator<Item = (&String, &u32)> {
        self.clips.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn add(&mut self, clip: &str, count: u32) {
        *self.clips.entry(clip.to_string()).or_insert(0) += count;
    }

    fn take_one(&mut self, clip: &str) -> bool {
        match self.clips.get_mut(clip) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.clips.remove(clip);
                }
                true
            }
            _ => false,
        }
    }
}

impl Map {
    pub fn storage_at(&self, pos: Pos) -> Option<&Storage> {
        self.storages.get(&pos)
    }

    pub fn storages(&self) -> impl Iterator<Item = (&Pos, &Storage)> {
        self.storages.iter()
    }

    pub fn add_to_storage(&mut self, pos: Pos, clip: &str, count: u32) {
        assert!(self.in_bounds(pos), "storage piles live on map cells");
        if count == 0 {
            return;
        }
        self.storages.entry(pos).or_default().add(clip, count);
    }

    /// Nearest pile holding at least one compatible clip, by squared
    /// distance; ties fall to the first pile in cell order.
    pub fn find_storage(&self, clip: &str, from: Pos) -> Option<Pos> {
        let mut best: Option<(i32, Pos)> = None;
        for (&pos, storage) in &self.storages {
            if storage.count(clip) == 0 {
                continue;
            }
            let dx = pos.x - from.x;
            let dy = pos.y - from.y;
            let dist2 = dx * dx + dy * dy;
            if best.is_none_or(|(best_dist, _)| dist2 < best_dist) {
                best = Some((dist2, pos));
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Take one clip out of the pile at a cell. Empty piles vanish.
    pub fn lock_storage(&mut self, pos: Pos, clip: &str) -> bool {
        let Some(storage) = self.storages.get_mut(&pos) else {
            return false;
        };
        if !storage.take_one(clip) {
            return false;
        }
        if storage.is_empty() {
            self.storages.remove(&pos);
        }
        self.log.push(LogEvent::StorageTaken { pos, clip: clip.to_string() });
        true
    }

    /// Put a previously taken clip back.
    pub fn release_storage(&mut self, pos: Pos, clip: &str) {
        self.add_to_storage(pos, clip, 1);
        self.log.push(LogEvent::StorageReturned { pos, clip: clip.to_string() });
    }
}
