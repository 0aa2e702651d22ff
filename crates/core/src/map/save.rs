//! Persisted map state: placed items and ground debris.
//! This module exists so the map can round-trip its own fields; fields equal
//! to definition defaults are omitted from the document.
//! It does not persist AI state; that is rebuilt from visibility each
//! session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Map;
use crate::content;
use crate::types::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSave {
    pub width: i32,
    pub height: i32,
    pub items: Vec<ItemSave>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debris: Vec<DebrisSave>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSave {
    pub def: String,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rot: u8,
    /// Omitted while the item still has its definition hit points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<u16>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebrisSave {
    pub x: i32,
    pub y: i32,
    pub clips: BTreeMap<String, u32>,
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

impl Map {
    pub fn to_save(&self) -> MapSave {
        let mut items: Vec<ItemSave> = self
            .items
            .values()
            .map(|item| ItemSave {
                def: item.def.key.to_string(),
                x: item.placement.origin.x,
                y: item.placement.origin.y,
                rot: item.placement.rot.steps(),
                hp: (item.hp != item.def.hp).then_some(item.hp),
            })
            .collect();
        // Slot order depends on placement history; cell order does not.
        items.sort_by(|a, b| (a.y, a.x, &a.def).cmp(&(b.y, b.x, &b.def)));

        let debris = self
            .storages
            .iter()
            .map(|(pos, storage)| DebrisSave {
                x: pos.x,
                y: pos.y,
                clips: storage.clips().map(|(clip, count)| (clip.clone(), *count)).collect(),
            })
            .collect();

        MapSave { width: self.width, height: self.height, items, debris }
    }

    pub fn from_save(save: &MapSave, seed: u64) -> Result<Map, SaveError> {
        let mut map = Map::new(save.width, save.height, seed);
        for item in &save.items {
            if content::item_def(&item.def).is_none() {
                return Err(SaveError::UnknownDef(item.def.clone()));
            }
            let origin = Pos { y: item.y, x: item.x };
            let id = map
                .add_item(&item.def, origin, Rotation::new(item.rot))
                .map_err(|_| SaveError::OutOfBounds { x: item.x, y: item.y })?;
            if let Some(hp) = item.hp {
                map.items[id].hp = hp;
            }
        }
        for pile in &save.debris {
            let pos = Pos { y: pile.y, x: pile.x };
            if !map.in_bounds(pos) {
                return Err(SaveError::OutOfBounds { x: pile.x, y: pile.y });
            }
            for (clip, count) in &pile.clips {
                map.add_to_storage(pos, clip, *count);
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::keys;
    use crate::test_support::*;

    fn built_map() -> Map {
        let mut map = open_map(16, 16);
        map.add_item(keys::ITEM_TREE, Pos { y: 3, x: 3 }, Rotation::R0).expect("tree");
        map.add_item(keys::ITEM_WOOD_WALL, Pos { y: 8, x: 2 }, Rotation::R90).expect("wall");
        let crate_id = map.add_item(keys::ITEM_CRATE, Pos { y: 5, x: 9 }, Rotation::R0).expect("crate");
        map.damage_item(crate_id, DamageDesc { kinetic: 10, energy: 0, incendiary: 0 });
        map.add_to_storage(Pos { y: 1, x: 7 }, keys::CLIP_RIFLE, 2);
        map.add_to_storage(Pos { y: 1, x: 7 }, keys::CLIP_GRENADE, 1);
        map
    }

    #[test]
    fn save_round_trips_through_json() {
        let map = built_map();
        let save = map.to_save();
        let json = serde_json::to_string(&save).expect("serialize");
        let parsed: MapSave = serde_json::from_str(&json).expect("parse");
        let restored = Map::from_save(&parsed, 0).expect("restore");
        assert_eq!(restored.to_save(), save);
    }

    #[test]
    fn default_fields_are_omitted_from_the_document() {
        let map = built_map();
        let save = map.to_save();
        let json = serde_json::to_string(&save).expect("serialize");

        let tree = save.items.iter().find(|item| item.def == keys::ITEM_TREE).expect("tree");
        assert_eq!(tree.hp, None, "undamaged items do not persist hp");
        assert_eq!(tree.rot, 0);

        let damaged = save.items.iter().find(|item| item.def == keys::ITEM_CRATE).expect("crate");
        assert_eq!(damaged.hp, Some(30));

        // One hp field in the document: the damaged crate's.
        assert_eq!(json.matches("\"hp\"").count(), 1);
        assert_eq!(json.matches("\"rot\"").count(), 1, "only the rotated wall persists rot");
    }

    #[test]
    fn restored_map_preserves_derived_masks() {
        let map = built_map();
        let restored = Map::from_save(&map.to_save(), 0).expect("restore");
        for cell in map.bounds().cells() {
            assert_eq!(
                map.path_mask(ConnectionKind::Path, cell),
                restored.path_mask(ConnectionKind::Path, cell),
                "path mask at {cell:?}"
            );
        }
    }

    #[test]
    fn unknown_defs_fail_to_restore() {
        let mut save = built_map().to_save();
        save.items[0].def = "item_left_in_an_old_build".to_string();
        assert!(matches!(Map::from_save(&save, 0), Err(SaveError::UnknownDef(_))));
    }

    #[test]
    fn out_of_bounds_items_fail_to_restore() {
        let mut save = built_map().to_save();
        save.items[0].x = 40;
        assert!(matches!(Map::from_save(&save, 0), Err(SaveError::OutOfBounds { .. })));
    }
}
