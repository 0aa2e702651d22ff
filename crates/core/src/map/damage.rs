//! Item damage resolution and destruction transitions.
//! This module exists so hit-point bookkeeping, wreck swaps, and explosion
//! hand-off stay together.
//! It does not apply explosions itself; callers drive area effects.

use rand_chacha::rand_core::Rng;

use super::{MAX_PYRO_DURATION, Map};
use crate::content;
use crate::types::*;

/// Blast parameters of an EXPLODES item going up. The caller decides when
/// to feed this back into `area_damage`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Explosion {
    pub center: Pos,
    pub radius: u32,
    pub damage: DamageDesc,
}

const ITEM_BLAST_RADIUS: u32 = 2;
const ITEM_BLAST_DAMAGE: DamageDesc = DamageDesc { kinetic: 30, energy: 0, incendiary: 40 };

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Union of destroyed footprints, for caller-driven debris effects.
    pub destroyed: Option<Rect>,
    pub explosions: Vec<Explosion>,
}

impl DamageReport {
    pub fn merge(&mut self, other: DamageReport) {
        self.destroyed = match (self.destroyed, other.destroyed) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        };
        self.explosions.extend(other.explosions);
    }
}

impl Map {
    /// Apply one damage description to one placed item. Kinetic and energy
    /// reduce hit points; at zero the item turns into its wreck variant or
    /// is removed outright. Incendiary rolls ignition per footprint cell
    /// against the definition's flammability.
    pub fn damage_item(&mut self, id: ItemId, damage: DamageDesc) -> DamageReport {
        let mut report = DamageReport::default();
        let Some(item) = self.items.get(id) else {
            return report;
        };
        let def = item.def;
        let bounds = item.bounds;
        let current_hp = item.hp;

        if def.can_damage() && damage.total() > 0 {
            let hp = current_hp.saturating_sub(damage.total());
            if hp == 0 {
                if let Some(wreck_key) = def.wreck {
                    self.wreck_item(id, wreck_key);
                } else {
                    self.delete_item(id);
                    self.log.push(LogEvent::ItemDestroyed { def: def.key, bounds });
                }
                report.destroyed = Some(bounds);
                if def.explodes() {
                    report.explosions.push(Explosion {
                        center: bounds_center(bounds),
                        radius: ITEM_BLAST_RADIUS,
                        damage: ITEM_BLAST_DAMAGE,
                    });
                }
            } else {
                self.items[id].hp = hp;
            }
        }

        if damage.incendiary > 0 && def.flammable > 0 {
            let duration = damage.incendiary.min(u16::from(MAX_PYRO_DURATION)) as u8;
            for cell in bounds.cells() {
                let roll = (self.rng.next_u32() % 256) as u8;
                if roll < def.flammable {
                    self.ignite_fire(cell, duration);
                }
            }
        }

        report
    }

    /// Damage every item whose footprint covers the cell.
    pub fn damage_at(&mut self, pos: Pos, damage: DamageDesc) -> DamageReport {
        let mut report = DamageReport::default();
        if !self.in_bounds(pos) {
            return report;
        }
        for id in self.quad.items_at(&self.items, pos) {
            report.merge(self.damage_item(id, damage));
        }
        report
    }

    /// Apply a blast over a Chebyshev radius. Secondary explosions are
    /// reported, not chained; the caller decides whether to feed them back.
    pub fn area_damage(&mut self, center: Pos, radius: u32, damage: DamageDesc) -> DamageReport {
        let mut report = DamageReport::default();
        let r = radius as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let cell = Pos { y: center.y + dy, x: center.x + dx };
                if self.in_bounds(cell) {
                    report.merge(self.damage_at(cell, damage));
                }
            }
        }
        report
    }

    fn wreck_item(&mut self, id: ItemId, wreck_key: &'static str) {
        let wreck = content::item_def(wreck_key).expect("wreck defs must exist in content");
        let item = &self.items[id];
        assert_eq!(
            (wreck.cx, wreck.cy),
            (item.def.cx, item.def.cy),
            "wreck footprint must match the parent def"
        );
        let old_def = item.def;
        let bounds = item.bounds;

        if old_def.obscures() != wreck.obscures() {
            for cell in bounds.cells() {
                let idx = self.index(cell);
                if wreck.obscures() {
                    self.obscured[idx] += 1;
                } else {
                    debug_assert!(self.obscured[idx] > 0, "obscured count must stay symmetric");
                    self.obscured[idx] = self.obscured[idx].saturating_sub(1);
                }
            }
        }

        let item = &mut self.items[id];
        item.def = wreck;
        item.hp = wreck.hp;
        self.log.push(LogEvent::ItemWrecked { def: old_def.key, wreck: wreck.key, bounds });
        self.recompute_masks(bounds);
    }
}

fn bounds_center(bounds: Rect) -> Pos {
    Pos { y: (bounds.min.y + bounds.max.y) / 2, x: (bounds.min.x + bounds.max.x) / 2 }
}
