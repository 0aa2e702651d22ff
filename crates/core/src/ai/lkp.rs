//! Last-known-position bookkeeping and turn boundaries.
//! This module exists so memory of enemies ages in one place.
//! It does not decide actions; behaviors consume the table.

use super::{TeamAi, unit_sees};
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

/// Staleness saturates here and the entry counts as unknown.
pub const MAX_TURNS_LKP: u8 = 8;

/// One remembered enemy: where it was last seen and how many turns ago.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lkp {
    pub pos: Pos,
    pub turns_since_seen: u8,
}

impl Lkp {
    pub fn unknown() -> Self {
        Self { pos: Pos { y: 0, x: 0 }, turns_since_seen: MAX_TURNS_LKP }
    }

    pub fn is_known(&self) -> bool {
        self.turns_since_seen < MAX_TURNS_LKP
    }
}

impl TeamAi {
    /// Run once per team-turn boundary, before any think call that turn:
    /// resets think budgets and ages or refreshes every enemy entry from
    /// current visibility.
    pub fn start_turn(&mut self, units: &[Unit], map: &Map) {
        self.ensure_slots(units.len());
        self.think_count.fill(0);

        for (slot, target) in units.iter().enumerate() {
            if !self.team.is_enemy_of(target.team) || !target.is_alive() {
                self.lkp[slot] = Lkp::unknown();
                continue;
            }
            let seen = units.iter().any(|viewer| {
                viewer.team == self.team && viewer.is_alive() && unit_sees(map, viewer, target.pos)
            });
            if seen {
                self.lkp[slot] = Lkp { pos: target.pos, turns_since_seen: 0 };
            } else if self.lkp[slot].is_known() {
                self.lkp[slot].turns_since_seen =
                    self.lkp[slot].turns_since_seen.saturating_add(1).min(MAX_TURNS_LKP);
            }
        }
    }

    /// External sighting report (a teammate spotted something mid-turn).
    pub fn inform(&mut self, slot: usize, pos: Pos) {
        self.ensure_slots(slot + 1);
        self.lkp[slot] = Lkp { pos, turns_since_seen: 0 };
    }

    pub fn lkp(&self, slot: usize) -> Lkp {
        self.lkp.get(slot).copied().unwrap_or_else(Lkp::unknown)
    }

    pub(super) fn drop_lkp(&mut self, slot: usize) {
        self.lkp[slot] = Lkp::unknown();
    }
}
