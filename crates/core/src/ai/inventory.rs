//! Resupply behaviors for units that ran dry.
//! This module exists so the out-of-ammo branch reads as one piece: reload
//! from the pile underfoot, or walk to the nearest compatible pile.

use super::{ThinkOutcome, TeamAi, movement::trim_path_to_cost};
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

impl TeamAi {
    /// Standing on a pile with a compatible clip: take it.
    pub(super) fn think_inventory(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        let Some(weapon) = unit.weapon_def() else {
            return ThinkOutcome::NoAction;
        };
        if unit.has_rounds() {
            return ThinkOutcome::NoAction;
        }
        match map.storage_at(unit.pos) {
            Some(storage) if storage.count(weapon.clip) > 0 => {
                ThinkOutcome::Action(AiAction::Pickup { clip: weapon.clip.to_string() })
            }
            _ => ThinkOutcome::NoAction,
        }
    }

    /// Walk toward the nearest pile holding a compatible clip.
    pub(super) fn think_move_to_ammo(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        let Some(weapon) = unit.weapon_def() else {
            return ThinkOutcome::NoAction;
        };
        if unit.has_rounds() {
            return ThinkOutcome::NoAction;
        }
        let Some(pile) = map.find_storage(weapon.clip, unit.pos) else {
            return ThinkOutcome::NoAction;
        };
        if pile == unit.pos {
            return ThinkOutcome::SolvedNoAction;
        }
        match map.solve_path(unit.pos, pile) {
            PathOutcome::Solved { path, .. } => {
                let (kept, cost) = trim_path_to_cost(unit.pos, &path, unit.tu);
                if kept.is_empty() {
                    ThinkOutcome::NoAction
                } else {
                    ThinkOutcome::Action(AiAction::Move { path: kept, cost })
                }
            }
            PathOutcome::NoSolution | PathOutcome::StartEndSame => ThinkOutcome::NoAction,
        }
    }
}
