//! Flee behavior for units that never fight.
//! This module exists so panic movement stays simple: one step per think,
//! always away from the nearest remembered threat.

use super::{ThinkOutcome, TeamAi, dist2, enemy_slots};
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

impl TeamAi {
    /// Step onto the reachable neighbor cell that gains the most distance
    /// from the nearest known threat. Staying put is preferred over a step
    /// that closes in.
    pub(super) fn think_flee(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];

        let mut threat: Option<(i32, Pos)> = None;
        for (enemy_slot, _) in enemy_slots(self.team, units) {
            let entry = self.lkp(enemy_slot);
            if !entry.is_known() {
                continue;
            }
            let key = dist2(unit.pos, entry.pos);
            if threat.is_none_or(|(best, _)| key < best) {
                threat = Some((key, entry.pos));
            }
        }
        let Some((current_dist, threat_pos)) = threat else {
            return ThinkOutcome::NoAction;
        };

        let mut best: Option<(i32, Pos, u32)> = None;
        for (dx, dy) in DIRS8 {
            if !map.connected8(ConnectionKind::Path, unit.pos, dx, dy) {
                continue;
            }
            let step = Pos { y: unit.pos.y + dy, x: unit.pos.x + dx };
            let cost = if dx != 0 && dy != 0 { DIAG_COST } else { ORTHO_COST };
            if cost > unit.tu {
                continue;
            }
            let gain = dist2(step, threat_pos);
            if best.is_none_or(|(best_gain, _, _)| gain > best_gain) {
                best = Some((gain, step, cost));
            }
        }

        match best {
            Some((gain, step, cost)) if gain > current_dist => {
                ThinkOutcome::Action(AiAction::Move { path: vec![step], cost })
            }
            _ => ThinkOutcome::NoAction,
        }
    }
}
