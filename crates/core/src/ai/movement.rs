//! Movement behaviors: hunting remembered enemies, wandering, traveling.
//! This module exists so every move the AI proposes is trimmed to the TU
//! budget with the same cost table the solver uses.
//! It does not apply moves; the controller does.

use rand_chacha::rand_core::Rng;

use super::{ThinkOutcome, TeamAi, chebyshev, dist2, enemy_slots};
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

/// How far a wander hop reaches, in cells per axis.
const WANDER_RADIUS: i32 = 3;
const WANDER_ATTEMPTS: u32 = 8;

/// Truncate a solved path to a TU budget. Steps are classified exactly the
/// way the solver priced them: 100 centi-TU orthogonal, 141 diagonal.
/// Returns the kept steps and their cumulative cost.
pub fn trim_path_to_cost(start: Pos, path: &[Pos], budget: u32) -> (Vec<Pos>, u32) {
    let mut kept = Vec::new();
    let mut cost = 0;
    let mut prev = start;
    for &step in path {
        let diagonal = step.x != prev.x && step.y != prev.y;
        let step_cost = if diagonal { DIAG_COST } else { ORTHO_COST };
        if cost + step_cost > budget {
            break;
        }
        cost += step_cost;
        kept.push(step);
        prev = step;
    }
    (kept, cost)
}

impl TeamAi {
    /// Hunt the best remembered enemy position: least stale, then nearest,
    /// then lowest slot. Only worth starting on a full TU budget. A
    /// remembered position the unit is already next to without seeing
    /// anyone is wrong; drop it instead of walking into it.
    pub(super) fn think_search(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        if unit.tu < unit.max_tu {
            return ThinkOutcome::NoAction;
        }

        let mut best: Option<(u8, i32, usize)> = None;
        for (enemy_slot, _) in enemy_slots(self.team, units) {
            let entry = self.lkp(enemy_slot);
            if !entry.is_known() {
                continue;
            }
            let key = (entry.turns_since_seen, dist2(unit.pos, entry.pos), enemy_slot);
            if best.is_none_or(|b| key < b) {
                best = Some(key);
            }
        }
        let Some((_, _, enemy_slot)) = best else {
            return ThinkOutcome::NoAction;
        };

        let entry = self.lkp(enemy_slot);
        if entry.turns_since_seen > 0 && chebyshev(unit.pos, entry.pos) <= 1 {
            self.drop_lkp(enemy_slot);
            return ThinkOutcome::NoAction;
        }

        match map.solve_path(unit.pos, entry.pos) {
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

    /// Random short hop when there is nothing better to do.
    pub(super) fn think_wander(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        for _ in 0..WANDER_ATTEMPTS {
            let dx = (self.rng.next_u32() % (2 * WANDER_RADIUS as u32 + 1)) as i32 - WANDER_RADIUS;
            let dy = (self.rng.next_u32() % (2 * WANDER_RADIUS as u32 + 1)) as i32 - WANDER_RADIUS;
            if dx == 0 && dy == 0 {
                continue;
            }
            let goal = Pos { y: unit.pos.y + dy, x: unit.pos.x + dx };
            if !map.in_bounds(goal) {
                continue;
            }
            if let PathOutcome::Solved { cost, path } = map.solve_path(unit.pos, goal)
                && cost <= unit.tu
            {
                return ThinkOutcome::Action(AiAction::Move { path, cost });
            }
        }
        ThinkOutcome::NoAction
    }

    /// Long-range fallback: hold a far travel target per unit and keep
    /// walking toward it across turns.
    pub(super) fn think_travel(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        let target = match self.travel[slot] {
            Some(target) if target != unit.pos => target,
            _ => {
                self.travel[slot] = None;
                for _ in 0..WANDER_ATTEMPTS {
                    let candidate = Pos {
                        y: (self.rng.next_u32() % map.height() as u32) as i32,
                        x: (self.rng.next_u32() % map.width() as u32) as i32,
                    };
                    if candidate != unit.pos {
                        self.travel[slot] = Some(candidate);
                        break;
                    }
                }
                match self.travel[slot] {
                    Some(target) => target,
                    None => return ThinkOutcome::NoAction,
                }
            }
        };
        match map.solve_path(unit.pos, target) {
            PathOutcome::Solved { path, .. } => {
                let (kept, cost) = trim_path_to_cost(unit.pos, &path, unit.tu);
                if kept.is_empty() {
                    ThinkOutcome::NoAction
                } else {
                    ThinkOutcome::Action(AiAction::Move { path: kept, cost })
                }
            }
            PathOutcome::NoSolution | PathOutcome::StartEndSame => {
                self.travel[slot] = None;
                ThinkOutcome::NoAction
            }
        }
    }
}
