//! Psionic attack selection.
//! This module exists so psi scoring stays separate from ballistic scoring;
//! psi needs no ammunition, only time units and a line to the target.

use super::{ThinkOutcome, TeamAi, enemy_slots};
use crate::content;
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

use super::lkp::MAX_TURNS_LKP;

impl TeamAi {
    /// Score remembered enemies by memory freshness times kind weight and
    /// strike the best one the unit still has a sight line to. Strictly
    /// greater keeps the first (lowest slot) maximum.
    pub(super) fn think_psi(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        let stats = content::unit_stats(unit.kind);
        let Some(psi) = stats.psi else {
            return ThinkOutcome::NoAction;
        };
        if unit.tu < psi.tu_cost {
            return ThinkOutcome::NoAction;
        }

        let mut best: Option<(f32, usize)> = None;
        for (target_slot, target) in enemy_slots(self.team, units) {
            let entry = self.lkp(target_slot);
            if !entry.is_known() {
                continue;
            }
            if !map.can_see(unit.pos, entry.pos, ConnectionKind::Sight) {
                continue;
            }
            let freshness = f32::from(MAX_TURNS_LKP - entry.turns_since_seen);
            let score = freshness * content::unit_stats(target.kind).weight;
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, target_slot));
            }
        }

        match best {
            Some((_, target)) => ThinkOutcome::Action(AiAction::Psi { target }),
            None => ThinkOutcome::NoAction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamAi;
    use crate::content::keys;
    use crate::test_support::*;

    #[test]
    fn psion_strikes_the_heaviest_fresh_target() {
        let map = open_map(16, 16);
        let units = vec![
            psion_at(Pos { y: 8, x: 2 }),
            soldier_at(Pos { y: 8, x: 8 }),
            civilian_at(Pos { y: 8, x: 6 }),
        ];
        let mut ai = TeamAi::new(Team::Alien, 13);
        ai.start_turn(&units, &map);
        match ai.think_psi(0, &units, &map) {
            ThinkOutcome::Action(AiAction::Psi { target }) => {
                assert_eq!(target, 1, "soldier weight beats civilian weight");
            }
            other => panic!("expected a psi strike, got {other:?}"),
        }
    }

    #[test]
    fn non_psionic_units_skip_the_behavior() {
        let map = open_map(16, 16);
        let units = vec![drone_at(Pos { y: 8, x: 2 }), soldier_at(Pos { y: 8, x: 8 })];
        let mut ai = TeamAi::new(Team::Alien, 13);
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_psi(0, &units, &map), ThinkOutcome::NoAction);
    }

    #[test]
    fn psi_needs_a_clear_line_to_the_remembered_position() {
        let mut map = open_map(16, 16);
        map.add_item(keys::ITEM_TREE, Pos { y: 8, x: 5 }, Rotation::R0).expect("tree");
        let units = vec![psion_at(Pos { y: 8, x: 2 }), soldier_at(Pos { y: 8, x: 8 })];
        let mut ai = TeamAi::new(Team::Alien, 13);
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_psi(0, &units, &map), ThinkOutcome::NoAction);
    }

    #[test]
    fn stale_memories_score_below_fresh_ones() {
        let map = open_map(24, 24);
        // Both targets are soldiers; only staleness differs.
        let units = vec![
            psion_at(Pos { y: 12, x: 2 }),
            soldier_at(Pos { y: 12, x: 8 }),
            soldier_at(Pos { y: 12, x: 9 }),
        ];
        let mut ai = TeamAi::new(Team::Alien, 13);
        ai.start_turn(&units, &map);
        // Slot 1 remembered two turns ago, slot 2 fresh.
        ai.inform(1, Pos { y: 12, x: 8 });
        ai.inform(2, Pos { y: 12, x: 9 });
        ai.lkp[1].turns_since_seen = 2;
        match ai.think_psi(0, &units, &map) {
            ThinkOutcome::Action(AiAction::Psi { target }) => assert_eq!(target, 2),
            other => panic!("expected a psi strike, got {other:?}"),
        }
    }

    #[test]
    fn psi_waits_when_time_units_run_short() {
        let map = open_map(16, 16);
        let mut units = vec![psion_at(Pos { y: 8, x: 2 }), soldier_at(Pos { y: 8, x: 8 })];
        units[0].tu = 500;
        let mut ai = TeamAi::new(Team::Alien, 13);
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_psi(0, &units, &map), ThinkOutcome::NoAction);
    }
}
