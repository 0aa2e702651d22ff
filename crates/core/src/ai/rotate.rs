//! Terminal facing fallback: if the whole chain produced nothing, at least
//! face the nearest known threat.

use super::{ThinkOutcome, TeamAi, dist2, enemy_slots};
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

impl TeamAi {
    pub(super) fn think_rotate(
        &mut self,
        slot: usize,
        units: &[Unit],
        _map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];

        let mut nearest: Option<(i32, Pos)> = None;
        for (enemy_slot, _) in enemy_slots(self.team, units) {
            let entry = self.lkp(enemy_slot);
            if !entry.is_known() {
                continue;
            }
            let key = dist2(unit.pos, entry.pos);
            if nearest.is_none_or(|(best, _)| key < best) {
                nearest = Some((key, entry.pos));
            }
        }
        let Some((_, threat_pos)) = nearest else {
            return ThinkOutcome::NoAction;
        };

        let Some(facing) =
            Facing::from_delta(threat_pos.x - unit.pos.x, threat_pos.y - unit.pos.y)
        else {
            return ThinkOutcome::NoAction;
        };
        if unit.facing == facing {
            return ThinkOutcome::NoAction;
        }
        ThinkOutcome::Action(AiAction::Rotate { facing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamAi;
    use crate::test_support::*;

    #[test]
    fn rotation_faces_the_nearest_known_threat() {
        let map = open_map(12, 12);
        let units = vec![
            drone_at(Pos { y: 6, x: 6 }),
            soldier_at(Pos { y: 6, x: 9 }),
            soldier_at(Pos { y: 2, x: 6 }),
        ];
        let mut ai = TeamAi::new(Team::Alien, 8);
        ai.start_turn(&units, &map);
        match ai.think_rotate(0, &units, &map) {
            ThinkOutcome::Action(AiAction::Rotate { facing }) => {
                assert_eq!(facing, Facing::East, "the x-distance-3 soldier is nearest");
            }
            other => panic!("expected a rotation, got {other:?}"),
        }
    }

    #[test]
    fn already_facing_the_threat_needs_no_action() {
        let map = open_map(12, 12);
        let mut units = vec![drone_at(Pos { y: 6, x: 6 }), soldier_at(Pos { y: 6, x: 9 })];
        units[0].facing = Facing::East;
        let mut ai = TeamAi::new(Team::Alien, 8);
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_rotate(0, &units, &map), ThinkOutcome::NoAction);
    }

    #[test]
    fn no_known_threat_leaves_facing_alone() {
        let map = open_map(12, 12);
        let units = vec![drone_at(Pos { y: 6, x: 6 })];
        let mut ai = TeamAi::new(Team::Alien, 8);
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_rotate(0, &units, &map), ThinkOutcome::NoAction);
    }
}
