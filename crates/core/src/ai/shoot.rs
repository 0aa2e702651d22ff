//! Target and fire-mode selection.
//! This module exists so hit-chance math and the hold-fire vetoes stay next
//! to each other.
//! It does not resolve shots; the controller applies the chosen action.

use super::{ThinkOutcome, TeamAi, chebyshev, dist2, enemy_slots, unit_sees};
use crate::content::{self, FireMode, WeaponDef};
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

/// Shots with a worse hit chance than this are never worth the time units.
pub const MINIMUM_FIRE_CHANCE: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireStats {
    pub chance: f32,
    pub expected_damage: f32,
    pub tu_cost: u32,
    /// Expected damage per whole time unit; the score shots compete on.
    pub damage_per_tu: f32,
}

/// Hit chance and expected damage for one mode at one range. Accuracy
/// falls off linearly with distance against the weapon's range scale.
pub fn fire_statistics(
    shooter_accuracy: f32,
    weapon: &WeaponDef,
    mode: &FireMode,
    distance: f32,
) -> FireStats {
    let falloff = 1.0 + distance / weapon.range as f32;
    let chance = (shooter_accuracy * mode.accuracy / falloff).clamp(0.0, 0.95);
    let expected_damage = chance * mode.shots as f32 * f32::from(weapon.damage.total());
    FireStats {
        chance,
        expected_damage,
        tu_cost: mode.tu_cost,
        damage_per_tu: expected_damage * TU_SCALE as f32 / mode.tu_cost as f32,
    }
}

impl TeamAi {
    /// Best shot by damage per TU across every visible enemy and affordable
    /// fire mode. Strictly-greater comparison keeps the first (lowest slot,
    /// earliest mode) candidate on ties.
    pub(super) fn think_shoot(
        &mut self,
        slot: usize,
        units: &[Unit],
        map: &Map,
    ) -> ThinkOutcome {
        let unit = &units[slot];
        let Some(weapon) = unit.weapon_def() else {
            return ThinkOutcome::NoAction;
        };
        let rounds = unit.weapon.as_ref().map_or(0, |held| held.rounds);
        if rounds == 0 {
            return ThinkOutcome::NoAction;
        }
        let accuracy = content::unit_stats(unit.kind).accuracy;

        let mut best: Option<(f32, usize, FireModeKind)> = None;
        for (target_slot, target) in enemy_slots(self.team, units) {
            if target_slot == slot || !unit_sees(map, unit, target.pos) {
                continue;
            }
            if self.holds_fire_on(units, unit, target, map) {
                continue;
            }
            let distance = (dist2(unit.pos, target.pos) as f32).sqrt();
            for mode in weapon.modes {
                if mode.tu_cost > unit.tu || mode.shots > rounds {
                    continue;
                }
                if weapon.blast_radius > 0
                    && blast_endangers_friendly(self.team, units, target.pos, weapon.blast_radius)
                {
                    continue;
                }
                let fire = fire_statistics(accuracy, weapon, mode, distance);
                if fire.chance < MINIMUM_FIRE_CHANCE {
                    continue;
                }
                if best.is_none_or(|(best_score, _, _)| fire.damage_per_tu > best_score) {
                    best = Some((fire.damage_per_tu, target_slot, mode.kind));
                }
            }
        }

        match best {
            Some((_, target, mode)) => {
                ThinkOutcome::Action(AiAction::Shoot { target, mode })
            }
            None => ThinkOutcome::NoAction,
        }
    }

    /// Aliens leave civilians alone while a soldier is in view; the armed
    /// threat is always the better use of the turn.
    fn holds_fire_on(&self, units: &[Unit], shooter: &Unit, target: &Unit, map: &Map) -> bool {
        if shooter.team != Team::Alien || target.team != Team::Civilian {
            return false;
        }
        units.iter().any(|other| {
            other.team == Team::Terran && other.is_alive() && unit_sees(map, shooter, other.pos)
        })
    }
}

/// Explosive safety veto: never place a blast where a non-hostile would
/// stand inside the radius (the shooter included).
fn blast_endangers_friendly(team: Team, units: &[Unit], impact: Pos, radius: u32) -> bool {
    units.iter().any(|other| {
        other.is_alive()
            && !team.is_enemy_of(other.team)
            && chebyshev(other.pos, impact) <= radius as i32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TeamAi;
    use crate::content::keys;
    use crate::test_support::*;

    fn alien_ai() -> TeamAi {
        TeamAi::new(Team::Alien, 77)
    }

    #[test]
    fn fire_statistics_degrade_with_range() {
        let weapon = content::weapon_def(keys::WEAPON_ASSAULT_RIFLE).expect("rifle");
        let close = fire_statistics(0.8, weapon, &weapon.modes[0], 2.0);
        let far = fire_statistics(0.8, weapon, &weapon.modes[0], 14.0);
        assert!(close.chance > far.chance);
        assert!(close.damage_per_tu > far.damage_per_tu);
    }

    #[test]
    fn point_blank_chance_is_capped() {
        let weapon = content::weapon_def(keys::WEAPON_ASSAULT_RIFLE).expect("rifle");
        let aimed = &weapon.modes[2];
        let stats = fire_statistics(1.0, weapon, aimed, 0.0);
        assert_eq!(stats.chance, 0.95);
    }

    #[test]
    fn hidden_enemies_are_not_shot_at() {
        let mut map = open_map(12, 12);
        map.add_item(keys::ITEM_TREE, Pos { y: 5, x: 5 }, Rotation::R0).expect("tree");
        let units = vec![drone_at(Pos { y: 5, x: 2 }), soldier_at(Pos { y: 5, x: 8 })];
        let mut ai = alien_ai();
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_shoot(0, &units, &map), ThinkOutcome::NoAction);
    }

    #[test]
    fn equal_threat_scores_pick_the_lower_slot() {
        let map = open_map(16, 16);
        // Two soldiers mirrored around the drone: identical distance, kind,
        // and hence identical damage-per-TU scores.
        let shooter = drone_at(Pos { y: 8, x: 8 });
        let units_forward = vec![
            shooter.clone(),
            soldier_at(Pos { y: 8, x: 4 }),
            soldier_at(Pos { y: 8, x: 12 }),
        ];
        let units_mirrored = vec![
            shooter,
            soldier_at(Pos { y: 8, x: 12 }),
            soldier_at(Pos { y: 8, x: 4 }),
        ];
        for units in [units_forward, units_mirrored] {
            let mut ai = alien_ai();
            ai.start_turn(&units, &map);
            match ai.think_shoot(0, &units, &map) {
                ThinkOutcome::Action(AiAction::Shoot { target, .. }) => {
                    assert_eq!(target, 1, "ties must resolve to the first slot");
                }
                other => panic!("expected a shot, got {other:?}"),
            }
        }
    }

    #[test]
    fn out_of_tu_modes_are_skipped() {
        let map = open_map(12, 12);
        let mut units = vec![drone_at(Pos { y: 5, x: 2 }), soldier_at(Pos { y: 5, x: 5 })];
        units[0].tu = 0;
        let mut ai = alien_ai();
        ai.start_turn(&units, &map);
        assert_eq!(ai.think_shoot(0, &units, &map), ThinkOutcome::NoAction);
    }

    #[test]
    fn blast_weapons_respect_the_friendly_fire_veto() {
        let map = open_map(16, 16);
        let mut gunner = mauler_at(Pos { y: 8, x: 2 });
        gunner = gunner.arm(keys::WEAPON_GRENADE_LAUNCHER);
        // A teammate stands adjacent to the would-be impact cell.
        let units = vec![
            gunner,
            drone_at(Pos { y: 8, x: 9 }),
            soldier_at(Pos { y: 8, x: 10 }),
        ];
        let mut ai = alien_ai();
        ai.start_turn(&units, &map);
        assert_eq!(
            ai.think_shoot(0, &units, &map),
            ThinkOutcome::NoAction,
            "grenade into the drone's cell radius must be vetoed"
        );
    }

    #[test]
    fn aliens_hold_fire_on_civilians_while_a_soldier_is_visible() {
        let map = open_map(16, 16);
        let units = vec![
            mauler_at(Pos { y: 8, x: 4 }),
            civilian_at(Pos { y: 8, x: 6 }),
            soldier_at(Pos { y: 8, x: 12 }),
        ];
        let mut ai = alien_ai();
        ai.start_turn(&units, &map);
        match ai.think_shoot(0, &units, &map) {
            ThinkOutcome::Action(AiAction::Shoot { target, .. }) => {
                assert_eq!(target, 2, "the soldier draws the shot, not the civilian");
            }
            other => panic!("expected a shot, got {other:?}"),
        }

        // With the soldier gone the civilian is fair game.
        let without_soldier = vec![
            mauler_at(Pos { y: 8, x: 4 }),
            civilian_at(Pos { y: 8, x: 6 }),
        ];
        let mut ai = alien_ai();
        ai.start_turn(&without_soldier, &map);
        match ai.think_shoot(0, &without_soldier, &map) {
            ThinkOutcome::Action(AiAction::Shoot { target, .. }) => assert_eq!(target, 1),
            other => panic!("expected a shot at the civilian, got {other:?}"),
        }
    }
}
