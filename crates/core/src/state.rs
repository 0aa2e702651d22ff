use crate::content::{self, WeaponDef};
use crate::types::*;

/// One weapon in a unit's hands: definition key plus loaded rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaponInstance {
    pub def: &'static str,
    pub rounds: u32,
}

/// A battlefield combatant. Units are owned by the battle controller; the AI
/// only ever sees a `&[Unit]` slice, and a unit's index in that slice is its
/// stable slot for last-known-position bookkeeping and tie-breaking.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub team: Team,
    pub kind: UnitKind,
    pub status: UnitStatus,
    pub pos: Pos,
    pub facing: Facing,
    /// Remaining budget this turn, in centi-TU.
    pub tu: u32,
    pub max_tu: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub weapon: Option<WeaponInstance>,
}

impl Unit {
    pub fn new(team: Team, kind: UnitKind, pos: Pos) -> Self {
        let stats = content::unit_stats(kind);
        Self {
            team,
            kind,
            status: UnitStatus::Alive,
            pos,
            facing: Facing::North,
            tu: stats.tu,
            max_tu: stats.tu,
            hp: stats.hp,
            max_hp: stats.hp,
            weapon: None,
        }
    }

    /// Hand the unit a weapon with a full clip.
    pub fn arm(mut self, weapon_key: &'static str) -> Self {
        let def = content::weapon_def(weapon_key).expect("weapon key must exist in content");
        self.weapon = Some(WeaponInstance { def: weapon_key, rounds: def.clip_rounds });
        self
    }

    pub fn is_alive(&self) -> bool {
        self.status == UnitStatus::Alive
    }

    pub fn weapon_def(&self) -> Option<&'static WeaponDef> {
        let weapon = self.weapon.as_ref()?;
        content::weapon_def(weapon.def)
    }

    pub fn has_rounds(&self) -> bool {
        self.weapon.as_ref().is_some_and(|weapon| weapon.rounds > 0)
    }

    pub fn reset_tu(&mut self) {
        self.tu = self.max_tu;
    }

    pub fn spend_tu(&mut self, cost: u32) {
        self.tu = self.tu.saturating_sub(cost);
    }

    /// Reload the held weapon from a compatible clip. Returns false when the
    /// unit is unarmed.
    pub fn reload(&mut self) -> bool {
        let Some(weapon) = self.weapon.as_mut() else {
            return false;
        };
        let def = content::weapon_def(weapon.def).expect("weapon key must exist in content");
        weapon.rounds = def.clip_rounds;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::keys;

    #[test]
    fn new_unit_starts_with_full_budgets() {
        let unit = Unit::new(Team::Terran, UnitKind::Soldier, Pos { y: 3, x: 4 });
        assert_eq!(unit.tu, unit.max_tu);
        assert_eq!(unit.hp, unit.max_hp);
        assert!(unit.is_alive());
        assert!(unit.weapon.is_none());
    }

    #[test]
    fn armed_unit_carries_a_full_clip() {
        let unit = Unit::new(Team::Terran, UnitKind::Soldier, Pos { y: 0, x: 0 })
            .arm(keys::WEAPON_ASSAULT_RIFLE);
        assert!(unit.has_rounds());
        assert_eq!(unit.weapon.as_ref().map(|w| w.rounds), Some(12));
    }

    #[test]
    fn reload_refills_from_the_definition() {
        let mut unit = Unit::new(Team::Alien, UnitKind::Mauler, Pos { y: 0, x: 0 })
            .arm(keys::WEAPON_PLASMA_CASTER);
        unit.weapon.as_mut().expect("armed").rounds = 0;
        assert!(!unit.has_rounds());
        assert!(unit.reload());
        assert!(unit.has_rounds());
    }

    #[test]
    fn tu_spend_saturates_at_zero() {
        let mut unit = Unit::new(Team::Civilian, UnitKind::Civilian, Pos { y: 0, x: 0 });
        unit.spend_tu(unit.max_tu + 500);
        assert_eq!(unit.tu, 0);
    }
}
