//! Shared test fixtures for the map and AI test suites.
//! This module exists to avoid repeating map and unit setup across tests.
//! It does not own production gameplay logic.

pub(crate) use crate::content::keys;
pub(crate) use crate::map::Map;
pub(crate) use crate::state::Unit;
pub(crate) use crate::types::*;

pub(crate) fn open_map(width: i32, height: i32) -> Map {
    Map::new(width, height, 7)
}

pub(crate) fn soldier_at(pos: Pos) -> Unit {
    Unit::new(Team::Terran, UnitKind::Soldier, pos).arm(keys::WEAPON_ASSAULT_RIFLE)
}

pub(crate) fn drone_at(pos: Pos) -> Unit {
    Unit::new(Team::Alien, UnitKind::Drone, pos).arm(keys::WEAPON_PLASMA_CASTER)
}

pub(crate) fn mauler_at(pos: Pos) -> Unit {
    Unit::new(Team::Alien, UnitKind::Mauler, pos).arm(keys::WEAPON_PLASMA_CASTER)
}

pub(crate) fn psion_at(pos: Pos) -> Unit {
    Unit::new(Team::Alien, UnitKind::Psion, pos)
}

pub(crate) fn civilian_at(pos: Pos) -> Unit {
    Unit::new(Team::Civilian, UnitKind::Civilian, pos)
}
