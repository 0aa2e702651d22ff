//! Per-cell fire, smoke, and flare state machine.
//! This module exists so burn/decay transitions and their obscured-count
//! accounting stay in one place.
//! It does not own item damage; fire hands that to the damage module.

use rand_chacha::rand_core::Rng;

use super::{DamageReport, Map};
use crate::types::*;

pub const MAX_PYRO_DURATION: u8 = 63;

/// How long a freshly spread fire burns, in sub-turns.
const SPREAD_DURATION: u8 = 4;

const CARDINALS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// One cell's burn state. Terminal state is `None` once the countdown runs
/// out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pyro {
    #[default]
    None,
    Smoke(u8),
    Fire(u8),
    Flare(u8),
}

impl Pyro {
    pub fn is_fire(&self) -> bool {
        matches!(self, Pyro::Fire(_))
    }

    pub fn is_smoke(&self) -> bool {
        matches!(self, Pyro::Smoke(_))
    }

    pub fn is_flare(&self) -> bool {
        matches!(self, Pyro::Flare(_))
    }

    /// Packed byte: bit 7 fire, bit 6 flare, low six bits the remaining
    /// duration. Smoke is a bare duration.
    pub fn pack(&self) -> u8 {
        match *self {
            Pyro::None => 0,
            Pyro::Smoke(d) => d & MAX_PYRO_DURATION,
            Pyro::Fire(d) => 0x80 | (d & MAX_PYRO_DURATION),
            Pyro::Flare(d) => 0x40 | (d & MAX_PYRO_DURATION),
        }
    }
}

/// What one sub-turn tick did: the union of cells whose burn state changed,
/// plus any item damage fallout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubTurnReport {
    pub changed: Option<Rect>,
    pub damage: DamageReport,
}

impl Map {
    pub fn pyro_at(&self, pos: Pos) -> Pyro {
        if !self.in_bounds(pos) {
            return Pyro::None;
        }
        self.pyro[self.index(pos)]
    }

    pub fn ignite_fire(&mut self, pos: Pos, duration: u8) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        let d = duration.clamp(1, MAX_PYRO_DURATION);
        match self.pyro[idx] {
            Pyro::Smoke(_) => {
                // Fire displaces smoke; the smoke's obscured contribution
                // goes with it.
                debug_assert!(self.obscured[idx] > 0, "smoke must have counted itself");
                self.obscured[idx] = self.obscured[idx].saturating_sub(1);
                self.pyro[idx] = Pyro::Fire(d);
                self.log.push(LogEvent::FireIgnited { pos });
            }
            Pyro::Fire(old) => {
                self.pyro[idx] = Pyro::Fire(old.max(d));
            }
            Pyro::None | Pyro::Flare(_) => {
                self.pyro[idx] = Pyro::Fire(d);
                self.log.push(LogEvent::FireIgnited { pos });
            }
        }
    }

    pub fn ignite_smoke(&mut self, pos: Pos, duration: u8) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        let d = duration.clamp(1, MAX_PYRO_DURATION);
        match self.pyro[idx] {
            Pyro::None => {
                self.obscured[idx] += 1;
                self.pyro[idx] = Pyro::Smoke(d);
            }
            Pyro::Smoke(old) => {
                self.pyro[idx] = Pyro::Smoke(old.max(d));
            }
            // Burning or flare-lit cells refuse smoke.
            Pyro::Fire(_) | Pyro::Flare(_) => {}
        }
    }

    pub fn ignite_flare(&mut self, pos: Pos, duration: u8) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        if self.pyro[idx] == Pyro::None {
            self.pyro[idx] = Pyro::Flare(duration.clamp(1, MAX_PYRO_DURATION));
        }
    }

    /// Advance every cell's burn countdown by one sub-turn. Fire damages
    /// items on its cell and may spread to flammable cardinal neighbors;
    /// expiring smoke gives back its obscured contribution.
    pub fn do_sub_turn(&mut self, fire_damage: DamageDesc) -> SubTurnReport {
        let mut report = SubTurnReport::default();
        let mut burn_cells = Vec::new();

        for cell in self.bounds().cells() {
            let idx = self.index(cell);
            match self.pyro[idx] {
                Pyro::None => {}
                Pyro::Fire(d) => {
                    burn_cells.push(cell);
                    self.pyro[idx] = if d <= 1 { Pyro::None } else { Pyro::Fire(d - 1) };
                    mark_changed(&mut report.changed, cell);
                }
                Pyro::Smoke(d) => {
                    if d <= 1 {
                        self.pyro[idx] = Pyro::None;
                        debug_assert!(self.obscured[idx] > 0, "smoke must have counted itself");
                        self.obscured[idx] = self.obscured[idx].saturating_sub(1);
                        self.log.push(LogEvent::SmokeExpired { pos: cell });
                    } else {
                        self.pyro[idx] = Pyro::Smoke(d - 1);
                    }
                    mark_changed(&mut report.changed, cell);
                }
                Pyro::Flare(d) => {
                    self.pyro[idx] = if d <= 1 { Pyro::None } else { Pyro::Flare(d - 1) };
                    mark_changed(&mut report.changed, cell);
                }
            }
        }

        for &cell in &burn_cells {
            for id in self.quad.items_at(&self.items, cell) {
                report.damage.merge(self.damage_item(id, fire_damage));
            }
        }

        // Spread only from cells still burning after the countdown step.
        for &cell in &burn_cells {
            if !self.pyro_at(cell).is_fire() {
                continue;
            }
            for (dx, dy) in CARDINALS {
                let neighbor = Pos { y: cell.y + dy, x: cell.x + dx };
                if !self.in_bounds(neighbor) || self.pyro_at(neighbor) != Pyro::None {
                    continue;
                }
                let flammable = self
                    .quad
                    .items_at(&self.items, neighbor)
                    .iter()
                    .map(|&id| self.items[id].def.flammable)
                    .max()
                    .unwrap_or(0);
                if flammable == 0 {
                    continue;
                }
                let roll = (self.rng.next_u32() % 256) as u8;
                if roll < flammable {
                    self.ignite_fire(neighbor, SPREAD_DURATION);
                    self.log.push(LogEvent::FireSpread { from: cell, to: neighbor });
                    mark_changed(&mut report.changed, neighbor);
                }
            }
        }

        report
    }
}

fn mark_changed(changed: &mut Option<Rect>, cell: Pos) {
    let cell_rect = Rect::single(cell);
    *changed = Some(match changed {
        Some(rect) => rect.union(&cell_rect),
        None => cell_rect,
    });
}
