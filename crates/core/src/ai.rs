//! Per-team decision engine over map pathing and visibility.
//! Each think call walks a strict priority chain of behaviors until one
//! produces a single action; pathfinding failures just fall through, so a
//! turn always ends gracefully. This file wires the behavior submodules
//! together.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::content;
use crate::map::Map;
use crate::state::Unit;
use crate::types::*;

mod civ;
mod inventory;
mod lkp;
mod movement;
mod psi;
mod rotate;
mod shoot;

pub use lkp::{Lkp, MAX_TURNS_LKP};
pub use movement::trim_path_to_cost;
pub use shoot::{FireStats, MINIMUM_FIRE_CHANCE, fire_statistics};

/// A unit that keeps failing to settle on an action stops burning the turn.
pub const MAX_THINKS_PER_TURN: u8 = 5;

/// What one behavior in the chain decided.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ThinkOutcome {
    /// Stop: this is the unit's action.
    Action(AiAction),
    /// Try the next behavior in the chain.
    NoAction,
    /// Abort the turn entirely (think budget exhausted).
    NotOption,
    /// Sub-goal already satisfied; nothing to do this tick.
    SolvedNoAction,
}

type Behavior = fn(&mut TeamAi, usize, &[Unit], &Map) -> ThinkOutcome;

/// One team's controller. Holds remembered enemy positions and per-unit
/// think bookkeeping; everything else is read fresh from the unit slice and
/// the map on each call.
pub struct TeamAi {
    team: Team,
    lkp: Vec<Lkp>,
    think_count: Vec<u8>,
    travel: Vec<Option<Pos>>,
    rng: ChaCha8Rng,
}

impl TeamAi {
    pub fn new(team: Team, seed: u64) -> Self {
        Self {
            team,
            lkp: Vec::new(),
            think_count: Vec::new(),
            travel: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    /// Grow the per-slot tables; existing entries are never discarded.
    pub(crate) fn ensure_slots(&mut self, count: usize) {
        if self.lkp.len() < count {
            self.lkp.resize(count, Lkp::unknown());
            self.think_count.resize(count, 0);
            self.travel.resize(count, None);
        }
    }

    /// Decide one action for the unit in `slot`. `start_turn` must have run
    /// at this team-turn boundary; unit cells other than the mover's are
    /// blocked for the duration of the call's path queries.
    pub fn think(&mut self, slot: usize, units: &[Unit], map: &mut Map) -> AiAction {
        assert!(slot < units.len(), "slot must index the unit slice");
        self.ensure_slots(units.len());
        let unit = &units[slot];
        debug_assert_eq!(unit.team, self.team, "think only drives this controller's own units");
        if !unit.is_alive() {
            return AiAction::None;
        }
        if self.think_base(slot) == ThinkOutcome::NotOption {
            return AiAction::None;
        }

        let occupied: Vec<Pos> = units
            .iter()
            .enumerate()
            .filter(|(other, other_unit)| *other != slot && other_unit.is_alive())
            .map(|(_, other_unit)| other_unit.pos)
            .collect();
        map.set_path_blocks(&occupied);

        let stats = content::unit_stats(unit.kind);
        let mut chain: Vec<Behavior> = vec![Self::think_psi];
        if stats.always_flee {
            chain.push(Self::think_flee);
        } else {
            if unit.has_rounds() {
                chain.push(Self::think_shoot);
            } else if unit.weapon.is_some() {
                chain.push(Self::think_inventory);
                chain.push(Self::think_move_to_ammo);
            }
            chain.push(Self::think_search);
            chain.push(Self::think_wander);
            chain.push(Self::think_travel);
        }
        chain.push(Self::think_rotate);

        for behavior in chain {
            match behavior(self, slot, units, map) {
                ThinkOutcome::Action(action) => return action,
                ThinkOutcome::NotOption | ThinkOutcome::SolvedNoAction => return AiAction::None,
                ThinkOutcome::NoAction => {}
            }
        }
        AiAction::None
    }

    fn think_base(&mut self, slot: usize) -> ThinkOutcome {
        self.think_count[slot] += 1;
        if self.think_count[slot] > MAX_THINKS_PER_TURN {
            ThinkOutcome::NotOption
        } else {
            ThinkOutcome::NoAction
        }
    }
}

/// Alive units hostile to `team`, in slot order. Slot order is the
/// deterministic tie-break everywhere scores compare equal.
pub(crate) fn enemy_slots(team: Team, units: &[Unit]) -> impl Iterator<Item = (usize, &Unit)> {
    units
        .iter()
        .enumerate()
        .filter(move |(_, unit)| unit.is_alive() && team.is_enemy_of(unit.team))
}

pub(crate) fn dist2(a: Pos, b: Pos) -> i32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

pub(crate) fn chebyshev(a: Pos, b: Pos) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Whether a unit currently sees a cell: in sight radius with a clear ray.
pub(crate) fn unit_sees(map: &Map, viewer: &Unit, target: Pos) -> bool {
    let sight = content::unit_stats(viewer.kind).sight;
    dist2(viewer.pos, target) <= sight * sight
        && map.can_see(viewer.pos, target, ConnectionKind::Sight)
}
