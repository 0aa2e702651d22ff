use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct ItemId;
}

/// Playable maps never exceed this many cells per side; the quad tree is
/// sized for it.
pub const MAP_SIZE: i32 = 64;

/// Time units are tracked in hundredths so that movement costs stay integral
/// and deterministic: one orthogonal step costs 100, one diagonal step 141.
/// The path solver and `ai` path trimming share this table.
pub const TU_SCALE: u32 = 100;
pub const ORTHO_COST: u32 = TU_SCALE;
pub const DIAG_COST: u32 = 141;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

/// Inclusive cell rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min: Pos,
    pub max: Pos,
}

impl Rect {
    pub fn from_origin_size(origin: Pos, width: i32, height: i32) -> Self {
        Self { min: origin, max: Pos { y: origin.y + height - 1, x: origin.x + width - 1 } }
    }

    pub fn single(pos: Pos) -> Self {
        Self { min: pos, max: pos }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    pub fn contains(&self, p: Pos) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Pos { y: self.min.y.min(other.min.y), x: self.min.x.min(other.min.x) },
            max: Pos { y: self.max.y.max(other.max.y), x: self.max.x.max(other.max.x) },
        }
    }

    pub fn cells(self) -> impl Iterator<Item = Pos> {
        let (min_x, max_x) = (self.min.x, self.max.x);
        (self.min.y..=self.max.y).flat_map(move |y| (min_x..=max_x).map(move |x| Pos { y, x }))
    }
}

/// Eight scan directions, clockwise from north. Iteration order is part of
/// the determinism contract wherever candidates tie.
pub const DIRS8: [(i32, i32); 8] =
    [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];

// Edge-block nibble: which of the four compass edges of a cell refuse
// crossing. One lowercase hex char per cell in content mask strings.
pub const EDGE_S: u8 = 0x1;
pub const EDGE_E: u8 = 0x2;
pub const EDGE_N: u8 = 0x4;
pub const EDGE_W: u8 = 0x8;
pub const EDGE_ALL: u8 = 0xf;

/// One clockwise quarter turn of an edge nibble per step: N rolls to E,
/// E to S, S to W, W to N.
pub fn rotate_edge_mask(mask: u8, steps: u8) -> u8 {
    let mut m = mask & EDGE_ALL;
    for _ in 0..(steps & 3) {
        m = ((m >> 1) | (m << 3)) & EDGE_ALL;
    }
    m
}

/// Swap each edge bit with its opposite, i.e. the same wall as seen from the
/// neighboring cell.
pub fn invert_edge_mask(mask: u8) -> u8 {
    ((mask << 2) | (mask >> 2)) & EDGE_ALL
}

/// Which derived mask set a connectivity query consults: movement blocking
/// or sight blocking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    Path,
    Sight,
}

/// Placement rotation in quarter turns, clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const R0: Rotation = Rotation(0);
    pub const R90: Rotation = Rotation(1);
    pub const R180: Rotation = Rotation(2);
    pub const R270: Rotation = Rotation(3);

    pub fn new(steps: u8) -> Self {
        Self(steps & 3)
    }

    pub fn steps(self) -> u8 {
        self.0
    }

    pub fn swaps_axes(self) -> bool {
        self.0 & 1 == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Team {
    Terran,
    Alien,
    Civilian,
}

impl Team {
    pub fn is_enemy_of(self, other: Team) -> bool {
        matches!(
            (self, other),
            (Team::Terran, Team::Alien)
                | (Team::Alien, Team::Terran)
                | (Team::Alien, Team::Civilian)
                | (Team::Civilian, Team::Alien)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKind {
    Soldier,
    Heavy,
    Drone,
    Mauler,
    Psion,
    Civilian,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitStatus {
    Alive,
    Downed,
    Dead,
}

/// Eight-way facing, clockwise from north. North is toward decreasing y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facing {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Facing {
    pub fn from_delta(dx: i32, dy: i32) -> Option<Facing> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Facing::North),
            (1, -1) => Some(Facing::NorthEast),
            (1, 0) => Some(Facing::East),
            (1, 1) => Some(Facing::SouthEast),
            (0, 1) => Some(Facing::South),
            (-1, 1) => Some(Facing::SouthWest),
            (-1, 0) => Some(Facing::West),
            (-1, -1) => Some(Facing::NorthWest),
            _ => None,
        }
    }
}

/// Per-shot damage components. Kinetic and energy subtract from hit points;
/// incendiary only rolls ignition against flammability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDesc {
    pub kinetic: u16,
    pub energy: u16,
    pub incendiary: u16,
}

impl DamageDesc {
    pub fn total(&self) -> u16 {
        self.kinetic.saturating_add(self.energy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireModeKind {
    Snap,
    Auto,
    Aimed,
}

/// The single action a think call settles on. Applying it (moving the unit,
/// resolving the shot) is the battle controller's job.
#[derive(Clone, Debug, PartialEq)]
pub enum AiAction {
    None,
    Move { path: Vec<Pos>, cost: u32 },
    Shoot { target: usize, mode: FireModeKind },
    Psi { target: usize },
    Pickup { clip: String },
    Rotate { facing: Facing },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    Solved { cost: u32, path: Vec<Pos> },
    NoSolution,
    StartEndSame,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    UnknownDef(String),
    OutOfBounds { bounds: Rect },
    RotationNotAllowed { def: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveError {
    UnknownDef(String),
    OutOfBounds { x: i32, y: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    ItemDestroyed { def: &'static str, bounds: Rect },
    ItemWrecked { def: &'static str, wreck: &'static str, bounds: Rect },
    FireIgnited { pos: Pos },
    FireSpread { from: Pos, to: Pos },
    SmokeExpired { pos: Pos },
    StorageTaken { pos: Pos, clip: String },
    StorageReturned { pos: Pos, clip: String },
}
