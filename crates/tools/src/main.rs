use anyhow::{Context, Result};
use clap::Parser;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use std::fs;

use skirmish_core::content::{self, keys};
use skirmish_core::map::Viewer;
use skirmish_core::{
    AiAction, DamageDesc, Map, Pos, Rotation, Team, TeamAi, Unit, UnitKind, UnitStatus, ai,
};

/// Headless skirmish runner: builds a fixed battlefield, lets the alien and
/// civilian AIs play out a number of turns, and prints the outcome plus the
/// final map snapshot hash.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 8)]
    turns: u32,
    /// Write the final map state as JSON to this path.
    #[arg(long)]
    save: Option<String>,
    /// Print every chosen action as it happens.
    #[arg(short, long)]
    verbose: bool,
}

fn battlefield(seed: u64) -> Map {
    let mut map = Map::new(24, 24, seed);
    map.add_item(keys::ITEM_LANDER_HULL, Pos { y: 2, x: 10 }, Rotation::R0).expect("hull");
    for x in [4, 6, 14, 16] {
        map.add_item(keys::ITEM_WOOD_WALL, Pos { y: 9, x }, Rotation::R0).expect("wall");
    }
    for y in 12..16 {
        map.add_item(keys::ITEM_TREE, Pos { y, x: 11 }, Rotation::R0).expect("tree");
    }
    map.add_item(keys::ITEM_FUEL_BARREL, Pos { y: 17, x: 5 }, Rotation::R0).expect("barrel");
    map.add_item(keys::ITEM_CRATE, Pos { y: 20, x: 18 }, Rotation::R0).expect("crate");
    map.add_to_storage(Pos { y: 19, x: 19 }, keys::CLIP_PLASMA, 3);
    map.add_to_storage(Pos { y: 21, x: 3 }, keys::CLIP_RIFLE, 2);
    map
}

fn roster() -> Vec<Unit> {
    vec![
        Unit::new(Team::Terran, UnitKind::Soldier, Pos { y: 22, x: 8 })
            .arm(keys::WEAPON_ASSAULT_RIFLE),
        Unit::new(Team::Terran, UnitKind::Soldier, Pos { y: 22, x: 10 })
            .arm(keys::WEAPON_ASSAULT_RIFLE),
        Unit::new(Team::Terran, UnitKind::Heavy, Pos { y: 22, x: 12 })
            .arm(keys::WEAPON_GRENADE_LAUNCHER),
        Unit::new(Team::Alien, UnitKind::Drone, Pos { y: 5, x: 6 })
            .arm(keys::WEAPON_PLASMA_CASTER),
        Unit::new(Team::Alien, UnitKind::Mauler, Pos { y: 5, x: 16 })
            .arm(keys::WEAPON_PLASMA_CASTER),
        Unit::new(Team::Alien, UnitKind::Psion, Pos { y: 4, x: 12 }),
        Unit::new(Team::Civilian, UnitKind::Civilian, Pos { y: 12, x: 3 }),
        Unit::new(Team::Civilian, UnitKind::Civilian, Pos { y: 13, x: 20 }),
    ]
}

fn apply_action(
    action: &AiAction,
    slot: usize,
    units: &mut [Unit],
    map: &mut Map,
    rng: &mut ChaCha8Rng,
) {
    match action {
        AiAction::None => {}
        AiAction::Move { path, cost } => {
            if let Some(stop) = path.last() {
                units[slot].pos = *stop;
            }
            units[slot].spend_tu(*cost);
        }
        AiAction::Rotate { facing } => units[slot].facing = *facing,
        AiAction::Pickup { clip } => {
            if map.lock_storage(units[slot].pos, clip) {
                units[slot].reload();
                units[slot].spend_tu(400);
            }
        }
        AiAction::Psi { target } => {
            let psi = content::unit_stats(units[slot].kind)
                .psi
                .expect("psi actions come from psi-capable units");
            units[slot].spend_tu(psi.tu_cost);
            hit_unit(&mut units[*target], i32::from(psi.strength));
        }
        AiAction::Shoot { target, mode } => {
            let weapon = units[slot].weapon_def().expect("shoot actions come from armed units");
            let fire_mode = weapon
                .modes
                .iter()
                .find(|candidate| candidate.kind == *mode)
                .expect("chosen mode exists on the weapon");
            let dx = (units[slot].pos.x - units[*target].pos.x) as f32;
            let dy = (units[slot].pos.y - units[*target].pos.y) as f32;
            let stats = ai::fire_statistics(
                content::unit_stats(units[slot].kind).accuracy,
                weapon,
                fire_mode,
                (dx * dx + dy * dy).sqrt(),
            );
            units[slot].spend_tu(fire_mode.tu_cost);
            if let Some(held) = units[slot].weapon.as_mut() {
                held.rounds = held.rounds.saturating_sub(fire_mode.shots);
            }
            for _ in 0..fire_mode.shots {
                let roll = (rng.next_u32() % 1000) as f32 / 1000.0;
                if roll >= stats.chance {
                    continue;
                }
                if weapon.blast_radius > 0 {
                    let report =
                        map.area_damage(units[*target].pos, weapon.blast_radius, weapon.damage);
                    for explosion in report.explosions {
                        map.area_damage(explosion.center, explosion.radius, explosion.damage);
                    }
                }
                hit_unit(&mut units[*target], i32::from(weapon.damage.total()));
            }
        }
    }
}

fn hit_unit(unit: &mut Unit, damage: i32) {
    unit.hp -= damage;
    if unit.hp <= 0 {
        unit.hp = 0;
        unit.status = UnitStatus::Dead;
    }
}

fn alive(units: &[Unit], team: Team) -> usize {
    units.iter().filter(|unit| unit.team == team && unit.is_alive()).count()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut map = battlefield(args.seed);
    let mut units = roster();
    let mut alien_ai = TeamAi::new(Team::Alien, args.seed ^ 0xa11e);
    let mut civ_ai = TeamAi::new(Team::Civilian, args.seed ^ 0xc1f);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    println!("skirmish: seed {} over {} turns", args.seed, args.turns);

    for turn in 0..args.turns {
        for unit in units.iter_mut() {
            unit.reset_tu();
        }
        let viewers: Vec<Viewer> = units
            .iter()
            .filter(|unit| unit.team == Team::Terran && unit.is_alive())
            .map(|unit| Viewer { pos: unit.pos, sight: content::unit_stats(unit.kind).sight })
            .collect();
        let delta = map.generate_seen_unseen(&viewers);
        if args.verbose {
            println!(
                "turn {turn}: {} cells revealed, {} hidden",
                delta.newly_seen.len(),
                delta.newly_hidden.len()
            );
        }

        for (team_ai, team) in [(&mut alien_ai, Team::Alien), (&mut civ_ai, Team::Civilian)] {
            team_ai.start_turn(&units, &map);
            for slot in 0..units.len() {
                if units[slot].team != team || !units[slot].is_alive() {
                    continue;
                }
                let action = team_ai.think(slot, &units, &mut map);
                if args.verbose && action != AiAction::None {
                    println!("turn {turn}: slot {slot} ({:?}) -> {action:?}", units[slot].kind);
                }
                apply_action(&action, slot, &mut units, &mut map, &mut rng);
            }
        }

        map.do_sub_turn(DamageDesc { kinetic: 4, energy: 0, incendiary: 0 });

        if alive(&units, Team::Alien) == 0 || alive(&units, Team::Terran) == 0 {
            break;
        }
    }

    println!(
        "survivors: {} terran / {} alien / {} civilian",
        alive(&units, Team::Terran),
        alive(&units, Team::Alien),
        alive(&units, Team::Civilian)
    );
    println!("map events logged: {}", map.log().len());
    println!("snapshot hash: {:016x}", map.snapshot_hash());

    if let Some(path) = args.save {
        let save = map.to_save();
        let json = serde_json::to_string_pretty(&save).context("serializing map save")?;
        fs::write(&path, json).with_context(|| format!("writing map save to {path}"))?;
        println!("map state written to {path}");
    }

    Ok(())
}
