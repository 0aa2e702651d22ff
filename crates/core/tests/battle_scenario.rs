//! Headless multi-turn battles driven through the public API: a minimal
//! controller applies whatever the team AIs decide and the whole run must
//! replay bit-identically from the same seeds.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use skirmish_core::content::{self, keys};
use skirmish_core::map::Viewer;
use skirmish_core::{
    AiAction, ConnectionKind, DamageDesc, Map, PathOutcome, Pos, Rotation, Team, TeamAi, Unit,
    UnitKind, UnitStatus, ai,
};

fn battlefield(seed: u64) -> Map {
    let mut map = Map::new(20, 20, seed);
    map.add_item(keys::ITEM_LANDER_HULL, Pos { y: 2, x: 8 }, Rotation::R0).expect("hull");
    map.add_item(keys::ITEM_WOOD_WALL, Pos { y: 8, x: 6 }, Rotation::R0).expect("wall");
    map.add_item(keys::ITEM_WOOD_WALL, Pos { y: 8, x: 12 }, Rotation::R0).expect("wall");
    for y in 11..14 {
        map.add_item(keys::ITEM_TREE, Pos { y, x: 10 }, Rotation::R0).expect("tree");
    }
    map.add_item(keys::ITEM_FUEL_BARREL, Pos { y: 14, x: 4 }, Rotation::R0).expect("barrel");
    map.add_to_storage(Pos { y: 16, x: 16 }, keys::CLIP_PLASMA, 2);
    map
}

fn roster() -> Vec<Unit> {
    vec![
        Unit::new(Team::Terran, UnitKind::Soldier, Pos { y: 18, x: 6 })
            .arm(keys::WEAPON_ASSAULT_RIFLE),
        Unit::new(Team::Terran, UnitKind::Heavy, Pos { y: 18, x: 9 })
            .arm(keys::WEAPON_GRENADE_LAUNCHER),
        Unit::new(Team::Alien, UnitKind::Drone, Pos { y: 5, x: 5 })
            .arm(keys::WEAPON_PLASMA_CASTER),
        Unit::new(Team::Alien, UnitKind::Mauler, Pos { y: 5, x: 14 })
            .arm(keys::WEAPON_PLASMA_CASTER),
        Unit::new(Team::Alien, UnitKind::Psion, Pos { y: 4, x: 11 }),
        Unit::new(Team::Civilian, UnitKind::Civilian, Pos { y: 10, x: 3 }),
    ]
}

/// The battle-scene controller role: apply one chosen action to the world.
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
        AiAction::Rotate { facing } => {
            units[slot].facing = *facing;
        }
        AiAction::Pickup { clip } => {
            if map.lock_storage(units[slot].pos, clip) {
                units[slot].reload();
                units[slot].spend_tu(400);
            }
        }
        AiAction::Psi { target } => {
            let stats = content::unit_stats(units[slot].kind);
            let psi = stats.psi.expect("psi actions come from psi-capable units");
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
                if roll < stats.chance {
                    if weapon.blast_radius > 0 {
                        let report = map.area_damage(
                            units[*target].pos,
                            weapon.blast_radius,
                            weapon.damage,
                        );
                        for explosion in report.explosions {
                            map.area_damage(explosion.center, explosion.radius, explosion.damage);
                        }
                    }
                    hit_unit(&mut units[*target], i32::from(weapon.damage.total()));
                }
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

fn run_battle(seed: u64, turns: u32) -> (u64, Vec<AiAction>) {
    let mut map = battlefield(seed);
    let mut units = roster();
    let mut alien_ai = TeamAi::new(Team::Alien, seed ^ 0xa11e);
    let mut civ_ai = TeamAi::new(Team::Civilian, seed ^ 0xc1f);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut transcript = Vec::new();

    for _ in 0..turns {
        for unit in units.iter_mut() {
            unit.reset_tu();
        }
        let viewers: Vec<Viewer> = units
            .iter()
            .filter(|unit| unit.team == Team::Terran && unit.is_alive())
            .map(|unit| Viewer {
                pos: unit.pos,
                sight: content::unit_stats(unit.kind).sight,
            })
            .collect();
        map.generate_seen_unseen(&viewers);

        for (ai, team) in [(&mut alien_ai, Team::Alien), (&mut civ_ai, Team::Civilian)] {
            ai.start_turn(&units, &map);
            for slot in 0..units.len() {
                if units[slot].team != team || !units[slot].is_alive() {
                    continue;
                }
                let action = ai.think(slot, &units, &mut map);
                apply_action(&action, slot, &mut units, &mut map, &mut rng);
                transcript.push(action);
            }
        }
        map.do_sub_turn(DamageDesc { kinetic: 4, energy: 0, incendiary: 0 });
    }

    (map.snapshot_hash(), transcript)
}

#[test]
fn battles_replay_bit_identically_from_the_same_seed() {
    let first = run_battle(99, 6);
    let second = run_battle(99, 6);
    assert_eq!(first.0, second.0, "map snapshot hashes must match");
    assert_eq!(first.1, second.1, "action transcripts must match");
}

#[test]
fn different_seeds_eventually_diverge() {
    let a = run_battle(1, 6);
    let b = run_battle(2, 6);
    // Same item layout, different decisions; the transcripts tell them
    // apart even when the surviving map state happens to coincide.
    assert!(a.0 != b.0 || a.1 != b.1);
}

#[test]
fn battle_ai_never_emits_an_unaffordable_action() {
    let mut map = battlefield(5);
    let mut units = roster();
    let mut ai = TeamAi::new(Team::Alien, 5);
    for unit in units.iter_mut() {
        unit.reset_tu();
    }
    ai.start_turn(&units, &map);
    for slot in 0..units.len() {
        if units[slot].team != Team::Alien {
            continue;
        }
        match ai.think(slot, &units, &mut map) {
            AiAction::Move { cost, .. } => assert!(cost <= units[slot].tu),
            AiAction::Shoot { mode, .. } => {
                let weapon = units[slot].weapon_def().expect("armed");
                let fire_mode =
                    weapon.modes.iter().find(|candidate| candidate.kind == mode).expect("mode");
                assert!(fire_mode.tu_cost <= units[slot].tu);
            }
            _ => {}
        }
    }
}

#[test]
fn blocked_cell_is_never_crossed_end_to_end() {
    let mut map = Map::new(10, 10, 0);
    map.add_item(keys::ITEM_TREE, Pos { y: 5, x: 5 }, Rotation::R0).expect("tree");
    match map.solve_path(Pos { y: 4, x: 5 }, Pos { y: 6, x: 5 }) {
        PathOutcome::Solved { path, .. } => {
            assert!(!path.contains(&Pos { y: 5, x: 5 }));
            assert_eq!(*path.last().expect("steps"), Pos { y: 6, x: 5 });
        }
        PathOutcome::NoSolution => {}
        PathOutcome::StartEndSame => panic!("endpoints differ"),
    }
}

#[test]
fn fog_of_war_history_survives_a_patrol() {
    let mut map = battlefield(3);
    let mut ever_seen = Vec::new();
    let patrol = [
        Pos { y: 18, x: 2 },
        Pos { y: 14, x: 6 },
        Pos { y: 10, x: 14 },
        Pos { y: 6, x: 17 },
    ];
    for stop in patrol {
        map.generate_seen_unseen(&[Viewer { pos: stop, sight: 6 }]);
        for cell in ever_seen.iter().copied() {
            assert!(map.was_ever_seen(cell), "{cell:?} must never fall out of history");
        }
        for y in 0..map.height() {
            for x in 0..map.width() {
                let cell = Pos { y, x };
                if map.was_ever_seen(cell) && !ever_seen.contains(&cell) {
                    ever_seen.push(cell);
                }
            }
        }
    }
    assert!(!ever_seen.is_empty());
}

#[test]
fn visible_armed_enemy_draws_fire_not_footsteps() {
    let mut map = Map::new(16, 16, 0);
    let units = vec![
        Unit::new(Team::Alien, UnitKind::Drone, Pos { y: 8, x: 3 })
            .arm(keys::WEAPON_PLASMA_CASTER),
        Unit::new(Team::Terran, UnitKind::Soldier, Pos { y: 8, x: 9 })
            .arm(keys::WEAPON_ASSAULT_RIFLE),
    ];
    let mut ai = TeamAi::new(Team::Alien, 17);
    ai.start_turn(&units, &map);
    match ai.think(0, &units, &mut map) {
        AiAction::Shoot { target, .. } => assert_eq!(target, 1),
        other => panic!("expected the drone to shoot, got {other:?}"),
    }

    // The same setup with the sight line cut falls back to movement.
    let mut blocked = Map::new(16, 16, 0);
    blocked.add_item(keys::ITEM_TREE, Pos { y: 8, x: 6 }, Rotation::R0).expect("tree");
    let mut ai = TeamAi::new(Team::Alien, 17);
    ai.start_turn(&units, &blocked);
    match ai.think(0, &units, &mut blocked) {
        AiAction::Move { .. } | AiAction::None => {}
        other => panic!("without line of sight a shot is impossible, got {other:?}"),
    }
}

#[test]
fn map_state_round_trips_mid_battle() {
    let mut map = battlefield(7);
    map.damage_at(Pos { y: 8, x: 6 }, DamageDesc { kinetic: 90, energy: 0, incendiary: 0 });
    let save = map.to_save();
    let json = serde_json::to_string_pretty(&save).expect("serialize");
    let parsed = serde_json::from_str(&json).expect("parse");
    let restored = Map::from_save(&parsed, 7).expect("restore");
    assert_eq!(restored.to_save(), save);
    for y in 0..map.height() {
        for x in 0..map.width() {
            let cell = Pos { y, x };
            assert_eq!(
                map.path_mask(ConnectionKind::Path, cell),
                restored.path_mask(ConnectionKind::Path, cell),
            );
        }
    }
}
