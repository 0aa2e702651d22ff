use anyhow::Result;
use clap::Parser;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use skirmish_core::content::keys;
use skirmish_core::{ConnectionKind, DamageDesc, Map, Pos, Rotation};

/// Invariant fuzzer: random item placement, damage, and pyro churn against a
/// map, asserting the structural invariants after every step.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short = 'n', long, default_value_t = 2000)]
    steps: u32,
}

const PLACEABLE: &[&str] = &[
    keys::ITEM_TREE,
    keys::ITEM_HEDGE,
    keys::ITEM_STONE_WALL,
    keys::ITEM_WOOD_WALL,
    keys::ITEM_DOOR,
    keys::ITEM_CRATE,
    keys::ITEM_FUEL_BARREL,
];

fn random_pos(rng: &mut ChaCha8Rng, map: &Map) -> Pos {
    Pos {
        y: (rng.next_u32() % map.height() as u32) as i32,
        x: (rng.next_u32() % map.width() as u32) as i32,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("fuzzing map invariants: seed {} for {} steps", args.seed, args.steps);

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut map = Map::new(32, 32, args.seed);

    for step in 0..args.steps {
        match rng.next_u32() % 6 {
            0 | 1 => {
                let key = PLACEABLE[(rng.next_u32() as usize) % PLACEABLE.len()];
                let rot = Rotation::new((rng.next_u32() % 4) as u8);
                let pos = random_pos(&mut rng, &map);
                // Out-of-bounds or non-rotatable placements are rejected;
                // both outcomes are valid fuzz input.
                let _ = map.add_item(key, pos, rot);
            }
            2 => {
                let pos = random_pos(&mut rng, &map);
                map.delete_at(pos);
            }
            3 => {
                let pos = random_pos(&mut rng, &map);
                let damage = DamageDesc {
                    kinetic: (rng.next_u32() % 60) as u16,
                    energy: (rng.next_u32() % 20) as u16,
                    incendiary: (rng.next_u32() % 12) as u16,
                };
                let report = map.damage_at(pos, damage);
                for explosion in report.explosions {
                    map.area_damage(explosion.center, explosion.radius, explosion.damage);
                }
            }
            4 => {
                let pos = random_pos(&mut rng, &map);
                match rng.next_u32() % 3 {
                    0 => map.ignite_smoke(pos, (rng.next_u32() % 8 + 1) as u8),
                    1 => map.ignite_fire(pos, (rng.next_u32() % 8 + 1) as u8),
                    _ => map.ignite_flare(pos, (rng.next_u32() % 8 + 1) as u8),
                }
            }
            _ => {
                map.do_sub_turn(DamageDesc { kinetic: 5, energy: 0, incendiary: 0 });
            }
        }

        check_invariants(&map, step);
    }

    println!("ok: {} steps, {} items standing, hash {:016x}",
        args.steps,
        map.items().count(),
        map.snapshot_hash()
    );
    Ok(())
}

fn check_invariants(map: &Map, step: u32) {
    // Every placed item is found by a query over its own bounds, and its
    // obscured/smoke contributions reconcile per cell.
    let mut expected_obscured = vec![0u16; (map.width() * map.height()) as usize];
    for (id, item) in map.items() {
        let found = map.find_items(item.bounds, 0, 0);
        assert!(
            found.contains(&id),
            "step {step}: item {id:?} missing from its own bounds query"
        );
        if item.def.obscures() {
            for cell in item.bounds.cells() {
                expected_obscured[(cell.y * map.width() + cell.x) as usize] += 1;
            }
        }
    }
    for y in 0..map.height() {
        for x in 0..map.width() {
            let cell = Pos { y, x };
            let mut expected = expected_obscured[(y * map.width() + x) as usize];
            if map.pyro_at(cell).is_smoke() {
                expected += 1;
            }
            assert_eq!(
                map.obscured_at(cell),
                expected,
                "step {step}: obscured count out of sync at {cell:?}"
            );
        }
    }

    // Connectivity stays symmetric whatever the churn did.
    for y in 0..map.height() {
        for x in 0..map.width() {
            let cell = Pos { y, x };
            for (dx, dy) in [(1, 0), (0, 1)] {
                let neighbor = Pos { y: y + dy, x: x + dx };
                if !map.in_bounds(neighbor) {
                    continue;
                }
                assert_eq!(
                    map.connected4(ConnectionKind::Path, cell, dx, dy),
                    map.connected4(ConnectionKind::Path, neighbor, -dx, -dy),
                    "step {step}: asymmetric edge at {cell:?}"
                );
            }
        }
    }
}
