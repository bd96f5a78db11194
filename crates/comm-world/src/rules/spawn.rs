//! Soldier recruitment from owned territory.

use crate::world::World;
use comm_core::{FactionTable, FactionTraits, RuleConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Soldiers a faction recruits this round: `owned * base_spawn_rate * aggression`,
/// with the fractional part resolved by one draw
pub fn spawn_count(owned: usize, rules: &RuleConfig, traits: &FactionTraits, rng: &mut ChaCha8Rng) -> usize {
    let expected = owned as f64 * rules.base_spawn_rate * traits.aggression;
    if !expected.is_finite() || expected <= 0.0 {
        return 0;
    }
    let mut count = expected.floor() as usize;
    if rng.gen::<f64>() < expected.fract() {
        count += 1;
    }
    count
}

/// Place new soldiers on random cells of each faction's territory.
/// Returns the number spawned.
pub fn spawn_soldiers(
    world: &mut World,
    factions: &FactionTable,
    rules: &RuleConfig,
    rng: &mut ChaCha8Rng,
) -> u64 {
    let mut spawned = 0;

    for (faction, traits) in factions.iter() {
        let cells = world.cells_owned_by(faction);
        if cells.is_empty() {
            continue;
        }

        let room = rules
            .max_soldiers_per_faction
            .saturating_sub(world.soldiers_of(faction));
        let count = spawn_count(cells.len(), rules, traits, rng).min(room);

        for _ in 0..count {
            let Some(&position) = cells.choose(rng) else {
                break;
            };
            let lifespan = rng.gen_range(rules.soldier_lifespan_min..=rules.soldier_lifespan_max);
            let id = world.add_soldier(faction, position, lifespan);
            trace!(soldier = %id, faction = %faction, x = position.x, y = position.y, lifespan, "Soldier spawned");
            spawned += 1;
        }
    }

    spawned
}
