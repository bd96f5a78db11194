//! Periodic attrition of owned cells, independent of combat.

use crate::world::World;
use comm_core::{FactionTable, RuleConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Revert each owned cell to unclaimed with the owner's decay probability.
/// Returns the number of cells lost.
pub fn decay(world: &mut World, factions: &FactionTable, rules: &RuleConfig, rng: &mut ChaCha8Rng) -> u64 {
    let mut lost = 0;
    for (pos, faction) in world.owned_cells() {
        let Some(traits) = factions.get(faction) else {
            continue;
        };
        let p = rules
            .decay_formula
            .probability(rules.base_decay_rate, traits.resilience);
        if rng.gen::<f64>() < p && world.release(pos).is_some() {
            if let Some(stats) = world.stats.get_mut(faction) {
                stats.cells_decayed += 1;
            }
            lost += 1;
        }
    }
    lost
}
