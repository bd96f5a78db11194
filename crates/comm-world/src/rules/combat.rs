//! Soldier movement, attacks and lifecycle.

use crate::soldier::Soldier;
use crate::world::World;
use comm_core::{FactionId, FactionTable, FactionTraits, Position, RuleConfig, SoldierRemovalPolicy, Terrain};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// What the soldier phase did during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoldierOutcome {
    pub cells_destroyed: u64,
    pub soldiers_removed: u64,
}

/// Step attempts per tick for a faction
pub fn step_attempts(traits: &FactionTraits) -> u32 {
    (traits.mobility * 2.0).round().max(0.0) as u32
}

/// Attack attempts per tick before capping by the number of targets
pub fn attack_attempts(traits: &FactionTraits) -> usize {
    (traits.aggression * 3.0).round().max(0.0) as usize
}

pub fn attack_success_probability(rules: &RuleConfig, traits: &FactionTraits) -> f64 {
    (rules.soldier_attack_base_probability * traits.aggression).clamp(0.0, 1.0)
}

/// Move, attack and age every live soldier, then drop the ones whose service is over
pub fn update_soldiers(
    world: &mut World,
    factions: &FactionTable,
    rules: &RuleConfig,
    rng: &mut ChaCha8Rng,
) -> SoldierOutcome {
    let mut outcome = SoldierOutcome::default();
    let mut soldiers = std::mem::take(&mut world.soldiers);
    soldiers.shuffle(rng);

    for soldier in soldiers.iter_mut() {
        soldier.begin_tick();
        if let Some(traits) = factions.get(soldier.faction) {
            move_soldier(world, soldier, traits, rules, rng);
            outcome.cells_destroyed += attack(world, soldier, traits, rules, rng);
        }
        soldier.tick();
    }

    let before = soldiers.len();
    soldiers.retain(|s| {
        let spent = rules.removal_policy == SoldierRemovalPolicy::OnAnyHit && s.hits_this_tick > 0;
        s.is_alive() && !spent
    });
    outcome.soldiers_removed = (before - soldiers.len()) as u64;

    soldiers.sort_by_key(|s| s.id);
    world.soldiers = soldiers;
    outcome
}

fn is_passable(terrain: Terrain, traits: &FactionTraits, rules: &RuleConfig, rng: &mut ChaCha8Rng) -> bool {
    match terrain {
        Terrain::Border => false,
        Terrain::Ground | Terrain::Vegetation => true,
        Terrain::Water => rng.gen::<f64>() < (rules.water_passability * traits.adaptability).min(1.0),
        Terrain::Rock => rng.gen::<f64>() < (rules.rock_passability * traits.adaptability).min(1.0),
    }
}

fn move_soldier(
    world: &World,
    soldier: &mut Soldier,
    traits: &FactionTraits,
    rules: &RuleConfig,
    rng: &mut ChaCha8Rng,
) {
    for _ in 0..step_attempts(traits) {
        let mut candidates: Vec<Position> = Vec::with_capacity(8);
        for neighbor in world.terrain().neighbors(soldier.position) {
            let Some(terrain) = world.terrain_at(neighbor) else {
                continue;
            };
            if is_passable(terrain, traits, rules, rng) {
                candidates.push(neighbor);
            }
        }
        if let Some(&next) = candidates.choose(rng) {
            soldier.move_to(next);
        }
    }
}

/// Strike enemy cells in the 3x3 block around the soldier. Returns cells destroyed.
fn attack(
    world: &mut World,
    soldier: &mut Soldier,
    traits: &FactionTraits,
    rules: &RuleConfig,
    rng: &mut ChaCha8Rng,
) -> u64 {
    let mut targets: Vec<(Position, FactionId)> = world
        .ownership()
        .neighborhood(soldier.position)
        .filter_map(|pos| match world.owner(pos) {
            Some(owner) if owner != soldier.faction => Some((pos, owner)),
            _ => None,
        })
        .collect();

    let attempts = attack_attempts(traits).min(targets.len());
    if attempts == 0 {
        return 0;
    }

    let p = attack_success_probability(rules, traits);
    let (chosen, _) = targets.partial_shuffle(rng, attempts);

    let mut destroyed = 0;
    for &(pos, victim) in chosen.iter() {
        if rng.gen::<f64>() < p && world.release(pos).is_some() {
            soldier.record_hit();
            if let Some(stats) = world.stats.get_mut(soldier.faction) {
                stats.record_destruction(victim);
            }
            trace!(
                soldier = %soldier.id,
                attacker = %soldier.faction,
                victim = %victim,
                x = pos.x,
                y = pos.y,
                "Cell destroyed"
            );
            destroyed += 1;
        }
    }
    destroyed
}
