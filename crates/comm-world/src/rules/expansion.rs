//! Territorial expansion into unclaimed neighbour cells.

use crate::world::World;
use comm_core::{FactionId, FactionTable, FactionTraits, Position, RuleConfig, Terrain};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Probability that one owned cell converts one unclaimed neighbour of the given terrain
pub fn claim_probability(rules: &RuleConfig, traits: &FactionTraits, terrain: Terrain) -> f64 {
    let multiplier = rules
        .terrain_multipliers
        .for_terrain(terrain, traits.adaptability);
    (rules.base_expansion_rate * traits.growth * multiplier).clamp(0.0, 1.0)
}

/// Run one expansion round for every faction at once.
///
/// Claims are drawn against the ownership at the start of the round, shuffled,
/// and applied first-claim-wins, so a contested cell goes to a random claimant.
/// Returns the number of cells granted.
pub fn expand(
    world: &mut World,
    factions: &FactionTable,
    rules: &RuleConfig,
    rng: &mut ChaCha8Rng,
) -> u64 {
    let mut claims: Vec<(Position, FactionId)> = Vec::new();

    for (pos, faction) in world.owned_cells() {
        let Some(traits) = factions.get(faction) else {
            continue;
        };
        for neighbor in world.ownership().neighbors(pos) {
            if !world.is_unclaimed(neighbor) {
                continue;
            }
            let Some(terrain) = world.terrain_at(neighbor) else {
                continue;
            };
            if !terrain.is_claimable() {
                continue;
            }
            if rng.gen::<f64>() < claim_probability(rules, traits, terrain) {
                claims.push((neighbor, faction));
            }
        }
    }

    claims.shuffle(rng);

    let mut granted = 0;
    for (pos, faction) in claims {
        if world.claim_if_unclaimed(pos, faction) {
            if let Some(stats) = world.stats.get_mut(faction) {
                stats.cells_claimed += 1;
            }
            granted += 1;
        }
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use comm_core::FactionSpec;
    use rand::SeedableRng;

    fn table(traits: FactionTraits) -> FactionTable {
        FactionTable::from(&[FactionSpec::new(FactionId::A, traits)][..])
    }

    #[test]
    fn test_claim_probability_scaling() {
        let rules = RuleConfig {
            base_expansion_rate: 0.5,
            ..Default::default()
        };
        let traits = FactionTraits::new(1.0, 1.0, 0.5, 1.0, 1.0);

        assert!((claim_probability(&rules, &traits, Terrain::Ground) - 0.5).abs() < 1e-12);
        assert!((claim_probability(&rules, &traits, Terrain::Water) - 0.1).abs() < 1e-12);
        assert_eq!(claim_probability(&rules, &traits, Terrain::Border), 0.0);

        let eager = FactionTraits::new(10.0, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(claim_probability(&rules, &eager, Terrain::Vegetation), 1.0);
    }

    #[test]
    fn test_certain_expansion_fills_ring() {
        let mut world = World::new(Grid::new(7, 7, Terrain::Ground), &[FactionId::A]);
        world.claim(Position::new(3, 3), FactionId::A);
        let rules = RuleConfig {
            base_expansion_rate: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let granted = expand(&mut world, &table(FactionTraits::balanced()), &rules, &mut rng);

        assert_eq!(granted, 8);
        assert_eq!(world.cells_owned_by(FactionId::A).len(), 9);
    }

    #[test]
    fn test_zero_growth_never_expands() {
        let mut world = World::new(Grid::new(9, 9, Terrain::Ground), &[FactionId::A]);
        world.claim(Position::new(4, 4), FactionId::A);
        let rules = RuleConfig {
            base_expansion_rate: 1.0,
            ..Default::default()
        };
        let traits = FactionTraits::new(0.0, 1.0, 1.0, 1.0, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..50 {
            assert_eq!(expand(&mut world, &table(traits), &rules, &mut rng), 0);
        }
    }

    #[test]
    fn test_contested_cell_goes_to_one_faction() {
        // Two factions flank a single free column; each free cell is claimed exactly once
        let ids = [FactionId::A, FactionId::B];
        let mut world = World::new(Grid::new(5, 7, Terrain::Ground), &ids);
        for y in 1..6 {
            world.claim(Position::new(1, y), FactionId::A);
            world.claim(Position::new(3, y), FactionId::B);
        }
        let specs = [
            FactionSpec::new(FactionId::A, FactionTraits::balanced()),
            FactionSpec::new(FactionId::B, FactionTraits::balanced()),
        ];
        let rules = RuleConfig {
            base_expansion_rate: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let granted = expand(&mut world, &FactionTable::from(&specs[..]), &rules, &mut rng);

        assert_eq!(granted, 5);
        for y in 1..6 {
            assert!(world.owner(Position::new(2, y)).is_some());
        }
    }
}
