//! Initial settlement placement.

use crate::world::World;
use comm_core::{Error, FactionId, Position, Result, Terrain, TerrainConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Found one irregular settlement per faction, each near its own quadrant centre
pub fn place_settlements(
    world: &mut World,
    factions: &[FactionId],
    config: &TerrainConfig,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    for &faction in factions {
        let center = quadrant_center(faction, world.width(), world.height());
        let site = find_site(world, center, config.settlement_retries, rng).ok_or_else(|| {
            Error::InvalidState(format!("no settlement site available for faction {}", faction))
        })?;
        let claimed = claim_cluster(world, faction, site, config, rng);
        debug!(
            faction = %faction,
            site_x = site.x,
            site_y = site.y,
            cells = claimed,
            "Settlement founded"
        );
    }
    Ok(())
}

/// Centre of the quadrant assigned to a faction: A top-left, B top-right, C bottom-left, D bottom-right
pub fn quadrant_center(faction: FactionId, width: i32, height: i32) -> Position {
    let slot = faction.index();
    let x = if slot % 2 == 0 { width / 4 } else { 3 * width / 4 };
    let y = if slot < 2 { height / 4 } else { 3 * height / 4 };
    Position::new(x, y)
}

fn is_site(world: &World, pos: Position) -> bool {
    matches!(world.terrain_at(pos), Some(t) if t != Terrain::Border && t != Terrain::Water)
        && world.is_unclaimed(pos)
}

/// Random probes around the centre first, then the nearest usable cell anywhere
fn find_site(world: &World, center: Position, retries: u32, rng: &mut ChaCha8Rng) -> Option<Position> {
    let jitter_x = (world.width() / 8).max(1);
    let jitter_y = (world.height() / 8).max(1);

    for _ in 0..retries {
        let candidate = center.add(
            rng.gen_range(-jitter_x..=jitter_x),
            rng.gen_range(-jitter_y..=jitter_y),
        );
        if is_site(world, candidate) {
            return Some(candidate);
        }
    }

    world
        .terrain()
        .positions()
        .filter(|p| is_site(world, *p))
        .min_by_key(|p| p.distance_squared(&center))
}

fn claim_cluster(
    world: &mut World,
    faction: FactionId,
    site: Position,
    config: &TerrainConfig,
    rng: &mut ChaCha8Rng,
) -> usize {
    let mut claimed = 0;
    if world.claim_if_unclaimed(site, faction) {
        claimed += 1;
    }

    let r = config.settlement_radius;
    for dy in -r..=r {
        for dx in -r..=r {
            let pos = site.add(dx, dy);
            if pos == site || pos.distance_squared(&site) > r * r || !is_site(world, pos) {
                continue;
            }
            if rng.gen::<f64>() < config.settlement_skip_probability {
                continue;
            }
            if world.claim_if_unclaimed(pos, faction) {
                claimed += 1;
            }
        }
    }
    claimed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use rand::SeedableRng;

    #[test]
    fn test_quadrant_centers() {
        assert_eq!(quadrant_center(FactionId::A, 96, 64), Position::new(24, 16));
        assert_eq!(quadrant_center(FactionId::B, 96, 64), Position::new(72, 16));
        assert_eq!(quadrant_center(FactionId::C, 96, 64), Position::new(24, 48));
        assert_eq!(quadrant_center(FactionId::D, 96, 64), Position::new(72, 48));
    }

    #[test]
    fn test_each_faction_gets_a_settlement() {
        let ids = FactionId::all();
        let mut world = World::new(Grid::new(40, 30, Terrain::Ground), &ids);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        place_settlements(&mut world, &ids, &TerrainConfig::default(), &mut rng).unwrap();

        for id in ids {
            assert!(!world.cells_owned_by(id).is_empty(), "faction {} has no cells", id);
        }
    }

    #[test]
    fn test_settlement_avoids_water() {
        let mut terrain = Grid::new(12, 12, Terrain::Water);
        terrain.set(Position::new(9, 9), Terrain::Rock);
        let mut world = World::new(terrain, &[FactionId::A]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        place_settlements(&mut world, &[FactionId::A], &TerrainConfig::default(), &mut rng).unwrap();

        assert_eq!(world.cells_owned_by(FactionId::A), vec![Position::new(9, 9)]);
    }

    #[test]
    fn test_no_site_is_an_error() {
        let terrain = Grid::new(8, 8, Terrain::Water);
        let mut world = World::new(terrain, &[FactionId::A]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = place_settlements(&mut world, &[FactionId::A], &TerrainConfig::default(), &mut rng);
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_zero_skip_fills_disc() {
        let mut world = World::new(Grid::new(20, 20, Terrain::Ground), &[FactionId::A]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = TerrainConfig {
            settlement_radius: 1,
            settlement_skip_probability: 0.0,
            ..Default::default()
        };

        place_settlements(&mut world, &[FactionId::A], &config, &mut rng).unwrap();
        // radius 1 disc: centre plus the four orthogonal neighbours
        assert_eq!(world.cells_owned_by(FactionId::A).len(), 5);
    }
}
