//! Terrain generation. The result is fixed for the rest of the run.

use crate::grid::Grid;
use comm_core::{Position, Terrain, TerrainConfig};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Build the terrain layer: per-cell special draws, pond and grove blobs, then the border ring
pub fn generate_terrain(
    width: i32,
    height: i32,
    config: &TerrainConfig,
    rng: &mut ChaCha8Rng,
) -> Grid<Terrain> {
    let mut grid = Grid::new(width, height, Terrain::Ground);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if rng.gen::<f64>() < config.special_terrain_fraction {
                grid.set(Position::new(x, y), pick_special(config, rng));
            }
        }
    }

    for _ in 0..config.pond_count {
        place_blob(&mut grid, Terrain::Water, config, rng);
    }
    for _ in 0..config.grove_count {
        place_blob(&mut grid, Terrain::Vegetation, config, rng);
    }

    apply_border(&mut grid);
    grid
}

/// Force every perimeter cell to Border
pub fn apply_border(grid: &mut Grid<Terrain>) {
    let perimeter: Vec<Position> = grid.positions().filter(|p| grid.is_perimeter(*p)).collect();
    for pos in perimeter {
        grid.set(pos, Terrain::Border);
    }
}

fn pick_special(config: &TerrainConfig, rng: &mut ChaCha8Rng) -> Terrain {
    let total = config.water_share + config.rock_share + config.vegetation_share;
    if total <= 0.0 {
        return Terrain::Ground;
    }
    let roll = rng.gen::<f64>() * total;
    if roll < config.water_share {
        Terrain::Water
    } else if roll < config.water_share + config.rock_share {
        Terrain::Rock
    } else {
        Terrain::Vegetation
    }
}

/// Stamp a roughly circular patch with a ragged edge
fn place_blob(grid: &mut Grid<Terrain>, terrain: Terrain, config: &TerrainConfig, rng: &mut ChaCha8Rng) {
    if grid.width < 3 || grid.height < 3 {
        return;
    }
    let center = Position::new(
        rng.gen_range(1..grid.width - 1),
        rng.gen_range(1..grid.height - 1),
    );
    let radius = rng.gen_range(config.blob_radius_min..=config.blob_radius_max);

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let pos = center.add(dx, dy);
            if !grid.in_bounds(pos) || grid.is_perimeter(pos) {
                continue;
            }
            // Jitter the edge so blobs are not perfect discs
            let reach = radius as f64 + rng.gen_range(-0.5..0.5);
            if (pos.distance_squared(&center) as f64) <= reach * reach {
                grid.set(pos, terrain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn count(grid: &Grid<Terrain>, terrain: Terrain) -> usize {
        grid.cells().iter().filter(|t| **t == terrain).count()
    }

    #[test]
    fn test_border_ring() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let grid = generate_terrain(20, 12, &TerrainConfig::default(), &mut rng);

        for (pos, terrain) in grid.iter() {
            assert_eq!(grid.is_perimeter(pos), *terrain == Terrain::Border, "at {:?}", pos);
        }
    }

    #[test]
    fn test_special_fraction_roughly_respected() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = TerrainConfig {
            pond_count: 0,
            grove_count: 0,
            ..Default::default()
        };
        let grid = generate_terrain(96, 64, &config, &mut rng);

        let interior = (94 * 62) as f64;
        let special = (count(&grid, Terrain::Water)
            + count(&grid, Terrain::Rock)
            + count(&grid, Terrain::Vegetation)) as f64;
        let fraction = special / interior;
        assert!((fraction - 0.25).abs() < 0.03, "fraction was {}", fraction);
    }

    #[test]
    fn test_zero_fraction_without_blobs_is_all_ground() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = TerrainConfig {
            special_terrain_fraction: 0.0,
            pond_count: 0,
            grove_count: 0,
            ..Default::default()
        };
        let grid = generate_terrain(10, 10, &config, &mut rng);
        assert_eq!(count(&grid, Terrain::Ground), 64);
        assert_eq!(count(&grid, Terrain::Border), 36);
    }

    #[test]
    fn test_ponds_add_water() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = TerrainConfig {
            special_terrain_fraction: 0.0,
            pond_count: 2,
            grove_count: 0,
            blob_radius_min: 2,
            blob_radius_max: 2,
            ..Default::default()
        };
        let grid = generate_terrain(30, 30, &config, &mut rng);
        assert!(count(&grid, Terrain::Water) >= 4);
        assert_eq!(count(&grid, Terrain::Vegetation), 0);
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let config = TerrainConfig::default();
        let a = generate_terrain(40, 30, &config, &mut ChaCha8Rng::seed_from_u64(9));
        let b = generate_terrain(40, 30, &config, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
