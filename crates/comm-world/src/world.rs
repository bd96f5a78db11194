//! The single mutable aggregate of the simulation.

use crate::grid::Grid;
use crate::soldier::Soldier;
use crate::terrain::apply_border;
use comm_core::{FactionId, Position, SoldierId, Terrain, WorldStats};
use serde::{Deserialize, Serialize};

/// Terrain, ownership, live soldiers and per-faction statistics.
///
/// Terrain is fixed at construction; only ownership, soldiers and stats
/// change while the simulation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    terrain: Grid<Terrain>,
    pub(crate) ownership: Grid<Option<FactionId>>,
    pub(crate) soldiers: Vec<Soldier>,
    pub(crate) stats: WorldStats,
    pub(crate) tick: u64,
    pub(crate) next_soldier_id: u64,
}

impl World {
    /// Create a world over the given terrain. The perimeter is forced to Border.
    pub fn new(mut terrain: Grid<Terrain>, factions: &[FactionId]) -> Self {
        apply_border(&mut terrain);
        let ownership = Grid::new(terrain.width, terrain.height, None);
        Self {
            terrain,
            ownership,
            soldiers: Vec::new(),
            stats: WorldStats::new(factions),
            tick: 0,
            next_soldier_id: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.terrain.width
    }

    pub fn height(&self) -> i32 {
        self.terrain.height
    }

    pub fn terrain(&self) -> &Grid<Terrain> {
        &self.terrain
    }

    pub fn ownership(&self) -> &Grid<Option<FactionId>> {
        &self.ownership
    }

    pub fn soldiers(&self) -> &[Soldier] {
        &self.soldiers
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Completed ticks ("years")
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn terrain_at(&self, pos: Position) -> Option<Terrain> {
        self.terrain.get(pos).copied()
    }

    /// Owner of a cell; `None` for unclaimed or off-grid cells
    pub fn owner(&self, pos: Position) -> Option<FactionId> {
        self.ownership.get(pos).copied().flatten()
    }

    pub fn is_unclaimed(&self, pos: Position) -> bool {
        matches!(self.ownership.get(pos), Some(None))
    }

    /// Assign a cell to a faction. Refused for Border and off-grid cells.
    pub fn claim(&mut self, pos: Position, faction: FactionId) -> bool {
        match self.terrain_at(pos) {
            Some(terrain) if terrain.is_claimable() => self.ownership.set(pos, Some(faction)),
            _ => false,
        }
    }

    /// Claim a cell only if nobody owns it yet
    pub fn claim_if_unclaimed(&mut self, pos: Position, faction: FactionId) -> bool {
        self.is_unclaimed(pos) && self.claim(pos, faction)
    }

    /// Revert a cell to unclaimed, returning its previous owner
    pub fn release(&mut self, pos: Position) -> Option<FactionId> {
        self.ownership.get_mut(pos).and_then(|cell| cell.take())
    }

    /// Every owned cell with its owner, row-major
    pub fn owned_cells(&self) -> Vec<(Position, FactionId)> {
        self.ownership
            .iter()
            .filter_map(|(pos, owner)| owner.map(|f| (pos, f)))
            .collect()
    }

    pub fn cells_owned_by(&self, faction: FactionId) -> Vec<Position> {
        self.ownership
            .iter()
            .filter(|(_, owner)| **owner == Some(faction))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Whether a soldier may stand on this cell
    pub fn is_soldier_cell(&self, pos: Position) -> bool {
        matches!(self.terrain_at(pos), Some(t) if !t.is_border())
    }

    pub fn soldiers_of(&self, faction: FactionId) -> usize {
        self.soldiers.iter().filter(|s| s.faction == faction).count()
    }

    pub(crate) fn add_soldier(&mut self, faction: FactionId, position: Position, lifespan: u32) -> SoldierId {
        let id = SoldierId(self.next_soldier_id);
        self.next_soldier_id += 1;
        self.soldiers
            .push(Soldier::new(id, faction, position, lifespan, self.tick));
        if let Some(stats) = self.stats.get_mut(faction) {
            stats.soldiers_spawned += 1;
        }
        id
    }

    /// Recompute owned-cell and live-soldier counts from scratch
    pub fn refresh_stats(&mut self) {
        let mut owned = [0u64; FactionId::COUNT];
        for owner in self.ownership.cells().iter().flatten() {
            owned[owner.index()] += 1;
        }
        let mut soldiers = [0u64; FactionId::COUNT];
        for soldier in &self.soldiers {
            soldiers[soldier.faction.index()] += 1;
        }

        let tick = self.tick;
        for (id, stats) in self.stats.factions.iter_mut() {
            stats.refresh_territory(owned[id.index()], tick);
            stats.soldiers_alive = soldiers[id.index()];
        }
    }

    /// Number of cells that are not Border
    pub fn claimable_cells(&self) -> usize {
        self.terrain.cells().iter().filter(|t| t.is_claimable()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> World {
        World::new(Grid::new(7, 7, Terrain::Ground), &[FactionId::A, FactionId::B])
    }

    #[test]
    fn test_new_world_has_border() {
        let world = small_world();
        assert_eq!(world.terrain_at(Position::new(0, 3)), Some(Terrain::Border));
        assert_eq!(world.terrain_at(Position::new(3, 3)), Some(Terrain::Ground));
        assert_eq!(world.claimable_cells(), 25);
    }

    #[test]
    fn test_border_cannot_be_claimed() {
        let mut world = small_world();
        assert!(!world.claim(Position::new(0, 0), FactionId::A));
        assert!(!world.claim(Position::new(-1, 2), FactionId::A));
        assert_eq!(world.owner(Position::new(0, 0)), None);
    }

    #[test]
    fn test_claim_and_release() {
        let mut world = small_world();
        let pos = Position::new(2, 2);
        assert!(world.claim_if_unclaimed(pos, FactionId::A));
        assert!(!world.claim_if_unclaimed(pos, FactionId::B));
        assert_eq!(world.owner(pos), Some(FactionId::A));

        assert_eq!(world.release(pos), Some(FactionId::A));
        assert!(world.is_unclaimed(pos));
        assert_eq!(world.release(pos), None);
    }

    #[test]
    fn test_refresh_stats() {
        let mut world = small_world();
        world.claim(Position::new(1, 1), FactionId::A);
        world.claim(Position::new(2, 1), FactionId::A);
        world.claim(Position::new(3, 1), FactionId::B);
        world.add_soldier(FactionId::B, Position::new(3, 1), 10);
        world.refresh_stats();

        let a = world.stats().get(FactionId::A).unwrap();
        let b = world.stats().get(FactionId::B).unwrap();
        assert_eq!(a.owned_cells, 2);
        assert_eq!(b.owned_cells, 1);
        assert_eq!(b.soldiers_alive, 1);
        assert_eq!(b.soldiers_spawned, 1);
        assert_eq!(world.cells_owned_by(FactionId::A).len(), 2);
    }

    #[test]
    fn test_soldier_ids_are_sequential() {
        let mut world = small_world();
        let first = world.add_soldier(FactionId::A, Position::new(1, 1), 5);
        let second = world.add_soldier(FactionId::A, Position::new(1, 2), 5);
        assert_eq!(first, SoldierId(0));
        assert_eq!(second, SoldierId(1));
        assert_eq!(world.soldiers_of(FactionId::A), 2);
    }
}
