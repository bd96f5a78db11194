//! Per-faction statistics tracking.

use crate::FactionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics for a single faction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionStats {
    /// Cells currently owned, recomputed from the ownership grid every tick
    pub owned_cells: u64,
    /// Largest territory ever held
    pub peak_cells: u64,
    /// Enemy cells reverted to unclaimed by this faction's soldiers
    pub cells_destroyed: u64,
    /// `cells_destroyed` broken down by victim faction
    pub destroyed_by_victim: BTreeMap<FactionId, u64>,
    /// Own cells lost to periodic decay
    pub cells_decayed: u64,
    /// Cells gained through expansion
    pub cells_claimed: u64,
    pub soldiers_spawned: u64,
    pub soldiers_alive: u64,
    /// First tick at which the faction owned no cells
    pub eliminated_at: Option<u64>,
}

impl FactionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_destruction(&mut self, victim: FactionId) {
        self.cells_destroyed += 1;
        *self.destroyed_by_victim.entry(victim).or_insert(0) += 1;
    }

    /// Update the owned-cell count after a full grid scan
    pub fn refresh_territory(&mut self, owned_cells: u64, tick: u64) {
        self.owned_cells = owned_cells;
        self.peak_cells = self.peak_cells.max(owned_cells);
        if owned_cells == 0 && self.eliminated_at.is_none() {
            self.eliminated_at = Some(tick);
        }
    }

    pub fn is_eliminated(&self) -> bool {
        self.owned_cells == 0
    }
}

/// Statistics for every configured faction, keyed in id order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub factions: BTreeMap<FactionId, FactionStats>,
}

impl WorldStats {
    pub fn new(ids: &[FactionId]) -> Self {
        Self {
            factions: ids.iter().map(|&id| (id, FactionStats::new())).collect(),
        }
    }

    pub fn get(&self, id: FactionId) -> Option<&FactionStats> {
        self.factions.get(&id)
    }

    pub fn get_mut(&mut self, id: FactionId) -> Option<&mut FactionStats> {
        self.factions.get_mut(&id)
    }

    pub fn total_owned(&self) -> u64 {
        self.factions.values().map(|s| s.owned_cells).sum()
    }

    pub fn total_destroyed(&self) -> u64 {
        self.factions.values().map(|s| s.cells_destroyed).sum()
    }

    /// Faction holding the most cells; ties resolve to the lowest id
    pub fn leader(&self) -> Option<FactionId> {
        self.factions
            .iter()
            .filter(|(_, s)| s.owned_cells > 0)
            .max_by(|(a_id, a), (b_id, b)| {
                a.owned_cells
                    .cmp(&b.owned_cells)
                    .then_with(|| b_id.cmp(a_id))
            })
            .map(|(id, _)| *id)
    }
}
