//! Serializable capture of the world state.

use crate::soldier::Soldier;
use crate::world::World;
use comm_core::{FactionId, Result, Terrain, WorldStats};
use serde::{Deserialize, Serialize};

/// Everything needed to inspect or compare a world at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub seed: u64,
    pub tick: u64,
    pub width: i32,
    pub height: i32,
    /// Row-major terrain tags
    pub terrain: Vec<Terrain>,
    /// Row-major ownership
    pub ownership: Vec<Option<FactionId>>,
    pub soldiers: Vec<Soldier>,
    pub stats: WorldStats,
}

impl WorldSnapshot {
    pub fn capture(world: &World, seed: u64) -> Self {
        Self {
            seed,
            tick: world.tick(),
            width: world.width(),
            height: world.height(),
            terrain: world.terrain().cells().to_vec(),
            ownership: world.ownership().cells().to_vec(),
            soldiers: world.soldiers().to_vec(),
            stats: world.stats().clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
