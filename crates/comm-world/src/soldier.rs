//! Soldier state and management.

use comm_core::{FactionId, Position, SoldierId};
use serde::{Deserialize, Serialize};

/// A transient mobile attacker belonging to a faction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
    pub faction: FactionId,
    pub position: Position,
    /// Ticks left to live
    pub lifespan: u32,
    pub age: u64,
    /// Successful attacks landed during the current tick
    pub hits_this_tick: u32,
    pub total_hits: u32,
    pub birth_tick: u64,
}

impl Soldier {
    pub fn new(id: SoldierId, faction: FactionId, position: Position, lifespan: u32, birth_tick: u64) -> Self {
        Self {
            id,
            faction,
            position,
            lifespan,
            age: 0,
            hits_this_tick: 0,
            total_hits: 0,
            birth_tick,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lifespan > 0
    }

    pub fn move_to(&mut self, new_position: Position) {
        self.position = new_position;
    }

    pub fn begin_tick(&mut self) {
        self.hits_this_tick = 0;
    }

    pub fn record_hit(&mut self) {
        self.hits_this_tick += 1;
        self.total_hits += 1;
    }

    /// Age by one tick and burn one unit of lifespan
    pub fn tick(&mut self) {
        self.age += 1;
        self.lifespan = self.lifespan.saturating_sub(1);
    }
}
