//! Per-tick rules. Each rule mutates the world through an explicit seeded RNG.

pub mod combat;
pub mod decay;
pub mod expansion;
pub mod spawn;

pub use combat::{update_soldiers, SoldierOutcome};
pub use decay::decay;
pub use expansion::expand;
pub use spawn::spawn_soldiers;

/// Whether a periodic rule fires on `tick`; an interval of zero disables it
pub fn is_due(tick: u64, interval: u64) -> bool {
    interval > 0 && tick % interval == 0
}
