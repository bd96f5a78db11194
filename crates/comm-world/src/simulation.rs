//! Simulation engine driving the per-tick rules.

use crate::render::{render, Frame};
use crate::rules::{self, is_due};
use crate::settlement::place_settlements;
use crate::snapshot::WorldSnapshot;
use crate::terrain::generate_terrain;
use crate::world::World;
use comm_core::{Error, FactionId, FactionTable, Position, Result, SimConfig, SoldierId, WorldStats};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

pub struct Simulation {
    world: World,
    config: SimConfig,
    factions: FactionTable,
    rng: ChaCha8Rng,
}

/// Counters for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub cells_claimed: u64,
    pub cells_decayed: u64,
    pub soldiers_spawned: u64,
    pub cells_destroyed: u64,
    pub soldiers_removed: u64,
}

impl Simulation {
    /// Generate terrain, found the settlements and return a simulation at tick zero
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let factions = config.faction_table();
        let ids = factions.ids();

        let terrain = generate_terrain(config.width, config.height, &config.terrain, &mut rng);
        let mut world = World::new(terrain, &ids);
        place_settlements(&mut world, &ids, &config.terrain, &mut rng)?;
        world.refresh_stats();

        info!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            factions = ids.len(),
            "World created"
        );

        Ok(Self {
            world,
            config,
            factions,
            rng,
        })
    }

    /// Start from a hand-built world instead of generated terrain and settlements
    pub fn with_world(config: SimConfig, mut world: World) -> Result<Self> {
        config.validate()?;
        if world.width() != config.width || world.height() != config.height {
            return Err(Error::Validation(format!(
                "world is {}x{} but configuration expects {}x{}",
                world.width(),
                world.height(),
                config.width,
                config.height
            )));
        }

        let factions = config.faction_table();
        if let Some((pos, owner)) = world
            .owned_cells()
            .into_iter()
            .find(|(_, owner)| !factions.contains(*owner))
        {
            return Err(Error::InvalidState(format!(
                "cell ({}, {}) is owned by unconfigured faction {}",
                pos.x, pos.y, owner
            )));
        }
        if world.soldiers().iter().any(|s| !factions.contains(s.faction)) {
            return Err(Error::InvalidState(
                "world contains soldiers of an unconfigured faction".to_string(),
            ));
        }

        world.stats = WorldStats::new(&factions.ids());
        world.refresh_stats();
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            world,
            config,
            factions,
            rng,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn factions(&self) -> &FactionTable {
        &self.factions
    }

    pub fn tick(&self) -> u64 {
        self.world.tick
    }

    pub fn is_finished(&self) -> bool {
        self.world.tick >= self.config.total_ticks
    }

    /// Whether the tick just completed is a render tick
    pub fn should_render(&self) -> bool {
        is_due(self.world.tick, self.config.render_interval_ticks)
    }

    /// Place a soldier by hand on any non-Border cell
    pub fn deploy_soldier(&mut self, faction: FactionId, position: Position, lifespan: u32) -> Result<SoldierId> {
        if !self.factions.contains(faction) {
            return Err(Error::InvalidState(format!("faction {} is not configured", faction)));
        }
        if !self.world.is_soldier_cell(position) {
            return Err(Error::InvalidState(format!(
                "soldiers cannot stand at ({}, {})",
                position.x, position.y
            )));
        }
        if lifespan == 0 {
            return Err(Error::Validation("soldier lifespan must be at least 1".to_string()));
        }
        let id = self.world.add_soldier(faction, position, lifespan);
        self.world.refresh_stats();
        Ok(id)
    }

    /// Execute one simulation step: expansion, decay, spawning, soldiers, statistics
    pub fn step(&mut self) -> Result<TickReport> {
        self.world.tick += 1;
        let tick = self.world.tick;
        let rules_config = &self.config.rules;
        let mut report = TickReport {
            tick,
            ..Default::default()
        };

        report.cells_claimed = rules::expand(&mut self.world, &self.factions, rules_config, &mut self.rng);

        if is_due(tick, rules_config.decay_interval_ticks) {
            report.cells_decayed = rules::decay(&mut self.world, &self.factions, rules_config, &mut self.rng);
        }

        if is_due(tick, rules_config.spawn_interval_ticks) {
            report.soldiers_spawned =
                rules::spawn_soldiers(&mut self.world, &self.factions, rules_config, &mut self.rng);
        }

        let outcome = rules::update_soldiers(&mut self.world, &self.factions, rules_config, &mut self.rng);
        report.cells_destroyed = outcome.cells_destroyed;
        report.soldiers_removed = outcome.soldiers_removed;

        let alive_before: Vec<FactionId> = self.alive_factions();
        self.world.refresh_stats();
        for faction in alive_before {
            if self
                .world
                .stats
                .get(faction)
                .map_or(false, |s| s.is_eliminated())
            {
                debug!(faction = %faction, tick, "Faction eliminated");
            }
        }

        debug!(
            tick,
            claimed = report.cells_claimed,
            decayed = report.cells_decayed,
            spawned = report.soldiers_spawned,
            destroyed = report.cells_destroyed,
            removed = report.soldiers_removed,
            "Tick complete"
        );

        Ok(report)
    }

    fn alive_factions(&self) -> Vec<FactionId> {
        self.world
            .stats
            .factions
            .iter()
            .filter(|(_, s)| !s.is_eliminated())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Run the remaining tick budget without presentation
    #[instrument(skip(self), fields(total_ticks = self.config.total_ticks, seed = self.config.seed))]
    pub fn run(&mut self) -> Result<SimulationResult> {
        info!("Starting simulation for {} ticks", self.config.total_ticks);

        while !self.is_finished() {
            self.step()?;
            if self.should_render() {
                self.emit_population_metrics();
            }
        }

        let result = self.result();
        info!(
            event = "run_summary",
            final_tick = result.final_tick,
            leader = ?result.leader,
            total_owned = result.stats.total_owned(),
            total_destroyed = result.stats.total_destroyed(),
            "Simulation complete"
        );
        Ok(result)
    }

    /// Emit per-faction territory metrics
    pub fn emit_population_metrics(&self) {
        for (faction, stats) in &self.world.stats.factions {
            info!(
                event = "population_metrics",
                tick = self.world.tick,
                faction = %faction,
                owned_cells = stats.owned_cells,
                peak_cells = stats.peak_cells,
                cells_destroyed = stats.cells_destroyed,
                cells_decayed = stats.cells_decayed,
                soldiers_alive = stats.soldiers_alive,
                "Faction metrics snapshot"
            );
        }
    }

    /// Render the current state into a frame
    pub fn frame(&self) -> Frame {
        render(&self.world, &self.factions)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, self.config.seed)
    }

    pub fn result(&self) -> SimulationResult {
        SimulationResult {
            final_tick: self.world.tick,
            leader: self.world.stats.leader(),
            soldiers_alive: self.world.soldiers.len(),
            stats: self.world.stats.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub final_tick: u64,
    pub leader: Option<FactionId>,
    pub soldiers_alive: usize,
    pub stats: WorldStats,
}
