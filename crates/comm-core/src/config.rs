//! Configuration types for the simulation.

use crate::{Error, FactionId, Result, Terrain};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Smallest grid edge that still leaves an interior inside the border ring
pub const MIN_GRID_EDGE: i32 = 5;

/// Largest grid edge; keeps row-major indices well inside `i32`
pub const MAX_GRID_EDGE: i32 = 4096;

/// Upper bound on mobility, i.e. at most 16 step attempts per soldier per tick
pub const MAX_MOBILITY: f64 = 8.0;

/// Static traits of a faction, constant for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactionTraits {
    /// Scales the expansion probability
    pub growth: f64,
    /// Scales soldier spawning, attack attempts and attack success
    pub aggression: f64,
    /// Scales expansion into and movement across Water/Rock
    pub adaptability: f64,
    /// Divides (or offsets) the decay probability
    pub resilience: f64,
    /// Number of soldier step attempts per tick is `round(mobility * 2)`
    pub mobility: f64,
}

impl FactionTraits {
    pub fn new(growth: f64, aggression: f64, adaptability: f64, resilience: f64, mobility: f64) -> Self {
        Self {
            growth,
            aggression,
            adaptability,
            resilience,
            mobility,
        }
    }

    /// Neutral traits, every value 1.0
    pub fn balanced() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0, 1.0)
    }

    fn validate(&self, id: FactionId) -> Result<()> {
        let named = [
            ("growth", self.growth),
            ("aggression", self.aggression),
            ("adaptability", self.adaptability),
            ("resilience", self.resilience),
            ("mobility", self.mobility),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Validation(format!(
                    "faction {} trait {} must be a finite non-negative number, got {}",
                    id, name, value
                )));
            }
        }
        if self.resilience <= 0.0 {
            return Err(Error::Validation(format!(
                "faction {} resilience must be positive (it divides the decay rate)",
                id
            )));
        }
        if self.mobility <= 0.0 || self.mobility > MAX_MOBILITY {
            return Err(Error::Validation(format!(
                "faction {} mobility must be within (0, {}], got {}",
                id, MAX_MOBILITY, self.mobility
            )));
        }
        Ok(())
    }
}

/// A faction taking part in the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactionSpec {
    pub id: FactionId,
    pub traits: FactionTraits,
}

impl FactionSpec {
    pub fn new(id: FactionId, traits: FactionTraits) -> Self {
        Self { id, traits }
    }
}

/// Direct trait lookup by faction id
#[derive(Debug, Clone, Default)]
pub struct FactionTable {
    traits: [Option<FactionTraits>; FactionId::COUNT],
}

impl FactionTable {
    pub fn get(&self, id: FactionId) -> Option<&FactionTraits> {
        self.traits[id.index()].as_ref()
    }

    pub fn contains(&self, id: FactionId) -> bool {
        self.get(id).is_some()
    }

    /// Configured factions in id order
    pub fn iter(&self) -> impl Iterator<Item = (FactionId, &FactionTraits)> + '_ {
        FactionId::all()
            .into_iter()
            .filter_map(move |id| self.get(id).map(|traits| (id, traits)))
    }

    pub fn ids(&self) -> Vec<FactionId> {
        self.iter().map(|(id, _)| id).collect()
    }
}

impl From<&[FactionSpec]> for FactionTable {
    fn from(specs: &[FactionSpec]) -> Self {
        let mut table = Self::default();
        for spec in specs {
            table.traits[spec.id.index()] = Some(spec.traits);
        }
        table
    }
}

/// Terrain generation and initial settlement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Target fraction of interior cells drawn as non-Ground (0.0 to 1.0)
    pub special_terrain_fraction: f64,
    /// Relative weight of Water among special cells
    pub water_share: f64,
    /// Relative weight of Rock among special cells
    pub rock_share: f64,
    /// Relative weight of Vegetation among special cells
    pub vegetation_share: f64,
    /// Number of circular Water blobs layered over the per-cell draws
    pub pond_count: u32,
    /// Number of circular Vegetation blobs layered over the per-cell draws
    pub grove_count: u32,
    pub blob_radius_min: i32,
    pub blob_radius_max: i32,
    /// Radius of the initial settlement cluster
    pub settlement_radius: i32,
    /// Chance of leaving a cell of the cluster unclaimed (irregular shape)
    pub settlement_skip_probability: f64,
    /// Attempts at finding a usable site near the quadrant centre
    pub settlement_retries: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            special_terrain_fraction: 0.25,
            water_share: 0.35,
            rock_share: 0.35,
            vegetation_share: 0.30,
            pond_count: 3,
            grove_count: 4,
            blob_radius_min: 2,
            blob_radius_max: 5,
            settlement_radius: 2,
            settlement_skip_probability: 0.3,
            settlement_retries: 50,
        }
    }
}

/// Expansion multiplier per terrain type.
///
/// Water and Rock are further scaled by the faction's adaptability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainMultipliers {
    pub ground: f64,
    pub water: f64,
    pub rock: f64,
    pub vegetation: f64,
}

impl TerrainMultipliers {
    pub fn for_terrain(&self, terrain: Terrain, adaptability: f64) -> f64 {
        match terrain {
            Terrain::Ground => self.ground,
            Terrain::Vegetation => self.vegetation,
            Terrain::Water => self.water * adaptability,
            Terrain::Rock => self.rock * adaptability,
            Terrain::Border => 0.0,
        }
    }
}

impl Default for TerrainMultipliers {
    fn default() -> Self {
        Self {
            ground: 1.0,
            water: 0.4,
            rock: 0.5,
            vegetation: 1.3,
        }
    }
}

/// When a soldier leaves the active list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoldierRemovalPolicy {
    /// Removed at the end of its lifespan or right after a tick with a successful attack
    OnAnyHit,
    /// Removed only when its lifespan runs out
    OnLifespanOnly,
}

/// How resilience turns the base decay rate into a per-cell probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayFormula {
    /// `base_decay_rate / resilience`
    DivideByResilience,
    /// `base_decay_rate * (1 - resilience)`, floored at zero
    ScaleByFragility,
}

impl DecayFormula {
    pub fn probability(&self, base_rate: f64, resilience: f64) -> f64 {
        let p = match self {
            DecayFormula::DivideByResilience => base_rate / resilience.max(MIN_DENOMINATOR),
            DecayFormula::ScaleByFragility => base_rate * (1.0 - resilience),
        };
        p.clamp(0.0, 1.0)
    }
}

/// Floor applied to trait denominators
pub const MIN_DENOMINATOR: f64 = 1e-6;

/// Per-tick rule parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Per (owned cell, unclaimed neighbour) claim probability before trait scaling
    pub base_expansion_rate: f64,
    pub base_decay_rate: f64,
    /// Soldiers spawned per owned cell per spawn round, before aggression scaling
    pub base_spawn_rate: f64,
    /// Attack success is `min(1, base * aggression)`
    pub soldier_attack_base_probability: f64,
    /// Decay runs on ticks divisible by this; 0 disables decay
    pub decay_interval_ticks: u64,
    /// Spawning runs on ticks divisible by this; 0 disables spawning
    pub spawn_interval_ticks: u64,
    pub soldier_lifespan_min: u32,
    pub soldier_lifespan_max: u32,
    /// Cap on live soldiers per faction
    pub max_soldiers_per_faction: usize,
    pub terrain_multipliers: TerrainMultipliers,
    /// Chance a Water neighbour is passable for a soldier, scaled by adaptability
    pub water_passability: f64,
    /// Chance a Rock neighbour is passable for a soldier, scaled by adaptability
    pub rock_passability: f64,
    pub removal_policy: SoldierRemovalPolicy,
    pub decay_formula: DecayFormula,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            base_expansion_rate: 0.08,
            base_decay_rate: 0.02,
            base_spawn_rate: 0.002,
            soldier_attack_base_probability: 1.0,
            decay_interval_ticks: 10,
            spawn_interval_ticks: 5,
            soldier_lifespan_min: 50,
            soldier_lifespan_max: 150,
            max_soldiers_per_faction: 40,
            terrain_multipliers: TerrainMultipliers::default(),
            water_passability: 0.3,
            rock_passability: 0.4,
            removal_policy: SoldierRemovalPolicy::OnAnyHit,
            decay_formula: DecayFormula::DivideByResilience,
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: i32,
    pub height: i32,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of ticks ("years") to run
    pub total_ticks: u64,
    pub render_interval_ticks: u64,
    /// Pause after each rendered frame (milliseconds)
    pub frame_delay_ms: u64,
    pub factions: Vec<FactionSpec>,
    pub terrain: TerrainConfig,
    pub rules: RuleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 64,
            seed: 0,
            total_ticks: 1000,
            render_interval_ticks: 10,
            frame_delay_ms: 100,
            factions: vec![
                FactionSpec::new(FactionId::A, FactionTraits::new(1.2, 0.8, 1.0, 0.9, 1.0)),
                FactionSpec::new(FactionId::B, FactionTraits::new(0.9, 1.3, 0.8, 1.1, 1.2)),
                FactionSpec::new(FactionId::C, FactionTraits::new(1.0, 1.0, 1.3, 0.8, 0.9)),
                FactionSpec::new(FactionId::D, FactionTraits::new(0.8, 1.1, 0.9, 1.4, 0.7)),
            ],
            terrain: TerrainConfig::default(),
            rules: RuleConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn faction_table(&self) -> FactionTable {
        FactionTable::from(self.factions.as_slice())
    }

    /// Reject configurations that would produce NaN probabilities or unbounded loops
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_GRID_EDGE || self.height < MIN_GRID_EDGE {
            return Err(Error::Validation(format!(
                "grid must be at least {}x{}, got {}x{}",
                MIN_GRID_EDGE, MIN_GRID_EDGE, self.width, self.height
            )));
        }
        if self.width > MAX_GRID_EDGE || self.height > MAX_GRID_EDGE {
            return Err(Error::Validation(format!(
                "grid must be at most {}x{}, got {}x{}",
                MAX_GRID_EDGE, MAX_GRID_EDGE, self.width, self.height
            )));
        }
        if self.render_interval_ticks == 0 {
            return Err(Error::Validation(
                "render_interval_ticks must be at least 1".to_string(),
            ));
        }
        if self.factions.is_empty() {
            return Err(Error::Validation("at least one faction is required".to_string()));
        }

        let mut seen = HashSet::new();
        for spec in &self.factions {
            if !seen.insert(spec.id) {
                return Err(Error::Validation(format!("faction {} listed twice", spec.id)));
            }
            spec.traits.validate(spec.id)?;
        }

        self.validate_terrain()?;
        self.validate_rules()
    }

    fn validate_terrain(&self) -> Result<()> {
        let t = &self.terrain;
        check_probability("special_terrain_fraction", t.special_terrain_fraction)?;
        check_probability("settlement_skip_probability", t.settlement_skip_probability)?;
        check_non_negative("water_share", t.water_share)?;
        check_non_negative("rock_share", t.rock_share)?;
        check_non_negative("vegetation_share", t.vegetation_share)?;
        if t.special_terrain_fraction > 0.0
            && t.water_share + t.rock_share + t.vegetation_share <= 0.0
        {
            return Err(Error::Validation(
                "special terrain requested but all terrain shares are zero".to_string(),
            ));
        }
        if t.blob_radius_min < 0 || t.blob_radius_max < t.blob_radius_min {
            return Err(Error::Validation(format!(
                "invalid blob radius range [{}, {}]",
                t.blob_radius_min, t.blob_radius_max
            )));
        }
        if t.settlement_radius < 0 {
            return Err(Error::Validation("settlement_radius must be non-negative".to_string()));
        }
        if t.settlement_retries == 0 {
            return Err(Error::Validation("settlement_retries must be at least 1".to_string()));
        }
        Ok(())
    }

    fn validate_rules(&self) -> Result<()> {
        let r = &self.rules;
        check_non_negative("base_expansion_rate", r.base_expansion_rate)?;
        check_non_negative("base_decay_rate", r.base_decay_rate)?;
        check_non_negative("base_spawn_rate", r.base_spawn_rate)?;
        check_non_negative("soldier_attack_base_probability", r.soldier_attack_base_probability)?;
        check_probability("water_passability", r.water_passability)?;
        check_probability("rock_passability", r.rock_passability)?;

        let m = &r.terrain_multipliers;
        check_non_negative("terrain_multipliers.ground", m.ground)?;
        check_non_negative("terrain_multipliers.water", m.water)?;
        check_non_negative("terrain_multipliers.rock", m.rock)?;
        check_non_negative("terrain_multipliers.vegetation", m.vegetation)?;

        if r.soldier_lifespan_min == 0 {
            return Err(Error::Validation("soldier_lifespan_min must be at least 1".to_string()));
        }
        if r.soldier_lifespan_max < r.soldier_lifespan_min {
            return Err(Error::Validation(format!(
                "invalid soldier lifespan range [{}, {}]",
                r.soldier_lifespan_min, r.soldier_lifespan_max
            )));
        }
        Ok(())
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )))
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let config = SimConfig::default();
        assert_eq!(config.width, 96);
        assert_eq!(config.height, 64);
        assert_eq!(config.factions.len(), 4);
        assert_eq!(config.rules.decay_interval_ticks, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = SimConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.factions, deserialized.factions);
        assert_eq!(config.rules.removal_policy, deserialized.rules.removal_policy);
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let config = SimConfig {
            width: 50_000,
            height: 50_000,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let tall = SimConfig {
            height: MAX_GRID_EDGE + 1,
            ..Default::default()
        };
        assert!(tall.validate().is_err());

        let largest = SimConfig {
            width: MAX_GRID_EDGE,
            height: MAX_GRID_EDGE,
            ..Default::default()
        };
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_runaway_mobility_rejected() {
        let mut config = SimConfig::default();
        config.factions[2].traits.mobility = 1e12;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mobility"));

        config.factions[2].traits.mobility = MAX_MOBILITY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{ "width": 40, "seed": 9, "rules": { "base_decay_rate": 0.05 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.height, 64);
        assert_eq!(config.seed, 9);
        assert_eq!(config.factions.len(), 4);
        assert_eq!(config.rules.base_decay_rate, 0.05);
        assert_eq!(config.rules.spawn_interval_ticks, 5);
        assert_eq!(config.terrain.pond_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_resilience_rejected() {
        let mut config = SimConfig::default();
        config.factions[1].traits.resilience = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("resilience"));
    }

    #[test]
    fn test_zero_mobility_and_nan_rejected() {
        let mut config = SimConfig::default();
        config.factions[0].traits.mobility = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.factions[0].traits.growth = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_growth_and_aggression_allowed() {
        let mut config = SimConfig::default();
        config.factions[0].traits.growth = 0.0;
        config.factions[0].traits.aggression = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_faction_rejected() {
        let mut config = SimConfig::default();
        config.factions[1].id = FactionId::A;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_structural_limits() {
        let mut config = SimConfig {
            width: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.width = 10;
        config.rules.soldier_lifespan_max = 10;
        config.rules.soldier_lifespan_min = 20;
        assert!(config.validate().is_err());

        let config = SimConfig {
            render_interval_ticks: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_decay_formulas() {
        let divide = DecayFormula::DivideByResilience;
        assert!((divide.probability(0.02, 2.0) - 0.01).abs() < 1e-12);
        // Denominator floor keeps the result finite
        assert_eq!(divide.probability(0.5, 0.0), 1.0);

        let fragility = DecayFormula::ScaleByFragility;
        assert!((fragility.probability(0.1, 0.5) - 0.05).abs() < 1e-12);
        assert_eq!(fragility.probability(0.1, 1.4), 0.0);
    }

    #[test]
    fn test_terrain_multipliers() {
        let m = TerrainMultipliers::default();
        assert_eq!(m.for_terrain(Terrain::Ground, 2.0), 1.0);
        assert!(m.for_terrain(Terrain::Vegetation, 1.0) > 1.0);
        assert!((m.for_terrain(Terrain::Water, 0.5) - 0.2).abs() < 1e-12);
        assert_eq!(m.for_terrain(Terrain::Border, 1.0), 0.0);
    }

    #[test]
    fn test_faction_table() {
        let config = SimConfig::default();
        let table = config.faction_table();
        assert_eq!(table.ids(), FactionId::all().to_vec());
        assert_eq!(table.get(FactionId::B).map(|t| t.aggression), Some(1.3));

        let single = [FactionSpec::new(FactionId::C, FactionTraits::balanced())];
        let table = FactionTable::from(&single[..]);
        assert!(table.contains(FactionId::C));
        assert!(!table.contains(FactionId::A));
    }
}
