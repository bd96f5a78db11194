//! World simulation engine.
//!
//! This module implements the bordered 2D grid where factions expand, decay
//! and send soldiers against each other's territory.

pub mod grid;
pub mod present;
pub mod render;
pub mod rules;
pub mod settlement;
pub mod simulation;
pub mod snapshot;
pub mod soldier;
pub mod terrain;
pub mod world;

pub use grid::Grid;
pub use present::{NullPresenter, Presenter, TerminalPresenter};
pub use render::{render, Frame, Glyph, Tint};
pub use simulation::{Simulation, SimulationResult, TickReport};
pub use snapshot::WorldSnapshot;
pub use soldier::Soldier;
pub use world::World;
