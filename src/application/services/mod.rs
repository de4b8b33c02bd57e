//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, SequenceReader)
//! but are themselves concrete structs, not traits.

mod lineage;
mod simulation;

pub use lineage::{LineageService, NodeStats};
pub use simulation::{SimulationParams, SimulationService};
