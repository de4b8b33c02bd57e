//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use rand::rngs::StdRng;

use crate::application::services::{LineageService, SimulationService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::RandomGenerator;
use crate::infrastructure::traits::{FastaReader, FileSystem, RealFileSystem, SequenceReader};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Root sequence source for lineage documents
    pub reader: Arc<dyn SequenceReader>,

    pub lineage: LineageService,
    pub simulation: SimulationService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let reader = Arc::new(FastaReader::new(fs.clone()));
        Self::with_deps(settings, fs, reader)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        reader: Arc<dyn SequenceReader>,
    ) -> Self {
        let settings = Arc::new(settings);
        let lineage = LineageService::new(fs.clone(), reader.clone());
        let simulation = SimulationService::new(settings.deletion_mode);

        Self {
            settings,
            fs,
            reader,
            lineage,
            simulation,
        }
    }

    /// Random generator from the configured alphabet and weights.
    ///
    /// `seed` wins over the configured seed; without either the generator
    /// is seeded from OS entropy.
    pub fn generator(&self, seed: Option<u64>) -> ApplicationResult<RandomGenerator<StdRng>> {
        let config = self.settings.generator_config();
        let generator = match seed.or(self.settings.simulation.seed) {
            Some(seed) => RandomGenerator::seeded(seed, config)?,
            None => RandomGenerator::from_entropy(config)?,
        };
        Ok(generator)
    }
}
