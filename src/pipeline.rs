//! Seeded end-to-end synthesis.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::combine::CombineMode;
use crate::orchestrator::{Maybe, Orchestrator, OrchestratorOptions, RunReport};
use crate::shape::Shape;
use crate::SynthError;

/// The random source every seeded entry point uses.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// An orchestrator bundled with the random source that planned it.
///
/// Two pipelines built from the same seed and the same entries produce the
/// same sequence of runs.
#[derive(Debug)]
pub struct Pipeline {
    seed: u64,
    rng: StdRng,
    orchestrator: Orchestrator,
}

impl Pipeline {
    pub fn seeded(
        seed: u64,
        entries: Vec<Maybe>,
        options: OrchestratorOptions,
    ) -> Result<Self, SynthError> {
        let mut rng = seeded_rng(seed);
        let requested = entries.len();
        let orchestrator = Orchestrator::new(entries, options, &mut rng)?;

        info!(
            seed,
            requested,
            planned = orchestrator.len(),
            shuffle = options.shuffle,
            max_generators = ?options.max_generators,
            "pipeline planned"
        );

        Ok(Self {
            seed,
            rng,
            orchestrator,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn run(&mut self, series: &Array2<f64>) -> Result<RunReport, SynthError> {
        let report = self.orchestrator.run(series, &mut self.rng)?;
        info!(
            seed = self.seed,
            applied = report.applied(),
            skipped = report.skipped(),
            "pipeline run finished"
        );
        Ok(report)
    }

    /// Run over the neutral series of `mode`: zeros for add, ones for mul.
    pub fn run_from_baseline(
        &mut self,
        shape: Shape,
        mode: CombineMode,
    ) -> Result<RunReport, SynthError> {
        self.run(&mode.baseline(shape))
    }
}
