//! tsynth - composable multivariate time-series synthesis
//!
//! Components (noise, drift, anomalies, periodic signals) are generated
//! independently of the series they are blended into, then combined
//! additively or multiplicatively, in the time domain or on the discrete
//! Fourier transform of the series, optionally gated by a mask. An
//! [`Orchestrator`] applies a stochastic subset of such generators in
//! sequence.

pub mod combine;
pub mod config;
pub mod dummy;
pub mod generator;
pub mod generators;
pub mod mask;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod shape;
pub mod transform;

use thiserror::Error;

// Re-export main types
pub use combine::CombineMode;
pub use config::{Baseline, EntryConfig, PipelineConfig};
pub use dummy::{dummy_series, DummySeriesConfig};
pub use generator::{Generator, GeneratorSettings};
pub use generators::GeneratorKind;
pub use mask::{ClusteredMask, IndependentMask, Mask, MaskGenerator, MaskKind, SigmoidMask};
pub use orchestrator::{EntryReport, Maybe, Orchestrator, OrchestratorOptions, Outcome, RunReport};
pub use pipeline::{seeded_rng, Pipeline};
pub use shape::Shape;
pub use transform::Domain;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(
        "shape mismatch: series {series}, component {component}, mask {}",
        describe_mask(.mask)
    )]
    ShapeMismatch {
        series: Shape,
        component: Shape,
        mask: Option<Shape>,
    },
    #[error("cannot sample {requested} distinct positions from {available} cells")]
    Exhausted { requested: usize, available: usize },
}

fn describe_mask(mask: &Option<Shape>) -> String {
    match mask {
        Some(shape) => shape.to_string(),
        None => "none".to_string(),
    }
}
