//! Leaf component generators.
//!
//! Each generator fills an array of its configured shape, either from a
//! distribution or from a deterministic curve. None of them reads the series
//! it is later combined with.

use std::fmt::Display;

use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::generator::{Generator, GeneratorSettings};
use crate::shape::Shape;
use crate::SynthError;

pub mod anomalies;
pub mod drift;
pub mod level;
pub mod noise;
pub mod pink;
pub mod sinusoid;

pub use anomalies::{ConstantBurstGenerator, PointAnomalyGenerator};
pub use drift::{DriftGenerator, DriftType};
pub use level::LevelGenerator;
pub use noise::{
    ExponentialGenerator, GammaGenerator, LaplaceGenerator, NormalGenerator, PoissonGenerator,
};
pub use pink::PinkNoiseGenerator;
pub use sinusoid::SinusoidGenerator;

/// Serializable selection of a leaf generator and its parameters.
///
/// Generator settings are not part of the serialized form; they are attached
/// by [`GeneratorKind::into_generator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorKind {
    Normal(NormalGenerator),
    Laplace(LaplaceGenerator),
    Exponential(ExponentialGenerator),
    Gamma(GammaGenerator),
    Poisson(PoissonGenerator),
    PinkNoise(PinkNoiseGenerator),
    Drift(DriftGenerator),
    Sinusoid(SinusoidGenerator),
    ConstantBurst(ConstantBurstGenerator),
    PointAnomaly(PointAnomalyGenerator),
    Level(LevelGenerator),
}

impl GeneratorKind {
    pub fn generator_type(&self) -> &'static str {
        match self {
            GeneratorKind::Normal(_) => "normal",
            GeneratorKind::Laplace(_) => "laplace",
            GeneratorKind::Exponential(_) => "exponential",
            GeneratorKind::Gamma(_) => "gamma",
            GeneratorKind::Poisson(_) => "poisson",
            GeneratorKind::PinkNoise(_) => "pink_noise",
            GeneratorKind::Drift(_) => "drift",
            GeneratorKind::Sinusoid(_) => "sinusoid",
            GeneratorKind::ConstantBurst(_) => "constant_burst",
            GeneratorKind::PointAnomaly(_) => "point_anomaly",
            GeneratorKind::Level(_) => "level",
        }
    }

    pub fn into_generator(self, settings: GeneratorSettings) -> Box<dyn Generator> {
        match self {
            GeneratorKind::Normal(g) => Box::new(NormalGenerator { settings, ..g }),
            GeneratorKind::Laplace(g) => Box::new(LaplaceGenerator { settings, ..g }),
            GeneratorKind::Exponential(g) => Box::new(ExponentialGenerator { settings, ..g }),
            GeneratorKind::Gamma(g) => Box::new(GammaGenerator { settings, ..g }),
            GeneratorKind::Poisson(g) => Box::new(PoissonGenerator { settings, ..g }),
            GeneratorKind::PinkNoise(g) => Box::new(PinkNoiseGenerator { settings, ..g }),
            GeneratorKind::Drift(g) => Box::new(DriftGenerator { settings, ..g }),
            GeneratorKind::Sinusoid(g) => Box::new(SinusoidGenerator { settings, ..g }),
            GeneratorKind::ConstantBurst(g) => Box::new(ConstantBurstGenerator { settings, ..g }),
            GeneratorKind::PointAnomaly(g) => Box::new(PointAnomalyGenerator { settings, ..g }),
            GeneratorKind::Level(g) => Box::new(LevelGenerator { settings, ..g }),
        }
    }
}

pub(crate) fn invalid_parameters(generator: &str, err: impl Display) -> SynthError {
    SynthError::InvalidConfig(format!("invalid {generator} parameters: {err}"))
}

/// `N(mean, std)` with a finite mean and a finite, non-negative spread.
pub(crate) fn normal_distribution(
    label: &str,
    mean: f64,
    std: f64,
) -> Result<Normal<f64>, SynthError> {
    if !(mean.is_finite() && std.is_finite() && std >= 0.0) {
        return Err(invalid_parameters(
            label,
            format!("mean must be finite and spread finite and >= 0, got N({mean}, {std})"),
        ));
    }
    Normal::new(mean, std).map_err(|err| invalid_parameters(label, err))
}

/// Fill an array of `shape` with independent draws from `distribution`.
pub(crate) fn fill_from<D>(shape: Shape, distribution: &D, rng: &mut dyn RngCore) -> Array2<f64>
where
    D: Distribution<f64>,
{
    Array2::from_shape_simple_fn(shape.dim(), || distribution.sample(rng))
}

/// `n` evenly spaced points over `[start, end]`, inclusive.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    if n <= 1 {
        return Array1::from_elem(n, start);
    }
    let step = (end - start) / (n - 1) as f64;
    Array1::from_shape_fn(n, |i| start + step * i as f64)
}

/// Pick `floor(fraction * cells)` distinct cells, returned as `(time, variate)`.
pub(crate) fn sample_cells(
    shape: Shape,
    fraction: f64,
    rng: &mut dyn RngCore,
) -> Result<Vec<(usize, usize)>, SynthError> {
    if !(fraction.is_finite() && fraction >= 0.0) {
        return Err(SynthError::InvalidConfig(format!(
            "fraction must be finite and >= 0, got {fraction}"
        )));
    }

    let available = shape.cells();
    let requested = (fraction * available as f64) as usize;
    if requested > available {
        return Err(SynthError::Exhausted {
            requested,
            available,
        });
    }

    Ok(index::sample(rng, available, requested)
        .into_iter()
        .map(|idx| (idx / shape.no_variates, idx % shape.no_variates))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::seeded_rng;

    #[test]
    fn kind_deserializes_and_builds_boxed_generator() {
        let kind: GeneratorKind =
            serde_json::from_str(r#"{"type": "normal", "std": 0.5}"#).unwrap();
        assert_eq!(kind.generator_type(), "normal");

        let shape = Shape::new(64, 2);
        let generator = kind.into_generator(GeneratorSettings::additive(shape));
        assert_eq!(generator.name(), "normal");

        let mut rng = seeded_rng(3);
        let component = generator.generate(&mut rng).unwrap();
        assert_eq!(Shape::of(&component), shape);
    }

    #[test]
    fn every_kind_honours_its_shape() {
        let kinds = vec![
            GeneratorKind::Normal(NormalGenerator::default()),
            GeneratorKind::Laplace(LaplaceGenerator::default()),
            GeneratorKind::Exponential(ExponentialGenerator::default()),
            GeneratorKind::Gamma(GammaGenerator::default()),
            GeneratorKind::Poisson(PoissonGenerator::default()),
            GeneratorKind::PinkNoise(PinkNoiseGenerator::default()),
            GeneratorKind::Drift(DriftGenerator::default()),
            GeneratorKind::Sinusoid(SinusoidGenerator::default()),
            GeneratorKind::ConstantBurst(ConstantBurstGenerator::default()),
            GeneratorKind::PointAnomaly(PointAnomalyGenerator::default()),
            GeneratorKind::Level(LevelGenerator::default()),
        ];
        let shape = Shape::new(128, 3);
        let mut rng = seeded_rng(17);

        for kind in kinds {
            let label = kind.generator_type();
            let generator = kind.into_generator(GeneratorSettings::additive(shape));
            let component = generator.generate(&mut rng).unwrap();
            assert_eq!(Shape::of(&component), shape, "{label}");
            assert!(component.iter().all(|v| v.is_finite()), "{label}");
        }
    }

    #[test]
    fn unshaped_generator_is_a_configuration_error() {
        let generator = NormalGenerator::default();
        let mut rng = seeded_rng(0);
        assert!(matches!(
            generator.generate(&mut rng),
            Err(SynthError::InvalidConfig(_))
        ));
    }

    #[test]
    fn sample_cells_guards_against_over_requesting() {
        let mut rng = seeded_rng(0);
        let err = sample_cells(Shape::new(10, 2), 1.5, &mut rng).unwrap_err();
        match err {
            SynthError::Exhausted {
                requested,
                available,
            } => {
                assert_eq!(requested, 30);
                assert_eq!(available, 20);
            }
            other => panic!("unexpected error: {other}"),
        }

        let cells = sample_cells(Shape::new(10, 2), 1.0, &mut rng).unwrap();
        assert_eq!(cells.len(), 20);
    }

    #[test]
    fn normal_distribution_rejects_negative_or_infinite_spread() {
        assert!(normal_distribution("test", 0.0, 0.0).is_ok());
        for (mean, std) in [(0.0, -1.0), (0.0, f64::INFINITY), (f64::NAN, 1.0)] {
            assert!(matches!(
                normal_distribution("test", mean, std),
                Err(SynthError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn linspace_includes_both_ends() {
        let points = linspace(0.0, 1.0, 5);
        assert_eq!(points.len(), 5);
        assert!((points[4] - 1.0).abs() < 1e-12);
        assert!((points[1] - 0.25).abs() < 1e-12);
        assert_eq!(linspace(2.0, 3.0, 1)[0], 2.0);
    }
}
