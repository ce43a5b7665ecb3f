//! Sparse anomaly components laid over the neutral baseline.

use ndarray::{s, Array2};
use rand::{Rng, RngCore};
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use super::{normal_distribution, sample_cells};
use crate::generator::{Generator, GeneratorSettings};
use crate::SynthError;

/// Flat bursts of a constant value.
///
/// `floor(fraction * seq_len * no_variates)` distinct start cells are drawn;
/// from each, `max(1, N(length, length_variance))` consecutive time steps of
/// that variate are set to `value` (a fresh uniform draw in `[0, 1)` per burst
/// when `value` is `None`). Bursts are clipped at the end of the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantBurstGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub fraction: f64,
    pub value: Option<f64>,
    pub length: f64,
    pub length_variance: f64,
    /// Force single-step bursts.
    pub points: bool,
}

impl Default for ConstantBurstGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            fraction: 0.01,
            value: Some(1.0),
            length: 3.0,
            length_variance: 1.0,
            points: false,
        }
    }
}

impl Generator for ConstantBurstGenerator {
    fn name(&self) -> &'static str {
        "constant_burst"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        let lengths = normal_distribution("constant_burst", self.length, self.length_variance)?;

        let mut component = self.settings.baseline()?;
        for (i, j) in sample_cells(shape, self.fraction, rng)? {
            let run = if self.points {
                1
            } else {
                let drawn: f64 = lengths.sample(rng);
                (drawn as i64).max(1) as usize
            };
            let value = match self.value {
                Some(value) => value,
                None => rng.gen::<f64>(),
            };

            let end = (i + run).min(shape.seq_len);
            component.slice_mut(s![i..end, j]).fill(value);
        }

        Ok(component)
    }
}

/// Isolated spikes of `±magnitude` (fair sign) at distinct cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointAnomalyGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub fraction: f64,
    pub magnitude: f64,
}

impl Default for PointAnomalyGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            fraction: 0.01,
            magnitude: 0.5,
        }
    }
}

impl Generator for PointAnomalyGenerator {
    fn name(&self) -> &'static str {
        "point_anomaly"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        let mut component = self.settings.baseline()?;

        for (i, j) in sample_cells(shape, self.fraction, rng)? {
            let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            component[[i, j]] += sign * self.magnitude;
        }

        Ok(component)
    }
}
