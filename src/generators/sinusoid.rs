//! Periodic components.

use std::f64::consts::TAU;

use ndarray::Array2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{invalid_parameters, linspace};
use crate::generator::{Generator, GeneratorSettings};
use crate::SynthError;

/// `amplitude * sin(frequency * t + phase)` over `t` in `[0, 2π]`, the same
/// for every variate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinusoidGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
}

impl Default for SinusoidGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            frequency: 1.0,
            amplitude: 1.0,
            phase: 0.0,
        }
    }
}

impl Generator for SinusoidGenerator {
    fn name(&self) -> &'static str {
        "sinusoid"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, _rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        if !(self.frequency.is_finite() && self.amplitude.is_finite() && self.phase.is_finite()) {
            return Err(invalid_parameters(
                "sinusoid",
                "frequency, amplitude and phase must be finite",
            ));
        }

        let times = linspace(0.0, TAU, shape.seq_len);
        Ok(Array2::from_shape_fn(shape.dim(), |(i, _)| {
            self.amplitude * (self.frequency * times[i] + self.phase).sin()
        }))
    }
}
