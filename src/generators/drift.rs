//! Slow deterministic trends.

use ndarray::Array2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::{invalid_parameters, linspace};
use crate::generator::{Generator, GeneratorSettings};
use crate::SynthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftType {
    Linear,
    Exponential,
    Polynomial,
}

/// Slow trend over normalized time `t` in `[0, 1]`, with a random sign per
/// variate.
///
/// - linear: `rate * t`
/// - exponential: `exp(rate * t) - 1`
/// - polynomial: `rate * t^degree`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub drift_type: DriftType,
    pub drift_rate: f64,
    pub polynomial_degree: i32,
    /// Draw a fresh rate per variate from `drift_rate_range`.
    pub random_drift: bool,
    pub drift_rate_range: (f64, f64),
}

impl Default for DriftGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            drift_type: DriftType::Linear,
            drift_rate: 0.01,
            polynomial_degree: 2,
            random_drift: false,
            drift_rate_range: (0.005, 0.02),
        }
    }
}

impl DriftGenerator {
    fn rate(&self, rng: &mut dyn RngCore) -> f64 {
        if !self.random_drift {
            return self.drift_rate;
        }
        let (low, high) = self.drift_rate_range;
        if low < high {
            rng.gen_range(low..high)
        } else {
            low
        }
    }

    fn curve(&self, rate: f64, t: f64) -> f64 {
        match self.drift_type {
            DriftType::Linear => rate * t,
            DriftType::Exponential => (rate * t).exp() - 1.0,
            DriftType::Polynomial => rate * t.powi(self.polynomial_degree),
        }
    }
}

impl Generator for DriftGenerator {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        let (low, high) = self.drift_rate_range;
        if !self.drift_rate.is_finite() || !low.is_finite() || !high.is_finite() || low > high {
            return Err(invalid_parameters(
                "drift",
                "drift_rate must be finite and drift_rate_range an ordered finite pair",
            ));
        }

        let times = linspace(0.0, 1.0, shape.seq_len);
        let mut component = Array2::<f64>::zeros(shape.dim());

        for j in 0..shape.no_variates {
            let rate = self.rate(rng);
            let sign = if rng.gen::<f64>() < 0.5 { -1.0 } else { 1.0 };
            for (cell, &t) in component.column_mut(j).iter_mut().zip(times.iter()) {
                *cell = sign * self.curve(rate, t);
            }
        }

        Ok(component)
    }
}
