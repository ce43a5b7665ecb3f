//! Coloured `1/f^alpha` noise.

use ndarray::Array2;
use rand::RngCore;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::{fill_from, invalid_parameters};
use crate::generator::{Generator, GeneratorSettings};
use crate::transform;
use crate::SynthError;

/// `1/f^alpha` noise shaped from white noise in the frequency domain.
///
/// `alpha = 1` gives pink noise, `alpha = 2` brown noise. Each variate is
/// normalized to unit standard deviation before scaling by `amplitude`; the
/// DC bin is removed so the output is zero-mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinkNoiseGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub alpha: f64,
    pub amplitude: f64,
}

impl Default for PinkNoiseGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            alpha: 1.0,
            amplitude: 1.0,
        }
    }
}

impl Generator for PinkNoiseGenerator {
    fn name(&self) -> &'static str {
        "pink_noise"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        if !self.alpha.is_finite() || !self.amplitude.is_finite() {
            return Err(invalid_parameters(
                "pink_noise",
                "alpha and amplitude must be finite",
            ));
        }

        let white = fill_from(shape, &StandardNormal, rng);
        let mut spectrum = transform::to_frequency(&white);

        let n = shape.seq_len;
        for (k, mut bin) in spectrum.rows_mut().into_iter().enumerate() {
            // |f_k| for the two-sided spectrum, in cycles per sample.
            let freq = k.min(n - k) as f64 / n as f64;
            let gain = if freq > 0.0 {
                freq.powf(-self.alpha / 2.0)
            } else {
                0.0
            };
            bin.mapv_inplace(|c| c * gain);
        }

        let mut noise = transform::to_time(spectrum);
        for mut column in noise.columns_mut() {
            let mean = column.sum() / n as f64;
            let variance = column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
            let std = variance.sqrt();
            if std > 0.0 {
                column.mapv_inplace(|v| v / std * self.amplitude);
            }
        }

        Ok(noise)
    }
}
