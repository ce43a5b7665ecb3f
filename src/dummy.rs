//! Noisy sinusoidal baseline series for demos and tests.

use std::f64::consts::PI;

use ndarray::Array2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::generators::{fill_from, linspace, normal_distribution};
use crate::shape::Shape;
use crate::SynthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DummySeriesConfig {
    pub seq_len: usize,
    pub no_variates: usize,
    /// Exclusive upper bound for the integer per-variate frequency.
    pub max_freq: u32,
    pub noise_std: f64,
    /// Phase offset between successive variates.
    pub phase_shift: f64,
    /// Add a uniform jitter in `[-1, 1)` to every phase.
    pub random_phase: bool,
}

impl Default for DummySeriesConfig {
    fn default() -> Self {
        Self {
            seq_len: 1000,
            no_variates: 2,
            max_freq: 10,
            noise_std: 0.05,
            phase_shift: PI,
            random_phase: true,
        }
    }
}

impl DummySeriesConfig {
    pub fn shape(&self) -> Shape {
        Shape::new(self.seq_len, self.no_variates)
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if self.max_freq < 2 {
            return Err(SynthError::InvalidConfig(format!(
                "dummy max_freq must be at least 2, got {}",
                self.max_freq
            )));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "dummy noise_std must be finite and >= 0, got {}",
                self.noise_std
            )));
        }
        if !self.phase_shift.is_finite() {
            return Err(SynthError::InvalidConfig(format!(
                "dummy phase_shift must be finite, got {}",
                self.phase_shift
            )));
        }
        Ok(())
    }
}

/// `sin(freq_j * t + phase_j) + N(0, noise_std)` per variate, with `t` spanning
/// `[0, 10π]`, `freq_j` an integer in `[1, max_freq)` and
/// `phase_j = j * phase_shift` plus optional jitter.
pub fn dummy_series(
    config: &DummySeriesConfig,
    rng: &mut dyn RngCore,
) -> Result<Array2<f64>, SynthError> {
    config.validate()?;
    let shape = config.shape();
    let noise = normal_distribution("dummy series", 0.0, config.noise_std)?;

    let times = linspace(0.0, 10.0 * PI, shape.seq_len);
    let mut series = fill_from(shape, &noise, rng);

    for (j, mut column) in series.columns_mut().into_iter().enumerate() {
        let freq = f64::from(rng.gen_range(1..config.max_freq));
        let mut phase = j as f64 * config.phase_shift;
        if config.random_phase {
            phase += rng.gen_range(-1.0..1.0);
        }
        for (cell, &t) in column.iter_mut().zip(times.iter()) {
            *cell += (freq * t + phase).sin();
        }
    }

    Ok(series)
}
