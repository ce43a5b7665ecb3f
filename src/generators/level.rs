//! Constant offsets and gains.

use ndarray::Array2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::generator::{Generator, GeneratorSettings};
use crate::SynthError;

/// Constant-valued component: a fixed offset (add) or gain (mul).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub value: f64,
}

impl LevelGenerator {
    pub fn new(settings: GeneratorSettings, value: f64) -> Self {
        Self { settings, value }
    }
}

impl Generator for LevelGenerator {
    fn name(&self) -> &'static str {
        "level"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, _rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        Ok(Array2::from_elem(self.shape()?.dim(), self.value))
    }
}
