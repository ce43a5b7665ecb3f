//! Distribution samplers: every cell is an independent draw.

use ndarray::Array2;
use rand::distributions::Open01;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp, Gamma, Poisson};
use serde::{Deserialize, Serialize};

use super::{fill_from, invalid_parameters, normal_distribution};
use crate::generator::{Generator, GeneratorSettings};
use crate::SynthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub mean: f64,
    pub std: f64,
}

impl Default for NormalGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            mean: 0.0,
            std: 0.1,
        }
    }
}

impl NormalGenerator {
    pub fn new(settings: GeneratorSettings, mean: f64, std: f64) -> Self {
        Self {
            settings,
            mean,
            std,
        }
    }
}

impl Generator for NormalGenerator {
    fn name(&self) -> &'static str {
        "normal"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        let distribution = normal_distribution("normal", self.mean, self.std)?;
        Ok(fill_from(shape, &distribution, rng))
    }
}

/// Laplace (double exponential) distribution, sampled by inverting its CDF.
#[derive(Debug, Clone, Copy)]
struct Laplace {
    loc: f64,
    scale: f64,
}

impl Distribution<f64> for Laplace {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.sample::<f64, _>(Open01) - 0.5;
        self.loc - self.scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaplaceGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    pub loc: f64,
    pub scale: f64,
}

impl Default for LaplaceGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            loc: 0.0,
            scale: 1.0,
        }
    }
}

impl Generator for LaplaceGenerator {
    fn name(&self) -> &'static str {
        "laplace"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        if !self.loc.is_finite() || !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(invalid_parameters(
                "laplace",
                "loc must be finite and scale finite and > 0",
            ));
        }
        let distribution = Laplace {
            loc: self.loc,
            scale: self.scale,
        };
        Ok(fill_from(shape, &distribution, rng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentialGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    /// Mean of the distribution (1 / rate).
    pub scale: f64,
}

impl Default for ExponentialGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            scale: 1.0,
        }
    }
}

impl Generator for ExponentialGenerator {
    fn name(&self) -> &'static str {
        "exponential"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(invalid_parameters(
                "exponential",
                format!("scale must be finite and > 0, got {}", self.scale),
            ));
        }
        let distribution =
            Exp::new(1.0 / self.scale).map_err(|err| invalid_parameters("exponential", err))?;
        Ok(fill_from(shape, &distribution, rng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    /// Shape parameter `k`.
    pub shape_param: f64,
    /// Scale parameter `theta`.
    pub scale: f64,
}

impl Default for GammaGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            shape_param: 2.0,
            scale: 1.0,
        }
    }
}

impl Generator for GammaGenerator {
    fn name(&self) -> &'static str {
        "gamma"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        let distribution = Gamma::new(self.shape_param, self.scale)
            .map_err(|err| invalid_parameters("gamma", err))?;
        Ok(fill_from(shape, &distribution, rng))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonGenerator {
    #[serde(skip)]
    pub settings: GeneratorSettings,
    /// Expected number of events per cell.
    pub lam: f64,
}

impl Default for PoissonGenerator {
    fn default() -> Self {
        Self {
            settings: GeneratorSettings::default(),
            lam: 1.0,
        }
    }
}

impl Generator for PoissonGenerator {
    fn name(&self) -> &'static str {
        "poisson"
    }

    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape()?;
        let distribution: Poisson<f64> =
            Poisson::new(self.lam).map_err(|err| invalid_parameters("poisson", err))?;
        Ok(fill_from(shape, &distribution, rng))
    }
}
