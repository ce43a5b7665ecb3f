//! The component generator contract.

use ndarray::Array2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::combine::CombineMode;
use crate::mask::Mask;
use crate::shape::Shape;
use crate::transform::{self, Domain};
use crate::SynthError;

/// Shape, domain and combine mode common to every generator.
///
/// All three are optional at construction so a generator can be declared
/// before its target is known; using a generator with a missing setting is a
/// configuration error rather than a silent default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub shape: Option<Shape>,
    pub domain: Option<Domain>,
    pub combine_mode: Option<CombineMode>,
}

impl GeneratorSettings {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape: Some(shape),
            ..Self::default()
        }
    }

    /// Settings sized after an existing series. Only the shape is taken.
    pub fn like(series: &Array2<f64>) -> Self {
        Self::new(Shape::of(series))
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_combine_mode(mut self, mode: CombineMode) -> Self {
        self.combine_mode = Some(mode);
        self
    }

    /// Time domain, additive.
    pub fn additive(shape: Shape) -> Self {
        Self::new(shape)
            .with_domain(Domain::Time)
            .with_combine_mode(CombineMode::Add)
    }

    /// Time domain, multiplicative.
    pub fn multiplicative(shape: Shape) -> Self {
        Self::new(shape)
            .with_domain(Domain::Time)
            .with_combine_mode(CombineMode::Mul)
    }

    pub fn shape(&self) -> Result<Shape, SynthError> {
        self.shape.ok_or_else(|| {
            SynthError::InvalidConfig(
                "generator shape was never supplied (pass a shape or a reference series)"
                    .to_string(),
            )
        })
    }

    pub fn domain(&self) -> Result<Domain, SynthError> {
        self.domain.ok_or_else(|| {
            SynthError::InvalidConfig("generator domain must be `time` or `frequency`".to_string())
        })
    }

    pub fn combine_mode(&self) -> Result<CombineMode, SynthError> {
        self.combine_mode.ok_or_else(|| {
            SynthError::InvalidConfig("generator combine mode must be `add` or `mul`".to_string())
        })
    }

    /// Neutral array for the configured combine mode.
    pub fn baseline(&self) -> Result<Array2<f64>, SynthError> {
        Ok(self.combine_mode()?.baseline(self.shape()?))
    }
}

/// Produces a component of a fixed shape, independently of any series.
///
/// Configuration lives in the implementing struct; `generate` takes nothing
/// but the random source and must return a fresh array of exactly
/// [`Generator::shape`].
pub trait Generator {
    fn name(&self) -> &'static str;

    fn settings(&self) -> &GeneratorSettings;

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Array2<f64>, SynthError>;

    fn shape(&self) -> Result<Shape, SynthError> {
        self.settings().shape()
    }

    fn domain(&self) -> Result<Domain, SynthError> {
        self.settings().domain()
    }

    fn combine_mode(&self) -> Result<CombineMode, SynthError> {
        self.settings().combine_mode()
    }

    /// Generate a component and blend it into `series` in this generator's
    /// domain. See [`transform::apply`].
    fn apply(
        &self,
        series: &Array2<f64>,
        mask: Option<&Mask>,
        rng: &mut dyn RngCore,
    ) -> Result<Array2<f64>, SynthError> {
        transform::apply(self, series, mask, rng)
    }
}
