//! Masks gate where a component is blended into a series.
//!
//! Three strategies are available: independent per-cell coin flips, clustered
//! runs of consecutive active time steps, and smooth double-sigmoid windows.
//! The first two produce hard (boolean) masks, the last a soft mask with
//! weights in `[0, 1]`.

use std::ops::Range;

use ndarray::{s, Array2};
use rand::seq::index;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::generators::normal_distribution;
use crate::shape::Shape;
use crate::SynthError;

#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    Hard(Array2<bool>),
    Soft(Array2<f64>),
}

impl Mask {
    pub fn shape(&self) -> Shape {
        match self {
            Mask::Hard(gate) => Shape::of(gate),
            Mask::Soft(weights) => Shape::of(weights),
        }
    }

    /// Hard mask that is on for `rows` in every variate.
    pub fn window(shape: Shape, rows: Range<usize>) -> Self {
        Mask::Hard(Array2::from_shape_fn(shape.dim(), |(i, _)| {
            rows.contains(&i)
        }))
    }

    pub fn to_weights(&self) -> Array2<f64> {
        match self {
            Mask::Hard(gate) => gate.mapv(|on| if on { 1.0 } else { 0.0 }),
            Mask::Soft(weights) => weights.clone(),
        }
    }

    /// Mean blend weight over all cells.
    pub fn coverage(&self) -> f64 {
        let shape = self.shape();
        if shape.is_empty() {
            return 0.0;
        }
        self.to_weights().sum() / shape.cells() as f64
    }
}

/// Generator whose output gates another component rather than being one.
pub trait MaskGenerator {
    fn name(&self) -> &'static str;

    fn shape(&self) -> Result<Shape, SynthError>;

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Mask, SynthError>;
}

fn require_shape(shape: Option<Shape>) -> Result<Shape, SynthError> {
    shape.ok_or_else(|| SynthError::InvalidConfig("mask shape was never supplied".to_string()))
}

fn check_probability(name: &str, value: f64) -> Result<(), SynthError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        return Ok(());
    }
    Err(SynthError::InvalidConfig(format!(
        "{name} must be in [0, 1], got {value}"
    )))
}

fn active_variates(no_variates: usize, probability: f64, rng: &mut dyn RngCore) -> Vec<bool> {
    let draws: Vec<f64> = (0..no_variates).map(|_| rng.gen::<f64>()).collect();
    draws.into_iter().map(|draw| draw < probability).collect()
}

/// Per-variate coin at `inter_variates_probability`, then per-time-step coins
/// at `intra_variates_probability` for the active variates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndependentMask {
    #[serde(skip)]
    pub shape: Option<Shape>,
    pub inter_variates_probability: f64,
    pub intra_variates_probability: f64,
}

impl Default for IndependentMask {
    fn default() -> Self {
        Self {
            shape: None,
            inter_variates_probability: 0.5,
            intra_variates_probability: 0.5,
        }
    }
}

impl IndependentMask {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape: Some(shape),
            ..Self::default()
        }
    }
}

impl MaskGenerator for IndependentMask {
    fn name(&self) -> &'static str {
        "independent_mask"
    }

    fn shape(&self) -> Result<Shape, SynthError> {
        require_shape(self.shape)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Mask, SynthError> {
        let shape = self.shape()?;
        check_probability("inter_variates_probability", self.inter_variates_probability)?;
        check_probability("intra_variates_probability", self.intra_variates_probability)?;

        let mut gate = Array2::from_elem(shape.dim(), false);
        let active = active_variates(shape.no_variates, self.inter_variates_probability, rng);

        for j in (0..shape.no_variates).filter(|&j| active[j]) {
            for i in 0..shape.seq_len {
                gate[[i, j]] = rng.gen::<f64>() < self.intra_variates_probability;
            }
        }

        Ok(Mask::Hard(gate))
    }
}

/// Contiguous runs of active time steps ("anomaly windows").
///
/// Each active variate receives `floor(seq_len * intra_variates_probability)`
/// active cells. Walking the time axis, a run starts at the current position
/// with probability `remaining_quota / remaining_length`; run lengths are
/// drawn from `N(cluster_size, cluster_variance)`, floored at one and capped
/// by both the remaining quota and the remaining length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteredMask {
    #[serde(skip)]
    pub shape: Option<Shape>,
    pub inter_variates_probability: f64,
    pub intra_variates_probability: f64,
    pub cluster_size: f64,
    pub cluster_variance: f64,
}

impl Default for ClusteredMask {
    fn default() -> Self {
        Self {
            shape: None,
            inter_variates_probability: 0.5,
            intra_variates_probability: 0.5,
            cluster_size: 50.0,
            cluster_variance: 10.0,
        }
    }
}

impl ClusteredMask {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape: Some(shape),
            ..Self::default()
        }
    }

    fn fill_clusters(
        &self,
        gate: &mut Array2<bool>,
        variate: usize,
        quota: usize,
        lengths: &Normal<f64>,
        rng: &mut dyn RngCore,
    ) {
        let seq_len = gate.nrows();
        let mut i = 0;
        let mut remaining = quota;

        while remaining > 0 && i < seq_len {
            let start_probability = remaining as f64 / (seq_len - i) as f64;
            if rng.gen::<f64>() < start_probability {
                let drawn: f64 = lengths.sample(rng);
                let run = (drawn as i64).max(1) as usize;
                let run = run.min(remaining).min(seq_len - i);

                gate.slice_mut(s![i..i + run, variate]).fill(true);
                remaining -= run;
                i += run;
            } else {
                i += 1;
            }
        }
    }
}

impl MaskGenerator for ClusteredMask {
    fn name(&self) -> &'static str {
        "clustered_mask"
    }

    fn shape(&self) -> Result<Shape, SynthError> {
        require_shape(self.shape)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Mask, SynthError> {
        let shape = self.shape()?;
        check_probability("inter_variates_probability", self.inter_variates_probability)?;
        check_probability("intra_variates_probability", self.intra_variates_probability)?;
        let lengths =
            normal_distribution("cluster length", self.cluster_size, self.cluster_variance)?;

        let mut gate = Array2::from_elem(shape.dim(), false);
        let active = active_variates(shape.no_variates, self.inter_variates_probability, rng);
        let quota = (shape.seq_len as f64 * self.intra_variates_probability) as usize;

        for j in (0..shape.no_variates).filter(|&j| active[j]) {
            if self.cluster_size <= 1.0 {
                // No clustering: scatter the quota over distinct time steps.
                for i in index::sample(rng, shape.seq_len, quota) {
                    gate[[i, j]] = true;
                }
            } else {
                self.fill_clusters(&mut gate, j, quota, &lengths, rng);
            }
        }

        Ok(Mask::Hard(gate))
    }
}

/// Smooth windows built from differences of logistic sigmoids.
///
/// Every variate gets `num_peaks` windows of width `N(peak_length,
/// length_variance)` at uniformly random centres; overlapping windows are
/// summed and the result clipped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmoidMask {
    #[serde(skip)]
    pub shape: Option<Shape>,
    pub num_peaks: usize,
    pub peak_length: f64,
    pub length_variance: f64,
    pub steepness: f64,
}

impl Default for SigmoidMask {
    fn default() -> Self {
        Self {
            shape: None,
            num_peaks: 3,
            peak_length: 50.0,
            length_variance: 10.0,
            steepness: 0.1,
        }
    }
}

impl SigmoidMask {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape: Some(shape),
            ..Self::default()
        }
    }
}

fn double_sigmoid(x: f64, a: f64, b: f64, k: f64) -> f64 {
    let rise = 1.0 / (1.0 + (-k * (x - a)).exp());
    let fall = 1.0 / (1.0 + (-k * (x - b)).exp());
    rise - fall
}

impl MaskGenerator for SigmoidMask {
    fn name(&self) -> &'static str {
        "sigmoid_mask"
    }

    fn shape(&self) -> Result<Shape, SynthError> {
        require_shape(self.shape)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Result<Mask, SynthError> {
        let shape = self.shape()?;
        if !(self.steepness.is_finite() && self.steepness > 0.0) {
            return Err(SynthError::InvalidConfig(format!(
                "steepness must be finite and > 0, got {}",
                self.steepness
            )));
        }
        let lengths = normal_distribution("peak length", self.peak_length, self.length_variance)?;

        let seq_len = shape.seq_len as f64;
        let mut weights = Array2::<f64>::zeros(shape.dim());

        for j in 0..shape.no_variates {
            let mut column = vec![0.0; shape.seq_len];

            for _ in 0..self.num_peaks {
                let length = lengths.sample(rng).max(0.0);
                let half = length / 2.0;
                let center = if seq_len - half > half {
                    rng.gen_range(half..seq_len - half)
                } else {
                    seq_len / 2.0
                };

                for (x, value) in column.iter_mut().enumerate() {
                    *value += double_sigmoid(x as f64, center - half, center + half, self.steepness);
                }
            }

            for (cell, value) in weights.column_mut(j).iter_mut().zip(column) {
                *cell = value.clamp(0.0, 1.0);
            }
        }

        Ok(Mask::Soft(weights))
    }
}

/// Serializable selection of a mask strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaskKind {
    Independent(IndependentMask),
    Clustered(ClusteredMask),
    Sigmoid(SigmoidMask),
}

impl MaskKind {
    pub fn mask_type(&self) -> &'static str {
        match self {
            MaskKind::Independent(_) => "independent",
            MaskKind::Clustered(_) => "clustered",
            MaskKind::Sigmoid(_) => "sigmoid",
        }
    }

    pub fn into_mask(self, shape: Shape) -> Box<dyn MaskGenerator> {
        match self {
            MaskKind::Independent(mask) => Box::new(IndependentMask {
                shape: Some(shape),
                ..mask
            }),
            MaskKind::Clustered(mask) => Box::new(ClusteredMask {
                shape: Some(shape),
                ..mask
            }),
            MaskKind::Sigmoid(mask) => Box::new(SigmoidMask {
                shape: Some(shape),
                ..mask
            }),
        }
    }
}
