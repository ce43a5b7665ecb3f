//! Additive and multiplicative blending of a component into a series.
//!
//! Each mode has a neutral value (zero for add, one for mul). Wherever a mask
//! is off, the component is replaced by that neutral value, so the cell keeps
//! its pre-combine value in either mode. Soft masks interpolate linearly
//! between the neutral value and the component.

use std::ops::{Add, Mul};

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::mask::Mask;
use crate::shape::Shape;
use crate::SynthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMode {
    Add,
    Mul,
}

impl CombineMode {
    /// Component value that leaves a cell unchanged.
    pub fn neutral(self) -> f64 {
        match self {
            CombineMode::Add => 0.0,
            CombineMode::Mul => 1.0,
        }
    }

    /// Array of the neutral value, the starting point for sparse components.
    pub fn baseline(self, shape: Shape) -> Array2<f64> {
        Array2::from_elem(shape.dim(), self.neutral())
    }

    pub fn label(self) -> &'static str {
        match self {
            CombineMode::Add => "add",
            CombineMode::Mul => "mul",
        }
    }

    /// Blend `component` into `series`, optionally gated by `mask`.
    ///
    /// `series` may be real (time domain) or complex (frequency domain); the
    /// component is always real.
    pub fn combine<T>(
        self,
        series: &Array2<T>,
        component: &Array2<f64>,
        mask: Option<&Mask>,
    ) -> Result<Array2<T>, SynthError>
    where
        T: Copy + Add<f64, Output = T> + Mul<f64, Output = T>,
    {
        check_shapes(
            Shape::of(series),
            Shape::of(component),
            mask.map(Mask::shape),
        )?;

        let neutral = self.neutral();
        let mut combined = series.to_owned();

        match mask {
            None => {
                Zip::from(&mut combined)
                    .and(component)
                    .for_each(|cell, &c| *cell = self.blend(*cell, c));
            }
            Some(Mask::Hard(gate)) => {
                Zip::from(&mut combined)
                    .and(component)
                    .and(gate)
                    .for_each(|cell, &c, &on| {
                        let effective = if on { c } else { neutral };
                        *cell = self.blend(*cell, effective);
                    });
            }
            Some(Mask::Soft(weights)) => {
                Zip::from(&mut combined)
                    .and(component)
                    .and(weights)
                    .for_each(|cell, &c, &m| {
                        let effective = neutral + m * (c - neutral);
                        *cell = self.blend(*cell, effective);
                    });
            }
        }

        Ok(combined)
    }

    fn blend<T>(self, value: T, component: f64) -> T
    where
        T: Add<f64, Output = T> + Mul<f64, Output = T>,
    {
        match self {
            CombineMode::Add => value + component,
            CombineMode::Mul => value * component,
        }
    }
}

fn check_shapes(series: Shape, component: Shape, mask: Option<Shape>) -> Result<(), SynthError> {
    let mask_ok = mask.map_or(true, |m| m == series && m == component);
    if series == component && mask_ok {
        return Ok(());
    }

    Err(SynthError::ShapeMismatch {
        series,
        component,
        mask,
    })
}
