//! Array dimensions shared by series, components and masks.

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Dimensions of a 2-D series: rows are time steps, columns are variates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    pub seq_len: usize,
    pub no_variates: usize,
}

impl Shape {
    pub fn new(seq_len: usize, no_variates: usize) -> Self {
        Self {
            seq_len,
            no_variates,
        }
    }

    /// Shape of an existing array.
    pub fn of<T>(array: &Array2<T>) -> Self {
        let (seq_len, no_variates) = array.dim();
        Self::new(seq_len, no_variates)
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.seq_len * self.no_variates
    }

    pub fn is_empty(&self) -> bool {
        self.cells() == 0
    }

    /// `(seq_len, no_variates)`, the form ndarray constructors take.
    pub fn dim(&self) -> (usize, usize) {
        (self.seq_len, self.no_variates)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((seq_len, no_variates): (usize, usize)) -> Self {
        Self::new(seq_len, no_variates)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.seq_len, self.no_variates)
    }
}
