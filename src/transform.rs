//! Domain transform wrapper around a generator's generate/combine cycle.
//!
//! Frequency-domain generators combine their component with the discrete
//! Fourier transform of the series (taken independently along the time axis
//! of every variate). The combined spectrum is inverse-transformed and only
//! the real part is kept. A component that is localized in frequency space
//! therefore shows up as a ripple spread over the whole time axis.

use ndarray::Array2;
use rand::RngCore;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::Generator;
use crate::mask::Mask;
use crate::SynthError;

/// Representation in which a component is combined with the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Time,
    Frequency,
}

impl Domain {
    pub fn label(self) -> &'static str {
        match self {
            Domain::Time => "time",
            Domain::Frequency => "frequency",
        }
    }
}

/// Forward DFT of every column (variate) along the time axis.
pub fn to_frequency(series: &Array2<f64>) -> Array2<Complex64> {
    let mut spectrum = series.mapv(|v| Complex64::new(v, 0.0));
    transform_columns(&mut spectrum, false);
    spectrum
}

/// Normalized inverse DFT of every column, keeping the real part.
pub fn to_time(spectrum: Array2<Complex64>) -> Array2<f64> {
    let mut spectrum = spectrum;
    transform_columns(&mut spectrum, true);
    spectrum.mapv(|c| c.re)
}

fn transform_columns(data: &mut Array2<Complex64>, inverse: bool) {
    let (seq_len, no_variates) = data.dim();
    if seq_len == 0 {
        return;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = if inverse {
        planner.plan_fft_inverse(seq_len)
    } else {
        planner.plan_fft_forward(seq_len)
    };

    let scale = if inverse { 1.0 / seq_len as f64 } else { 1.0 };
    let mut buffer = vec![Complex64::new(0.0, 0.0); seq_len];

    for j in 0..no_variates {
        let mut column = data.column_mut(j);
        for (slot, value) in buffer.iter_mut().zip(column.iter()) {
            *slot = *value;
        }
        fft.process(&mut buffer);
        for (value, slot) in column.iter_mut().zip(buffer.iter()) {
            *value = *slot * scale;
        }
    }
}

/// Apply `generator` to `series` in the generator's declared domain.
///
/// The component is generated without reading the series. The result always
/// has the shape of `series`.
pub fn apply<G>(
    generator: &G,
    series: &Array2<f64>,
    mask: Option<&Mask>,
    rng: &mut dyn RngCore,
) -> Result<Array2<f64>, SynthError>
where
    G: Generator + ?Sized,
{
    let domain = generator.domain()?;
    let mode = generator.combine_mode()?;

    let combined = match domain {
        Domain::Time => {
            let component = generator.generate(rng)?;
            mode.combine(series, &component, mask)?
        }
        Domain::Frequency => {
            let spectrum = to_frequency(series);
            let component = generator.generate(rng)?;
            to_time(mode.combine(&spectrum, &component, mask)?)
        }
    };

    debug!(
        generator = generator.name(),
        domain = domain.label(),
        mode = mode.label(),
        masked = mask.is_some(),
        "combined component"
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::CombineMode;
    use crate::generator::GeneratorSettings;
    use crate::generators::LevelGenerator;
    use crate::pipeline::seeded_rng;
    use crate::shape::Shape;

    fn wave(shape: Shape) -> Array2<f64> {
        Array2::from_shape_fn(shape.dim(), |(i, j)| {
            let t = i as f64 / shape.seq_len as f64;
            (std::f64::consts::TAU * (j as f64 + 1.0) * t).sin() + 0.3 * j as f64
        })
    }

    fn level(shape: Shape, domain: Domain, mode: CombineMode, value: f64) -> LevelGenerator {
        LevelGenerator {
            settings: GeneratorSettings::new(shape)
                .with_domain(domain)
                .with_combine_mode(mode),
            value,
        }
    }

    #[test]
    fn frequency_round_trip_with_zero_component_is_identity() {
        let shape = Shape::new(100, 3);
        let series = wave(shape);
        let generator = level(shape, Domain::Frequency, CombineMode::Add, 0.0);
        let mut rng = seeded_rng(7);

        let out = generator.apply(&series, None, &mut rng).unwrap();

        assert_eq!(Shape::of(&out), shape);
        for (a, b) in out.iter().zip(series.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn frequency_round_trip_with_unit_gain_is_identity() {
        let shape = Shape::new(37, 2);
        let series = wave(shape);
        let generator = level(shape, Domain::Frequency, CombineMode::Mul, 1.0);
        let mut rng = seeded_rng(7);

        let out = generator.apply(&series, None, &mut rng).unwrap();
        for (a, b) in out.iter().zip(series.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn frequency_spike_spreads_across_time_axis() {
        let shape = Shape::new(64, 1);
        let series = Array2::<f64>::zeros(shape.dim());
        let generator = level(shape, Domain::Frequency, CombineMode::Add, 1.0);
        let mask = Mask::window(shape, 4..5);
        let mut rng = seeded_rng(1);

        let out = generator.apply(&series, Some(&mask), &mut rng).unwrap();

        // A single bin becomes a cosine over every time step.
        let nonzero = out.iter().filter(|v| v.abs() > 1e-6).count();
        assert!(nonzero > shape.seq_len / 2);
        let expected = (std::f64::consts::TAU * 4.0 * 3.0 / 64.0).cos() / 64.0;
        assert!((out[[3, 0]] - expected).abs() < 1e-12);
    }

    #[test]
    fn time_domain_matches_direct_combine() {
        let shape = Shape::new(20, 2);
        let series = wave(shape);
        let generator = level(shape, Domain::Time, CombineMode::Add, 1.5);
        let mut rng = seeded_rng(3);

        let out = generator.apply(&series, None, &mut rng).unwrap();
        for (a, b) in out.iter().zip(series.iter()) {
            assert!((a - (b + 1.5)).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_domain_is_a_configuration_error() {
        let shape = Shape::new(10, 1);
        let generator = LevelGenerator {
            settings: GeneratorSettings::new(shape).with_combine_mode(CombineMode::Add),
            value: 1.0,
        };
        let mut rng = seeded_rng(0);
        let err = generator
            .apply(&Array2::zeros(shape.dim()), None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SynthError::InvalidConfig(_)));
    }

    #[test]
    fn component_shape_must_match_series() {
        let generator = level(Shape::new(10, 2), Domain::Frequency, CombineMode::Add, 0.0);
        let mut rng = seeded_rng(0);
        let err = generator
            .apply(&Array2::zeros((12, 2)), None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SynthError::ShapeMismatch { .. }));
    }
}
