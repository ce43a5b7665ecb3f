use std::fs;
use std::path::Path;

use csv::Writer;
use ndarray::Array2;

use crate::mask::Mask;
use crate::orchestrator::EntryReport;
use crate::shape::Shape;
use crate::SynthError;

fn fmt_f64(value: f64) -> String {
    format!("{value:.10}")
}

fn ensure_shape(
    series: &Array2<f64>,
    other: Shape,
    mask: Option<Shape>,
) -> Result<(), SynthError> {
    let expected = Shape::of(series);
    if other == expected && mask.map_or(true, |shape| shape == expected) {
        return Ok(());
    }

    Err(SynthError::ShapeMismatch {
        series: expected,
        component: other,
        mask,
    })
}

/// One row per time step: `step`, then `series_j` for every variate, followed
/// by `raw_j` and `mask_j` columns when those arrays are given.
pub fn write_series_csv(
    path: &Path,
    series: &Array2<f64>,
    raw: Option<&Array2<f64>>,
    mask: Option<&Mask>,
) -> Result<(), SynthError> {
    let shape = Shape::of(series);
    ensure_shape(
        series,
        raw.map_or(shape, Shape::of),
        mask.map(Mask::shape),
    )?;
    let weights = mask.map(Mask::to_weights);

    let mut header = vec!["step".to_string()];
    header.extend((0..shape.no_variates).map(|j| format!("series_{j}")));
    if raw.is_some() {
        header.extend((0..shape.no_variates).map(|j| format!("raw_{j}")));
    }
    if weights.is_some() {
        header.extend((0..shape.no_variates).map(|j| format!("mask_{j}")));
    }

    let mut writer = Writer::from_path(path)?;
    writer.write_record(&header)?;

    for (step, row) in series.rows().into_iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(step.to_string());
        record.extend(row.iter().map(|&v| fmt_f64(v)));
        if let Some(raw) = raw {
            record.extend(raw.row(step).iter().map(|&v| fmt_f64(v)));
        }
        if let Some(weights) = &weights {
            record.extend(weights.row(step).iter().map(|&v| fmt_f64(v)));
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON array of per-entry outcomes.
pub fn write_report_json(path: &Path, entries: &[EntryReport]) -> Result<(), SynthError> {
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json)?;
    Ok(())
}
