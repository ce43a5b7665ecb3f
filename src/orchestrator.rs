//! Stochastic sequential composition of generators.
//!
//! An [`Orchestrator`] holds an ordered plan of [`Maybe`] entries. Each entry
//! receives one uniform inclusion draw at construction, taken in the original
//! list order before any shuffling, so the draw travels with its entry. A run
//! folds the surviving entries over the series in plan order: each entry
//! regenerates its mask, is skipped when its probability is below its draw,
//! and otherwise replaces the working series with its applied result.

use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::Generator;
use crate::mask::{Mask, MaskGenerator};
use crate::SynthError;

/// A generator, an optional mask generator and an inclusion probability.
pub struct Maybe {
    pub generator: Box<dyn Generator>,
    pub mask: Option<Box<dyn MaskGenerator>>,
    pub probability: f64,
}

impl Maybe {
    /// Entry that always applies, everywhere.
    pub fn new(generator: impl Generator + 'static) -> Self {
        Self::boxed(Box::new(generator))
    }

    pub fn boxed(generator: Box<dyn Generator>) -> Self {
        Self {
            generator,
            mask: None,
            probability: 1.0,
        }
    }

    pub fn with_mask(mut self, mask: impl MaskGenerator + 'static) -> Self {
        self.mask = Some(Box::new(mask));
        self
    }

    pub fn with_boxed_mask(mut self, mask: Option<Box<dyn MaskGenerator>>) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }
}

impl std::fmt::Debug for Maybe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maybe")
            .field("generator", &self.generator.name())
            .field("mask", &self.mask.as_ref().map(|m| m.name()))
            .field("probability", &self.probability)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorOptions {
    /// Uniformly permute the entries before truncation.
    pub shuffle: bool,
    /// Keep at most this many entries after shuffling.
    pub max_generators: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Skipped,
}

/// What happened to one planned entry during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryReport {
    /// Position of the entry in the list the orchestrator was built from.
    pub origin: usize,
    pub generator: String,
    pub probability: f64,
    pub draw: f64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub series: Array2<f64>,
    pub entries: Vec<EntryReport>,
    /// Mask of the last applied entry, when that entry had one.
    pub mask: Option<Mask>,
}

impl RunReport {
    pub fn applied(&self) -> usize {
        self.count(Outcome::Applied)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }
}

#[derive(Debug)]
struct PlannedEntry {
    origin: usize,
    draw: f64,
    entry: Maybe,
}

/// Applies a stochastic subset of generators to a series, in sequence.
#[derive(Debug)]
pub struct Orchestrator {
    plan: Vec<PlannedEntry>,
}

impl Orchestrator {
    pub fn new(
        entries: Vec<Maybe>,
        options: OrchestratorOptions,
        rng: &mut dyn RngCore,
    ) -> Result<Self, SynthError> {
        for (origin, entry) in entries.iter().enumerate() {
            let p = entry.probability;
            if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
                return Err(SynthError::InvalidConfig(format!(
                    "entry {origin} ({}) has inclusion probability {p}, expected [0, 1]",
                    entry.generator.name()
                )));
            }
        }

        let mut plan: Vec<PlannedEntry> = entries
            .into_iter()
            .enumerate()
            .map(|(origin, entry)| PlannedEntry {
                origin,
                draw: rng.gen::<f64>(),
                entry,
            })
            .collect();

        if options.shuffle {
            plan.shuffle(rng);
        }
        if let Some(cap) = options.max_generators {
            plan.truncate(cap);
        }

        Ok(Self { plan })
    }

    pub fn len(&self) -> usize {
        self.plan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Original positions of the surviving entries, in run order.
    pub fn order(&self) -> Vec<usize> {
        self.plan.iter().map(|p| p.origin).collect()
    }

    /// Inclusion draws of the surviving entries, in run order.
    pub fn draws(&self) -> Vec<f64> {
        self.plan.iter().map(|p| p.draw).collect()
    }

    /// Fold the surviving entries over `series`.
    ///
    /// Any configuration or shape error aborts the whole run.
    pub fn run(&self, series: &Array2<f64>, rng: &mut dyn RngCore) -> Result<RunReport, SynthError> {
        let mut current = series.to_owned();
        let mut reports = Vec::with_capacity(self.plan.len());
        let mut last_mask = None;

        for planned in &self.plan {
            let entry = &planned.entry;
            let mask = match &entry.mask {
                Some(generator) => Some(generator.generate(rng)?),
                None => None,
            };

            let outcome = if entry.probability < planned.draw {
                Outcome::Skipped
            } else {
                current = entry.generator.apply(&current, mask.as_ref(), rng)?;
                Outcome::Applied
            };

            debug!(
                origin = planned.origin,
                generator = entry.generator.name(),
                probability = entry.probability,
                draw = planned.draw,
                mask_coverage = ?mask.as_ref().map(Mask::coverage),
                ?outcome,
                "orchestrator entry"
            );
            if outcome == Outcome::Applied {
                last_mask = mask;
            }

            reports.push(EntryReport {
                origin: planned.origin,
                generator: entry.generator.name().to_string(),
                probability: entry.probability,
                draw: planned.draw,
                outcome,
            });
        }

        Ok(RunReport {
            series: current,
            entries: reports,
            mask: last_mask,
        })
    }
}
