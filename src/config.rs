use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::combine::CombineMode;
use crate::dummy::{dummy_series, DummySeriesConfig};
use crate::generator::GeneratorSettings;
use crate::generators::{
    ConstantBurstGenerator, GeneratorKind, NormalGenerator, PointAnomalyGenerator,
};
use crate::mask::MaskKind;
use crate::orchestrator::{Maybe, OrchestratorOptions};
use crate::pipeline::{seeded_rng, Pipeline};
use crate::shape::Shape;
use crate::transform::Domain;
use crate::SynthError;

/// Series the pipeline starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Baseline {
    Zeros,
    Ones,
    /// Noisy sinusoids; the dimensions always come from the pipeline config.
    Dummy(DummySeriesConfig),
}

/// One orchestrator entry as it appears in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    pub generator: GeneratorKind,
    #[serde(default)]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub combine_mode: Option<CombineMode>,
    #[serde(default)]
    pub mask: Option<MaskKind>,
    #[serde(default = "default_probability")]
    pub probability: f64,
}

fn default_probability() -> f64 {
    1.0
}

impl EntryConfig {
    pub fn new(generator: GeneratorKind, domain: Domain, combine_mode: CombineMode) -> Self {
        Self {
            generator,
            domain: Some(domain),
            combine_mode: Some(combine_mode),
            mask: None,
            probability: 1.0,
        }
    }

    fn into_maybe(self, shape: Shape) -> Maybe {
        let mut settings = GeneratorSettings::new(shape);
        settings.domain = self.domain;
        settings.combine_mode = self.combine_mode;

        Maybe::boxed(self.generator.into_generator(settings))
            .with_boxed_mask(self.mask.map(|mask| mask.into_mask(shape)))
            .with_probability(self.probability)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub seed: u64,
    pub seq_len: usize,
    pub no_variates: usize,
    pub shuffle: bool,
    pub max_generators: Option<usize>,
    pub baseline: Baseline,
    pub entries: Vec<EntryConfig>,
}

impl Default for PipelineConfig {
    /// Dummy sinusoids with frequency-domain noise and spikes, followed by
    /// time-domain spikes, noise and constant bursts.
    fn default() -> Self {
        let point_anomalies = |fraction, magnitude| {
            GeneratorKind::PointAnomaly(PointAnomalyGenerator {
                fraction,
                magnitude,
                ..PointAnomalyGenerator::default()
            })
        };
        let noise = || {
            GeneratorKind::Normal(NormalGenerator {
                mean: 0.0,
                std: 0.1,
                ..NormalGenerator::default()
            })
        };
        let bursts = GeneratorKind::ConstantBurst(ConstantBurstGenerator {
            fraction: 0.01,
            value: Some(1.0),
            length: 5.0,
            length_variance: 2.0,
            ..ConstantBurstGenerator::default()
        });

        Self {
            seed: 42,
            seq_len: 1000,
            no_variates: 2,
            shuffle: false,
            max_generators: None,
            baseline: Baseline::Dummy(DummySeriesConfig::default()),
            entries: vec![
                EntryConfig::new(noise(), Domain::Frequency, CombineMode::Add),
                EntryConfig::new(point_anomalies(0.1, 20.0), Domain::Frequency, CombineMode::Add),
                EntryConfig::new(point_anomalies(0.01, 1.0), Domain::Time, CombineMode::Add),
                EntryConfig::new(noise(), Domain::Time, CombineMode::Add),
                EntryConfig::new(bursts, Domain::Time, CombineMode::Add),
            ],
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, SynthError> {
        let raw = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.seq_len, self.no_variates)
    }

    pub fn options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            shuffle: self.shuffle,
            max_generators: self.max_generators,
        }
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if self.seq_len == 0 {
            return Err(SynthError::InvalidConfig(
                "seq_len must be greater than zero".to_string(),
            ));
        }

        if self.no_variates == 0 {
            return Err(SynthError::InvalidConfig(
                "no_variates must be greater than zero".to_string(),
            ));
        }

        for (idx, entry) in self.entries.iter().enumerate() {
            let kind = entry.generator.generator_type();
            if entry.domain.is_none() {
                return Err(SynthError::InvalidConfig(format!(
                    "entry {idx} ({kind}) must set domain to `time` or `frequency`"
                )));
            }
            if entry.combine_mode.is_none() {
                return Err(SynthError::InvalidConfig(format!(
                    "entry {idx} ({kind}) must set combine_mode to `add` or `mul`"
                )));
            }
            if !(entry.probability.is_finite() && (0.0..=1.0).contains(&entry.probability)) {
                return Err(SynthError::InvalidConfig(format!(
                    "entry {idx} ({kind}) probability must be in [0, 1], got {}",
                    entry.probability
                )));
            }
        }

        if let Baseline::Dummy(dummy) = &self.baseline {
            dummy.validate()?;
        }

        Ok(())
    }

    /// The starting series. Dummy baselines draw from their own stream,
    /// seeded one past the pipeline seed.
    pub fn baseline_series(&self) -> Result<Array2<f64>, SynthError> {
        let shape = self.shape();
        match &self.baseline {
            Baseline::Zeros => Ok(CombineMode::Add.baseline(shape)),
            Baseline::Ones => Ok(CombineMode::Mul.baseline(shape)),
            Baseline::Dummy(dummy) => {
                let dummy = DummySeriesConfig {
                    seq_len: self.seq_len,
                    no_variates: self.no_variates,
                    ..dummy.clone()
                };
                let mut rng = seeded_rng(self.seed.wrapping_add(1));
                dummy_series(&dummy, &mut rng)
            }
        }
    }

    /// Validate, then build the seeded pipeline and its starting series.
    pub fn build(&self) -> Result<(Pipeline, Array2<f64>), SynthError> {
        self.validate()?;
        let shape = self.shape();

        let entries = self
            .entries
            .iter()
            .cloned()
            .map(|entry| entry.into_maybe(shape))
            .collect();
        let pipeline = Pipeline::seeded(self.seed, entries, self.options())?;

        Ok((pipeline, self.baseline_series()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::Outcome;

    #[test]
    fn default_config_is_valid_and_runs() {
        let config = PipelineConfig::default();
        config.validate().unwrap();

        let (mut pipeline, baseline) = config.build().unwrap();
        assert_eq!(Shape::of(&baseline), Shape::new(1000, 2));
        assert_eq!(pipeline.orchestrator().len(), 5);

        let report = pipeline.run(&baseline).unwrap();
        assert_eq!(Shape::of(&report.series), Shape::new(1000, 2));
        assert_eq!(report.applied(), 5);
        assert!(report.series.iter().all(|v| v.is_finite()));
        assert_ne!(report.series, baseline);
    }

    #[test]
    fn json_entries_take_defaults() {
        let raw = r#"{
            "seed": 7,
            "seq_len": 64,
            "no_variates": 3,
            "baseline": {"type": "zeros"},
            "entries": [
                {
                    "generator": {"type": "level", "value": 2.0},
                    "domain": "time",
                    "combine_mode": "add",
                    "mask": {"type": "clustered", "inter_variates_probability": 1.0,
                             "intra_variates_probability": 0.25, "cluster_size": 4.0,
                             "cluster_variance": 1.0}
                },
                {
                    "generator": {"type": "normal"},
                    "domain": "frequency",
                    "combine_mode": "mul",
                    "probability": 0.0
                }
            ]
        }"#;
        let config: PipelineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.entries[0].probability, 1.0);
        assert!(!config.shuffle);

        let (mut pipeline, baseline) = config.build().unwrap();
        assert!(baseline.iter().all(|&v| v == 0.0));

        let report = pipeline.run(&baseline).unwrap();
        assert_eq!(report.entries[0].outcome, Outcome::Applied);
        assert_eq!(report.entries[1].outcome, Outcome::Skipped);
        // 16 of 64 steps in each of 3 variates.
        assert_eq!(report.series.iter().filter(|&&v| v == 2.0).count(), 48);

        // The applied entry's mask is carried out of the run for export.
        let mask = report.mask.as_ref().unwrap();
        assert_eq!(mask.to_weights().sum(), 48.0);

        let dir = std::env::temp_dir().join(format!("tsynth-config-mask-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("series.csv");
        crate::output::write_series_csv(&path, &report.series, Some(&baseline), Some(mask))
            .unwrap();
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.lines().next().unwrap().ends_with("mask_0,mask_1,mask_2"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_domain_is_rejected() {
        let raw = r#"{"entries": [{"generator": {"type": "normal"}, "combine_mode": "add"}]}"#;
        let config: PipelineConfig = serde_json::from_str(raw).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("domain"));
    }

    #[test]
    fn invalid_dimensions_and_probabilities_are_rejected() {
        let zero_len = PipelineConfig {
            seq_len: 0,
            ..PipelineConfig::default()
        };
        assert!(zero_len.validate().is_err());

        let mut bad_probability = PipelineConfig::default();
        bad_probability.entries[2].probability = -0.1;
        assert!(matches!(
            bad_probability.build(),
            Err(SynthError::InvalidConfig(_))
        ));
    }

    #[test]
    fn same_config_builds_identical_pipelines() {
        let config = PipelineConfig {
            shuffle: true,
            max_generators: Some(3),
            ..PipelineConfig::default()
        };
        let (mut first, base_a) = config.build().unwrap();
        let (mut second, base_b) = config.build().unwrap();
        assert_eq!(base_a, base_b);
        assert_eq!(first.orchestrator().order(), second.orchestrator().order());
        assert_eq!(
            first.run(&base_a).unwrap().series,
            second.run(&base_b).unwrap().series
        );
    }

    #[test]
    fn config_round_trips_through_json_file() {
        let dir = std::env::temp_dir().join(format!("tsynth-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let config = PipelineConfig {
            baseline: Baseline::Ones,
            ..PipelineConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_dir_all(&dir).ok();
    }
}
