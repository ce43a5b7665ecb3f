use ndarray::Array2;
use proptest::prelude::*;
use tsynth::generators::{
    ConstantBurstGenerator, DriftGenerator, GeneratorKind, LevelGenerator, NormalGenerator,
    PinkNoiseGenerator, PointAnomalyGenerator, SinusoidGenerator,
};
use tsynth::{
    seeded_rng, CombineMode, Domain, Generator, GeneratorSettings, Mask, Maybe, Orchestrator,
    OrchestratorOptions, Shape,
};

fn series_for(shape: Shape, seed: u64) -> Array2<f64> {
    Array2::from_shape_fn(shape.dim(), |(i, j)| {
        ((i * 7 + j * 13) as f64 + seed as f64 * 0.1).sin() * 3.0
    })
}

fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn settings(shape: Shape, domain: Domain, mode: CombineMode) -> GeneratorSettings {
    GeneratorSettings::new(shape)
        .with_domain(domain)
        .with_combine_mode(mode)
}

fn domain_strategy() -> impl Strategy<Value = Domain> {
    prop_oneof![Just(Domain::Time), Just(Domain::Frequency)]
}

fn mode_strategy() -> impl Strategy<Value = CombineMode> {
    prop_oneof![Just(CombineMode::Add), Just(CombineMode::Mul)]
}

proptest! {
    #[test]
    fn generated_components_match_configured_shape(
        seq_len in 1usize..80,
        no_variates in 1usize..5,
        seed in any::<u64>(),
    ) {
        let shape = Shape::new(seq_len, no_variates);
        let kinds = vec![
            GeneratorKind::Normal(NormalGenerator::default()),
            GeneratorKind::PinkNoise(PinkNoiseGenerator::default()),
            GeneratorKind::Drift(DriftGenerator::default()),
            GeneratorKind::Sinusoid(SinusoidGenerator::default()),
            GeneratorKind::ConstantBurst(ConstantBurstGenerator::default()),
            GeneratorKind::PointAnomaly(PointAnomalyGenerator::default()),
        ];
        let mut rng = seeded_rng(seed);

        for kind in kinds {
            let generator = kind.into_generator(GeneratorSettings::additive(shape));
            let component = generator.generate(&mut rng).unwrap();
            prop_assert_eq!(Shape::of(&component), shape);
        }
    }

    #[test]
    fn applied_result_keeps_series_shape(
        seq_len in 1usize..80,
        no_variates in 1usize..5,
        domain in domain_strategy(),
        mode in mode_strategy(),
        seed in any::<u64>(),
    ) {
        let shape = Shape::new(seq_len, no_variates);
        let generator = NormalGenerator::new(settings(shape, domain, mode), 0.0, 1.0);
        let mut rng = seeded_rng(seed);
        let applied = generator.apply(&series_for(shape, seed), None, &mut rng).unwrap();
        prop_assert_eq!(Shape::of(&applied), shape);
    }

    #[test]
    fn neutral_component_leaves_series_unchanged(
        seq_len in 1usize..80,
        no_variates in 1usize..5,
        domain in domain_strategy(),
        mode in mode_strategy(),
        seed in any::<u64>(),
    ) {
        let shape = Shape::new(seq_len, no_variates);
        let series = series_for(shape, seed);
        let neutral = LevelGenerator::new(settings(shape, domain, mode), mode.neutral());
        let mut rng = seeded_rng(seed);

        let applied = neutral.apply(&series, None, &mut rng).unwrap();
        prop_assert!(max_abs_diff(&applied, &series) < 1e-9);
    }

    #[test]
    fn all_off_mask_is_a_no_op(
        seq_len in 1usize..80,
        no_variates in 1usize..5,
        mode in mode_strategy(),
        value in -50.0f64..50.0,
        seed in any::<u64>(),
    ) {
        let shape = Shape::new(seq_len, no_variates);
        let series = series_for(shape, seed);
        let generator = LevelGenerator::new(settings(shape, Domain::Time, mode), value);
        let mask = Mask::Hard(Array2::from_elem(shape.dim(), false));
        let mut rng = seeded_rng(seed);

        let applied = generator.apply(&series, Some(&mask), &mut rng).unwrap();
        prop_assert_eq!(applied, series);
    }

    #[test]
    fn orchestrator_never_exceeds_its_cap(
        count in 0usize..10,
        cap in 0usize..10,
        seed in any::<u64>(),
    ) {
        let shape = Shape::new(8, 1);
        let entries: Vec<Maybe> = (0..count)
            .map(|_| Maybe::new(LevelGenerator::new(GeneratorSettings::additive(shape), 1.0)))
            .collect();
        let mut rng = seeded_rng(seed);
        let orchestrator = Orchestrator::new(
            entries,
            OrchestratorOptions { shuffle: true, max_generators: Some(cap) },
            &mut rng,
        )
        .unwrap();

        let report = orchestrator.run(&Array2::zeros(shape.dim()), &mut rng).unwrap();
        prop_assert_eq!(report.applied(), count.min(cap));
        prop_assert!(report.series.iter().all(|&v| v == count.min(cap) as f64));
    }
}
