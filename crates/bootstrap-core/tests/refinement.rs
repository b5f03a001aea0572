use bootstrap_core::checkpoint::CheckpointStore;
use bootstrap_core::common::{CheckpointConfig, RunConfig};
use bootstrap_core::domain::{IntersectionMode, SolveMode};
use bootstrap_core::engine::{RefinementEngine, RefinementOutcome};
use bootstrap_core::providers::{
    CoulombMoments, CoulombParameters, CoulombVariable, HarmonicMoments, MomentProvider,
};
use bootstrap_core::region::{Interval, Region};
use tempfile::TempDir;

fn run(provider: &dyn MomentProvider, config: &RunConfig) -> RefinementOutcome {
    RefinementEngine::new(provider, config)
        .expect("engine should build")
        .run()
        .expect("refinement should succeed")
}

fn harmonic_config(round: usize) -> RunConfig {
    RunConfig {
        round,
        ..RunConfig::default()
    }
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn harmonic_rounds_bracket_the_ground_state() {
    let provider = HarmonicMoments::new(1.0, 8).expect("provider");
    let outcome = run(&provider, &harmonic_config(8));

    assert_eq!(outcome.history.len(), 8);
    assert_eq!(outcome.rounds_computed, 8);
    for early in &outcome.history[..3] {
        assert_eq!(early, &Region::non_negative());
    }

    let round_four = &outcome.history[3];
    assert_eq!(round_four.len(), 1);
    assert_close(round_four.intervals()[0].lower(), 0.373377, 1.0e-4);

    let last = outcome.final_region().expect("eight rounds");
    let [ground, excited] = last.intervals() else {
        panic!("expected two pieces after eight rounds, got {last}");
    };
    assert_close(ground.lower(), 0.679858, 1.0e-4);
    assert_close(ground.upper(), 0.801163, 1.0e-4);
    assert_close(excited.lower(), 1.60068, 1.0e-4);
    assert_eq!(excited.upper(), f64::INFINITY);

    let energies = provider.reference_energies(2);
    assert!(last.contains(energies[0]));
    assert!(last.contains(energies[1]));
    assert!(!last.contains(1.0));
    assert!(outcome.confirmed.is_empty());
}

#[test]
fn coulomb_rounds_bracket_the_lowest_levels() {
    let provider = CoulombMoments::new(CoulombParameters::default(), 7).expect("provider");
    let config = RunConfig {
        round: 7,
        ..RunConfig::default()
    };
    let outcome = run(&provider, &config);

    assert_close(outcome.history[1].intervals()[0].lower(), 2.47214, 1.0e-4);
    assert_close(outcome.history[2].intervals()[0].lower(), 4.80975, 1.0e-4);

    let last = outcome.final_region().expect("seven rounds");
    let [lowest, rest] = last.intervals() else {
        panic!("expected two pieces after seven rounds, got {last}");
    };
    assert_close(lowest.lower(), 7.04676, 1.0e-4);
    assert_close(lowest.upper(), 8.37675, 1.0e-4);
    assert_close(rest.lower(), 14.6875, 1.0e-3);

    assert!(last.contains(8.0));
    assert!(last.contains(18.0));
    assert!(!last.contains(10.0));
}

#[test]
fn chained_rounds_without_remerge_only_narrow() {
    let provider = HarmonicMoments::new(1.0, 7).expect("provider");
    let config = RunConfig {
        round: 7,
        remerge_confirmed: false,
        ..RunConfig::default()
    };
    let outcome = run(&provider, &config);

    for pair in outcome.history.windows(2) {
        assert!(
            pair[1].is_subset_of(&pair[0]),
            "{} is not inside {}",
            pair[1],
            pair[0]
        );
    }
}

#[test]
fn chained_rounds_stay_inside_independent_rounds() {
    let provider = HarmonicMoments::new(1.0, 6).expect("provider");
    let chained = run(&provider, &harmonic_config(6));
    let independent = run(
        &provider,
        &RunConfig {
            intersection: IntersectionMode::Independent,
            ..harmonic_config(6)
        },
    );

    for (chained_round, independent_round) in chained.history.iter().zip(&independent.history) {
        assert!(chained_round.is_subset_of(independent_round));
        assert!(independent_round.is_subset_of(&Region::non_negative()));
    }
    let last = independent.final_region().expect("six rounds");
    assert!(last.contains(std::f64::consts::FRAC_1_SQRT_2));
}

#[test]
fn narrow_brackets_are_confirmed_and_kept() {
    let provider = HarmonicMoments::new(1.0, 8).expect("provider");
    let config = RunConfig {
        threshold: 0.2,
        ..harmonic_config(8)
    };
    let outcome = run(&provider, &config);

    assert_eq!(outcome.confirmed.len(), 1);
    let bracket = outcome.confirmed.intervals()[0];
    assert!(bracket.contains(std::f64::consts::FRAC_1_SQRT_2));
    assert!(bracket.width() < 0.2);

    let last = outcome.final_region().expect("eight rounds");
    assert!(outcome.confirmed.is_subset_of(last));
}

#[test]
fn resuming_a_checkpoint_continues_where_it_stopped() {
    let temp = TempDir::new().expect("tempdir should be created");
    let provider = HarmonicMoments::new(1.0, 8).expect("provider");
    let store = || CheckpointStore::in_directory(temp.path(), &provider.checkpoint_key());

    let first = RefinementEngine::new(&provider, &harmonic_config(6))
        .expect("engine")
        .with_checkpoint(store())
        .run()
        .expect("first run");
    assert_eq!(first.rounds_computed, 6);
    assert!(temp.path().join("energy_intervals_k1.00.json").is_file());

    let resumed = RefinementEngine::new(&provider, &harmonic_config(8))
        .expect("engine")
        .with_checkpoint(store())
        .run()
        .expect("resumed run");
    assert_eq!(resumed.resumed_from, Some(6));
    assert_eq!(resumed.rounds_computed, 2);
    assert_eq!(&resumed.history[..6], first.history.as_slice());

    let fresh = run(&provider, &harmonic_config(8));
    assert_eq!(resumed.history, fresh.history);
    assert_eq!(resumed.confirmed, fresh.confirmed);

    let stored = store().load().expect("load").expect("checkpoint exists");
    assert_eq!(stored.history, fresh.history);
}

#[test]
fn completed_checkpoint_computes_nothing() {
    let temp = TempDir::new().expect("tempdir should be created");
    let provider = HarmonicMoments::new(1.0, 4).expect("provider");
    let config = RunConfig {
        checkpoint: Some(CheckpointConfig {
            save_every_round: true,
            ..CheckpointConfig::default()
        }),
        ..harmonic_config(4)
    };
    let checkpoint = config.checkpoint.as_ref().expect("checkpoint section");
    let store = CheckpointStore::from_config(checkpoint, temp.path(), "k1.00");

    let first = RefinementEngine::new(&provider, &config)
        .expect("engine")
        .with_checkpoint(store.clone())
        .run()
        .expect("first run");

    let fewer = RunConfig {
        round: 3,
        ..config.clone()
    };
    let again = RefinementEngine::new(&provider, &fewer)
        .expect("engine")
        .with_checkpoint(store)
        .run()
        .expect("second run");

    assert_eq!(again.rounds_computed, 0);
    assert_eq!(again.resumed_from, Some(4));
    assert_eq!(again.history, first.history);
}

#[test]
fn rational_mode_solves_the_direct_energy_variable() {
    let provider = CoulombMoments::new(
        CoulombParameters {
            variable: CoulombVariable::Direct,
            ..CoulombParameters::default()
        },
        3,
    )
    .expect("provider");
    let config = RunConfig {
        round: 3,
        mode: SolveMode::Rational,
        initial_interval: Region::from(
            Interval::new(f64::NEG_INFINITY, 0.0, true, true).expect("negative half line"),
        ),
        ..RunConfig::default()
    };
    let outcome = run(&provider, &config);

    // E = -1/E' for the inverse-variable bounds 2.47214 and 4.80975
    let second = outcome.history[1].intervals()[0];
    assert_close(second.lower(), -1.0 / 2.47214, 1.0e-4);
    assert_eq!(second.upper(), 0.0);
    assert!(second.upper_open());

    let last = outcome.final_region().expect("three rounds");
    assert_close(last.intervals()[0].lower(), -1.0 / 4.80975, 1.0e-4);
    assert!(last.contains(-0.125));
    assert!(!last.contains(-0.3));
}
