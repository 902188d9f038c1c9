#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use helpers::failure_of;
use helpers::init_logging;
use helpers::propagator_over;
use helpers::push_until;
use marrow_core::branching::weighted::DomWDeg;
use marrow_core::branching::weighted::DomWDegOptions;
use marrow_core::branching::weighted::WatchedPairs;
use marrow_core::branching::weighted::WeightFlush;
use marrow_core::branching::weighted::WeightedSearch;
use marrow_core::branching::Decision;
use marrow_core::branching::SelectionContext;
use marrow_core::branching::VariableSelector;
use marrow_core::rand::rngs::SmallRng;
use marrow_core::rand::Rng;
use marrow_core::rand::SeedableRng;
use marrow_core::Cause;
use marrow_core::Model;
use marrow_core::NoPropagation;
use marrow_core::Random;
use marrow_core::VariableId;

fn four_variables(model: &mut Model) -> Vec<VariableId> {
    (0..4)
        .map(|index| model.new_enumerated_var(format!("x{index}"), 0, 2))
        .collect()
}

#[test]
fn two_free_variables_credit_the_whole_scope() {
    init_logging();
    let mut model = Model::default();
    let x = four_variables(&mut model);
    let propagator = propagator_over(&mut model, &x);

    push_until(&mut model, 3);
    let _ = model
        .instantiate_to(x[0], 1, Cause::Decision, &mut NoPropagation)
        .expect("1 is in the domain");
    push_until(&mut model, 5);
    let _ = model
        .instantiate_to(x[1], 2, Cause::Decision, &mut NoPropagation)
        .expect("2 is in the domain");

    let mut strategy = WeightedSearch::dom_wdeg(&x);
    let mut engine = NoPropagation;
    let mut rng = SmallRng::seed_from_u64(42);
    let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
    assert!(strategy.init(&mut context));
    strategy.on_contradiction(&mut context, &failure_of(propagator));

    assert_eq!(0, strategy.core().statistics().revoked_increments);
    let pair = strategy
        .core()
        .watched_pairs()
        .get(propagator)
        .expect("the propagator was credited");
    assert_eq!(2, pair.counter);
    assert_eq!(x[2], pair.first);
    assert_eq!(x[3], pair.second);

    context.model_mut().world_pop_until(0);
    for &variable in &x {
        assert_eq!(
            1.0,
            strategy.criterion().weights().weight(context.model(), variable)
        );
    }
}

#[test]
fn the_increment_of_the_last_fixed_variable_is_revoked_with_its_world() {
    init_logging();
    let mut model = Model::default();
    let x = four_variables(&mut model);
    let propagator = propagator_over(&mut model, &x);

    for (world, &variable) in (1..=3).zip(&x) {
        push_until(&mut model, world);
        let _ = model
            .instantiate_to(variable, 0, Cause::Decision, &mut NoPropagation)
            .expect("0 is in the domain");
    }
    push_until(&mut model, 4);

    let mut strategy = WeightedSearch::dom_wdeg(&x);
    let mut engine = NoPropagation;
    let mut rng = SmallRng::seed_from_u64(42);
    let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
    assert!(strategy.init(&mut context));
    strategy.on_contradiction(&mut context, &failure_of(propagator));
    assert_eq!(1, strategy.core().statistics().revoked_increments);

    let weight = |context: &SelectionContext, variable| {
        strategy.criterion().weights().weight(context.model(), variable)
    };

    // Popping the world of the contradiction keeps the increment
    context.world_pop();
    assert_eq!(1.0, weight(&context, x[2]));

    // x2 was fixed in world 3, once it is free again the failure no longer concerns it
    context.world_pop();
    assert_eq!(0.0, weight(&context, x[2]));
    assert_eq!(1.0, weight(&context, x[0]));
    assert_eq!(1.0, weight(&context, x[1]));
    assert_eq!(1.0, weight(&context, x[3]));
}

#[test]
fn weights_only_decrease_through_revocations() {
    init_logging();
    let mut model = Model::default();
    let x = (0..6)
        .map(|index| model.new_enumerated_var(format!("x{index}"), 0, 3))
        .collect::<Vec<_>>();
    let propagators = [
        propagator_over(&mut model, &x[0..3]),
        propagator_over(&mut model, &x[2..5]),
        propagator_over(&mut model, &[x[5], x[0]]),
    ];

    let mut strategy = WeightedSearch::new(
        &x,
        DomWDeg::new(DomWDegOptions {
            flush: WeightFlush::Never,
        }),
    );
    let mut engine = NoPropagation;
    let mut rng = SmallRng::seed_from_u64(3);
    let mut choices = SmallRng::seed_from_u64(11);
    let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
    assert!(strategy.init(&mut context));

    // Every revocation removes at most 1 from a single variable
    let mut heaviest = vec![0.0_f64; x.len()];
    for _ in 0..200 {
        match strategy.select_variable(&mut context) {
            Some(variable) if choices.gen_bool(0.7) => {
                context.world_push();
                let value = context.lower_bound(variable);
                let _ = context
                    .apply(Decision::assign(variable, value))
                    .expect("the lower bound is in the domain");
            }
            _ => {
                let propagator =
                    propagators[choices.generate_usize_in_range(0..propagators.len())];
                strategy.on_contradiction(&mut context, &failure_of(propagator));
                if context.world_index() > 0 && choices.gen_bool(0.5) {
                    context.world_pop();
                } else {
                    context.model_mut().world_pop_until(0);
                    strategy.on_restart(&mut context);
                }
            }
        }

        let revocations = strategy.core().statistics().revoked_increments as f64;
        for (index, &variable) in x.iter().enumerate() {
            let weight = strategy
                .criterion()
                .weights()
                .weight(context.model(), variable);
            assert!(weight >= 0.0);
            assert!(weight >= heaviest[index] - revocations);
            heaviest[index] = heaviest[index].max(weight);
        }
    }
    assert!(strategy.core().statistics().attributed_contradictions > 0);
}

#[test]
fn watched_pairs_witness_the_free_variables() {
    init_logging();
    let mut model = Model::default();
    let x = (0..5)
        .map(|index| model.new_enumerated_var(format!("x{index}"), 0, 1))
        .collect::<Vec<_>>();
    let propagator = propagator_over(&mut model, &x);
    let mut pairs = WatchedPairs::default();
    let mut rng = SmallRng::seed_from_u64(5);

    for _ in 0..100 {
        let free = x
            .iter()
            .filter(|&&variable| !model.is_instantiated(variable))
            .copied()
            .collect::<Vec<_>>();
        assert_eq!(
            free.len() >= 2,
            pairs.has_at_least_two_free(&model, propagator)
        );

        if !free.is_empty() && rng.gen_bool(0.6) {
            model.world_push();
            let variable = free[rng.gen_range(0..free.len())];
            let _ = model
                .instantiate_to(variable, 1, Cause::Decision, &mut NoPropagation)
                .expect("1 is in the domain");
        } else if model.world_index() > 0 {
            model.world_pop();
        }
    }
}
