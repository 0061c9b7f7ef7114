use criterion::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use pkode::expr::compile;
use pkode::prelude::*;

fn two_compartment_oral() -> ModelDescriptor {
    ModelDescriptor {
        states: vec![State::new("A"), State::new("C"), State::new("P")],
        parameters: vec![
            Parameter::new("ka", 1.0, Bounds::new(0.1, 5.0)),
            Parameter::new("ke", 0.2, Bounds::new(0.01, 1.0)),
            Parameter::new("k12", 0.1, Bounds::new(0.0, 1.0)),
            Parameter::new("k21", 0.08, Bounds::new(0.0, 1.0)),
        ],
        equations: vec![
            Equation::for_state("A", "-ka * A"),
            Equation::for_state("C", "ka * A - ke * C - k12 * C + k21 * P"),
            Equation::for_state("P", "k12 * C - k21 * P"),
        ],
        initial_conditions: vec![
            InitialCondition::new("A", 100.0),
            InitialCondition::new("C", 0.0),
            InitialCondition::new("P", 0.0),
        ],
        time: TimeGrid::new(0.0, 24.0, 0.1),
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let library = ModelLibrary::builtin();
    let one_compartment = library.get("pk/1cmt-iv").unwrap().clone();
    let oral = library.get("pk/1cmt-oral").unwrap().clone();
    let two_compartment = two_compartment_oral();

    c.bench_function("compile_two_compartment", |b| {
        b.iter(|| {
            black_box(compile(
                &two_compartment.state_names(),
                &two_compartment.parameter_names(),
                &two_compartment.rhs(),
            ))
        })
    });
    c.bench_function("one_compartment", |b| {
        b.iter(|| black_box(simulate(&one_compartment)))
    });
    c.bench_function("one_compartment_oral", |b| {
        b.iter(|| black_box(simulate(&oral)))
    });
    c.bench_function("two_compartment_oral", |b| {
        b.iter(|| black_box(simulate(&two_compartment)))
    });

    let scenarios: Vec<Scenario> = (1..=32)
        .map(|i| [("ka".to_string(), 0.1 * i as f64)].into_iter().collect())
        .collect();
    c.bench_function("oral_32_scenarios", |b| {
        b.iter(|| black_box(simulate_scenarios(&oral, &scenarios, &SolverOptions::default())))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
