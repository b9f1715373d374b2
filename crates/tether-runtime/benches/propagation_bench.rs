//! Benchmarks for binding propagation and multi-source combination.
//!
//! Run with: cargo bench -p tether-runtime --bench propagation_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::cell::{Cell, RefCell};
use std::hint::black_box;
use std::rc::Rc;
use std::sync::LazyLock;
use tether_runtime::{
    Bindable, Binding, BindingDirection, MemberTable, PropertyChanged, provider,
};

#[derive(Default)]
struct Counter {
    value: Cell<i64>,
    label: RefCell<String>,
    changed: PropertyChanged,
}

static COUNTER: LazyLock<MemberTable> = LazyLock::new(|| {
    MemberTable::builder::<Counter>("Counter")
        .field("value", |c| c.value.get())
        .field_mut("label", |c| c.label.borrow().clone(), |c, v: String| {
            c.changed.set_field(&c.label, v, "label");
        })
        .build()
});

impl Bindable for Counter {
    fn members(&self) -> &'static MemberTable {
        &COUNTER
    }

    fn property_changed(&self) -> Option<&PropertyChanged> {
        Some(&self.changed)
    }
}

fn bench_single_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagate/single");
    group.throughput(Throughput::Elements(1));

    let model = Rc::new(Counter::default());
    let sink = Rc::new(Cell::new(0i64));
    let s = Rc::clone(&sink);
    let _binding = Binding::bind_callback(
        provider::no_parent(),
        move |v: i64| s.set(v),
        BindingDirection::OneWay,
    )
    .and_then(|b| b.to_member(provider::weak(&model), "value"))
    .expect("binding");

    let mut next = 0;
    group.bench_function("member_to_callback", |b| {
        b.iter(|| {
            next += 1;
            model.changed.set_cell(&model.value, next, "value");
            black_box(sink.get())
        });
    });

    let view = Rc::new(Counter::default());
    let _text = Binding::bind_member(
        provider::no_parent(),
        provider::weak(&view),
        "label",
        BindingDirection::OneWay,
    )
    .and_then(|b| b.to_member(provider::weak(&model), "value"))
    .map(Binding::convert_to_string)
    .expect("binding");

    group.bench_function("member_to_member_string", |b| {
        b.iter(|| {
            next += 1;
            model.changed.set_cell(&model.value, next, "value");
            black_box(view.label.borrow().len())
        });
    });

    group.finish();
}

fn bench_multi_source(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagate/multi");

    for sources in [2usize, 8, 32] {
        group.throughput(Throughput::Elements(sources as u64));
        let models: Vec<Rc<Counter>> = (0..sources).map(|_| Rc::new(Counter::default())).collect();
        let sink = Rc::new(Cell::new(0i64));
        let s = Rc::clone(&sink);

        let mut binding = Binding::bind_callback(
            provider::no_parent(),
            move |v: i64| s.set(v),
            BindingDirection::OneWay,
        )
        .expect("binding");
        for model in &models {
            binding = binding
                .to_member(provider::weak(model), "value")
                .expect("source");
        }
        let binding = binding
            .combine_by_fn(|values| values.iter().filter_map(|v| v.as_i64()).sum::<i64>().into())
            .expect("combiner");

        let mut next = 0;
        group.bench_with_input(BenchmarkId::new("sum", sources), &(), |b, _| {
            b.iter(|| {
                next += 1;
                models[0].changed.set_cell(&models[0].value, next, "value");
                black_box(sink.get())
            });
        });
        binding.release();
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let model = Rc::new(Counter::default());
    let binding = Binding::bind_callback(provider::no_parent(), |_: i64| {}, BindingDirection::OneWay)
        .and_then(|b| b.to_member(provider::weak(&model), "value"))
        .expect("binding");

    group.bench_function("set_dirty", |b| {
        b.iter(|| black_box(binding.set_dirty()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_source,
    bench_multi_source,
    bench_evaluate
);
criterion_main!(benches);
