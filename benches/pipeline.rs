use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use zestra::{
    chart::{ChartDataStore, ChartKind, RenderPlan, Theme, Timeframe, YRange},
    models::{NamedSeries, SeriesIterable},
};
mod data;

fn timeframe_filter_benchmark(c: &mut Criterion) {
    let a20k = black_box(data::generate_random_series(20_000));
    c.bench_function("filter 5y of 20k", |b| {
        b.iter(|| Timeframe::Years(5.0).filter(&a20k))
    });
    c.bench_function("filter all of 20k", |b| b.iter(|| Timeframe::All.filter(&a20k)));

    let a1k = black_box(data::generate_random_series(1_000));
    c.bench_function("filter 1y of 1k", |b| {
        b.iter(|| Timeframe::Years(1.0).filter(&a1k))
    });
}

fn range_benchmark(c: &mut Criterion) {
    let a20k = black_box(data::generate_random_series(20_000));
    c.bench_function("padded range 20k", |b| {
        b.iter(|| YRange::padded(a20k.numeric_values()))
    });
}

fn render_plan_benchmark(c: &mut Criterion) {
    let mut store = ChartDataStore::new(10, Timeframe::Years(10.0));
    store.set_primary(NamedSeries::new(
        "primary",
        ustr::ustr("primary"),
        data::generate_random_series(20_000),
    ));
    for i in 0..10 {
        let slug = format!("cmp-{i}");
        store
            .add_comparison(NamedSeries::new(
                slug.clone(),
                ustr::ustr(&slug),
                data::generate_random_series(20_000),
            ))
            .unwrap();
    }

    c.bench_function("render plan with 10 comparisons", |b| {
        b.iter(|| RenderPlan::build(black_box(&store), Theme::Dark, ChartKind::Line))
    });
    c.bench_function("switch timeframe with 10 comparisons", |b| {
        b.iter(|| store.set_timeframe(black_box(Timeframe::Years(2.0))))
    });
}

criterion_group!(
    benches,
    timeframe_filter_benchmark,
    range_benchmark,
    render_plan_benchmark
);
criterion_main!(benches);
