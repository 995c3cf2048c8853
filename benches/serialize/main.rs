use amrsetup::presets::pipe_acoustics;
use amrsetup::presets::GaugeLayout;
use amrsetup::presets::Resolution;
use amrsetup::ConfigSerializer;
use amrsetup::RunConfigBuilder;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::BenchmarkId;
use criterion::Criterion;

fn build_and_serialize(builder: RunConfigBuilder) {
    let config = builder.build().unwrap();
    let files = ConfigSerializer::serialize(&config).unwrap();
    assert_eq!(files.len(), 5);
}

pub fn serialize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    group.noise_threshold(0.05);
    for layout in [GaugeLayout::None, GaugeLayout::AlongAxis] {
        group.bench_function(BenchmarkId::from_parameter(format!("{:?}", layout)), |b| {
            b.iter_batched(
                || pipe_acoustics(Resolution::Fine, layout),
                build_and_serialize,
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, serialize_benchmark);
criterion_main!(benches);
