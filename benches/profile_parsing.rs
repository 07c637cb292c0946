use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ds_hal_harness::{parse_configuration, register_suites, HarnessSettings, ProfileStore, Session, Tier};

const PROFILES: &[(&str, &str)] = &[
    ("source", include_str!("../profiles/source.toml")),
    ("sink", include_str!("../profiles/sink.toml")),
];

fn benchmark_profile_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile");

    for &(name, text) in PROFILES {
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("load_toml", name), text, |b, text| {
            b.iter(|| ProfileStore::from_toml_str(black_box(text)).unwrap());
        });

        let store = ProfileStore::from_toml_str(text).unwrap();
        group.bench_with_input(BenchmarkId::new("parse_configuration", name), &store, |b, store| {
            b.iter(|| parse_configuration(black_box(store)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_key_lookup(c: &mut Criterion) {
    let store = ProfileStore::from_toml_str(PROFILES[1].1).unwrap();
    let keys = [
        "dsAudio/Ports/1/Typeid",
        "dsAudio.Ports.3.stereo_modes.2",
        "dsVideoPort/Ports/1/supportedResolutions/1/name",
        "dsVideoDevice/Device/1/SupportedDisplayFramerate/3",
    ];

    c.bench_function("profile/key_lookup", |b| {
        b.iter(|| {
            for key in keys {
                black_box(store.field_present(black_box(key)));
            }
        });
    });
}

fn benchmark_conformance_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");

    for &(name, text) in PROFILES {
        let config = parse_configuration(&ProfileStore::from_toml_str(text).unwrap()).unwrap();
        let suites = register_suites(config.modules, config.device_class, &[Tier::L1, Tier::L2]);
        let cases: usize = suites.iter().map(|s| s.cases.len()).sum();
        group.throughput(Throughput::Elements(cases as u64));

        let session = Session::with_config(
            HarnessSettings {
                tiers: vec![Tier::L1, Tier::L2],
                ..Default::default()
            },
            config,
        );
        group.bench_function(BenchmarkId::new("l1_l2_simulated", name), |b| {
            b.iter(|| {
                let mut hal = session.backend().unwrap();
                black_box(session.run(&mut hal).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_profile_loading,
    benchmark_key_lookup,
    benchmark_conformance_run
);
criterion_main!(benches);
