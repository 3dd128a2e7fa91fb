//! 분류/파이프라인 선택 벤치마크

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sigmaforge_convert::{classify, select_pipeline};
use sigmaforge_sigma::Logsource;

fn sample_logsources() -> Vec<Logsource> {
    let samples: &[(&str, &str, &str)] = &[
        ("windows", "security", ""),
        ("windows", "sysmon", "process_creation"),
        ("linux", "auditd", "process_creation"),
        ("", "", "linux_builtin"),
        ("zeek", "corelight_conn", ""),
        ("zeek", "dns", ""),
        ("kubernetes", "", "audit"),
        ("macos", "", "process_creation"),
    ];

    samples.iter()
        .map(|(product, service, category)| Logsource {
            product: (!product.is_empty()).then(|| (*product).to_owned()),
            service: (!service.is_empty()).then(|| (*service).to_owned()),
            category: (!category.is_empty()).then(|| (*category).to_owned()),
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let logsources = sample_logsources();
    c.bench_function("classify", |b| {
        b.iter(|| {
            for ls in &logsources {
                black_box(classify(black_box(ls)));
            }
        })
    });
}

fn bench_select_pipeline(c: &mut Criterion) {
    let logsources = sample_logsources();
    c.bench_function("select_pipeline", |b| {
        b.iter(|| {
            for ls in &logsources {
                black_box(select_pipeline(black_box(ls)).name().len());
            }
        })
    });
}

criterion_group!(benches, bench_classify, bench_select_pipeline);
criterion_main!(benches);
