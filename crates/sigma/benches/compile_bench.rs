//! 규칙 파싱/컴파일 벤치마크

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sigmaforge_sigma::pipeline::ecs_windows;
use sigmaforge_sigma::rule::RuleCollection;
use sigmaforge_sigma::LuceneBackend;

const RULE_YAML: &str = r#"
title: Suspicious Encoded PowerShell
id: 11111111-2222-3333-4444-555555555555
logsource:
  product: windows
  category: process_creation
detection:
  selection:
    Image|endswith: \powershell.exe
    CommandLine|contains:
      - -enc
      - -EncodedCommand
  filter:
    ParentImage|endswith: \explorer.exe
  condition: selection and not filter
level: high
tags:
  - attack.execution
"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("rule_parse", |b| {
        b.iter(|| {
            let collection =
                RuleCollection::from_yaml(black_box(RULE_YAML), "bench.yml").expect("parse");
            black_box(collection.len())
        })
    });
}

fn bench_compile(c: &mut Criterion) {
    let collection = RuleCollection::from_yaml(RULE_YAML, "bench.yml").expect("parse");
    let backend = LuceneBackend::new(ecs_windows());
    let index = vec!["logs-*".to_owned()];

    c.bench_function("rule_compile", |b| {
        b.iter(|| {
            let docs = backend
                .convert(black_box(&collection), black_box(&index))
                .expect("compile");
            black_box(docs.len())
        })
    });
}

criterion_group!(benches, bench_parse, bench_compile);
criterion_main!(benches);
