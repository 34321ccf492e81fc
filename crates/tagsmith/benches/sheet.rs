use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tagsmith::{
    GenerationConfig, Generator, NameEntry, OutputMode, SheetConfig, TemplateDocument,
    TemplateSizeConfig,
};

const BADGE: &str = include_str!("../../../fixtures/templates/badge.svg");

fn names(n: usize) -> Vec<NameEntry> {
    (0..n)
        .map(|i| NameEntry::new(format!("Attendee Number {i} With A Fairly Long Name")))
        .collect()
}

fn bench_generate(c: &mut Criterion) {
    let template = TemplateDocument::parse(BADGE).unwrap();
    let small_tags = GenerationConfig {
        template_size: Some(TemplateSizeConfig {
            width: 45.0,
            height: 27.5,
            lock_aspect: true,
        }),
        sheet: SheetConfig::a4().with_margin(5.0).with_spacing(2.0),
        ..Default::default()
    };

    let mut group = c.benchmark_group("generate");
    for (label, mode) in [("sheet", OutputMode::Sheet), ("separate", OutputMode::Separate)] {
        let generator = Generator::new().with_config(GenerationConfig {
            output_mode: mode,
            ..small_tags.clone()
        });
        let input = names(40);
        group.bench_function(label, |b| {
            b.iter_batched(
                || input.clone(),
                |names| {
                    let out = generator.generate(Some(&template), &names).unwrap();
                    black_box(out);
                },
                BatchSize::SmallInput,
            )
        });
    }

    let generator = Generator::new().with_config(small_tags);
    let input = names(500);
    group.bench_function("pages_500", |b| {
        b.iter(|| black_box(generator.generate_pages(Some(&template), &input).unwrap()))
    });
    group.finish();
}

fn bench_template_parse(c: &mut Criterion) {
    c.bench_function("template_parse", |b| {
        b.iter(|| black_box(TemplateDocument::parse(black_box(BADGE)).unwrap()))
    });
}

criterion_group!(benches, bench_generate, bench_template_parse);
criterion_main!(benches);
