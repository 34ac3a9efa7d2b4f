use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use promptgrade_core::model::{EvaluationRequest, Mode};
use promptgrade_core::parser::parse_catalog_str;
use promptgrade_core::Evaluator;

const CATALOG: &str = r#"
[catalog]
id = "bench"
name = "Bench"

[[exercises]]
id = "sky"
title = "Why is the sky blue?"
difficulty = "Easy"
expected_output = "The sky appears blue because air molecules scatter short blue wavelengths of sunlight more than long red ones, an effect called Rayleigh scattering."
keywords = ["sky", "blue", "scatter", "wavelength", "sunlight"]
patterns = ["rayleigh", "wave ?lengths?", "\\bair\\b"]
max_tokens = 60
hints = ["Mention wavelength", "Name the effect"]
"#;

const SUBMISSION: &str = "In short, the sky is blue because sunlight is scattered by air molecules. \
    For example, shorter blue wavelengths scatter far more than red, which means we clearly see \
    blue everywhere. This is called Rayleigh scattering, and you should imagine it as a vivid, \
    creative dance of light.";

fn request() -> EvaluationRequest {
    let catalog = parse_catalog_str(CATALOG, &PathBuf::from("bench.toml")).unwrap();
    catalog.exercises[0].to_request(SUBMISSION, Mode::Submit)
}

fn bench_evaluate(c: &mut Criterion) {
    let evaluator = Evaluator::default();
    let req = request();

    c.bench_function("evaluate/typical", |b| {
        b.iter(|| evaluator.evaluate(black_box(&req)))
    });

    let mut empty = req.clone();
    empty.user_text = String::new();
    c.bench_function("evaluate/empty_submission", |b| {
        b.iter(|| evaluator.evaluate(black_box(&empty)))
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
