use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use maskmatch::{scan_files_concurrent, DocumentBuilder, ScanJob, Tokens};
use std::sync::Arc;

const PROSE: &str = "Passamos o fim de semana no interior. A cidade tem ruas calmas, praças bonitas e um mercado municipal cheio de frutas. No domingo visitamos a feira de artesanato e voltamos para casa no fim da tarde.";

const QUERIES: &[&str] = &["cocaína", "unilever", "atibaia boa vida", "apple store", "play store", "natura"];

fn corpus_text(paragraphs: usize) -> String {
    let mut text = String::new();
    for i in 0..paragraphs {
        text.push_str(PROSE);
        // WHY: sprinkle disguised keywords so both alignment phases get exercised
        if i % 7 == 0 {
            text.push_str(" coc4ína un! lever ati baia");
        }
        text.push(' ');
    }
    text
}

fn recipe() -> DocumentBuilder {
    DocumentBuilder::new().lowercase().fold_diacritics()
}

fn candidates() -> Vec<maskmatch::Document> {
    let query_recipe = recipe().min_score(60);
    QUERIES.iter().map(|q| query_recipe.build(q)).collect()
}

fn bench_scan(c: &mut Criterion) {
    let candidates = candidates();
    let mut group = c.benchmark_group("scan");

    for paragraphs in [1usize, 10, 100] {
        let text = corpus_text(paragraphs);
        let corpus = recipe().build(&text);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &corpus, |b, corpus| {
            b.iter(|| black_box(corpus.scan(black_box(&candidates))))
        });
    }
    group.finish();
}

fn bench_canonicalize(c: &mut Criterion) {
    let document = recipe().build(&corpus_text(100));
    c.bench_function("canonicalize_100_paragraphs", |b| {
        b.iter(|| black_box(Tokens::canonicalize(black_box(document.words()))))
    });
}

fn bench_prepare(c: &mut Criterion) {
    let html = format!("<html><body><p>{}</p></body></html>", corpus_text(20));
    let builder = DocumentBuilder::new()
        .parse_html()
        .lowercase()
        .fold_diacritics()
        .collapse_repeats();
    c.bench_function("prepare_html_20_paragraphs", |b| b.iter(|| black_box(builder.build(black_box(&html)))));
}

fn bench_scan_files(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let temp_dir = tempfile::TempDir::new().unwrap();
    let paths: Vec<_> = (0..16)
        .map(|i| {
            let path = temp_dir.path().join(format!("post{i}.txt"));
            std::fs::write(&path, corpus_text(10)).unwrap();
            path
        })
        .collect();

    let queries = QUERIES.iter().map(|q| q.to_string()).collect();
    let job = Arc::new(ScanJob::new(recipe(), &recipe().min_score(60), queries));

    let mut group = c.benchmark_group("scan_files");
    group.sample_size(10); // WHY: file I/O dominates, few samples are enough
    group.bench_function("16_files", |b| {
        b.iter(|| {
            rt.block_on(async {
                let results = scan_files_concurrent(Arc::clone(&job), paths.clone(), None)
                    .await
                    .unwrap();
                black_box(results.len())
            })
        })
    });
    group.finish();
}

criterion_group!(benches, bench_scan, bench_canonicalize, bench_prepare, bench_scan_files);
criterion_main!(benches);
