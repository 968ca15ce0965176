//! Benchmarks for episode page extraction at varying page sizes.
//!
//! Run with: `cargo bench --bench extract_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use anistream::stream::extract::isolate_expression;
use anistream::{StreamExtractor, StreamValidator};

const SERVER_MAP: &str = r#"var videos = {"SW": "https://sw.example/e/abc123.m3u8", "Okru": ["//ok.example/videoembed/998877", "https://redirector.googlevideo.com/videoplayback?id=1"], "YourUpload": "https://yu.example/embed/xyz", "Stape": "about:blank"};"#;

/// Generate an episode page of approximately `target_bytes` with the server
/// map in the last inline script, after the filler markup.
fn generate_page(target_bytes: usize) -> String {
    let header = r#"<!DOCTYPE html>
<html lang="es">
<head><meta charset="UTF-8"><title>Episode</title>
<script src="/assets/js/app.js"></script>
<script>var anime_info = ["20", "Naruto", "naruto"];</script>
</head>
<body>
<nav><ul><li><a href="/">Inicio</a></li><li><a href="/browse">Directorio</a></li></ul></nav>
<main>
"#;

    let comment = "<div class=\"Comment\"><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
        Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.</p></div>\n";
    let related = r#"<article class="Anime"><a href="/anime/related"><h3 class="Title">Related</h3></a></article>"#;

    let mut html = String::with_capacity(target_bytes + 1024);
    html.push_str(header);

    let blocks = [comment, comment, related, "\n"];
    let mut block_idx = 0;
    while html.len() < target_bytes {
        html.push_str(blocks[block_idx % blocks.len()]);
        block_idx += 1;
    }

    html.push_str("</main>\n<script>");
    html.push_str(SERVER_MAP);
    html.push_str("</script>\n</body>\n</html>");
    html
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_extract");
    let extractor = StreamExtractor::default();

    let sizes: &[(usize, &str)] = &[
        (4_096, "4KB"),
        (40_960, "40KB"),
        (204_800, "200KB"),
    ];

    for &(size, label) in sizes {
        let page = generate_page(size);

        group.throughput(Throughput::Bytes(page.len() as u64));
        group.bench_with_input(BenchmarkId::new("page", label), &page, |b, page| {
            b.iter(|| black_box(extractor.extract(black_box(page)).unwrap()));
        });
    }

    group.finish();
}

fn bench_isolate_and_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_pipeline");

    group.bench_function("isolate_expression", |b| {
        b.iter(|| black_box(isolate_expression(black_box(SERVER_MAP)).unwrap()));
    });

    let page = generate_page(40_960);
    let candidates = StreamExtractor::default().extract(&page).unwrap();
    let validator = StreamValidator::default();

    group.bench_function("validate", |b| {
        b.iter(|| black_box(validator.validate(black_box(candidates.clone()))));
    });

    group.finish();
}

criterion_group!(benches, bench_extract, bench_isolate_and_validate);
criterion_main!(benches);
