//! Benchmarks for highlighting and the comment cascade.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use quill::editor::TextBuffer;
use quill::highlight::{PROFILES, highlight_line};

fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("\tint value_{i} = {i} * 2; // \"quoted\" {i}.5"))
        .collect()
}

fn bench_highlight_line(c: &mut Criterion) {
    let line = b"static int count = 42; /* inline */ char *name = \"quill\";".to_vec();
    c.bench_function("highlight_line", |b| {
        b.iter(|| highlight_line(black_box(&line), Some(&PROFILES[0]), false))
    });
}

fn bench_cascade(c: &mut Criterion) {
    let mut buffer = TextBuffer::from_lines(sample_lines(2_000), Some(PROFILES[0]));
    c.bench_function("open_and_close_comment_2000_rows", |b| {
        b.iter(|| {
            buffer.insert_char(0, 0, b'*');
            buffer.insert_char(0, 0, b'/');
            buffer.delete_char(0, 0);
            buffer.delete_char(0, 0);
        });
    });
}

criterion_group!(benches, bench_highlight_line, bench_cascade);
criterion_main!(benches);
