//! Benchmarks for SDL parsing and extraction.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::indexing_slicing)]

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sheet_sdl::instance::append_row;
use sheet_sdl::memory::{MemoryWorkbook, SheetBuilder};
use sheet_sdl::Parser;

const SMALL_SDL: &str = "declare-type\t\"Product\"\tString\ndeclare-type\t\"Price\"\tGBPxVAT\ndeclare-header\tA1:B1\ndeclare-data\tA2:B3\n";

fn wide_sdl(columns: usize) -> String {
    let mut src = String::new();
    let mut end_col = String::new();
    for i in 0..columns {
        let name = format!("Col{i}");
        src.push_str(&format!("declare-type\t\"{name}\"\tString\n"));
        end_col = column_letter(i);
    }
    src.push_str(&format!("declare-header\tA1:{end_col}1\n"));
    src.push_str(&format!("declare-data\tA2:{end_col}1001\n"));
    src
}

fn column_letter(zero_based: usize) -> String {
    let mut n = zero_based + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + u8::try_from(rem).unwrap_or(0));
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn bench_parse_small(c: &mut Criterion) {
    c.bench_function("parse_small_sdl", |b| {
        b.iter(|| {
            let mut parser = Parser::new(Cursor::new(black_box(SMALL_SDL).as_bytes()));
            parser.parse().expect("parse small sdl").validate()
        })
    });
}

fn bench_parse_wide(c: &mut Criterion) {
    let src = wide_sdl(50);
    let mut group = c.benchmark_group("parse_wide_sdl");
    group.throughput(Throughput::Bytes(src.len() as u64));
    group.bench_with_input(BenchmarkId::new("columns", 50), &src, |b, src| {
        b.iter(|| {
            let mut parser = Parser::new(Cursor::new(black_box(src.as_bytes())));
            parser.parse().expect("parse wide sdl").validate()
        })
    });
    group.finish();
}

fn bench_extract_1000_rows(c: &mut Criterion) {
    let mut parser = Parser::new(Cursor::new(SMALL_SDL.as_bytes()));
    let metadata = parser
        .parse()
        .expect("parse small sdl")
        .validate()
        .expect("validate small sdl");

    let mut builder = SheetBuilder::new().row(&["Product", "Price"]);
    for i in 0..1000 {
        let name = format!("item-{i}");
        builder = builder.row(&[name.as_str(), "1.00"]);
    }
    let sheet = builder.build();
    let workbook = MemoryWorkbook::single(sheet);

    let mut group = c.benchmark_group("extract");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("extract_1000_rows", |b| {
        b.iter(|| {
            let mut instance = metadata.bind(black_box(&workbook));
            let mut rows = Vec::new();
            instance
                .extract(&mut rows, append_row)
                .expect("extract 1000 rows");
            rows.len()
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_small,
    bench_parse_wide,
    bench_extract_1000_rows,
);
criterion_main!(benches);
