use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sheet_ingest::ingestion::{Ingestor, ReaderConfig};

fn people_csv(rows: usize) -> Vec<u8> {
    let mut out = String::from("id,name,score,city\n");
    for i in 0..rows {
        // Every 50th row carries a non-numeric score and lands in the error bucket.
        let score = if i % 50 == 49 { "n/a".to_string() } else { format!("{}.5", i % 100) };
        out.push_str(&format!("{i},person-{i},{score},\"City, {}\"\n", i % 7));
    }
    out.into_bytes()
}

fn bench_csv(c: &mut Criterion) {
    let input = people_csv(10_000);
    let mut ingestor = Ingestor::new(ReaderConfig::default());

    c.bench_function("read_csv_bytes_10k_rows", |b| {
        b.iter(|| {
            ingestor.read_csv_bytes(black_box(&input)).unwrap();
            black_box(ingestor.rows().len())
        })
    });
}

criterion_group!(benches, bench_csv);
criterion_main!(benches);
