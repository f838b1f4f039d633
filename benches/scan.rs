use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use wallet_sim::config::ScanConfig;
use wallet_sim::data::Value;
use wallet_sim::similarity::find_similarities;
use wallet_sim::workbook::Sheet;

fn generate_wallets(rows: usize) -> Sheet {
    let mut sheet = Sheet::new("Sheet");
    sheet.push_values(
        ["wallet_number", "ua", "rs", "chain", "amt", "tc", "ibt", "lbt", "average"]
            .into_iter()
            .map(Value::from),
    );
    for i in 0..rows {
        let chain = match i % 3 {
            0 => "eth",
            1 => "sol",
            _ => "btc",
        };
        let month = (i % 12) + 1;
        let day = (i % 28) + 1;
        sheet.push_values(vec![
            Value::Integer(i as i64 + 1),
            Value::String(format!("0x{i:06x}")),
            Value::String(format!("r{i}")),
            Value::from(chain),
            Value::Integer((i % 7) as i64 * 100),
            Value::Integer((i % 5) as i64 + 1),
            Value::String(format!("2024-{month:02}-{day:02} 10:00:00")),
            Value::String(format!("2023-{month:02}-{day:02} 12:00:00")),
            Value::Float((i % 7) as f64 * 100.0 / ((i % 5) as f64 + 1.0)),
        ]);
    }
    sheet
}

fn scan_benchmark(c: &mut Criterion) {
    let config = ScanConfig::default();
    let mut group = c.benchmark_group("find_similarities");
    for rows in [250usize, 1_000] {
        let sheet = generate_wallets(rows);
        group.bench_function(format!("{rows}_rows"), |b| {
            b.iter_batched(
                || sheet.clone(),
                |sheet| find_similarities(&sheet, &config).expect("scan"),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, scan_benchmark);
criterion_main!(benches);
