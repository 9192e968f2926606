use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hydroprofile::app::services::profile_decoder::ProfileTextDecoder;
use hydroprofile::{LocationId, ParameterInfo, ParserDefinition, TimeSpec};

fn indexed_definition(parameters: usize) -> ParserDefinition {
    ParserDefinition {
        location_id: LocationId::new("SWT", "KEYS"),
        key_parameter: "Depth".to_string(),
        time_zone: "America/Chicago".to_string(),
        time_format: "YYYY-MM-DD HH24:MI:SS".to_string(),
        time_spec: TimeSpec::Indexed {
            time_field: 0,
            second_time_field: None,
            field_delimiter: ",".to_string(),
            record_delimiter: "\n".to_string(),
        },
        parameters: (0..parameters)
            .map(|i| ParameterInfo::indexed(&format!("P{}", i), "m", i, i + 1))
            .collect(),
    }
}

fn indexed_extract(records: usize, parameters: usize) -> String {
    let mut text = String::with_capacity(records * (20 + parameters * 6));
    for r in 0..records {
        let minute = r % 60;
        let hour = (r / 60) % 24;
        text.push_str(&format!("2024-05-01 {:02}:{:02}:00", hour, minute));
        for p in 0..parameters {
            // Every seventh cell is empty
            if (r + p) % 7 == 0 {
                text.push(',');
            } else {
                text.push_str(&format!(",{}.{}", p, r % 10));
            }
        }
        text.push('\n');
    }
    text
}

fn columnar_extract(records: usize) -> String {
    (0..records)
        .map(|r| format!("{:>13}{:>8.2}{:>8.2}\n", 1_714_521_600_000_i64 + r as i64 * 60_000, r as f64 * 0.5, 12.25))
        .collect()
}

fn columnar_definition() -> ParserDefinition {
    ParserDefinition {
        location_id: LocationId::new("SWT", "KEYS"),
        key_parameter: "Depth".to_string(),
        time_zone: "UTC".to_string(),
        time_format: "EPOCH_MILLIS".to_string(),
        time_spec: TimeSpec::Columnar {
            time_start: 0,
            time_length: 13,
        },
        parameters: vec![
            ParameterInfo::columnar("Depth", "m", 0, 13, 8),
            ParameterInfo::columnar("Temp-Water", "C", 1, 21, 8),
        ],
    }
}

fn bench_indexed(c: &mut Criterion) {
    let decoder = ProfileTextDecoder::new();
    let mut group = c.benchmark_group("decode_indexed");

    for records in [100, 1_000, 10_000] {
        let definition = indexed_definition(4);
        let text = indexed_extract(records, 4);
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &text, |b, text| {
            b.iter(|| decoder.decode(black_box(text), &definition))
        });
    }
    group.finish();
}

fn bench_columnar(c: &mut Criterion) {
    let decoder = ProfileTextDecoder::new();
    let definition = columnar_definition();
    let text = columnar_extract(10_000);

    let mut group = c.benchmark_group("decode_columnar");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("10000_lines", |b| {
        b.iter(|| decoder.decode(black_box(&text), &definition))
    });
    group.finish();
}

criterion_group!(benches, bench_indexed, bench_columnar);
criterion_main!(benches);
