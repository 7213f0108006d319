//! Benchmarks for the response dashboard
//!
//! Run with: cargo bench -p formdesk-core
//!
//! Covers the per-render work on the responses page:
//! - Search and date filtering
//! - CSV export of the filtered rows

use chrono::{NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use formdesk_core::{
    filter_responses, responses_to_csv, AnswerValue, Answers, FieldId, FieldRecord, FieldType,
    FormId, ResponseFilter, ResponseRecord,
};

fn fields(form_id: FormId) -> Vec<FieldRecord> {
    let columns = [
        ("Full Name", FieldType::ShortText),
        ("Email", FieldType::Email),
        ("Program / Branch", FieldType::Select),
        ("Motivation", FieldType::LongText),
        ("Roles", FieldType::Checkbox),
    ];
    columns.iter()
        .enumerate()
        .map(|(i, (label, field_type))| FieldRecord {
            id: FieldId::new(),
            form_id,
            label: label.to_string(),
            field_type: *field_type,
            required: true,
            help_text: None,
            options: None,
            sort_order: i as u32,
            created_at: Utc::now(),
        })
        .collect()
}

fn responses(fields: &[FieldRecord], count: usize) -> Vec<ResponseRecord> {
    (0..count)
        .map(|i| {
            let mut answers = Answers::new();
            answers.insert(fields[0].answer_key(), format!("Respondent {}", i).into());
            answers.insert(fields[1].answer_key(), format!("user{}@uni.edu", i).into());
            answers.insert(fields[2].answer_key(), "CSE".into());
            answers.insert(
                fields[3].answer_key(),
                "Line one\nline \"two\", with a comma".into(),
            );
            answers.insert(
                fields[4].answer_key(),
                AnswerValue::List(vec!["Ops".into(), "Design".into()]),
            );
            ResponseRecord::new(
                fields[0].form_id,
                answers,
                Some(format!("user{}@uni.edu", i)),
            )
        })
        .collect()
}

// ============================================================================
// Filter Benchmarks
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_responses");
    let fields = fields(FormId::new());

    for size in [100, 1000, 10000] {
        let rows = responses(&fields, size);
        group.throughput(Throughput::Elements(size as u64));

        let search = ResponseFilter {
            search: Some("user99".into()),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("search", size), &rows, |b, rows| {
            b.iter(|| black_box(filter_responses(&fields, rows, &search).len()))
        });

        let dated = ResponseFilter {
            search: None,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2099, 12, 31),
        };
        group.bench_with_input(BenchmarkId::new("date_range", size), &rows, |b, rows| {
            b.iter(|| black_box(filter_responses(&fields, rows, &dated).len()))
        });
    }

    group.finish();
}

// ============================================================================
// Export Benchmarks
// ============================================================================

fn bench_csv_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("responses_to_csv");
    let fields = fields(FormId::new());

    for size in [100, 1000, 10000] {
        let rows = responses(&fields, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| black_box(responses_to_csv(&fields, rows.iter())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_csv_export);
criterion_main!(benches);
