use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use palaver::core::message::{Message, Role};
use palaver::ui::transcript::Transcript;

fn make_messages(n_pairs: usize, base: &str) -> Vec<Message> {
    let start = Utc::now();
    let mut v = Vec::with_capacity(n_pairs * 2);
    for i in 0..n_pairs * 2 {
        v.push(Message {
            id: format!("mem-{i:08}"),
            role: if i % 2 == 0 { Role::User } else { Role::Assistant },
            content: base.into(),
            created_at: start + Duration::milliseconds(i as i64),
        });
    }
    v
}

fn bench_transcript(c: &mut Criterion) {
    let base = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor incididunt ut labore et dolore magna aliqua\n\nsecond paragraph";

    for &pairs in &[100usize, 400usize] {
        let messages = make_messages(pairs, base);
        let built = Transcript::build_display_lines(&messages);

        let mut group = c.benchmark_group(format!("transcript_pairs{}", pairs));
        group.throughput(Throughput::Elements(messages.len() as u64));

        group.bench_function("build_lines", |b| {
            b.iter(|| Transcript::build_display_lines(&messages))
        });

        for &width in &[80u16, 120u16] {
            group.bench_function(BenchmarkId::new("wrapped_count", width), |b| {
                b.iter(|| Transcript::wrapped_line_count(&built, width))
            });
            group.bench_function(BenchmarkId::new("scroll_to_bottom", width), |b| {
                b.iter(|| Transcript::scroll_to_bottom(&messages, width, 40))
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_transcript);
criterion_main!(benches);
