use blogchat::core::frame_parser::FrameParser;
use blogchat::core::reconcile::{trim_overlap, Reconciler};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Frames that each restate the last `overlap` characters of the previous one.
fn overlapping_frames(count: usize, width: usize, overlap: usize) -> Vec<String> {
    let text: String = "the quick brown fox jumps over the lazy dog "
        .chars()
        .cycle()
        .take(count * width + overlap)
        .collect();
    (0..count)
        .map(|i| {
            let start = (i * width).saturating_sub(if i == 0 { 0 } else { overlap });
            text[start..(i + 1) * width].to_string()
        })
        .collect()
}

fn sse_body(frames: &[String]) -> Vec<u8> {
    frames
        .iter()
        .map(|chunk| format!("data: {}\n\n", serde_json::json!({ "chunk": chunk })))
        .collect::<String>()
        .into_bytes()
}

fn bench_trim_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("trim_overlap");
    for width in [16usize, 128, 1024] {
        let previous: String = "x".repeat(width);
        let new: String = format!("{}{}", "x".repeat(width / 4), "y".repeat(width));
        group.throughput(Throughput::Bytes(new.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| trim_overlap(&previous, &new).len())
        });
    }
    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_reconcile");
    for read_size in [64usize, 1024, 16 * 1024] {
        let frames = overlapping_frames(500, 40, 12);
        let body = sse_body(&frames);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(read_size),
            &read_size,
            |b, &read_size| {
                b.iter(|| {
                    let mut parser = FrameParser::new();
                    let mut reconciler = Reconciler::new();
                    for read in body.chunks(read_size) {
                        for frame in parser.push(read) {
                            if let Ok(blogchat::core::frame_parser::Frame::Payload(payload)) = frame
                            {
                                reconciler.apply(payload.chunk_text());
                            }
                        }
                    }
                    reconciler.into_accumulated_text().len()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_trim_overlap, bench_session);
criterion_main!(benches);
