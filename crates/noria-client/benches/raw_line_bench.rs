//! Raw-line layout and whole-line re-render costs.
//!
//! Run with: cargo bench -p noria-client --bench raw_line_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use noria_client::Reconciler;
use noria_client::segments::{Metrics, Run, render_segments};
use noria_dom::HeadlessDocument;
use serde_json::json;
use std::hint::black_box;

const METRICS: Metrics = Metrics {
    width: 8.0,
    height: 16.0,
};

/// A line of `width` chars with alternating keyword/plain runs of 4.
fn line(width: usize) -> (String, Vec<Run>, Vec<Run>) {
    let text: String = (0..width).map(|i| (b'a' + (i % 26) as u8) as char).collect();
    let fg = (0..width / 4)
        .map(|i| Run::new(4, (i % 2 == 0).then_some("kw")))
        .collect();
    let bg = vec![Run::new(width / 3, None), Run::new(width / 3, Some("sel"))];
    (text, fg, bg)
}

fn bench_render_segments(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_line/render_segments");
    for width in [80usize, 200, 1000] {
        let (text, fg, bg) = line(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| render_segments(black_box(&text), black_box(&fg), black_box(&bg), METRICS));
        });
    }
    group.finish();
}

fn bench_update_props(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_line/update_props");
    for width in [80usize, 200] {
        let (text, fg, bg) = line(width);
        let fg: Vec<_> = fg.into_iter().map(|r| json!([r.len, r.class])).collect();
        let bg: Vec<_> = bg.into_iter().map(|r| json!([r.len, r.class])).collect();
        let mut reconciler = Reconciler::new(HeadlessDocument::new());
        let setup = json!([
            {"update_type": "make-node", "make-node_node": 0, "make-node_type": "div"},
            {"update_type": "make-node", "make-node_node": 1, "make-node_type": "raw-line",
             "make-node_props": {"metrics": {"width": 8, "height": 16}, "text": text,
                                 "fg-markup": fg, "bg-markup": bg}},
            {"update_type": "add", "add_parent": 0, "add_child": 1, "add_index": 0}
        ]);
        if let Err(err) = reconciler.process_frame(&setup.to_string()) {
            panic!("setup frame failed: {err}");
        }
        let update = json!([
            {"update_type": "update-props", "update-props_node": 1,
             "update-props_props-diff": {"text": text.to_uppercase()}}
        ])
        .to_string();
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| reconciler.process_frame(black_box(&update)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_segments, bench_update_props);
criterion_main!(benches);
