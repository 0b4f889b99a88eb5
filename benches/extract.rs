// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use nereid_drawio::format::drawio::{
    deflate_diagram_page, extract_node_by_id, extract_nodes, parse_document,
};

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Groups: `extract.parse`, `extract.node_by_id`, `extract.all_nodes`
fn benches_extract(c: &mut Criterion) {
    let small = fixtures::document_text(20, 12);
    let large = fixtures::document_text(2_000, 48);
    let compressed = {
        let document = fixtures::document_text(2_000, 48);
        let model_start = document.find("<mxGraphModel>").expect("model start");
        let model_end = document.find("</diagram>").expect("model end");
        format!(
            r#"<mxfile host="bench"><diagram name="Page-1" id="bench">{}</diagram></mxfile>"#,
            deflate_diagram_page(&document[model_start..model_end])
        )
    };

    let mut group = c.benchmark_group("extract.parse");
    for (case, text) in [
        ("small", &small),
        ("large", &large),
        ("large_compressed", &compressed),
    ] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(case, |b| {
            b.iter(|| {
                let document = parse_document(black_box(text)).expect("parse");
                black_box(fixtures::checksum_document(&document))
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("extract.node_by_id");
    for (case, id) in [
        ("large_first", fixtures::vertex_id(0)),
        ("large_last", fixtures::edge_id(1_999)),
        ("large_missing", "absent".to_owned()),
    ] {
        group.bench_function(case, |b| {
            b.iter(|| black_box(extract_node_by_id(black_box(&large), black_box(&id))))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("extract.all_nodes");
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| {
        b.iter(|| black_box(extract_nodes(black_box(&large)).expect("extract").len()))
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_extract
}
criterion_main!(benches);
