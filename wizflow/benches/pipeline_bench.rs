//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::collections::HashMap;
use wizflow::prelude::*;

fn pipeline_benchmark(c: &mut Criterion) {
    let runner = PipelineRunner::new();

    c.bench_function("ten_sync_actions", |b| {
        b.iter(|| {
            let pipeline: Vec<FinishAction> = (0..10)
                .map(|i| {
                    FinishAction::sync(format!("action_{i}"), move |ctx: ActionContext| {
                        ctx.set(format!("key_{i}"), json!(i));
                        Ok(())
                    })
                })
                .collect();
            let run = runner.start_run(pipeline, HashMap::new()).unwrap();
            let mut events = 0_usize;
            while let Some(event) = run.recv() {
                black_box(event);
                events += 1;
            }
            black_box(events)
        })
    });

    c.bench_function("context_snapshot", |b| {
        let context = FlowContext::new();
        for i in 0..64 {
            context.set(format!("key_{i}"), json!(i));
        }
        b.iter(|| black_box(context.snapshot().len()));
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
