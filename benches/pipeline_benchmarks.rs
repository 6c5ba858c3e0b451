//! Performance benchmarks for the compile-and-invoke pipeline.
//!
//! - Compile: source text to a loaded module, per test script
//! - Invoke: bound calls against an already-created instance
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use quickc::{PolicyOverrides, compile};
use std::hint::black_box;
use std::path::PathBuf;

fn load_script(filename: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn fixed_name() -> Option<PolicyOverrides> {
    Some(PolicyOverrides::new().with_module_name("bench"))
}

fn compile_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("pipeline/compile");
    for script in ["greeter.cs", "counter.cs", "control_flow.cs", "library.cs"] {
        let source = load_script(script);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(script, |b| {
            b.iter(|| {
                let module = compile(black_box(&source), fixed_name()).expect("Failed to compile");
                black_box(module);
                end_profiling_frame();
            });
        });
    }
    group.finish();
}

fn invoke_benchmarks(c: &mut Criterion) {
    let module = compile(&load_script("control_flow.cs"), fixed_name()).expect("Failed to compile");
    let loops = module.create_instance("Loops").expect("Failed to create instance");

    let mut group = c.benchmark_group("pipeline/invoke");
    let sum_to = loops.bind::<(i32,), i32>("SumTo").expect("Failed to bind");
    group.bench_function("sum_to_1000", |b| {
        b.iter(|| black_box(sum_to.invoke(black_box((1000,))).expect("Failed to invoke")));
    });
    let fib = loops.bind::<(i32,), i32>("Fib").expect("Failed to bind");
    group.bench_function("fib_20", |b| {
        b.iter(|| black_box(fib.invoke(black_box((20,))).expect("Failed to invoke")));
    });
    group.finish();

    c.bench_function("pipeline/create_instance", |b| {
        b.iter(|| black_box(module.create_instance("Loops").expect("Failed to create instance")));
    });
}

criterion_group!(benches, compile_benchmarks, invoke_benchmarks);
criterion_main!(benches);
