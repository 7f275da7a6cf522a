//! Benchmarks for bridge crossings
//!
//! Run with: cargo bench -p tether

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use tether::{AccessFlags, Context, HostClass, HostFunction, Instance, Value};

fn native_access(c: &mut Criterion) {
    let ctx = Context::new().unwrap();
    let class = HostClass::with_flags("Point", AccessFlags::ALLOW_MODIFY_ATTR);
    let point = Instance::new(class).with_attr("x", 1).with_attr("y", 2).into_ref();
    let global = ctx.global_object().unwrap();
    global.set_attr("p", point).unwrap();
    global
        .set_attr("id", HostFunction::new("id", |args| Ok(args.first().cloned().unwrap_or_default())).into_ref())
        .unwrap();

    c.bench_function("native_get_1000", |b| {
        b.iter(|| ctx.evaluate(black_box("let s = 0; for (let i = 0; i < 1000; i++) s += p.x; s")).unwrap())
    });
    c.bench_function("native_set_1000", |b| {
        b.iter(|| ctx.evaluate(black_box("for (let i = 0; i < 1000; i++) p.y = i;")).unwrap())
    });
    c.bench_function("native_call_1000", |b| {
        b.iter(|| ctx.evaluate(black_box("for (let i = 0; i < 1000; i++) id(i);")).unwrap())
    });
}

fn engine_access(c: &mut Criterion) {
    let ctx = Context::new().unwrap();
    let object = ctx
        .evaluate("({ a: 1, b: 'two', sum(x, y) { return x + y; } })")
        .unwrap();
    let object = object.as_object().unwrap().clone();

    c.bench_function("engine_get_attr", |b| {
        b.iter(|| object.get_attr(black_box("a")).unwrap())
    });
    c.bench_function("engine_set_item", |b| {
        b.iter(|| object.set_item(black_box("a"), Value::Number(2.0)).unwrap())
    });
    c.bench_function("engine_call_method", |b| {
        b.iter(|| {
            object
                .call_method("sum", &[Value::Number(1.0), Value::Number(2.0)])
                .unwrap()
        })
    });
    c.bench_function("engine_keys", |b| {
        b.iter(|| object.keys().unwrap().count())
    });
}

criterion_group!(benches, native_access, engine_access);
criterion_main!(benches);
