use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jvbridge_core::{Bridge, BridgeOptions, HostType, JValue, JavaTypeId, MethodSignature, SlotList, StackBackend, ValueBackend};
use jvbridge_sdk::{PrimitiveBuffer, RawValue};
use jvbridge_sim::{ScriptValue, SimHost, SimStackEngine, SimValueEngine};

fn bench_primitives(c: &mut Criterion) {
    let host = SimHost::new();
    let options = BridgeOptions {
        check_balance: false,
        ..BridgeOptions::default()
    };
    let stack = Bridge::new(&host, StackBackend::new(SimStackEngine::new()), options.clone());
    let handles = Bridge::new(&host, ValueBackend::new(SimValueEngine::new()), options);
    let int = HostType::Scalar(JavaTypeId::Int);

    c.bench_function("ingress_int_stack", |b| {
        b.iter(|| {
            stack.backend().engine().push(black_box(300.0));
            let slot = stack.backend().take_top().unwrap();
            stack.ingress(int, slot).unwrap()
        });
    });

    c.bench_function("ingress_int_handles", |b| {
        b.iter(|| {
            let backend = handles.backend();
            let slot = backend.adopt(backend.engine().insert(black_box(300.0)));
            handles.ingress(int, slot).unwrap()
        });
    });

    c.bench_function("egress_int_stack", |b| {
        b.iter(|| drop(stack.egress(int, black_box(&JValue::Int(7))).unwrap()));
    });
}

fn bench_arrays(c: &mut Criterion) {
    let host = SimHost::new();
    let bridge = Bridge::new(
        &host,
        StackBackend::new(SimStackEngine::new()),
        BridgeOptions::default(),
    );
    let mut group = c.benchmark_group("byte_array");

    for len in [16usize, 256, 4096] {
        let values: Vec<f64> = (0..len).map(|i| (i % 300) as f64).collect();
        let source = ScriptValue::numbers(&values);
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("ingress", len), &source, |b, source| {
            b.iter(|| {
                bridge.backend().engine().push(source.clone());
                let slot = bridge.backend().take_top().unwrap();
                bridge.ingress(HostType::Array(JavaTypeId::Byte), slot).unwrap()
            });
        });

        let bytes: Vec<i8> = (0..len).map(|i| i as i8).collect();
        let array = JValue::object(&host, Some(host.new_array_from(PrimitiveBuffer::Byte(bytes))));
        group.bench_with_input(BenchmarkId::new("egress", len), &array, |b, array| {
            b.iter(|| drop(bridge.egress(HostType::Array(JavaTypeId::Byte), array).unwrap()));
        });
    }

    group.finish();
}

fn bench_host_call(c: &mut Criterion) {
    let host = SimHost::new();
    host.define_method("bench/Math", "add", "(II)I", true, |_, _, args| {
        let a = args[0].as_i32().unwrap_or_default();
        let b = args[1].as_i32().unwrap_or_default();
        Ok(RawValue::Int(a.wrapping_add(b)))
    });
    let bridge = Bridge::new(
        &host,
        ValueBackend::new(SimValueEngine::new()),
        BridgeOptions::default(),
    );
    let sig = MethodSignature::static_method("bench/Math", "add", "(II)I", bridge.options()).unwrap();

    c.bench_function("call_host_method", |b| {
        b.iter(|| {
            let backend = bridge.backend();
            let args = vec![backend.engine().insert(1.0), backend.engine().insert(2.0)];
            let args = SlotList::adopt(backend, args);
            drop(bridge.call_host_method(&sig, None, black_box(args)).unwrap())
        });
    });
}

criterion_group!(benches, bench_primitives, bench_arrays, bench_host_call);
criterion_main!(benches);
