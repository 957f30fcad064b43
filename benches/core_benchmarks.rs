use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xmlrpc_client::codec::{decode_response, encode_call, encode_response, Response};
use xmlrpc_client::value::{Members, Value};

fn sample_struct() -> Value {
    let rows: Vec<Value> = (0..32i32)
        .map(|i| {
            Value::Struct(
                Members::new()
                    .with("id", i)
                    .with("name", format!("row-{}", i))
                    .with("score", i as f64 * 0.5)
                    .with("active", i % 2 == 0),
            )
        })
        .collect();
    Value::Struct(Members::new().with("rows", rows).with("blob", Value::base64(vec![7u8; 256])))
}

fn bench_encode_call(c: &mut Criterion) {
    let params = vec![Value::Integer(2), Value::Integer(3), sample_struct()];

    c.bench_function("encode_call_struct", |b| {
        b.iter(|| encode_call(black_box("sum"), black_box(&params)))
    });
}

fn bench_decode_response(c: &mut Criterion) {
    let small = encode_response(&Response::Success(Value::Integer(5)));
    let large = encode_response(&Response::Success(sample_struct()));
    let fault = encode_response(&Response::Fault {
        code: 4,
        message: "Too many parameters.".to_string(),
    });

    c.bench_function("decode_response_int", |b| {
        b.iter(|| decode_response(black_box(&small)))
    });
    c.bench_function("decode_response_struct", |b| {
        b.iter(|| decode_response(black_box(&large)))
    });
    c.bench_function("decode_response_fault", |b| {
        b.iter(|| decode_response(black_box(&fault)))
    });
}

criterion_group!(benches, bench_encode_call, bench_decode_response);
criterion_main!(benches);
