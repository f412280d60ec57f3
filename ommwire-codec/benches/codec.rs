//! Codec benchmarks.

use bytes::Bytes;
use criterion::{Criterion, criterion_group, criterion_main};
use ommwire_codec::{
    clone_msg, FieldList, FieldListView, Msg, MsgKey, MsgView, Payload, Value,
};
use ommwire_core::{DataState, DataType, Real, RealHint, State, StreamState};
use std::hint::black_box;

fn market_price_field_list() -> FieldList {
    let mut list = FieldList::new();
    list.add(22, Value::Real(Real::new(2995, RealHint::ExponentNeg2)))
        .add(25, Value::Real(Real::new(2998, RealHint::ExponentNeg2)))
        .add(30, Value::UInt(100))
        .add(31, Value::UInt(200))
        .add(3, Value::Ascii("TRI.N".into()));
    list
}

fn refresh_bytes() -> Bytes {
    let state = State::new(StreamState::Open, DataState::Ok).with_text("ok");
    Msg::refresh(6, 5, state)
        .with_key(MsgKey::with_name("TRI.N"))
        .with_payload(Payload::new(
            DataType::FieldList,
            market_price_field_list().encode().unwrap(),
        ))
        .encode()
        .unwrap()
}

fn benchmark_field_list_encode(c: &mut Criterion) {
    let list = market_price_field_list();
    c.bench_function("field_list_encode", |b| {
        b.iter(|| black_box(&list).encode().unwrap())
    });
}

fn benchmark_field_list_iterate(c: &mut Criterion) {
    let raw = market_price_field_list().encode().unwrap();
    let view = FieldListView::decode(raw).unwrap();
    c.bench_function("field_list_iterate", |b| {
        b.iter(|| {
            for entry in black_box(&view).iter() {
                black_box(entry.unwrap().load());
            }
        })
    });
}

fn benchmark_msg_bind(c: &mut Criterion) {
    let raw = refresh_bytes();
    let mut view = MsgView::new();
    c.bench_function("refresh_bind", |b| {
        b.iter(|| view.bind(black_box(raw.clone())).unwrap())
    });
}

fn benchmark_msg_clone(c: &mut Criterion) {
    let mut view = MsgView::new();
    view.bind(refresh_bytes()).unwrap();
    c.bench_function("refresh_clone", |b| {
        b.iter(|| clone_msg(black_box(&view)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_field_list_encode,
    benchmark_field_list_iterate,
    benchmark_msg_bind,
    benchmark_msg_clone,
);
criterion_main!(benches);
