// Signature and evaluation benchmarks for the submission path.
//
// Covers digest encoding, verification and a full pipeline evaluation
// against the seeded partner directory.

use std::sync::Arc;

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use trxgate_protocol::crypto::{encode_signature, verify_signature};
use trxgate_protocol::directory::InMemoryPartnerDirectory;
use trxgate_protocol::message::{format_timestamp, validate_request, ItemDetail, TransactionRequest};
use trxgate_protocol::pipeline::TransactionPipeline;

const CANONICAL: &str = "20240815021122FAKEGOOGLEFG-000000011000FAKEPASSWORD1234";

fn bench_encode_signature(c: &mut Criterion) {
    c.bench_function("digest/encode_signature", |b| {
        b.iter(|| encode_signature(CANONICAL));
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let sig = encode_signature(CANONICAL);
    c.bench_function("digest/verify_signature", |b| {
        b.iter(|| verify_signature(CANONICAL, &sig));
    });
}

fn signed_request(items: usize) -> TransactionRequest {
    let items: Vec<ItemDetail> = (0..items)
        .map(|i| ItemDetail {
            item_ref: format!("i-{i:05}"),
            name: "Pen".into(),
            qty: 2,
            unit_price: 500,
        })
        .collect();
    let mut req = TransactionRequest {
        partner_key: "FAKEGOOGLE".into(),
        partner_ref_no: "FG-00000001".into(),
        partner_password: "FAKEPASSWORD1234".into(),
        total_amount: 1000 * items.len() as i64,
        timestamp: format_timestamp(&Utc::now()),
        signature: String::new(),
        items,
    };
    req.sign().unwrap();
    req
}

fn bench_full_submission(c: &mut Criterion) {
    let pipeline = TransactionPipeline::new(Arc::new(InMemoryPartnerDirectory::seeded()));
    let mut group = c.benchmark_group("pipeline/submit");

    for &items in &[1usize, 10, 100] {
        let req = signed_request(items);
        group.throughput(Throughput::Elements(items as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &req, |b, req| {
            b.iter(|| {
                validate_request(req).unwrap();
                pipeline.evaluate(req)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_signature,
    bench_verify_signature,
    bench_full_submission
);
criterion_main!(benches);
