use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use plb::prelude::*;
use plb::Call;
use std::hint::black_box;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// End-to-end overhead of one dispatch through `LoadBalancer`: queue push,
/// worker pick-up, a real (loopback) HTTP round trip, and response delivery.
fn single_node_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let (lb, _server) = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let lb = LoadBalancer::new(PrioQueueConfig::builder().build(), PoolConfig::builder().build());
        lb.add_node(NodeConfig::builder(server.uri()).num_workers(4).build());
        (lb, server)
    });

    c.bench_function("single_node_dispatch_roundtrip", |b| {
        b.iter(|| {
            rt.block_on(async {
                let resp = lb.dispatch(Call::new("bench", Bytes::new())).await.unwrap();
                black_box(resp);
            })
        })
    });

    rt.block_on(lb.shutdown());
}

criterion_group!(benches, single_node_dispatch);
criterion_main!(benches);
