//! Streamable codec and envelope benchmarks.

use bytes::Bytes;
use chianet_protocol::{
    unwrap, unwrap_payload, wrap, Handshake, Message, NodeType, ProtocolMessageType,
    RespondPeers, TimestampedPeerInfo,
};
use chianet_streamable::{marshal, unmarshal};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn create_handshake() -> Handshake {
    Handshake::new("mainnet", "1.2.11", 8444, NodeType::FullNode)
}

fn create_peers(count: usize) -> RespondPeers {
    RespondPeers::new(
        (0..count)
            .map(|i| {
                TimestampedPeerInfo::new(
                    format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff),
                    8444,
                    1_700_000_000 + i as u64,
                )
            })
            .collect(),
    )
}

fn bench_handshake(c: &mut Criterion) {
    let mut group = c.benchmark_group("handshake");
    let handshake = create_handshake();
    let encoded = marshal(&handshake).unwrap();

    group.throughput(Throughput::Elements(1));
    group.bench_function("marshal", |b| {
        b.iter(|| black_box(marshal(&handshake).unwrap()));
    });
    group.bench_function("unmarshal", |b| {
        b.iter(|| black_box(unmarshal::<Handshake>(&encoded).unwrap()));
    });

    group.finish();
}

fn bench_respond_peers_marshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("respond_peers_marshal");

    for count in [10, 100, 1000] {
        let peers = create_peers(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &peers, |b, peers| {
            b.iter(|| black_box(marshal(peers).unwrap()));
        });
    }

    group.finish();
}

fn bench_respond_peers_unmarshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("respond_peers_unmarshal");

    for count in [10, 100, 1000] {
        let encoded = marshal(&create_peers(count)).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &encoded, |b, encoded| {
            b.iter(|| black_box(unmarshal::<RespondPeers>(encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    for size in [100, 1000, 10000] {
        let message = Message::new(ProtocolMessageType(200), Bytes::from(vec![0x42u8; size]))
            .with_id(7);
        let encoded = message.encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &message, |b, message| {
            b.iter(|| black_box(message.encode().unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| black_box(unwrap(encoded).unwrap()));
        });
    }

    group.finish();
}

fn bench_wrap_unwrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap_unwrap");
    let peers = create_peers(100);
    let wrapped = wrap(ProtocolMessageType::RESPOND_PEERS, &peers).unwrap();

    group.bench_function("wrap", |b| {
        b.iter(|| black_box(wrap(ProtocolMessageType::RESPOND_PEERS, &peers).unwrap()));
    });
    group.bench_function("unwrap_payload", |b| {
        b.iter(|| black_box(unwrap_payload::<RespondPeers>(&wrapped).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_handshake,
    bench_respond_peers_marshal,
    bench_respond_peers_unmarshal,
    bench_envelope,
    bench_wrap_unwrap,
);

criterion_main!(benches);
