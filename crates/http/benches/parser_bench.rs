use std::hint::black_box;

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use reactor_http::codec::{RequestDecoder, ResponseDecoder, ResponseEncoder};
use reactor_http::protocol::{Delivery, Response};
use reactor_http::server::{DateCache, ServerSession, make_handler};
use tokio_util::codec::{Decoder, Encoder};

const CURL_REQUEST: &[u8] = b"GET /index.html HTTP/1.1\r\nHost: 127.0.0.1:8080\r\nUser-Agent: curl/7.79.1\r\nAccept: */*\r\n\r\n";

const EDGE_REQUEST: &[u8] = b"GET /index/?a=1&b=2&a=3 HTTP/1.1\r\n\
Host: 127.0.0.1:8080\r\n\
Connection: keep-alive\r\n\
Cache-Control: max-age=0\r\n\
sec-ch-ua: \"#Not_A Brand\";v=\"99\", \"Microsoft Edge\";v=\"109\", \"Chromium\";v=\"109\"\r\n\
sec-ch-ua-mobile: ?0\r\n\
sec-ch-ua-platform: \"macOS\"\r\n\
Upgrade-Insecure-Requests: 1\r\n\
User-Agent: Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36 Edg/109.0.1518.52\r\n\
Accept: text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8\r\n\
Accept-Encoding: gzip, deflate, br\r\n\
Accept-Language: zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7\r\n\r\n";

fn chunked_response() -> Vec<u8> {
    let mut wire = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    for _ in 0..16 {
        wire.extend_from_slice(b"100\r\n");
        wire.extend_from_slice(&[b'x'; 256]);
        wire.extend_from_slice(b"\r\n");
    }
    wire.extend_from_slice(b"0\r\n\r\n");
    wire
}

fn bench_request_decoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_decoder");

    for (name, wire) in [("curl", CURL_REQUEST), ("edge", EDGE_REQUEST)] {
        group.bench_function(name, |b| {
            let mut decoder = RequestDecoder::new(Delivery::Whole);
            b.iter(|| {
                let mut src = BytesMut::from(wire);
                black_box(decoder.decode(&mut src).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_response_decoder(c: &mut Criterion) {
    let wire = chunked_response();
    let mut group = c.benchmark_group("response_decoder");

    for (name, delivery) in [("chunked_whole", Delivery::Whole), ("chunked_streaming", Delivery::Streaming)] {
        group.bench_function(name, |b| {
            let mut decoder = ResponseDecoder::new(delivery);
            b.iter(|| {
                let mut src = BytesMut::from(wire.as_slice());
                while let Some(message) = decoder.decode(&mut src).unwrap() {
                    black_box(message);
                }
            });
        });
    }

    group.finish();
}

fn bench_response_encoder(c: &mut Criterion) {
    let mut response = Response::new(200, "Hello World!\r\n");
    response.add_header_field("Content-Type", "text/plain");
    response.add_header_field("Date", DateCache::new().load());

    c.bench_function("response_encoder", |b| {
        let mut dst = BytesMut::with_capacity(1024);
        b.iter(|| {
            dst.clear();
            ResponseEncoder.encode(black_box(&response), &mut dst).unwrap();
        });
    });
}

fn bench_server_session(c: &mut Criterion) {
    let handler = make_handler(|session: &mut ServerSession, _request| session.respond(200, Some("text/plain"), "ok"));
    let date = DateCache::new();

    c.bench_function("server_session_roundtrip", |b| {
        b.iter(|| {
            let mut session = ServerSession::new(date.clone(), None, None);
            let mut src = BytesMut::from(CURL_REQUEST);
            session.on_data(&mut src, &handler);
            black_box(session.outbox_mut().pop());
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_response_decoder, bench_response_encoder, bench_server_session);
criterion_main!(benches);
