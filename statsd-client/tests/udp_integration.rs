use std::{
    net::{Ipv4Addr, UdpSocket},
    time::Duration,
};

use statsd_client::{MetricBatch, MetricValue, StatsdBuilder, StatsdClient};

fn receiver() -> UdpSocket {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    socket
}

fn recv_payloads(socket: &UdpSocket, count: usize) -> Vec<String> {
    let mut buf = [0u8; 1024];
    (0..count)
        .map(|_| {
            let len = socket.recv(&mut buf).unwrap();
            String::from_utf8(buf[..len].to_vec()).unwrap()
        })
        .collect()
}

fn assert_no_more_payloads(socket: &UdpSocket) {
    socket.set_read_timeout(Some(Duration::from_millis(200))).unwrap();
    let mut buf = [0u8; 1024];
    assert!(socket.recv(&mut buf).is_err(), "unexpected extra datagram");
}

#[test]
fn sends_datagrams_to_statsd() {
    let server = receiver();
    let port = server.local_addr().unwrap().port();
    let client = StatsdClient::new("127.0.0.1", port).unwrap();

    client.record_timing("example.time", 500);
    client.increment("example.counter.inc");
    client.decrement("example.counter.dec");
    client.update_counters(["example.a", "example.b"], 10);

    let payloads = recv_payloads(&server, 5);
    assert_eq!(
        payloads,
        vec![
            "example.time:500|ms",
            "example.counter.inc:1|c",
            "example.counter.dec:-1|c",
            "example.a:10|c",
            "example.b:10|c",
        ]
    );
    assert_no_more_payloads(&server);
}

#[test]
fn resolves_hostnames_at_send_time() {
    let server = receiver();
    let port = server.local_addr().unwrap().port();
    let client = StatsdBuilder::default()
        .with_remote_address("localhost", port)
        .unwrap()
        .with_prefix("app")
        .build()
        .unwrap();

    let batch = [("hits", MetricValue::Counter(2)), ("render", MetricValue::Timing(16))]
        .into_iter()
        .collect::<MetricBatch>();
    client.send(&batch, 1.0);

    // IPv4 addresses are preferred when resolving, so `localhost` lands on the IPv4 receiver.
    assert_eq!(recv_payloads(&server, 2), vec!["app.hits:2|c", "app.render:16|ms"]);
    assert_no_more_payloads(&server);
}

#[test]
fn nothing_listening_is_not_an_error() {
    // Bind and immediately drop a socket to find a port that nothing is listening on.
    let port = receiver().local_addr().unwrap().port();
    let client = StatsdClient::new("127.0.0.1", port).unwrap();

    for _ in 0..10 {
        client.increment(["a", "b"]);
        client.record_timing("t", 1);
    }
}

#[test]
fn sampled_out_calls_send_nothing() {
    let server = receiver();
    let port = server.local_addr().unwrap().port();
    let client = StatsdClient::new("127.0.0.1", port).unwrap();

    for _ in 0..100 {
        client.increment_sampled(["a", "b", "c"], 0.0);
    }
    client.increment("sentinel");

    assert_eq!(recv_payloads(&server, 1), vec!["sentinel:1|c"]);
}
