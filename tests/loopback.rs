use std::net::UdpSocket;
use std::thread;
use std::time::{Duration, Instant};

use serial_test::serial;
use slipstream::{RudpStream, UdpChannel};

/// Two endpoints wired to each other over loopback, on OS-assigned ports.
fn pair() -> (RudpStream, RudpStream) {
    let a = UdpSocket::bind("127.0.0.1:0").unwrap();
    let b = UdpSocket::bind("127.0.0.1:0").unwrap();
    let a_addr = a.local_addr().unwrap();
    let b_addr = b.local_addr().unwrap();

    let a = RudpStream::from_channel(UdpChannel::from_socket(a, b_addr).unwrap());
    let b = RudpStream::from_channel(UdpChannel::from_socket(b, a_addr).unwrap());

    (a, b)
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn send_all(stream: &mut RudpStream, data: &[u8]) {
    let mut off = 0;
    while off < data.len() {
        off += stream.send(&data[off..]).unwrap();
    }
}

#[test]
fn tiny_write_round_trip() {
    let (mut a, b) = pair();

    let reader = thread::spawn(move || {
        let mut b = b;
        let got = b.recv(5);
        (b, got)
    });

    let n = a.send(b"hello").unwrap();
    assert_eq!(n, 5);

    let (b, got) = reader.join().unwrap();
    assert_eq!(got, b"hello");
    assert_eq!(a.sent_bytes(), 5);
    assert_eq!(a.confirmed_bytes(), 5);
    assert_eq!(b.received_bytes(), 5);
}

#[test]
fn write_larger_than_mss() {
    let (mut a, b) = pair();
    let payload = patterned(5000);
    let expect = payload.clone();

    let reader = thread::spawn(move || {
        let mut b = b;
        b.recv(5000)
    });

    send_all(&mut a, &payload);

    assert_eq!(reader.join().unwrap(), expect);
    assert_eq!(a.sent_bytes(), 5000);
    assert_eq!(a.confirmed_bytes(), 5000);
    assert_eq!(a.in_flight(), 0);
}

#[test]
fn write_larger_than_window() {
    let (mut a, b) = pair();
    let payload = patterned(65536);
    let expect = payload.clone();

    let reader = thread::spawn(move || {
        let mut b = b;
        (b.recv(65536), b)
    });

    send_all(&mut a, &payload);

    let (got, b) = reader.join().unwrap();
    assert_eq!(got, expect);
    assert_eq!(b.received_bytes(), 65536);
    assert_eq!(a.confirmed_bytes(), 65536);
    assert_eq!(a.in_flight(), 0);
}

#[test]
fn echo_exercises_both_directions() {
    let (mut a, b) = pair();
    let payload = patterned(2000);
    let expect = payload.clone();

    let echo = thread::spawn(move || {
        let mut b = b;
        let got = b.recv(2000);
        send_all(&mut b, &got);
        got
    });

    send_all(&mut a, &payload);
    let back = a.recv(2000);

    assert_eq!(echo.join().unwrap(), expect);
    assert_eq!(back, expect);
    assert_eq!(a.received_bytes(), 2000);
}

#[test]
#[serial]
fn silent_peer_bounds_send() {
    let a = UdpSocket::bind("127.0.0.1:0").unwrap();
    // Bound so the wire accepts datagrams, but never reads or replies.
    let mute = UdpSocket::bind("127.0.0.1:0").unwrap();

    let channel = UdpChannel::from_socket(a, mute.local_addr().unwrap()).unwrap();
    let mut stream = RudpStream::from_channel(channel);

    let start = Instant::now();
    let n = stream.send(&[42]).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(n, 1);
    assert_eq!(stream.sent_bytes(), 1);
    assert_eq!(stream.confirmed_bytes(), 0);
    assert!(
        elapsed >= Duration::from_millis(100),
        "send gave up too fast: {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(2),
        "send failed to self-bound: {elapsed:?}"
    );
}
