use slipstream::RudpStream;

fn main() {
    let mut stream = RudpStream::connect(
        "127.0.0.1:34343".parse().unwrap(),
        "127.0.0.1:9090".parse().unwrap(),
    )
    .unwrap();

    let payload: Vec<u8> = (0u32..4096).map(|i| (i % 256) as u8).collect();

    println!(">>> Sending {} bytes...", payload.len());
    let mut sent = 0;
    while sent < payload.len() {
        sent += stream.send(&payload[sent..]).unwrap();
    }

    println!(">>> Waiting for the echo...");
    let echoed = stream.recv(payload.len());

    assert_eq!(echoed, payload);
    println!(">>> Echo matched, closing");

    stream.close();
}
