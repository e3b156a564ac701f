use slipstream::RudpStream;

// Start the server before the client: there is no handshake, and
// datagrams sent to an unbound port are lost by the OS.
fn main() {
    let mut stream = RudpStream::connect(
        "127.0.0.1:9090".parse().unwrap(),
        "127.0.0.1:34343".parse().unwrap(),
    )
    .unwrap();

    println!(">>> Waiting for data...");
    let data = stream.recv(4096);

    println!(">>> Read {} bytes, echoing back", data.len());
    let mut sent = 0;
    while sent < data.len() {
        sent += stream.send(&data[sent..]).unwrap();
    }

    println!(">>> Done");
    stream.close();
}
