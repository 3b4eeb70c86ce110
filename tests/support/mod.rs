use std::{net::SocketAddr, time::Duration};

use pairchat::{ConnectionEndpoint, MessageChannel};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    time::timeout,
};

#[allow(dead_code)]
pub const WAIT: Duration = Duration::from_secs(3);

/// Test-side end of the connection, standing in for the remote client.
#[allow(dead_code)]
pub struct Peer {
    pub reader: BufReader<OwnedReadHalf>,
    pub writer: OwnedWriteHalf,
}

#[allow(dead_code)]
impl Peer {
    pub async fn send_line(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.expect("peer write");
        self.writer.write_all(b"\n").await.expect("peer write");
        self.writer.flush().await.expect("peer flush");
    }

    /// Drop the connection with an RST instead of a FIN.
    pub async fn reset(self) {
        let stream = self.reader.into_inner().reunite(self.writer).expect("reunite peer halves");
        stream.set_linger(Some(Duration::ZERO)).expect("set linger");
        drop(stream);

        // let the RST reach the other side
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    /// Next line without its delimiter. `None` on EOF. Panics on timeout.
    pub async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let n = timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .expect("peer read");
        if n == 0 {
            return None;
        }
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[allow(dead_code)]
fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

/// Bind on an ephemeral loopback port, connect a peer and accept it.
#[allow(dead_code)]
pub async fn connected_channel() -> (MessageChannel, Peer) {
    let mut endpoint = ConnectionEndpoint::bind(loopback()).expect("bind loopback");
    let addr = endpoint.local_addr();

    let (accepted, stream) = tokio::join!(endpoint.accept(), TcpStream::connect(addr));
    let connection = accepted.expect("accept peer");
    let (reader, writer) = stream.expect("connect to endpoint").into_split();

    (
        MessageChannel::new(connection),
        Peer {
            reader: BufReader::new(reader),
            writer,
        },
    )
}

#[allow(dead_code)]
pub fn reserve_port(host: &str) -> u16 {
    let addr = format!("{host}:0");
    let listener = std::net::TcpListener::bind(&addr).expect("bind ephemeral port");
    listener.local_addr().unwrap().port()
}

#[allow(dead_code)]
pub async fn connect_when_listening(host: &str, port: u16) -> TcpStream {
    let addr = format!("{host}:{port}");
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(&addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("pairchat did not start listening on {addr}");
}
