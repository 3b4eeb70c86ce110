use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{
    TcpListener, TcpSocket, TcpStream,
    tcp::{OwnedReadHalf, OwnedWriteHalf},
};
use tracing::{info, warn};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

// Only one peer is ever accepted, so there is no point queueing more.
const LISTEN_BACKLOG: u32 = 1;

// -----------------------------------------------------------------------------
// ----- ConnectionEndpoint ----------------------------------------------------

/// Owns the listening socket and hands out at most one [`Connection`].
#[derive(Debug)]
pub struct ConnectionEndpoint {
    listener: TcpListener,
    local_addr: SocketAddr,
    accepted: bool,
}

// -----------------------------------------------------------------------------
// ----- ConnectionEndpoint: Static --------------------------------------------

impl ConnectionEndpoint {
    /// Bind and listen on `addr`. Must be called from inside a Tokio runtime.
    pub fn bind(addr: SocketAddr) -> Result<Self, EndpointError> {
        let bind_failed = |source| EndpointError::BindFailed { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_failed)?;

        socket.bind(addr).map_err(bind_failed)?;

        let listener = socket.listen(LISTEN_BACKLOG).map_err(bind_failed)?;
        let local_addr = listener.local_addr().map_err(bind_failed)?;

        Ok(Self {
            listener,
            local_addr,
            accepted: false,
        })
    }

    /// Bind on `addr` and wait for the single peer. The listener is released
    /// as soon as the peer is accepted.
    pub async fn open(addr: SocketAddr) -> Result<Connection, EndpointError> {
        let mut endpoint = Self::bind(addr)?;
        endpoint.accept().await
    }
}

// -----------------------------------------------------------------------------
// ----- ConnectionEndpoint: Public --------------------------------------------

impl ConnectionEndpoint {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the one peer this endpoint will ever accept.
    ///
    /// A second call fails with [`EndpointError::AlreadyAccepted`] and does not
    /// touch the listener.
    pub async fn accept(&mut self) -> Result<Connection, EndpointError> {
        if self.accepted {
            return Err(EndpointError::AlreadyAccepted);
        }

        let (stream, peer_addr) = self
            .listener
            .accept()
            .await
            .map_err(|source| EndpointError::AcceptFailed { source })?;

        self.accepted = true;

        if let Err(e) = stream.set_nodelay(true) {
            warn!("could not set TCP_NODELAY for {peer_addr}: {e}");
        }

        info!("peer {peer_addr} connected on {}", self.local_addr);

        Ok(Connection { stream, peer_addr })
    }
}

// -----------------------------------------------------------------------------
// ----- Connection ------------------------------------------------------------

/// The accepted bidirectional stream. Consumed by the message channel.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl Connection {
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub(crate) fn into_split(self) -> (OwnedReadHalf, OwnedWriteHalf) {
        self.stream.into_split()
    }
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to accept peer: {source}")]
    AcceptFailed { source: std::io::Error },

    #[error("endpoint already accepted its peer")]
    AlreadyAccepted,
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
