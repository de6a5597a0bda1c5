//! Outbound datagram channel owned by a single peer.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

/// An exclusively-owned reply channel to one peer.
///
/// Each channel is its own socket, connected to the peer's source address so
/// sends need no explicit destination.
#[derive(Debug)]
pub struct PeerChannel {
    socket: UdpSocket,
    target: SocketAddr,
}

impl PeerChannel {
    /// Open a channel to the given peer address.
    pub async fn open(target: SocketAddr) -> io::Result<Self> {
        let bind_addr: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(target).await?;

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Send a payload to the peer this channel is bound to.
    pub async fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload).await
    }
}
