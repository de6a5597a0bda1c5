//! Broadcast beacon listener.
//!
//! Binds the discovery port, ingests beacon datagrams, and maintains the
//! peer registry. Uses SO_REUSEPORT so an announcer and a listener can
//! coexist on one host.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

use crate::beacon;
use crate::connect::{self, ConnectSource, ServiceDirectory, StreamConnector, CONNECT_TIMEOUT};
use crate::error::{is_transient, CoreError, ErrorSink, Result, StderrSink};
use crate::peer::{Connection, PeerChannel, PeerRef, PeerRegistry, RemotePeer};

/// Default UDP service port for beacon broadcasts.
pub const DEFAULT_SERVICE_PORT: u16 = 4000;

/// Timeout for UDP receive - keeps the optional eviction sweep running even
/// without incoming packets.
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Create a UDP socket with SO_REUSEADDR/SO_REUSEPORT on the given port.
pub fn create_reusable_socket(port: u16) -> std::io::Result<std::net::UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_reuse_address(true)?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

/// How inbound beacons are routed to peer identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerMode {
    /// One process-wide inbound peer slot; every datagram resolves to it
    /// regardless of source. Matches the protocol's assumption of exactly
    /// one live inbound counterpart per listener.
    #[default]
    SinglePeer,
    /// One peer identity per distinct source address.
    MultiPeer,
}

/// State shared between the service handle and the receive task.
struct ListenerShared {
    mode: PeerMode,
    /// Current inbound peer in single-peer mode.
    current_peer: tokio::sync::Mutex<Option<PeerRef>>,
    /// Inbound peers by source in multi-peer mode.
    peers_by_source: tokio::sync::Mutex<HashMap<SocketAddr, PeerRef>>,
    registry: PeerRegistry,
}

impl ListenerShared {
    fn new(mode: PeerMode) -> Self {
        Self {
            mode,
            current_peer: tokio::sync::Mutex::new(None),
            peers_by_source: tokio::sync::Mutex::new(HashMap::new()),
            registry: PeerRegistry::new(),
        }
    }

    /// Resolve the peer identity for an inbound datagram, creating it (and
    /// its reply channel) on first contact.
    ///
    /// The slot lock is held across channel creation so racing first
    /// contacts produce exactly one channel per slot. `Ok(None)` means a
    /// transient channel failure dropped the datagram.
    async fn resolve_inbound(&self, source: SocketAddr) -> Result<Option<PeerRef>> {
        match self.mode {
            PeerMode::SinglePeer => {
                let mut slot = self.current_peer.lock().await;
                if let Some(peer) = slot.as_ref() {
                    return Ok(Some(peer.clone()));
                }
                let peer = match Self::open_peer(source).await? {
                    Some(peer) => peer,
                    None => return Ok(None),
                };
                *slot = Some(peer.clone());
                Ok(Some(peer))
            }
            PeerMode::MultiPeer => {
                let mut peers = self.peers_by_source.lock().await;
                if let Some(peer) = peers.get(&source) {
                    return Ok(Some(peer.clone()));
                }
                let peer = match Self::open_peer(source).await? {
                    Some(peer) => peer,
                    None => return Ok(None),
                };
                peers.insert(source, peer.clone());
                Ok(Some(peer))
            }
        }
    }

    async fn open_peer(source: SocketAddr) -> Result<Option<PeerRef>> {
        let channel = match PeerChannel::open(source).await {
            Ok(channel) => channel,
            Err(e) if is_transient(&e) => return Ok(None),
            Err(e) => return Err(CoreError::Transport(e)),
        };
        let peer = RemotePeer::new(Some(channel), source.ip().to_string(), source.port());
        Ok(Some(peer.shared()))
    }

    /// Process one inbound datagram.
    ///
    /// Decode failures and source mismatches are non-fatal; only an
    /// unrecognized transport error during channel creation propagates.
    async fn handle_datagram(&self, datagram: &[u8], source: SocketAddr) -> Result<()> {
        let peer = match self.resolve_inbound(source).await? {
            Some(peer) => peer,
            None => return Ok(()),
        };

        {
            let peer = peer.lock().unwrap_or_else(PoisonError::into_inner);
            if !peer.is_matching(&source) {
                eprintln!(
                    "Beacon from {} while channel is bound to {}:{}",
                    source, peer.host, peer.port
                );
            }
        }

        let Some(beacon) = beacon::decode(datagram) else {
            return Ok(());
        };

        let (key, connection) = {
            let mut peer_state = peer.lock().unwrap_or_else(PoisonError::into_inner);
            peer_state.apply_beacon(&beacon);
            let connection = Connection {
                display_name: peer_state.display_name.clone(),
                peer: peer.clone(),
            };
            (peer_state.ip.clone(), connection)
        };

        self.registry.insert_if_absent(&key, connection);
        Ok(())
    }
}

/// Discovery service: beacon listener plus the connect path.
///
/// The service boundary exposed to the connection base layer is
/// [`start_listening`](Self::start_listening),
/// [`connections`](Self::connections) and [`connect`](Self::connect).
pub struct DiscoveryService {
    service_port: u16,
    sweep_after: Option<Duration>,
    shared: Arc<ListenerShared>,
    socket: tokio::sync::Mutex<Option<Arc<UdpSocket>>>,
    connector: tokio::sync::Mutex<StreamConnector>,
    sink: Arc<dyn ErrorSink>,
    directory: Option<Arc<dyn ServiceDirectory>>,
}

impl DiscoveryService {
    /// Create a service for the given beacon port, in single-peer mode with
    /// no eviction sweep and a stderr error sink.
    pub fn new(service_port: u16) -> Self {
        Self {
            service_port,
            sweep_after: None,
            shared: Arc::new(ListenerShared::new(PeerMode::default())),
            socket: tokio::sync::Mutex::new(None),
            connector: tokio::sync::Mutex::new(StreamConnector::new(CONNECT_TIMEOUT)),
            sink: Arc::new(StderrSink),
            directory: None,
        }
    }

    pub fn with_mode(mut self, mode: PeerMode) -> Self {
        self.shared = Arc::new(ListenerShared::new(mode));
        self
    }

    /// Enable the periodic eviction sweep: entries whose peer has not been
    /// seen for `horizon` are removed between receives. Off by default.
    pub fn with_sweep(mut self, horizon: Duration) -> Self {
        self.sweep_after = Some(horizon);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connector = tokio::sync::Mutex::new(StreamConnector::new(timeout));
        self
    }

    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn ServiceDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn service_port(&self) -> u16 {
        self.service_port
    }

    /// Bind the beacon port and start the receive task.
    ///
    /// Idempotent: a no-op when already bound. Bind failures are swallowed
    /// (the listener stays unbound and callers only observe an absence of
    /// discovered peers), so this never returns an error.
    pub async fn start_listening(&self) {
        let mut slot = self.socket.lock().await;
        if slot.is_some() {
            return;
        }

        let std_socket = match create_reusable_socket(self.service_port) {
            Ok(socket) => socket,
            Err(e) => {
                eprintln!("Beacon listener bind on port {} failed: {}", self.service_port, e);
                return;
            }
        };
        let socket = match UdpSocket::from_std(std_socket) {
            Ok(socket) => Arc::new(socket),
            Err(e) => {
                eprintln!("Beacon listener setup failed: {}", e);
                return;
            }
        };

        println!("Beacon listener bound on port {}", self.service_port);
        *slot = Some(socket.clone());

        let shared = self.shared.clone();
        let sweep_after = self.sweep_after;
        tokio::spawn(async move {
            Self::receive_loop(socket, shared, sweep_after).await;
        });
    }

    /// Receive loop: each datagram is handled by an independent task, so a
    /// slow channel creation never stalls ingestion.
    async fn receive_loop(
        socket: Arc<UdpSocket>,
        shared: Arc<ListenerShared>,
        sweep_after: Option<Duration>,
    ) {
        let mut buf = vec![0u8; 2048];

        loop {
            match timeout(RECEIVE_TIMEOUT, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, source))) => {
                    let datagram = buf[..len].to_vec();
                    let shared = shared.clone();
                    tokio::spawn(async move {
                        if let Err(e) = shared.handle_datagram(&datagram, source).await {
                            eprintln!("Beacon handler error from {}: {}", source, e);
                        }
                    });
                }
                Ok(Err(ref e)) => {
                    eprintln!("UDP receive error: {}", e);
                }
                Err(_) => {
                    // Receive timeout - fall through to the sweep.
                }
            }

            if let Some(horizon) = sweep_after {
                shared.registry.evict_older_than(horizon);
            }
        }
    }

    /// Liveness-filtered snapshot of tracked connections.
    pub fn connections(&self) -> Vec<Connection> {
        self.shared.registry.connections()
    }

    /// Resolve a connect source and attempt the bounded stream connect.
    ///
    /// Unresolvable sources and failed handshakes report false; handshake
    /// errors additionally go to the error sink.
    pub async fn connect(&self, source: ConnectSource) -> bool {
        let directory = self.directory.as_deref();
        let Some((host, port)) = connect::resolve(source, self.service_port, directory).await
        else {
            return false;
        };

        let mut connector = self.connector.lock().await;
        connector.connect(&host, port, self.sink.as_ref()).await
    }

    /// Hand the connected stream to the base layer's registration hook.
    pub async fn take_stream(&self) -> Option<TcpStream> {
        self.connector.lock().await.take_stream()
    }
}
