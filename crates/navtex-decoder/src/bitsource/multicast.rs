use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Sender, unbounded};
use socket2::{Domain, Protocol, Socket, Type};

use navtex_config::CfgMulticast;
use navtex_core::BitSourceErr;

use super::{Chunk, ChunkedBitSource};

/// Largest datagram accepted from the network
const MAX_DATAGRAM: usize = 10240;

/// UDP multicast receiver
///
/// Joins the configured group on all interfaces and forwards every datagram payload,
/// unchanged, to a channel. The decoder reads that channel through a `ChunkedBitSource`.
/// A socket failure is forwarded as `BitSourceErr::Io`; only a cleared `running` flag
/// ends the stream as end of data.
pub struct MulticastReceiver {
    socket: UdpSocket,
}

impl MulticastReceiver {
    /// Create the socket, allow address reuse, bind `0.0.0.0:port` and join the group.
    pub fn bind(cfg: &CfgMulticast) -> Result<Self, BitSourceErr> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| BitSourceErr::Io(format!("UDP socket creation failed: {}", e)))?;
        socket
            .set_reuse_address(true)
            .map_err(|e| BitSourceErr::Io(format!("Failed to set SO_REUSEADDR: {}", e)))?;

        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, cfg.port);
        socket
            .bind(&bind_addr.into())
            .map_err(|e| BitSourceErr::Io(format!("UDP bind to {} failed: {}", bind_addr, e)))?;
        socket
            .join_multicast_v4(&cfg.group, &Ipv4Addr::UNSPECIFIED)
            .map_err(|e| BitSourceErr::Io(format!("Failed to join multicast group {}: {}", cfg.group, e)))?;

        tracing::info!("Joined multicast group {} on port {}", cfg.group, cfg.port);
        Self::from_socket(socket.into(), Duration::from_millis(cfg.read_timeout_ms))
    }

    /// Use an already bound socket
    pub fn from_socket(socket: UdpSocket, read_timeout: Duration) -> Result<Self, BitSourceErr> {
        socket
            .set_read_timeout(Some(read_timeout))
            .map_err(|e| BitSourceErr::Io(format!("Failed to set timeout: {}", e)))?;
        Ok(Self { socket })
    }

    pub fn local_port(&self) -> Option<u16> {
        self.socket.local_addr().ok().map(|a| a.port())
    }

    /// Start the receive thread. The thread ends, closing the channel, when `running`
    /// is cleared, the receiving end is dropped, or the socket fails.
    pub fn spawn(self, tx: Sender<Chunk>, running: Arc<AtomicBool>) -> JoinHandle<()> {
        thread::Builder::new()
            .name("mc-rx".to_string())
            .spawn(move || self.receive_loop(tx, running))
            .expect("failed to spawn multicast receive thread")
    }

    /// Convenience: spawn the receive thread and return a bit source reading from it.
    pub fn into_bit_source(self, running: Arc<AtomicBool>) -> (ChunkedBitSource, JoinHandle<()>) {
        let (tx, rx) = unbounded();
        let handle = self.spawn(tx, running);
        (ChunkedBitSource::new(rx), handle)
    }

    fn receive_loop(self, tx: Sender<Chunk>, running: Arc<AtomicBool>) {
        let mut buffer = vec![0u8; MAX_DATAGRAM];
        while running.load(Ordering::SeqCst) {
            match self.socket.recv(&mut buffer) {
                Ok(len) => {
                    tracing::trace!("datagram: {} bytes", len);
                    if tx.send(Ok(buffer[..len].to_vec())).is_err() {
                        tracing::debug!("bit source dropped, stopping receiver");
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!("multicast receive failed: {}", e);
                    let _ = tx.send(Err(BitSourceErr::Io(format!("multicast receive failed: {}", e))));
                    return;
                }
            }
        }
        tracing::info!("multicast receiver stopped");
    }
}
