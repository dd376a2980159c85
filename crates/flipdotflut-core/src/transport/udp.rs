use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;

use super::{DotSink, TransportError};
use crate::protocol::Packet;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 1337;

/// Resolve `host:port`, preferring an IPv4 address when several are returned.
///
/// # Examples
/// ```
/// use flipdotflut_core::transport::resolve_destination;
///
/// let addr = resolve_destination("127.0.0.1", 1337)?;
/// assert_eq!(addr.to_string(), "127.0.0.1:1337");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve_destination(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| TransportError::NoAddress {
            host: host.to_string(),
            port,
        })
}

/// Unconnected UDP socket sending every packet to one destination.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    destination: SocketAddr,
    sent: u64,
}

impl UdpSink {
    /// Bind an ephemeral local port of the destination's address family.
    pub fn open(destination: SocketAddr) -> Result<Self, TransportError> {
        let local: SocketAddr = if destination.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).map_err(TransportError::Bind)?;
        debug!(%destination, "udp sink opened");
        Ok(Self {
            socket,
            destination,
            sent: 0,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Datagrams handed to the OS so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl DotSink for UdpSink {
    fn send(&mut self, packet: Packet) -> Result<(), TransportError> {
        self.socket
            .send_to(packet.as_bytes(), self.destination)
            .map_err(|source| TransportError::Send {
                destination: self.destination,
                source,
            })?;
        self.sent += 1;
        Ok(())
    }
}
