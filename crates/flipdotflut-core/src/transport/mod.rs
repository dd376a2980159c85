//! Packet transport.
//!
//! A [`DotSink`] delivers encoded packets somewhere. The production sink is
//! [`UdpSink`], one datagram per packet, fire-and-forget. Tests substitute an
//! in-memory recorder.

mod error;
mod udp;

pub use error::TransportError;
pub use udp::{DEFAULT_HOST, DEFAULT_PORT, UdpSink, resolve_destination};

use crate::protocol::Packet;

/// Destination for encoded dot packets.
pub trait DotSink {
    fn send(&mut self, packet: Packet) -> Result<(), TransportError>;
}

impl<T: DotSink + ?Sized> DotSink for &mut T {
    fn send(&mut self, packet: Packet) -> Result<(), TransportError> {
        (**self).send(packet)
    }
}

impl DotSink for Vec<Packet> {
    fn send(&mut self, packet: Packet) -> Result<(), TransportError> {
        self.push(packet);
        Ok(())
    }
}
