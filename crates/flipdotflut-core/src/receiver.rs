//! Receiving side: a display simulator that applies dot packets.
//!
//! [`DotBoard`] models the panel: every cell has a current state and a
//! pending flip; [`DotBoard::flush`] applies the pending flips at once.
//! [`Receiver`] pulls datagrams off a UDP socket and decodes them. Invalid
//! packets are logged and counted, never fatal.

use std::io::{self, ErrorKind};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::{PacketError, parse_packet};
use crate::render::FrameRenderer;
use crate::{CELLS, Dot, Frame, HEIGHT, WIDTH};

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:1337";
/// How long `recv` blocks before reporting a quiet socket.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("dot ({column}, {row}) is outside the 112x16 display")]
    OutOfRange { column: u8, row: u8 },
}

#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    state: bool,
    pending_flip: bool,
}

/// Simulated flip-dot panel.
///
/// A fresh board reports every cell lit with a pending flip, so the first
/// flush clears it.
///
/// # Examples
/// ```
/// use flipdotflut_core::receiver::DotBoard;
/// use flipdotflut_core::Dot;
///
/// let mut board = DotBoard::new();
/// board.flush();
/// board.apply(Dot::new(5, 2, true))?;
/// let changed = board.flush();
/// assert_eq!(changed, vec![Dot::new(5, 2, true)]);
/// assert!(board.snapshot().get(5, 2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DotBoard {
    cells: Vec<Cell>,
}

impl DotBoard {
    pub fn new() -> Self {
        let cell = Cell {
            state: true,
            pending_flip: true,
        };
        Self {
            cells: vec![cell; CELLS],
        }
    }

    /// Record the requested polarity of one cell.
    pub fn apply(&mut self, dot: Dot) -> Result<(), BoardError> {
        let (column, row) = (usize::from(dot.column), usize::from(dot.row));
        if column >= WIDTH || row >= HEIGHT {
            return Err(BoardError::OutOfRange {
                column: dot.column,
                row: dot.row,
            });
        }
        let cell = &mut self.cells[row * WIDTH + column];
        cell.pending_flip = dot.lit != cell.state;
        Ok(())
    }

    /// Apply pending flips; returns the cells that changed, row-major.
    pub fn flush(&mut self) -> Vec<Dot> {
        let mut changed = Vec::new();
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if !cell.pending_flip {
                continue;
            }
            cell.state = !cell.state;
            cell.pending_flip = false;
            changed.push(Dot::new(
                (index % WIDTH) as u8,
                (index / WIDTH) as u8,
                cell.state,
            ));
        }
        changed
    }

    pub fn has_pending(&self) -> bool {
        self.cells.iter().any(|cell| cell.pending_flip)
    }

    /// Current (flushed) state of the panel.
    pub fn snapshot(&self) -> Frame {
        Frame::from_fn(|column, row| self.cells[row * WIDTH + column].state)
    }

    pub fn render(&self, renderer: &mut dyn FrameRenderer) -> io::Result<()> {
        let frame = self.snapshot();
        renderer.begin_frame()?;
        for row in frame.rows() {
            renderer.render_row(row)?;
        }
        renderer.end_frame()
    }
}

impl Default for DotBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("receive failed: {0}")]
    Io(#[from] io::Error),
}

/// One datagram taken off the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Dot { dot: Dot, from: SocketAddr },
    Rejected { error: PacketError, from: SocketAddr },
}

/// UDP listener decoding dot packets.
#[derive(Debug)]
pub struct Receiver {
    socket: UdpSocket,
    accepted: u64,
    rejected: u64,
}

impl Receiver {
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self, ReceiverError> {
        let label = addr.to_string();
        let socket = UdpSocket::bind(&addr).map_err(|source| ReceiverError::Bind {
            addr: label.clone(),
            source,
        })?;
        socket
            .set_read_timeout(Some(DEFAULT_READ_TIMEOUT))
            .map_err(|source| ReceiverError::Bind {
                addr: label,
                source,
            })?;
        Ok(Self {
            socket,
            accepted: 0,
            rejected: 0,
        })
    }

    pub fn with_read_timeout(self, timeout: Duration) -> Result<Self, ReceiverError> {
        self.socket.set_read_timeout(Some(timeout))?;
        Ok(self)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ReceiverError> {
        Ok(self.socket.local_addr()?)
    }

    /// Wait for one datagram. `Ok(None)` means the read timed out.
    pub fn recv(&mut self) -> Result<Option<Received>, ReceiverError> {
        // Oversized datagrams must not be truncated into valid ones.
        let mut buf = [0u8; 64];
        let (len, from) = match self.socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        match parse_packet(&buf[..len]) {
            Ok(dot) => {
                self.accepted += 1;
                Ok(Some(Received::Dot { dot, from }))
            }
            Err(error) => {
                self.rejected += 1;
                warn!(%from, len, error = %error, "invalid packet");
                debug!(rejected = self.rejected, "rejected packet count");
                Ok(Some(Received::Rejected { error, from }))
            }
        }
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_board_clears_on_first_flush() {
        let mut board = DotBoard::new();
        assert!(board.has_pending());
        let changed = board.flush();
        assert_eq!(changed.len(), CELLS);
        assert!(changed.iter().all(|dot| !dot.lit));
        assert_eq!(changed[1], Dot::new(1, 0, false));
        assert_eq!(board.snapshot(), Frame::blank());
        assert!(board.flush().is_empty());
    }

    #[test]
    fn last_write_wins_before_flush() {
        let mut board = DotBoard::new();
        board.flush();
        board.apply(Dot::new(3, 3, true)).unwrap();
        board.apply(Dot::new(3, 3, false)).unwrap();
        assert!(board.flush().is_empty());

        board.apply(Dot::new(0, 15, true)).unwrap();
        board.apply(Dot::new(111, 0, true)).unwrap();
        let changed = board.flush();
        assert_eq!(changed, vec![Dot::new(111, 0, true), Dot::new(0, 15, true)]);
    }

    #[test]
    fn rejects_dots_outside_display() {
        let mut board = DotBoard::new();
        let err = board.apply(Dot::new(112, 0, true)).unwrap_err();
        assert_eq!(err, BoardError::OutOfRange { column: 112, row: 0 });
        assert!(board.apply(Dot::new(0, 16, true)).is_err());
    }

    #[test]
    fn receiver_counts_valid_and_invalid_packets() {
        let mut receiver = Receiver::bind("127.0.0.1:0")
            .unwrap()
            .with_read_timeout(Duration::from_secs(2))
            .unwrap();
        let target = receiver.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(&[0x85, 0x13], target).unwrap();
        sender.send_to(&[0x05, 0x13], target).unwrap();

        match receiver.recv().unwrap() {
            Some(Received::Dot { dot, .. }) => assert_eq!(dot, Dot::new(5, 3, true)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            receiver.recv().unwrap(),
            Some(Received::Rejected { .. })
        ));
        assert_eq!((receiver.accepted(), receiver.rejected()), (1, 1));
    }

    #[test]
    fn quiet_socket_times_out() {
        let mut receiver = Receiver::bind("127.0.0.1:0")
            .unwrap()
            .with_read_timeout(Duration::from_millis(20))
            .unwrap();
        assert!(receiver.recv().unwrap().is_none());
    }
}
