use super::layout;
use crate::Dot;

/// A single 2-byte dot command, ready to be sent as one datagram.
///
/// # Examples
/// ```
/// use flipdotflut_core::protocol::encode;
///
/// assert_eq!(encode(0, 0, true).as_bytes(), &[0x80, 0x10]);
/// assert_eq!(encode(127, 15, false).as_bytes(), &[0xFF, 0x0F]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet([u8; layout::PACKET_LEN]);

impl Packet {
    pub fn as_bytes(&self) -> &[u8; layout::PACKET_LEN] {
        &self.0
    }

    pub fn cmdh(&self) -> u8 {
        self.0[layout::CMDH_OFFSET]
    }

    pub fn cmdl(&self) -> u8 {
        self.0[layout::CMDL_OFFSET]
    }
}

impl From<Packet> for [u8; layout::PACKET_LEN] {
    fn from(packet: Packet) -> Self {
        packet.0
    }
}

/// Encode a dot command.
///
/// Coordinates are masked to the wire field widths (7 bits for the column,
/// 4 bits for the row); the encoder never fails and callers own range
/// checking. Reserved CMDL bits are always zero.
pub fn encode(column: u8, row: u8, lit: bool) -> Packet {
    let cmdh = layout::MARKER_BIT | (column & layout::COLUMN_MASK);
    let cmdl = ((lit as u8) * layout::POLARITY_BIT) | (row & layout::ROW_MASK);
    Packet([cmdh, cmdl])
}

pub fn encode_dot(dot: Dot) -> Packet {
    encode(dot.column, dot.row, dot.lit)
}
