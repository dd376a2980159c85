//! Dot command wire protocol.
//!
//! Every dot travels as one 2-byte UDP datagram:
//!
//! ```text
//! Byte 0 (CMDH): 1 CCC CCCC   bit7 = marker, bits6..0 = column
//! Byte 1 (CMDL): 000 P RRRR   bits7..5 = reserved, bit4 = polarity, bits3..0 = row
//! ```
//!
//! The module follows a layered structure:
//! - `layout`: bit positions and masks (source of truth)
//! - `reader`: safe byte access
//! - `parser`: packet -> [`Dot`](crate::Dot), with structural validation
//! - `encoder`: [`Dot`](crate::Dot) -> packet, total and branch-free
//! - `error`: explicit, actionable errors
//!
//! There is no framing, checksum, sequence number or acknowledgement; a
//! receiver applies packets last-write-wins per cell.

pub mod encoder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use encoder::{Packet, encode, encode_dot};
pub use error::PacketError;
pub use parser::parse_packet;
