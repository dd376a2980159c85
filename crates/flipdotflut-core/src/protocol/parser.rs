use super::error::PacketError;
use super::layout;
use super::reader::PacketReader;
use crate::Dot;

/// Decode a dot command datagram.
///
/// The payload must be exactly two bytes with the CMDH marker bit set and
/// the CMDL reserved bits clear. Column and row are returned as carried on
/// the wire (0..=127 and 0..=15); whether they address a real cell is up to
/// the caller.
pub fn parse_packet(payload: &[u8]) -> Result<Dot, PacketError> {
    let reader = PacketReader::new(payload)?;
    let (cmdh, cmdl) = (reader.cmdh(), reader.cmdl());
    if cmdh & layout::MARKER_BIT == 0 || cmdl & layout::RESERVED_MASK != 0 {
        return Err(PacketError::InvalidStructure { cmdh, cmdl });
    }

    Ok(Dot {
        column: cmdh & layout::COLUMN_MASK,
        row: cmdl & layout::ROW_MASK,
        lit: cmdl & layout::POLARITY_BIT != 0,
    })
}
