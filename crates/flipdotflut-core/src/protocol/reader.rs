use super::error::PacketError;
use super::layout;

/// Byte access over a payload already checked to be one full packet.
pub struct PacketReader<'a> {
    bytes: &'a [u8; layout::PACKET_LEN],
}

impl<'a> PacketReader<'a> {
    /// Fails unless `payload` is exactly one packet long.
    pub fn new(payload: &'a [u8]) -> Result<Self, PacketError> {
        let bytes: &[u8; layout::PACKET_LEN] = payload
            .try_into()
            .map_err(|_| PacketError::InvalidLength {
                actual: payload.len(),
            })?;
        Ok(Self { bytes })
    }

    pub fn cmdh(&self) -> u8 {
        self.bytes[layout::CMDH_OFFSET]
    }

    pub fn cmdl(&self) -> u8 {
        self.bytes[layout::CMDL_OFFSET]
    }
}

#[cfg(test)]
mod tests {
    use super::PacketReader;
    use crate::protocol::error::PacketError;

    #[test]
    fn reads_command_bytes() {
        let payload = [0x85, 0x13];
        let reader = PacketReader::new(&payload).unwrap();
        assert_eq!(reader.cmdh(), 0x85);
        assert_eq!(reader.cmdl(), 0x13);
    }

    #[test]
    fn short_payload_is_rejected_up_front() {
        let payload = [0x80];
        assert_eq!(
            PacketReader::new(&payload).err(),
            Some(PacketError::InvalidLength { actual: 1 })
        );
        assert_eq!(
            PacketReader::new(&[]).err(),
            Some(PacketError::InvalidLength { actual: 0 })
        );
    }

    #[test]
    fn long_payload_is_rejected() {
        let payload = [0x80, 0x00, 0x00];
        assert!(matches!(
            PacketReader::new(&payload),
            Err(PacketError::InvalidLength { actual: 3 })
        ));
    }
}
