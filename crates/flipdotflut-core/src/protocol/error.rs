use thiserror::Error;

/// Errors returned by packet parsing.
///
/// # Examples
/// ```
/// use flipdotflut_core::protocol::PacketError;
///
/// let err = PacketError::InvalidLength { actual: 3 };
/// assert!(err.to_string().contains("invalid packet length"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("invalid packet length: expected 2 bytes, got {actual}")]
    InvalidLength { actual: usize },
    #[error("invalid packet structure: cmdh={cmdh:#04x} cmdl={cmdl:#04x}")]
    InvalidStructure { cmdh: u8, cmdl: u8 },
}
