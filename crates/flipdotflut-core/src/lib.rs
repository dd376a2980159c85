//! flipdotflut core library: stream images, patterns and video to a flip-dot
//! display over UDP.
//!
//! A session wires one [`source`] (gradient, still image, procedural pattern
//! or video) through the [`transform`] pipeline into 112×16 monochrome
//! [`Frame`]s, and the [`stream`] driver sends every cell of every frame as
//! one 2-byte [`protocol`] datagram through a [`transport`] sink. The
//! [`receiver`] module is the other end: a display simulator that decodes the
//! same packets.
//!
//! Invariants:
//! - Every frame is exactly [`WIDTH`]×[`HEIGHT`], whatever the input size.
//! - Frames are sent row-major, one datagram per cell, no framing.
//! - Media I/O lives in `source`; protocol code is pure and never fails to
//!   encode.
//!
//! # Examples
//! ```
//! use flipdotflut_core::protocol::Packet;
//! use flipdotflut_core::source::{PatternKind, ProceduralPattern, SourceKind};
//! use flipdotflut_core::stream::{StreamConfig, Streamer};
//!
//! let mut sent: Vec<Packet> = Vec::new();
//! let config = StreamConfig::for_source(SourceKind::Pattern);
//! let summary = Streamer::new(config, &mut sent)
//!     .run(&mut ProceduralPattern::new(PatternKind::Rows))?;
//! assert_eq!(summary.frames, 1);
//! assert_eq!(sent.len(), flipdotflut_core::CELLS);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod frame;
pub mod protocol;
pub mod receiver;
pub mod render;
pub mod source;
pub mod stream;
pub mod transform;
pub mod transport;

pub use frame::{Dot, Frame, LIT_GLYPH, UNLIT_GLYPH};
pub use protocol::{Packet, PacketError, encode, parse_packet};
pub use source::{FrameSource, Source, SourceError, SourceKind};
pub use stream::{SessionState, StreamConfig, StreamError, Streamer};
pub use transform::{ScaleMode, TransformConfig};
pub use transport::{DotSink, TransportError, UdpSink};

/// Display width in dots.
pub const WIDTH: usize = 112;
/// Display height in dots.
pub const HEIGHT: usize = 16;
/// Total addressable cells.
pub const CELLS: usize = WIDTH * HEIGHT;

/// Outcome of one streaming session.
///
/// # Examples
/// ```
/// use flipdotflut_core::{SessionState, SessionSummary};
///
/// let summary = SessionSummary {
///     frames: 1,
///     dots: 1792,
///     bytes: 3584,
///     state: SessionState::Completed,
///     destination: Some("127.0.0.1:1337".to_string()),
///     started_at: "2024-01-01T00:00:00Z".to_string(),
///     finished_at: "2024-01-01T00:00:01Z".to_string(),
/// };
/// assert_eq!(summary.bytes, summary.dots * 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Frames fully streamed.
    pub frames: u64,
    /// Datagrams sent (one per dot).
    pub dots: u64,
    /// Payload bytes sent.
    pub bytes: u64,
    pub state: SessionState,
    /// Destination address, when streaming over the network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// RFC3339 session start.
    pub started_at: String,
    /// RFC3339 session end.
    pub finished_at: String,
}
