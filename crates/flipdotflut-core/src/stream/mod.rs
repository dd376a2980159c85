//! Session driver: pulls frames from a source and streams them dot by dot.
//!
//! A session walks `Idle -> Running -> Completed | Aborted`. Every frame is
//! sent row-major, one datagram per cell, with optional per-row and
//! per-frame pauses. Transport and source failures abort the session; debug
//! rendering failures only disable the renderer.

mod config;

pub use config::{Iterations, Pacing, StreamConfig};

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::protocol::encode;
use crate::protocol::layout::PACKET_LEN;
use crate::render::FrameRenderer;
use crate::source::{FrameSource, SourceError};
use crate::transport::{DotSink, TransportError};
use crate::{Frame, SessionSummary};

/// Fallback timestamp when the clock cannot be formatted.
pub const DEFAULT_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Cooperative pause between rows and frames.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Streams frames from a [`FrameSource`] into a [`DotSink`].
///
/// # Examples
/// ```
/// use flipdotflut_core::protocol::Packet;
/// use flipdotflut_core::source::{PatternKind, ProceduralPattern, SourceKind};
/// use flipdotflut_core::stream::{SessionState, StreamConfig, Streamer};
///
/// let config = StreamConfig::for_source(SourceKind::Pattern);
/// let mut sent: Vec<Packet> = Vec::new();
/// let mut streamer = Streamer::new(config, &mut sent);
/// let summary = streamer.run(&mut ProceduralPattern::new(PatternKind::Fill))?;
///
/// assert_eq!(summary.state, SessionState::Completed);
/// assert_eq!(summary.dots, 1792);
/// assert_eq!(sent.len(), 1792);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Streamer<S: DotSink> {
    config: StreamConfig,
    sink: S,
    renderer: Option<Box<dyn FrameRenderer>>,
    pacer: Box<dyn Pacer>,
    destination: Option<SocketAddr>,
    state: SessionState,
    frames: u64,
    dots: u64,
}

impl<S: DotSink> Streamer<S> {
    pub fn new(config: StreamConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            renderer: None,
            pacer: Box::new(ThreadPacer),
            destination: None,
            state: SessionState::Idle,
            frames: 0,
            dots: 0,
        }
    }

    /// Renderer used when `config.debug` is set.
    pub fn with_renderer(mut self, renderer: impl FrameRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Destination reported in the session summary.
    pub fn with_destination(mut self, destination: SocketAddr) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Stream until the iteration limit is reached or the source runs dry.
    pub fn run<F: FrameSource + ?Sized>(
        &mut self,
        source: &mut F,
    ) -> Result<SessionSummary, StreamError> {
        let started_at = timestamp_now();
        match self.stream_frames(source) {
            Ok(()) => {
                self.state = SessionState::Completed;
                info!(frames = self.frames, dots = self.dots, "session completed");
                Ok(self.summary(started_at))
            }
            Err(err) => {
                self.state = SessionState::Aborted;
                warn!(frames = self.frames, dots = self.dots, error = %err, "session aborted");
                Err(err)
            }
        }
    }

    fn stream_frames<F: FrameSource + ?Sized>(
        &mut self,
        source: &mut F,
    ) -> Result<(), StreamError> {
        while !self.config.iterations.is_done(self.frames) {
            let Some(frame) = source.next_frame()? else {
                debug!(frames = self.frames, "source exhausted");
                break;
            };
            if self.state == SessionState::Idle {
                self.state = SessionState::Running;
                info!(
                    destination = ?self.destination,
                    iterations = ?self.config.iterations,
                    finite = source.is_finite(),
                    "session running"
                );
            }
            self.send_frame(&frame)?;
        }
        Ok(())
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), StreamError> {
        self.render(|renderer| renderer.begin_frame());
        for (row, cells) in frame.rows().enumerate() {
            for (column, &lit) in cells.iter().enumerate() {
                self.sink.send(encode(column as u8, row as u8, lit))?;
                self.dots += 1;
            }
            self.render(|renderer| renderer.render_row(cells));
            self.pacer.pause(self.config.pacing.per_row);
        }
        self.render(|renderer| renderer.end_frame());
        self.frames += 1;
        self.pacer.pause(self.config.pacing.per_frame);
        Ok(())
    }

    fn render(&mut self, draw: impl FnOnce(&mut dyn FrameRenderer) -> io::Result<()>) {
        if !self.config.debug {
            return;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if let Err(err) = draw(renderer.as_mut()) {
            warn!(error = %err, "debug rendering failed; disabling renderer");
            self.renderer = None;
        }
    }

    fn summary(&self, started_at: String) -> SessionSummary {
        SessionSummary {
            frames: self.frames,
            dots: self.dots,
            bytes: self.dots * PACKET_LEN as u64,
            state: self.state,
            destination: self.destination.map(|addr| addr.to_string()),
            started_at,
            finished_at: timestamp_now(),
        }
    }
}

fn timestamp_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_TIMESTAMP.to_string())
}
