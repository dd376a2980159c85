use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{FrameSource, SourceError};
use crate::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Every cell lit.
    Fill,
    /// Every cell unlit.
    Clear,
    /// Odd rows lit.
    Rows,
    /// Odd columns lit.
    Columns,
    /// Independent uniform bit per cell, redrawn every frame.
    Random,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::Fill,
        PatternKind::Clear,
        PatternKind::Rows,
        PatternKind::Columns,
        PatternKind::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Fill => "fill",
            PatternKind::Clear => "clear",
            PatternKind::Rows => "rows",
            PatternKind::Columns => "columns",
            PatternKind::Random => "random",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown pattern '{value}'"))
    }
}

/// Frames synthesized without any image decoding.
///
/// # Examples
/// ```
/// use flipdotflut_core::source::{PatternKind, ProceduralPattern};
///
/// let mut pattern = ProceduralPattern::new(PatternKind::Rows);
/// let frame = pattern.render();
/// assert!(!frame.get(0, 0));
/// assert!(frame.get(0, 1));
/// ```
pub struct ProceduralPattern {
    kind: PatternKind,
    rng: StdRng,
}

impl ProceduralPattern {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible variant; only affects [`PatternKind::Random`].
    pub fn with_seed(kind: PatternKind, seed: u64) -> Self {
        Self {
            kind,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn render(&mut self) -> Frame {
        match self.kind {
            PatternKind::Fill => Frame::filled(),
            PatternKind::Clear => Frame::blank(),
            PatternKind::Rows => Frame::from_fn(|_, row| row % 2 == 1),
            PatternKind::Columns => Frame::from_fn(|column, _| column % 2 == 1),
            PatternKind::Random => {
                let rng = &mut self.rng;
                Frame::from_fn(|_, _| rng.random::<bool>())
            }
        }
    }
}

impl FrameSource for ProceduralPattern {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        Ok(Some(self.render()))
    }

    fn is_finite(&self) -> bool {
        false
    }
}
