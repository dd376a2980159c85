//! Debug rendering of streamed frames.

use std::io::{self, Write};

use crossterm::{cursor::MoveToPreviousLine, queue};

use crate::HEIGHT;
use crate::frame::glyph;

/// Sink for a textual preview of what is being streamed, row by row.
pub trait FrameRenderer {
    /// Called before the first row of every frame.
    fn begin_frame(&mut self) -> io::Result<()>;
    fn render_row(&mut self, row: &[bool]) -> io::Result<()>;
    /// Called after the last row of every frame.
    fn end_frame(&mut self) -> io::Result<()>;
}

impl<R: FrameRenderer + ?Sized> FrameRenderer for Box<R> {
    fn begin_frame(&mut self) -> io::Result<()> {
        (**self).begin_frame()
    }

    fn render_row(&mut self, row: &[bool]) -> io::Result<()> {
        (**self).render_row(row)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        (**self).end_frame()
    }
}

/// Draws `█`/space rows and moves the cursor back up before each new frame,
/// so consecutive frames overwrite each other in place.
///
/// # Examples
/// ```
/// use flipdotflut_core::render::{FrameRenderer, TerminalRenderer};
///
/// let mut renderer = TerminalRenderer::new(Vec::new());
/// renderer.begin_frame()?;
/// renderer.render_row(&[true, false, true])?;
/// renderer.end_frame()?;
/// assert_eq!(String::from_utf8(renderer.into_inner())?, "\u{2588} \u{2588}\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    frames: u64,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameRenderer for TerminalRenderer<W> {
    fn begin_frame(&mut self) -> io::Result<()> {
        if self.frames > 0 {
            queue!(self.out, MoveToPreviousLine(HEIGHT as u16))?;
        }
        Ok(())
    }

    fn render_row(&mut self, row: &[bool]) -> io::Result<()> {
        let line: String = row.iter().map(|&lit| glyph(lit)).collect();
        writeln!(self.out, "{line}")
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.frames += 1;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;

    fn draw(renderer: &mut TerminalRenderer<Vec<u8>>, frame: &Frame) {
        renderer.begin_frame().unwrap();
        for row in frame.rows() {
            renderer.render_row(row).unwrap();
        }
        renderer.end_frame().unwrap();
    }

    #[test]
    fn first_frame_has_no_rewind() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        draw(&mut renderer, &Frame::filled());
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(text, Frame::filled().to_string());
    }

    #[test]
    fn later_frames_rewind_cursor() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        draw(&mut renderer, &Frame::blank());
        draw(&mut renderer, &Frame::filled());
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let rewind = format!("\x1b[{HEIGHT}F");
        assert_eq!(text.matches(&rewind).count(), 1);
        let (first, second) = text.split_once(&rewind).unwrap();
        assert_eq!(first, Frame::blank().to_string());
        assert_eq!(second, Frame::filled().to_string());
    }
}
