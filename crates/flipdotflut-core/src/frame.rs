use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CELLS, HEIGHT, WIDTH};

/// Glyph used for a lit cell when a frame is printed.
pub const LIT_GLYPH: char = '\u{2588}';
/// Glyph used for an unlit cell when a frame is printed.
pub const UNLIT_GLYPH: char = ' ';

/// One addressable cell on the display.
///
/// # Examples
/// ```
/// use flipdotflut_core::Dot;
///
/// let dot = Dot::new(3, 7, true);
/// assert_eq!((dot.column, dot.row, dot.lit), (3, 7, true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dot {
    /// Column address (0-based, left to right).
    pub column: u8,
    /// Row address (0-based, top to bottom).
    pub row: u8,
    /// Polarity: `true` = lit.
    pub lit: bool,
}

impl Dot {
    pub fn new(column: u8, row: u8, lit: bool) -> Self {
        Self { column, row, lit }
    }
}

/// A complete WIDTH×HEIGHT monochrome bitmap, row-major, origin top-left.
///
/// # Examples
/// ```
/// use flipdotflut_core::{Frame, HEIGHT, WIDTH};
///
/// let mut frame = Frame::blank();
/// frame.set(WIDTH - 1, HEIGHT - 1, true);
/// assert!(frame.get(WIDTH - 1, HEIGHT - 1));
/// assert_eq!(frame.lit_count(), 1);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    cells: [bool; CELLS],
}

impl Frame {
    /// Frame with every cell unlit.
    pub fn blank() -> Self {
        Self {
            cells: [false; CELLS],
        }
    }

    /// Frame with every cell lit.
    pub fn filled() -> Self {
        Self {
            cells: [true; CELLS],
        }
    }

    /// Build a frame by evaluating `f(column, row)` for every cell.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut frame = Self::blank();
        for row in 0..HEIGHT {
            for column in 0..WIDTH {
                frame.cells[row * WIDTH + column] = f(column, row);
            }
        }
        frame
    }

    /// Cell polarity. Out-of-bounds coordinates read as unlit.
    pub fn get(&self, column: usize, row: usize) -> bool {
        if column >= WIDTH || row >= HEIGHT {
            return false;
        }
        self.cells[row * WIDTH + column]
    }

    /// Set a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, column: usize, row: usize, lit: bool) {
        if column < WIDTH && row < HEIGHT {
            self.cells[row * WIDTH + column] = lit;
        }
    }

    /// Flip every cell in place.
    pub fn invert(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = !*cell;
        }
    }

    pub fn inverted(&self) -> Self {
        let mut frame = self.clone();
        frame.invert();
        frame
    }

    /// Rows in top-to-bottom order, each WIDTH cells long.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(WIDTH)
    }

    pub fn row(&self, row: usize) -> Option<&[bool]> {
        self.rows().nth(row)
    }

    /// Every cell as a [`Dot`], row-major.
    pub fn dots(&self) -> impl Iterator<Item = Dot> + '_ {
        self.cells.iter().enumerate().map(|(index, &lit)| Dot {
            column: (index % WIDTH) as u8,
            row: (index / WIDTH) as u8,
            lit,
        })
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&lit| lit).count()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({} lit)\n{}", self.lit_count(), self)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|&lit| glyph(lit)).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub(crate) fn glyph(lit: bool) -> char {
    if lit { LIT_GLYPH } else { UNLIT_GLYPH }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_twice_is_identity() {
        let frame = Frame::from_fn(|column, row| (column * 7 + row * 3) % 5 == 0);
        assert_eq!(frame.inverted().inverted(), frame);
        assert_ne!(frame.inverted(), frame);
    }

    #[test]
    fn dots_are_row_major() {
        let frame = Frame::from_fn(|column, row| column == 1 && row == 0);
        let dots: Vec<Dot> = frame.dots().take(3).collect();
        assert_eq!(dots[0], Dot::new(0, 0, false));
        assert_eq!(dots[1], Dot::new(1, 0, true));
        assert_eq!(dots[2], Dot::new(2, 0, false));
        assert_eq!(frame.dots().count(), WIDTH * HEIGHT);
        let last = frame.dots().last().unwrap();
        assert_eq!((last.column, last.row), ((WIDTH - 1) as u8, (HEIGHT - 1) as u8));
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut frame = Frame::blank();
        frame.set(WIDTH, 0, true);
        frame.set(0, HEIGHT, true);
        assert_eq!(frame.lit_count(), 0);
        assert!(!frame.get(WIDTH, HEIGHT));
    }

    #[test]
    fn display_renders_glyph_rows() {
        let text = Frame::filled().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), HEIGHT);
        assert!(lines.iter().all(|line| line.chars().count() == WIDTH));
        assert!(lines.iter().all(|line| line.chars().all(|c| c == LIT_GLYPH)));
    }
}
