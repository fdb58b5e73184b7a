//! Grid geometry shared by the encoder and the sampler.
//!
//! A code is a `SPAN x SPAN` grid of equal cells: `GRID x GRID` data cells
//! surrounded by a one-cell border. The encoder derives its cell size from the
//! canvas side, the sampler from the pixel size of the detected region. Both use
//! truncating integer division so that they agree on an undistorted image.

use super::error::{CodeError, CodeResult};

/// Data cells per axis.
pub const GRID: u32 = 8;

/// Border cells on each side of the data grid.
pub const BORDER: u32 = 1;

/// Cells per axis including the border.
pub const SPAN: u32 = GRID + 2 * BORDER;

pub const DEFAULT_SIDE: u32 = 600;

/// Thickness of the alignment bars in pixels.
pub const MARK_THICKNESS: u32 = 4;

/// Pixels shaved off every side of a cell before averaging it.
pub const SAMPLE_EROSION: u32 = 2;

// Encoder canvas
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    pub side: u32,
    pub cell: u32,
}

impl CanvasLayout {
    pub const DEFAULT: Self = Self { side: DEFAULT_SIDE, cell: DEFAULT_SIDE / SPAN };

    pub fn new(side: u32) -> CodeResult<Self> {
        let cell = side / SPAN;
        if cell == 0 {
            return Err(CodeError::InvalidSide(side));
        }
        Ok(Self { side, cell })
    }

    /// Top-left pixel of data cell `(r, c)`, counted from the inner top-left.
    pub fn cell_origin(&self, r: u32, c: u32) -> (u32, u32) {
        ((c + BORDER) * self.cell, (r + BORDER) * self.cell)
    }

    /// Centre lines of the border band: the first and last cell midpoints.
    pub fn mark_lines(&self) -> (u32, u32) {
        let half = self.cell / 2;
        (half, (GRID + BORDER) * self.cell + half)
    }
}

// Sampler grid
//------------------------------------------------------------------------------

/// Cell window in region coordinates, `x0..x1` by `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    pub fn area(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (self.x1 - self.x0) as u64 * (self.y1 - self.y0) as u64
    }
}

/// Sampling geometry for a region whose bounding box runs from border midline
/// to border midline, i.e. spans `GRID + 1` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    pub step_x: u32,
    pub step_y: u32,
}

impl SampleLayout {
    pub fn from_region(w: u32, h: u32) -> Self {
        Self { step_x: w / (GRID + 1), step_y: h / (GRID + 1) }
    }

    /// Offset of the data grid inside the region.
    pub fn margin(&self) -> (u32, u32) {
        (self.step_x / 2, self.step_y / 2)
    }

    /// Whole window of data cell `(r, c)`.
    pub fn cell(&self, r: u32, c: u32) -> Window {
        let (mx, my) = self.margin();
        let x0 = mx + c * self.step_x;
        let y0 = my + r * self.step_y;
        Window { x0, y0, x1: x0 + self.step_x, y1: y0 + self.step_y }
    }

    /// Window of data cell `(r, c)` shrunk by `erosion` pixels on every side.
    pub fn eroded_cell(&self, r: u32, c: u32, erosion: u32) -> Window {
        let Window { x0, y0, x1, y1 } = self.cell(r, c);
        Window {
            x0: x0 + erosion,
            y0: y0 + erosion,
            x1: x1.saturating_sub(erosion),
            y1: y1.saturating_sub(erosion),
        }
    }
}
