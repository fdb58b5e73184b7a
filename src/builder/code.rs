use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

use crate::common::{BitString, CanvasLayout, CodeResult, GRID};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Rendered code. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeImage {
    img: GrayImage,
    bits: BitString,
    layout: CanvasLayout,
}

impl CodeImage {
    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    pub fn key(&self) -> u64 {
        self.bits.to_key()
    }

    pub fn side(&self) -> u32 {
        self.layout.side
    }

    pub fn cell(&self) -> u32 {
        self.layout.cell
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.img
    }

    pub fn into_image(self) -> GrayImage {
        self.img
    }

    /// Copy of the raster, ready to be fed to the reader as a frame.
    pub fn to_frame(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.img.clone())
    }

    /// Saves the raster; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CodeResult<()> {
        self.img.save(path)?;
        Ok(())
    }

    /// Text preview with one character per cell, including the border.
    pub fn to_str(&self) -> String {
        let span = GRID + 2;
        let mut canvas = String::with_capacity(((span * 2 + 1) * span) as usize);
        for r in 0..span {
            for c in 0..span {
                let inner = (1..=GRID).contains(&r) && (1..=GRID).contains(&c);
                let dark = inner && !self.bits.bit(((r - 1) * GRID + c - 1) as usize);
                canvas.push_str(if dark { "  " } else { "██" });
            }
            canvas.push('\n');
        }
        canvas
    }
}

impl From<CodeImage> for DynamicImage {
    fn from(code: CodeImage) -> Self {
        DynamicImage::ImageLuma8(code.img)
    }
}

// Render
//------------------------------------------------------------------------------

/// Draws `bits` onto a fresh `side x side` canvas. Data cell `(r, c)` carries
/// bit `r * GRID + c`; a '0' paints it black, anything else leaves it white.
/// Four bars of `thickness` pixels run along the border midlines and close into
/// a square frame around the data grid.
pub fn render(bits: &BitString, side: u32, thickness: u32) -> CodeResult<CodeImage> {
    let layout = CanvasLayout::new(side)?;
    Ok(paint(bits, layout, thickness))
}

pub(crate) fn paint(bits: &BitString, layout: CanvasLayout, thickness: u32) -> CodeImage {
    let CanvasLayout { side, cell } = layout;

    let mut img = GrayImage::from_pixel(side, side, LIGHT);

    for r in 0..GRID {
        for c in 0..GRID {
            if bits.bit((r * GRID + c) as usize) {
                continue;
            }
            let (x, y) = layout.cell_origin(r, c);
            draw_filled_rect_mut(&mut img, Rect::at(x as i32, y as i32).of_size(cell, cell), DARK);
        }
    }

    if thickness > 0 {
        let half = (thickness / 2) as i32;
        let (start, stop) = layout.mark_lines();
        let (start, stop) = (start as i32, stop as i32);
        let len = (stop - start) as u32 + thickness;

        for line in [start, stop] {
            let vert = Rect::at(line - half, start - half).of_size(thickness, len);
            let horz = Rect::at(start - half, line - half).of_size(len, thickness);
            draw_filled_rect_mut(&mut img, vert, DARK);
            draw_filled_rect_mut(&mut img, horz, DARK);
        }
    }

    CodeImage { img, bits: bits.clone(), layout }
}
