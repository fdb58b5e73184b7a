use image::GrayImage;

use crate::common::{BitString, SampleLayout, Window, GRID, SAMPLE_EROSION};

// Grid sampler
// Reads one bit per data cell by averaging the cell's interior and rounding the
// mean intensity over 255 to 0 or 1. The grid is derived from the region's own
// size, which is expected to run from border midline to border midline.
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSampler {
    erosion: u32,
}

impl Default for GridSampler {
    fn default() -> Self {
        Self { erosion: SAMPLE_EROSION }
    }
}

impl GridSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn erosion(&mut self, erosion: u32) -> &mut Self {
        self.erosion = erosion;
        self
    }

    pub fn sample(&self, img: &GrayImage) -> BitString {
        let (w, h) = img.dimensions();
        let layout = SampleLayout::from_region(w, h);

        let mut bits = String::with_capacity((GRID * GRID) as usize);
        for r in 0..GRID {
            for c in 0..GRID {
                let mut win = layout.eroded_cell(r, c, self.erosion);
                if win.is_empty() {
                    win = layout.cell(r, c);
                }
                bits.push(match mean(img, win) {
                    Some(m) if (m / 255.0).round_ties_even() >= 1.0 => '1',
                    _ => '0',
                });
            }
        }
        BitString::from_raw(bits)
    }
}

/// Mean intensity over a window, clipped to the image. `None` if nothing is left.
fn mean(img: &GrayImage, win: Window) -> Option<f64> {
    let (w, h) = img.dimensions();
    let win = Window { x0: win.x0, y0: win.y0, x1: win.x1.min(w), y1: win.y1.min(h) };
    if win.is_empty() {
        return None;
    }

    let mut sum = 0u64;
    for y in win.y0..win.y1 {
        for x in win.x0..win.x1 {
            sum += img.get_pixel(x, y)[0] as u64;
        }
    }
    Some(sum as f64 / win.area() as f64)
}
