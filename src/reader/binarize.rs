use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

// Binarize
// Global Otsu threshold with inverted polarity: pixels at or below the level
// become foreground (255), everything brighter becomes background (0). Dark
// code content therefore ends up as foreground for contour tracing.
//------------------------------------------------------------------------------

#[derive(Debug)]
pub struct BinaryImage {
    pub buffer: GrayImage,
    pub level: u8,
}

impl BinaryImage {
    pub fn prepare(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        let (mn, mx) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

        // A frame without contrast has nothing to separate
        if mn >= mx {
            return Self { buffer: GrayImage::new(w, h), level: mn };
        }

        let level = otsu_level(gray);
        let buffer = GrayImage::from_fn(w, h, |x, y| {
            if gray.get_pixel(x, y)[0] > level {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        Self { buffer, level }
    }

    pub fn w(&self) -> u32 {
        self.buffer.width()
    }

    pub fn h(&self) -> u32 {
        self.buffer.height()
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.buffer.get_pixel(x, y)[0] != 0
    }
}
