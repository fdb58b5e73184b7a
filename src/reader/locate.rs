use image::{imageops, DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};

use super::binarize::BinaryImage;

/// Axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Bounds {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Bounding box of a traced contour, inclusive of its extreme points.
    pub fn of_contour(contour: &Contour<u32>) -> Option<Self> {
        let first = contour.points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in contour.points.iter() {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self { x: x0, y: y0, w: x1 - x0 + 1, h: y1 - y0 + 1 })
    }
}

// Region
//------------------------------------------------------------------------------

/// Candidate code area cut out of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub bounds: Bounds,
    pub confidence: f64,
    img: GrayImage,
}

impl Region {
    pub fn image(&self) -> &GrayImage {
        &self.img
    }

    pub fn into_image(self) -> GrayImage {
        self.img
    }
}

/// Fraction of pixels that are within `tolerance` of pure black or pure white.
/// An empty image scores 0.
pub fn confidence(img: &GrayImage, tolerance: f64) -> f64 {
    let area = img.width() as u64 * img.height() as u64;
    if area == 0 {
        return 0.0;
    }

    let white = (1.0 - tolerance) * 255.0;
    let black = tolerance * 255.0;
    let saturated = img
        .pixels()
        .filter(|p| {
            let v = p[0] as f64;
            v > white || v < black
        })
        .count();

    saturated as f64 / area as f64
}

// Region locator
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLocator {
    min_size_divisor: u32,
    tolerance: f64,
}

impl Default for RegionLocator {
    fn default() -> Self {
        Self { min_size_divisor: 4, tolerance: 0.04 }
    }
}

impl RegionLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates must be wider than `w / divisor` and taller than `h / divisor`.
    pub fn min_size_divisor(&mut self, divisor: u32) -> &mut Self {
        self.min_size_divisor = divisor.max(1);
        self
    }

    /// Distance from 0 or 255, as a fraction of 255, that still counts as
    /// saturated when scoring.
    pub fn tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.tolerance = tolerance.clamp(0.0, 0.5);
        self
    }

    pub fn min_size(&self, w: u32, h: u32) -> (u32, u32) {
        (w / self.min_size_divisor, h / self.min_size_divisor)
    }

    /// Finds the most code-like region in a frame. `None` is the normal answer
    /// for frames that show no code.
    pub fn isolate(&self, frame: &DynamicImage) -> Option<Region> {
        self.isolate_gray(&frame.to_luma8())
    }

    pub fn isolate_gray(&self, gray: &GrayImage) -> Option<Region> {
        let candidates = self.candidates(gray);
        log::trace!("{} candidates after size filter", candidates.len());
        self.select(gray, &candidates)
    }

    /// Bounding boxes of outermost foreground blobs, in tracing order, that
    /// clear the minimum size. Blobs touching the frame edge count too.
    pub fn candidates(&self, gray: &GrayImage) -> Vec<Bounds> {
        let (w, h) = gray.dimensions();
        let (min_w, min_h) = self.min_size(w, h);

        // Tracing reports edge-touching blobs as holes, so trace inside a 1px
        // background ring and shift the boxes back afterwards
        let bin = BinaryImage::prepare(gray);
        let mut padded = GrayImage::new(w + 2, h + 2);
        imageops::replace(&mut padded, &bin.buffer, 1, 1);

        find_contours::<u32>(&padded)
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(Bounds::of_contour)
            .map(|b| Bounds { x: b.x.saturating_sub(1), y: b.y.saturating_sub(1), ..b })
            .filter(|b| b.w > min_w && b.h > min_h)
            .collect()
    }

    pub fn score(&self, gray: &GrayImage, bounds: Bounds) -> Region {
        let Bounds { x, y, w, h } = bounds;
        let img = imageops::crop_imm(gray, x, y, w, h).to_image();
        let confidence = confidence(&img, self.tolerance);
        Region { bounds, confidence, img }
    }

    /// Scores every candidate and keeps the best. On ties the earlier candidate
    /// wins.
    pub fn select(&self, gray: &GrayImage, candidates: &[Bounds]) -> Option<Region> {
        let mut best: Option<Region> = None;
        for &b in candidates {
            let reg = self.score(gray, b);
            log::trace!("Candidate {:?} confidence {:.3}", reg.bounds, reg.confidence);
            if best.as_ref().map_or(true, |cur| reg.confidence > cur.confidence) {
                best = Some(reg);
            }
        }
        best
    }
}
