pub mod binarize;
pub mod locate;
pub mod sample;
pub mod source;

use image::DynamicImage;

use crate::common::{CodeError, CodeResult};
pub use locate::{confidence, Bounds, Region, RegionLocator};
pub use sample::GridSampler;
pub use source::{Cancel, FrameSource, ImageFrames, Never};
use source::SourceGuard;

/// Reads one code from `src` with the default reader and no cancellation.
pub fn decode<S: FrameSource + ?Sized>(src: &mut S) -> CodeResult<Option<u64>> {
    CodeReader::new().read(src, &Never)
}

// Read state
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Searching,
    CandidateFound,
    Accepted,
}

/// Outcome of scanning a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Scan {
    NoRegion,
    LowConfidence(Region),
    Accepted { region: Region, key: u64 },
}

impl Scan {
    /// State the reader ends up in after this frame.
    pub fn state(&self) -> ReadState {
        match self {
            Self::NoRegion | Self::LowConfidence(_) => ReadState::Searching,
            Self::Accepted { .. } => ReadState::Accepted,
        }
    }

    pub fn region(&self) -> Option<&Region> {
        match self {
            Self::NoRegion => None,
            Self::LowConfidence(r) | Self::Accepted { region: r, .. } => Some(r),
        }
    }

    pub fn key(&self) -> Option<u64> {
        match self {
            Self::Accepted { key, .. } => Some(*key),
            _ => None,
        }
    }
}

// Code reader
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CodeReader {
    locator: RegionLocator,
    sampler: GridSampler,
    threshold: f64,
    max_frames: Option<usize>,
}

impl Default for CodeReader {
    fn default() -> Self {
        Self {
            locator: RegionLocator::default(),
            sampler: GridSampler::default(),
            threshold: 0.55,
            max_frames: None,
        }
    }
}

impl CodeReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum confidence before a region is decoded. 0 accepts any region.
    pub fn threshold(&mut self, threshold: f64) -> &mut Self {
        self.threshold = threshold;
        self
    }

    /// Gives up after this many frames without an accepted region.
    pub fn max_frames(&mut self, max_frames: usize) -> &mut Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn unset_max_frames(&mut self) -> &mut Self {
        self.max_frames = None;
        self
    }

    pub fn locator(&mut self, locator: RegionLocator) -> &mut Self {
        self.locator = locator;
        self
    }

    pub fn sampler(&mut self, sampler: GridSampler) -> &mut Self {
        self.sampler = sampler;
        self
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Threshold: {}, Max frames: {:?}, Locator: {:?}, Sampler: {:?} }}",
            self.threshold, self.max_frames, self.locator, self.sampler
        )
    }

    /// Runs locate, gate and sample on a single frame.
    pub fn scan(&self, frame: &DynamicImage) -> Scan {
        let Some(region) = self.locator.isolate(frame) else {
            log::trace!("{:?}: no region", ReadState::Searching);
            return Scan::NoRegion;
        };

        log::debug!(
            "{:?}: {:?} confidence {:.3}",
            ReadState::CandidateFound,
            region.bounds,
            region.confidence
        );
        if region.confidence < self.threshold {
            return Scan::LowConfidence(region);
        }

        let bits = self.sampler.sample(region.image());
        let key = bits.to_key();
        log::info!("{:?}: key {key} at {:?}", ReadState::Accepted, region.bounds);
        Scan::Accepted { region, key }
    }

    /// Polls `src` until a frame yields an accepted region. Returns `Ok(None)`
    /// when `cancel` fires or the frame budget runs out. The source is closed on
    /// every exit path.
    pub fn read<S, C>(&self, src: &mut S, cancel: &C) -> CodeResult<Option<u64>>
    where
        S: FrameSource + ?Sized,
        C: Cancel + ?Sized,
    {
        self.read_with(src, cancel, |_, _| ())
    }

    /// Like [`read`](Self::read), handing every frame and its scan to `on_frame`
    /// before moving on. Useful for drawing overlays.
    pub fn read_with<S, C, F>(
        &self,
        src: &mut S,
        cancel: &C,
        mut on_frame: F,
    ) -> CodeResult<Option<u64>>
    where
        S: FrameSource + ?Sized,
        C: Cancel + ?Sized,
        F: FnMut(&DynamicImage, &Scan),
    {
        log::debug!("Reading code {}", self.metadata());
        let mut src = SourceGuard::new(src);
        let mut count = 0usize;

        loop {
            if cancel.is_cancelled() {
                log::debug!("Read cancelled after {count} frames");
                return Ok(None);
            }
            if self.max_frames.is_some_and(|max| count >= max) {
                log::warn!("No code accepted within {count} frames");
                return Ok(None);
            }

            let frame = src.next_frame()?.ok_or(CodeError::EndOfStream)?;
            count += 1;

            let scan = self.scan(&frame);
            on_frame(&frame, &scan);
            if let Some(key) = scan.key() {
                return Ok(Some(key));
            }
        }
    }
}

#[cfg(test)]
mod reader_tests {
    use std::cell::Cell;

    use image::{DynamicImage, GrayImage, Luma};

    use super::{decode, CodeReader, FrameSource, ImageFrames, Never, ReadState, Scan};
    use crate::{
        builder::encode,
        common::{CodeError, CodeResult},
    };

    /// Counts frames and closes, optionally failing on a given frame.
    struct Probe {
        frames: Vec<DynamicImage>,
        served: usize,
        closed: usize,
        fail_at: Option<usize>,
    }

    impl Probe {
        fn new(frames: Vec<DynamicImage>) -> Self {
            Self { frames, served: 0, closed: 0, fail_at: None }
        }
    }

    impl FrameSource for Probe {
        fn next_frame(&mut self) -> CodeResult<Option<DynamicImage>> {
            if self.fail_at == Some(self.served) {
                return Err(CodeError::FrameSource("device lost".into()));
            }
            let frame = self.frames.get(self.served).cloned();
            self.served += 1;
            Ok(frame)
        }

        fn close(&mut self) {
            self.closed += 1;
        }
    }

    fn blank() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(600, 600, Luma([255])))
    }

    fn smudged(key: u64) -> DynamicImage {
        // Wash the code out to mid grey so it is found but fails the gate
        let mut img = encode(key).into_image();
        img.pixels_mut().for_each(|p| p[0] = 64 + p[0] / 2);
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_end_to_end_single_frame() {
        let mut src = Probe::new(vec![encode(12345).to_frame()]);
        let key = CodeReader::new().threshold(0.0).read(&mut src, &Never).unwrap();
        assert_eq!(key, Some(12345));
        assert_eq!(src.served, 1);
        assert_eq!(src.closed, 1);
    }

    #[test]
    fn test_decode_entry_point() {
        let mut src = ImageFrames::new([blank(), encode(u64::MAX - 7).into()]);
        assert_eq!(decode(&mut src).unwrap(), Some(u64::MAX - 7));
        assert!(src.is_closed());
    }

    #[test]
    fn test_scan_states() {
        let reader = CodeReader::new();

        let scan = reader.scan(&blank());
        assert_eq!(scan, Scan::NoRegion);
        assert_eq!(scan.state(), ReadState::Searching);

        let scan = reader.scan(&smudged(99));
        assert!(matches!(scan, Scan::LowConfidence(_)));
        assert_eq!(scan.state(), ReadState::Searching);
        assert!(scan.region().unwrap().confidence < 0.55);
        assert_eq!(scan.key(), None);

        let scan = reader.scan(&encode(99).to_frame());
        assert_eq!(scan.state(), ReadState::Accepted);
        assert_eq!(scan.key(), Some(99));
    }

    #[test]
    fn test_keeps_searching_until_accepted() {
        let frames = vec![blank(), smudged(4242), blank(), encode(4242).to_frame(), blank()];
        let mut src = Probe::new(frames);
        let mut seen = Vec::new();

        let key = CodeReader::new()
            .read_with(&mut src, &Never, |_, scan| seen.push(scan.state()))
            .unwrap();

        assert_eq!(key, Some(4242));
        assert_eq!(src.served, 4);
        assert_eq!(src.closed, 1);
        assert_eq!(seen.last(), Some(&ReadState::Accepted));
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_unconditional_accept() {
        // With the gate at 0 even a washed-out code is decoded
        let mut src = Probe::new(vec![smudged(7)]);
        let key = CodeReader::new().threshold(0.0).read(&mut src, &Never).unwrap();
        assert!(key.is_some());
    }

    #[test]
    fn test_cancel_between_frames() {
        let polls = Cell::new(0);
        let cancel = || {
            polls.set(polls.get() + 1);
            polls.get() > 2
        };

        let mut src = Probe::new(vec![blank(), blank(), blank(), encode(1).to_frame()]);
        let key = CodeReader::new().read(&mut src, &cancel).unwrap();

        assert_eq!(key, None);
        assert_eq!(src.served, 2);
        assert_eq!(src.closed, 1);
    }

    #[test]
    fn test_end_of_stream_is_failure() {
        let mut src = Probe::new(vec![blank(), blank()]);
        let err = CodeReader::new().read(&mut src, &Never).unwrap_err();
        assert!(matches!(err, CodeError::EndOfStream));
        assert_eq!(src.closed, 1);
    }

    #[test]
    fn test_device_failure_propagates() {
        let mut src = Probe::new(vec![blank(), blank(), encode(5).to_frame()]);
        src.fail_at = Some(1);
        let err = CodeReader::new().read(&mut src, &Never).unwrap_err();
        assert!(matches!(err, CodeError::FrameSource(_)));
        assert_eq!(src.closed, 1);
    }

    #[test]
    fn test_frame_budget() {
        let mut src = Probe::new(vec![blank(); 10]);
        let key = CodeReader::new().max_frames(3).read(&mut src, &Never).unwrap();
        assert_eq!(key, None);
        assert_eq!(src.served, 3);
        assert_eq!(src.closed, 1);
    }
}
