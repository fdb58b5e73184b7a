use std::{
    collections::VecDeque,
    ops::{Deref, DerefMut},
    path::PathBuf,
};

use image::DynamicImage;

use crate::common::{CodeError, CodeResult};

// Frame source
//------------------------------------------------------------------------------

/// Anything that hands out camera-like frames one at a time.
pub trait FrameSource {
    /// Blocks until the next frame is available. `Ok(None)` marks the end of the
    /// stream; errors are terminal failures of the device.
    fn next_frame(&mut self) -> CodeResult<Option<DynamicImage>>;

    /// Releases the underlying device. Called exactly once when a read ends.
    fn close(&mut self) {}
}

/// Closes the wrapped source when dropped, whichever way the read loop exits.
pub(crate) struct SourceGuard<'a, S: FrameSource + ?Sized> {
    src: &'a mut S,
}

impl<'a, S: FrameSource + ?Sized> SourceGuard<'a, S> {
    pub(crate) fn new(src: &'a mut S) -> Self {
        Self { src }
    }
}

impl<S: FrameSource + ?Sized> Deref for SourceGuard<'_, S> {
    type Target = S;
    fn deref(&self) -> &Self::Target {
        self.src
    }
}

impl<S: FrameSource + ?Sized> DerefMut for SourceGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.src
    }
}

impl<S: FrameSource + ?Sized> Drop for SourceGuard<'_, S> {
    fn drop(&mut self) {
        log::debug!("Closing frame source");
        self.src.close();
    }
}

// Image sequence
//------------------------------------------------------------------------------

enum Pending {
    Loaded(DynamicImage),
    Path(PathBuf),
}

/// Finite sequence of stills, either held in memory or loaded from disk on
/// demand.
pub struct ImageFrames {
    queue: VecDeque<Pending>,
    closed: bool,
}

impl ImageFrames {
    pub fn new<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = DynamicImage>,
    {
        Self { queue: frames.into_iter().map(Pending::Loaded).collect(), closed: false }
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let queue = paths.into_iter().map(|p| Pending::Path(p.into())).collect();
        Self { queue, closed: false }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSource for ImageFrames {
    fn next_frame(&mut self) -> CodeResult<Option<DynamicImage>> {
        if self.closed {
            return Err(CodeError::FrameSource("source is closed".into()));
        }
        match self.queue.pop_front() {
            None => Ok(None),
            Some(Pending::Loaded(img)) => Ok(Some(img)),
            Some(Pending::Path(path)) => image::open(&path)
                .map(Some)
                .map_err(|e| CodeError::FrameSource(format!("{}: {e}", path.display()))),
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.queue.clear();
    }
}

// Cancellation
//------------------------------------------------------------------------------

/// Cooperative stop signal, polled once between frames.
pub trait Cancel {
    fn is_cancelled(&self) -> bool;
}

impl<F> Cancel for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Signal that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Cancel for Never {
    fn is_cancelled(&self) -> bool {
        false
    }
}
