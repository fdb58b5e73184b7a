//! # gridkey
//!
//! Fixed-layout 8x8 binary grid codes carrying a 64-bit key, with a reader that
//! picks them out of camera-like frames.
//!
//! ## Features
//!
//! - **Generation**: Render a key as a square black/white raster with registration marks
//! - **Reading**: Locate, score and sample a code region from a stream of frames
//! - **Record store**: Flat-file registry mapping generated keys to named payloads
//!
//! ## Quick Start
//!
//! ### Generating a code
//!
//! ```rust
//! use gridkey::{encode, CodeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Default 600x600 canvas
//! let code = encode(12345);
//! assert_eq!(code.as_image().dimensions(), (600, 600));
//!
//! // Custom canvas size and mark thickness
//! let code = CodeBuilder::new(12345).side(300).mark_thickness(2).build()?;
//! assert_eq!(code.key(), 12345);
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a code
//!
//! ```rust
//! use gridkey::{encode, CodeReader, ImageFrames, Never};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frames = ImageFrames::new([encode(987654321).to_frame()]);
//! let key = CodeReader::new().threshold(0.55).read(&mut frames, &Never)?;
//! assert_eq!(key, Some(987654321));
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! The canvas is split into a 10x10 grid of equal cells. The outer ring is a
//! white border, and the inner 8x8 cells carry the key's bits MSB first in
//! row-major order, white for 1 and black for 0. Thin black bars along the
//! border midlines close a frame around the data so the reader can find it.

pub mod builder;
pub(crate) mod common;
pub mod reader;
pub mod store;

pub use builder::{encode, render, CodeBuilder, CodeImage};
pub use common::{
    decode_bits, encode_bits, BitString, CanvasLayout, CodeError, CodeResult, SampleLayout, Window,
    DEFAULT_SIDE, GRID, KEY_BITS, MARK_THICKNESS, SPAN,
};
pub use reader::{
    decode, Bounds, Cancel, CodeReader, FrameSource, GridSampler, ImageFrames, Never, ReadState,
    Region, RegionLocator, Scan,
};
pub use store::{Record, RecordStore};
