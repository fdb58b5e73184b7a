pub mod bits;
pub mod error;
pub mod layout;

pub use bits::*;
pub use error::*;
pub use layout::*;
