// Error
//------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum CodeError {
    // Encode path
    #[error("key {key} does not fit in {width} bits")]
    InvalidKey { key: u128, width: u32 },
    #[error("side {0} is too small to hold the code grid")]
    InvalidSide(u32),

    // Read path
    #[error("frame source exhausted")]
    EndOfStream,
    #[error("frame source failure: {0}")]
    FrameSource(String),

    // Record store
    #[error("no free key found after {0} draws")]
    KeySpaceExhausted(usize),
    #[error("key {0} is already registered")]
    DuplicateKey(u64),
    #[error("no record for key {0}")]
    RecordNotFound(u64),
    #[error("invalid record field: {0}")]
    InvalidField(String),
    #[error("malformed record at line {line}")]
    MalformedRecord { line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl CodeError {
    /// Terminal failures of the frame source, as opposed to codec or store errors.
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Self::EndOfStream | Self::FrameSource(_))
    }
}

pub type CodeResult<T> = Result<T, CodeError>;
