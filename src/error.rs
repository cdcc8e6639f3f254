/// Crate-level error type for the pageturner score follower.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Reference sequence has no frames.
    #[error("reference sequence is empty")]
    EmptyReference,

    /// A page boundary points past the end of the reference (or at frame 0).
    #[error("page boundary #{index} = {boundary} is out of range for a reference of {len} frames")]
    BoundaryOutOfRange {
        index: usize,
        boundary: usize,
        len: usize,
    },

    /// Page boundaries must be strictly increasing.
    #[error("page boundary #{index} = {boundary} does not follow previous boundary {previous}")]
    BoundaryNotIncreasing {
        index: usize,
        previous: usize,
        boundary: usize,
    },

    /// Input has incorrect length for the operation.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// Malformed reference header text.
    #[error("malformed score data: {0}")]
    ScoreFormat(String),

    /// WAV decoding errors.
    #[error(transparent)]
    Wav(#[from] hound::Error),

    /// Settings file could not be parsed.
    #[error(transparent)]
    Config(#[from] toml::de::Error),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience Result type for pageturner operations.
pub type Result<T> = std::result::Result<T, Error>;
