//! Error types for the cursor decoding pipeline.

use thiserror::Error;

/// Coarse classification of a [`CursorError`].
///
/// Callers decide between aborting a run and skipping a file by kind, not by
/// matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad signature, wrong form type, missing chunk, zero counts.
    MalformedContainer,
    /// A read or an index lookup past the end of a buffer or list.
    OutOfRange,
    /// Valid data in a variant this decoder does not handle.
    Unsupported,
    /// The embedded image codec rejected a payload.
    Codec,
    /// The size filter produced nothing to export.
    Selection,
}

/// Fatal errors raised while decoding cursor containers.
#[derive(Debug, Error)]
pub enum CursorError {
    /// A read would run past the end of the buffer
    #[error("Read of {needed} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfRange {
        /// Position the read started at
        offset: usize,
        /// Number of bytes requested
        needed: usize,
        /// Total buffer length
        len: usize,
    },

    /// Container is shorter than its fixed header
    #[error("Container too small: expected at least {expected} bytes, got {actual}")]
    TooSmall {
        /// Minimum byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Leading tag does not identify the container
    #[error("Invalid signature '{found}' (expected '{expected}')")]
    InvalidSignature {
        /// Tag that was expected
        expected: String,
        /// Tag that was found
        found: String,
    },

    /// Content matches none of the supported containers
    #[error("Unrecognized cursor format (expected RIFF ACON, ICO or CUR)")]
    UnknownFormat,

    /// RIFF file of some other form type
    #[error("Not an ANI file: expected RIFF ACON, got RIFF {0}")]
    NotAnimation(String),

    /// Required chunk absent
    #[error("ANI file missing required '{0}' chunk")]
    MissingChunk(&'static str),

    /// Chunk shorter than its fixed layout
    #[error("Chunk '{id}' too small: expected {expected} bytes, got {actual}")]
    ChunkTooSmall {
        /// Chunk tag
        id: String,
        /// Required size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Animation header declares no frames
    #[error("ANI 'anih' reports 0 frames")]
    ZeroFrames,

    /// Frame list holds no icon payloads
    #[error("ANI file contains no frames")]
    NoFrames,

    /// Icon directory reserved word is non-zero
    #[error("Invalid icon directory header (reserved = {0})")]
    InvalidReserved(u16),

    /// Icon directory type is neither icon nor cursor
    #[error("Invalid icon directory type {0} (expected 1 = ICO or 2 = CUR)")]
    InvalidImageType(u16),

    /// Icon directory has no entries
    #[error("Icon directory contains no images")]
    EmptyDirectory,

    /// Entry payload starts outside the container
    #[error("Image payload at offset {offset} lies outside container of {len} bytes")]
    PayloadOutOfBounds {
        /// Declared payload offset
        offset: u32,
        /// Container length
        len: usize,
    },

    /// Legacy bitmap uses a compression scheme
    #[error("Compressed bitmap not supported (compression = {0})")]
    UnsupportedCompression(u32),

    /// Legacy bitmap bit depth outside 1/4/8/24/32
    #[error("Unsupported bitmap bit depth {0}")]
    UnsupportedBitDepth(u16),

    /// Legacy bitmap dimensions that cannot describe a cursor
    #[error("Invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width
        width: i64,
        /// Declared height
        height: i64,
    },

    /// Embedded PNG could not be decoded
    #[error("Failed to decode embedded PNG: {0}")]
    Png(#[from] image::ImageError),

    /// Animation step index past the step count or playback sequence
    #[error("Animation step index {step} out of range ({steps} steps)")]
    StepOutOfRange {
        /// Requested step
        step: usize,
        /// Resolvable step count
        steps: usize,
    },

    /// Step resolves to a frame that does not exist
    #[error("Animation frame index {frame} out of range ({frames} frames)")]
    FrameOutOfRange {
        /// Resolved frame index
        frame: usize,
        /// Number of frames present
        frames: usize,
    },

    /// Rescale to size zero or past the largest supported dimension
    #[error("Invalid target size {0}")]
    InvalidTargetSize(u32),

    /// Size filter selected nothing
    #[error("No sizes selected for export")]
    NoImagesSelected,
}

impl CursorError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange { .. }
            | Self::StepOutOfRange { .. }
            | Self::FrameOutOfRange { .. } => ErrorKind::OutOfRange,
            Self::UnsupportedCompression(_) | Self::UnsupportedBitDepth(_) => {
                ErrorKind::Unsupported
            }
            Self::Png(_) => ErrorKind::Codec,
            Self::InvalidTargetSize(_) | Self::NoImagesSelected => ErrorKind::Selection,
            Self::TooSmall { .. }
            | Self::InvalidSignature { .. }
            | Self::UnknownFormat
            | Self::NotAnimation(_)
            | Self::MissingChunk(_)
            | Self::ChunkTooSmall { .. }
            | Self::ZeroFrames
            | Self::NoFrames
            | Self::InvalidReserved(_)
            | Self::InvalidImageType(_)
            | Self::EmptyDirectory
            | Self::PayloadOutOfBounds { .. }
            | Self::InvalidDimensions { .. } => ErrorKind::MalformedContainer,
        }
    }

    /// True for errors that indicate a broken file rather than a limitation.
    pub fn is_malformed(&self) -> bool {
        self.kind() == ErrorKind::MalformedContainer
    }
}

/// Shorthand for results carrying a [`CursorError`].
pub type Result<T> = std::result::Result<T, CursorError>;
