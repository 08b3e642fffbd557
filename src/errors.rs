use std::error::Error;
use std::fmt;
use std::io;

/// Enumeration of all errors raised while turning an MP4 file into HLS output
#[derive(Debug)]
pub enum HlsError {
    /// Structural failure decoding or indexing the container
    Mp4(Mp4Error),
    /// No keyframe-aligned range matches the request
    NoSegment(SegmentError),
    /// A box or computed buffer exceeds a configured limit
    Resource(ResourceError),
    /// Backing-store failure
    Stream(StreamError),
    Other(io::Error),
}

/// MP4 structural errors
#[derive(Debug)]
pub enum Mp4Error {
    /// A box payload is shorter than its layout requires
    Truncated {
        kind: String,
        needed: usize,
        available: usize,
    },
    /// A box header declares an impossible size
    InvalidSize { kind: String, size: u64 },
    /// A structurally mandatory child box is absent
    MissingChild { parent: String, child: String },
    /// Generic MP4 error with a descriptive message
    Error { message: String },
}

impl Mp4Error {
    /// Create a generic error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Mp4Error::Error {
            message: message.into(),
        }
    }

    pub fn truncated(kind: &str, needed: usize, available: usize) -> Self {
        Mp4Error::Truncated {
            kind: kind.to_string(),
            needed,
            available,
        }
    }

    pub fn missing(parent: &str, child: &str) -> Self {
        Mp4Error::MissingChild {
            parent: parent.to_string(),
            child: child.to_string(),
        }
    }
}

/// Segment resolution errors
#[derive(Debug)]
pub struct SegmentError {
    pub message: String,
}

impl SegmentError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Size limit errors
#[derive(Debug)]
pub struct ResourceError {
    pub message: String,
}

impl ResourceError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct StreamError {
    pub message: String,
}

impl StreamError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for HlsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HlsError::Other(err) => write!(f, "I/O error: {}", err),
            HlsError::Mp4(err) => write!(f, "MP4 error: {}", err),
            HlsError::NoSegment(err) => write!(f, "No segment: {}", err),
            HlsError::Resource(err) => write!(f, "Resource error: {}", err),
            HlsError::Stream(err) => write!(f, "Stream error: {}", err),
        }
    }
}

impl fmt::Display for Mp4Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mp4Error::Truncated {
                kind,
                needed,
                available,
            } => write!(
                f,
                "{} box too small: expected at least {} bytes, got {}",
                kind, needed, available
            ),
            Mp4Error::InvalidSize { kind, size } => {
                write!(f, "invalid size {} for {} box", size, kind)
            }
            Mp4Error::MissingChild { parent, child } => {
                write!(f, "{}: missing mandatory {}", parent, child)
            }
            Mp4Error::Error { message } => write!(f, "{}", message),
        }
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for HlsError {}
impl Error for Mp4Error {}
impl Error for SegmentError {}
impl Error for ResourceError {}
impl Error for StreamError {}

// Conversion implementations
impl From<io::Error> for HlsError {
    fn from(err: io::Error) -> Self {
        HlsError::Other(err)
    }
}

impl From<Mp4Error> for HlsError {
    fn from(err: Mp4Error) -> Self {
        HlsError::Mp4(err)
    }
}

impl From<SegmentError> for HlsError {
    fn from(err: SegmentError) -> Self {
        HlsError::NoSegment(err)
    }
}

impl From<ResourceError> for HlsError {
    fn from(err: ResourceError) -> Self {
        HlsError::Resource(err)
    }
}

impl From<StreamError> for HlsError {
    fn from(err: StreamError) -> Self {
        HlsError::Stream(err)
    }
}

// Conversion to io::Error for callers working with std I/O results
impl From<HlsError> for io::Error {
    fn from(err: HlsError) -> Self {
        match err {
            HlsError::Other(err) => err,
            other => io::Error::other(other),
        }
    }
}

// Type alias for Result with HlsError
pub type HlsResult<T> = Result<T, HlsError>;
