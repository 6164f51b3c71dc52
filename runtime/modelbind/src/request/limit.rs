use ubyte::{ByteUnit, ToByteUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An upper limit on the size of incoming request bodies.
///
/// It's enforced when the body is buffered, see [`RequestContext::buffered_body`].
///
/// [`RequestContext::buffered_body`]: super::RequestContext::buffered_body
pub enum BodySizeLimit {
    /// There is an active limit on the size of incoming request bodies.
    Enabled {
        /// The maximum size of incoming request bodies, in bytes.
        max_size: ByteUnit,
    },
    /// There is no limit on the size of incoming request bodies.
    Disabled,
}

impl BodySizeLimit {
    /// The maximum body size, if a limit is enabled.
    pub fn max_size(&self) -> Option<ByteUnit> {
        match self {
            BodySizeLimit::Enabled { max_size } => Some(*max_size),
            BodySizeLimit::Disabled => None,
        }
    }
}

impl Default for BodySizeLimit {
    fn default() -> Self {
        Self::Enabled {
            max_size: 2.megabytes(),
        }
    }
}

impl From<Option<ByteUnit>> for BodySizeLimit {
    fn from(max_size: Option<ByteUnit>) -> Self {
        match max_size {
            Some(max_size) => Self::Enabled { max_size },
            None => Self::Disabled,
        }
    }
}
