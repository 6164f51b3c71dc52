//! Errors that can occur while reading the request body.
use std::time::Duration;

use ubyte::ByteUnit;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`RequestContext::buffered_body`] when the body can't be buffered.
///
/// [`RequestContext::buffered_body`]: crate::request::RequestContext::buffered_body
pub enum ExtractBufferedBodyError {
    #[error(transparent)]
    /// See [`SizeLimitExceeded`] for details.
    SizeLimitExceeded(#[from] SizeLimitExceeded),
    #[error(transparent)]
    /// See [`UnexpectedBufferError`] for details.
    UnexpectedBufferError(#[from] UnexpectedBufferError),
    #[error(transparent)]
    /// See [`BodyReadTimeout`] for details.
    ReadTimeout(#[from] BodyReadTimeout),
    #[error(transparent)]
    /// See [`BodyAlreadyConsumed`] for details.
    AlreadyConsumed(#[from] BodyAlreadyConsumed),
}

#[derive(Debug, thiserror::Error)]
#[error("The request body is larger than the maximum size limit enforced by this server.")]
#[non_exhaustive]
/// The request body is larger than the maximum size limit enforced by this server.
pub struct SizeLimitExceeded {
    /// The maximum size limit enforced by this server.
    pub max_size: ByteUnit,
    /// The value of the `Content-Length` header for the request that breached the body
    /// size limit.
    ///
    /// It's set to `None` if the `Content-Length` header was missing or invalid.
    /// If it's set to `Some(n)` and `n` is smaller than `max_size`, then the request
    /// lied about the size of its body in the `Content-Length` header.
    pub content_length: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
#[error("Something went wrong while reading the request body.")]
#[non_exhaustive]
/// Something went wrong while reading the request body, but we don't know what specifically.
///
/// A client that disconnects halfway through the upload ends up here.
pub struct UnexpectedBufferError {
    #[source]
    pub(crate) source: Box<dyn std::error::Error + Send + Sync>,
}

#[derive(Debug, thiserror::Error)]
#[error("The request body was not received within {}ms.", .timeout.as_millis())]
#[non_exhaustive]
/// Reading the request body took longer than the configured timeout.
pub struct BodyReadTimeout {
    /// The timeout that was exceeded.
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
#[error("The request body has already been consumed by a previous, failed, read.")]
#[non_exhaustive]
/// The raw body was taken by an earlier read attempt that didn't complete successfully.
pub struct BodyAlreadyConsumed;
