use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use tokio::sync::OnceCell;

use super::errors::{
    BodyAlreadyConsumed, BodyReadTimeout, ExtractBufferedBodyError, SizeLimitExceeded,
    UnexpectedBufferError,
};
use super::{BodySizeLimit, RawIncomingBody, RequestHead};

#[derive(Debug)]
/// Everything a binder may need to know about the request that is currently being processed.
///
/// It is request-scoped: the host creates one per incoming request and shares it,
/// read-only, with every binder involved in processing that request.
///
/// # Body buffering
///
/// The body is buffered in memory the first time [`buffered_body`](Self::buffered_body)
/// is called, enforcing the configured [`BodySizeLimit`] and read timeout.
/// Later calls return the same bytes without touching the network again.
pub struct RequestContext {
    head: RequestHead,
    body: Mutex<Option<RawIncomingBody>>,
    buffered_body: OnceCell<Bytes>,
    body_size_limit: BodySizeLimit,
    read_timeout: Option<Duration>,
}

impl RequestContext {
    /// Create a new [`RequestContext`] using the default [`BodySizeLimit`] and no read timeout.
    pub fn new<B>(head: RequestHead, body: B) -> Self
    where
        B: Into<RawIncomingBody>,
    {
        Self {
            head,
            body: Mutex::new(Some(body.into())),
            buffered_body: OnceCell::new(),
            body_size_limit: BodySizeLimit::default(),
            read_timeout: None,
        }
    }

    /// Split an [`http::Request`] into its head and body.
    pub fn from_request<B>(request: http::Request<B>) -> Self
    where
        B: Into<RawIncomingBody>,
    {
        let (parts, body) = request.into_parts();
        Self::new(parts.into(), body)
    }

    /// Set the upper limit on the size of the request body.
    pub fn body_size_limit(mut self, limit: BodySizeLimit) -> Self {
        self.body_size_limit = limit;
        self
    }

    /// Fail body reads that take longer than `timeout`.
    ///
    /// No timeout is enforced if `None`.
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    /// The value of the `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.head.content_type()
    }

    /// Buffer the request body in memory and return it.
    ///
    /// The body is read from the network at most once: if the first read fails, every
    /// later call returns [`BodyAlreadyConsumed`].
    pub async fn buffered_body(&self) -> Result<&Bytes, ExtractBufferedBodyError> {
        self.buffered_body.get_or_try_init(|| self.buffer()).await
    }

    async fn buffer(&self) -> Result<Bytes, ExtractBufferedBodyError> {
        let body = self
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(BodyAlreadyConsumed)?;
        let buffering = buffer_with_limit(&self.head, body, self.body_size_limit);
        match self.read_timeout {
            Some(timeout) => tokio::time::timeout(timeout, buffering)
                .await
                .map_err(|_| BodyReadTimeout { timeout })?,
            None => buffering.await,
        }
    }
}

async fn buffer_with_limit<B>(
    request_head: &RequestHead,
    body: B,
    body_size_limit: BodySizeLimit,
) -> Result<Bytes, ExtractBufferedBodyError>
where
    B: http_body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_size = match body_size_limit {
        BodySizeLimit::Enabled { max_size } => max_size,
        BodySizeLimit::Disabled => {
            return match body.collect().await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(e) => Err(UnexpectedBufferError { source: e.into() }.into()),
            };
        }
    };
    let content_length = request_head.content_length();

    // Little shortcut to create a `SizeLimitExceeded` error.
    let limit_error = || SizeLimitExceeded {
        max_size,
        content_length,
    };

    // A `Content-Length` above the limit lets us bail out without reading a single byte.
    if let Some(len) = content_length {
        if len > max_size {
            return Err(limit_error().into());
        }
    }

    // We saturate to `usize::MAX` on platforms where `usize` is smaller than `u64`.
    let max_n_bytes = max_size.as_u64().try_into().unwrap_or(usize::MAX);
    // The `Content-Length` header may lie: keep track of the limit while buffering.
    let limited_body = Limited::new(body, max_n_bytes);
    match limited_body.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            if e.downcast_ref::<http_body_util::LengthLimitError>()
                .is_some()
            {
                Err(limit_error().into())
            } else {
                Err(UnexpectedBufferError { source: e }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use futures_util::stream;
    use http_body::Frame;
    use http_body_util::StreamBody;
    use ubyte::ToByteUnit;

    use super::{BodySizeLimit, RawIncomingBody, RequestContext};
    use crate::request::errors::ExtractBufferedBodyError;

    fn request(headers: &[(&'static str, &'static str)], body: RawIncomingBody) -> RequestContext {
        let mut builder = http::Request::builder().method(http::Method::POST).uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        RequestContext::from_request(builder.body(body).unwrap())
    }

    fn broken_body() -> RawIncomingBody {
        let frames = stream::iter(vec![
            Ok(Frame::data(Bytes::from_static(b"{\"id\":"))),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
        ]);
        RawIncomingBody::new(StreamBody::new(frames))
    }

    #[tokio::test]
    async fn the_body_is_buffered_once() {
        let ctx = request(&[], "{\"id\":1}".into());
        let first = ctx.buffered_body().await.unwrap().clone();
        let second = ctx.buffered_body().await.unwrap();
        assert_eq!(first, Bytes::from_static(b"{\"id\":1}"));
        assert_eq!(&first, second);
    }

    #[tokio::test]
    async fn error_if_body_above_size_limit_without_content_length() {
        let ctx = request(&[], vec![0u8; 1000].into()).body_size_limit(BodySizeLimit::Enabled {
            max_size: 100.bytes(),
        });
        let err = ctx.buffered_body().await.unwrap_err();
        insta::assert_snapshot!(err, @"The request body is larger than the maximum size limit enforced by this server.");
        let ExtractBufferedBodyError::SizeLimitExceeded(e) = err else {
            panic!("Expected a size limit error, got {err:?}");
        };
        assert_eq!(e.content_length, None);
    }

    #[tokio::test]
    async fn error_if_content_length_header_is_larger_than_limit() {
        // The body itself is tiny, but the header claims otherwise.
        let ctx = request(&[("content-length", "1000")], "{}".into()).body_size_limit(
            BodySizeLimit::Enabled {
                max_size: 100.bytes(),
            },
        );
        let err = ctx.buffered_body().await.unwrap_err();
        let ExtractBufferedBodyError::SizeLimitExceeded(e) = err else {
            panic!("Expected a size limit error, got {err:?}");
        };
        assert_eq!(e.content_length, Some(1000));
        assert_eq!(e.max_size, 100.bytes());
    }

    #[tokio::test]
    async fn no_limit_when_disabled() {
        let ctx = request(&[], vec![0u8; 1000].into()).body_size_limit(BodySizeLimit::Disabled);
        assert_eq!(ctx.buffered_body().await.unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn stream_faults_are_reported_and_the_body_is_gone() {
        let ctx = request(&[], broken_body());
        let err = ctx.buffered_body().await.unwrap_err();
        insta::assert_snapshot!(err, @"Something went wrong while reading the request body.");

        let err = ctx.buffered_body().await.unwrap_err();
        assert!(matches!(err, ExtractBufferedBodyError::AlreadyConsumed(_)));
    }

    #[tokio::test]
    async fn stalled_reads_time_out() {
        let stalled = StreamBody::new(stream::pending::<Result<Frame<Bytes>, std::io::Error>>());
        let ctx = request(&[], RawIncomingBody::new(stalled))
            .read_timeout(Some(Duration::from_millis(20)));
        let err = ctx.buffered_body().await.unwrap_err();
        insta::assert_snapshot!(err, @"The request body was not received within 20ms.");
    }
}
