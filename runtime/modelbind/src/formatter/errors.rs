//! Errors that can occur while selecting an input formatter or reading the request body with it.
use crate::request::errors::ExtractBufferedBodyError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`InputFormatter::read`] when the body can't be turned into a model.
///
/// [`InputFormatter::read`]: super::InputFormatter::read
pub enum InputFormatterError {
    #[error(transparent)]
    /// The body couldn't be read from the network.
    /// See [`ExtractBufferedBodyError`] for details.
    Body(#[from] ExtractBufferedBodyError),
    #[error(transparent)]
    /// See [`JsonDeserializationError`] for details.
    Json(#[from] JsonDeserializationError),
    #[error(transparent)]
    /// See [`UrlEncodedDeserializationError`] for details.
    UrlEncoded(#[from] UrlEncodedDeserializationError),
    #[error(transparent)]
    /// A failure raised by a formatter that isn't built into this crate.
    Custom(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to deserialize the body as a JSON document.\n{source}")]
#[non_exhaustive]
/// Something went wrong when deserializing the request body into the specified type.
pub struct JsonDeserializationError {
    #[source]
    pub(crate) source: serde_path_to_error::Error<serde_json::Error>,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to deserialize the body as a urlencoded form.\n{source}")]
#[non_exhaustive]
/// Something went wrong when deserializing the request body into the specified type.
pub struct UrlEncodedDeserializationError {
    #[source]
    pub(crate) source: serde_html_form::de::Error,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported content type: {}", .content_type.as_deref().unwrap_or("<missing>"))]
#[non_exhaustive]
/// None of the registered input formatters can read a body with the request's `Content-Type`.
pub struct UnsupportedContentType {
    /// The value of the `Content-Type` header.
    ///
    /// It's `None` if the header was missing or not valid UTF-8.
    pub content_type: Option<String>,
}
