use http::{HeaderMap, Method, Uri, Version};

#[derive(Debug)]
/// All the information that is transmitted as part of an HTTP request ahead of the body.
///
/// It includes the [method](Method), the [target](Uri),
/// the [HTTP version](Version), and the [headers](HeaderMap).
pub struct RequestHead {
    /// The HTTP method of the request.
    pub method: Method,
    /// The [target](https://datatracker.ietf.org/doc/html/rfc7230#section-5.3) of the request.
    pub target: Uri,
    /// The HTTP version used by the request.
    pub version: Version,
    /// The headers attached to the request.
    pub headers: HeaderMap,
}

impl RequestHead {
    /// The value of the `Content-Type` header.
    ///
    /// It returns `None` if the header is missing or if its value is not valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// The value of the `Content-Length` header, if present and well-formed.
    pub fn content_length(&self) -> Option<usize> {
        self.headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok()?.parse::<usize>().ok())
    }
}

impl From<http::request::Parts> for RequestHead {
    fn from(parts: http::request::Parts) -> Self {
        Self {
            method: parts.method,
            target: parts.uri,
            version: parts.version,
            headers: parts.headers,
        }
    }
}
