//! Turn the request body into a model.
//!
//! # Overview
//!
//! An [`InputFormatter`] knows how to read a certain body format (e.g. JSON) into a model.
//! The host registers an ordered set of formatters for each request, an [`InputFormatters`]
//! collection, and an [`InputFormatterSelector`] picks the one that is going to be used.
//!
//! The [`DefaultInputFormatterSelector`] goes for the first formatter, in registration order,
//! that [can read](InputFormatter::can_read) the request. Registration order is, therefore,
//! the priority order.
use std::fmt;
use std::sync::Arc;

use crate::binding::{Model, ModelType};
use crate::request::RequestContext;

pub use errors::{InputFormatterError, UnsupportedContentType};
pub use json::JsonInputFormatter;
pub use selector::{DefaultInputFormatterSelector, InputFormatterSelector};
pub use url_encoded::UrlEncodedInputFormatter;

pub mod errors;
mod json;
mod selector;
mod url_encoded;

#[derive(Debug, Clone, Copy)]
/// Everything an [`InputFormatter`] needs to decide whether it can read the request body
/// and, if it can, to read it.
pub struct InputFormatterContext<'a> {
    request: &'a RequestContext,
    model_type: &'a ModelType,
    treat_empty_input_as_default: bool,
}

impl<'a> InputFormatterContext<'a> {
    pub fn new(request: &'a RequestContext, model_type: &'a ModelType) -> Self {
        Self {
            request,
            model_type,
            treat_empty_input_as_default: false,
        }
    }

    /// If `true`, an empty body binds to the [default value](ModelType::default_value) of
    /// the model type instead of being handed over to the deserializer.
    pub fn treat_empty_input_as_default(mut self, enabled: bool) -> Self {
        self.treat_empty_input_as_default = enabled;
        self
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    /// The type of the model that must be produced.
    pub fn model_type(&self) -> &'a ModelType {
        self.model_type
    }

    /// The parsed `Content-Type` of the request.
    ///
    /// It's `None` if the header is missing or it isn't a valid MIME type.
    pub fn content_type(&self) -> Option<mime::Mime> {
        self.request.content_type()?.parse().ok()
    }

    /// The model to bind when the body is empty, if empty bodies are allowed.
    pub(crate) fn empty_input(&self, body: &[u8]) -> Option<Option<Model>> {
        if body.is_empty() && self.treat_empty_input_as_default {
            Some(self.model_type.default_value())
        } else {
            None
        }
    }
}

#[async_trait::async_trait]
/// A deserializer for a specific request body format.
pub trait InputFormatter: fmt::Debug + Send + Sync {
    /// The name used to refer to this formatter in diagnostics.
    fn name(&self) -> &'static str;

    /// Returns `true` if this formatter can read the request body described by `context`.
    ///
    /// It must not consume the body.
    fn can_read(&self, context: &InputFormatterContext<'_>) -> bool;

    /// Read the request body into an instance of [`InputFormatterContext::model_type`].
    ///
    /// It returns `Ok(None)` if the body encodes an absent model (e.g. a JSON `null`).
    async fn read(
        &self,
        context: &InputFormatterContext<'_>,
    ) -> Result<Option<Model>, InputFormatterError>;
}

#[derive(Debug, Clone, Default)]
/// An ordered set of [`InputFormatter`]s.
///
/// The order is significant: it's used as priority order when selecting a formatter.
pub struct InputFormatters(Vec<Arc<dyn InputFormatter>>);

impl InputFormatters {
    /// An empty set of formatters.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in formatters: [`JsonInputFormatter`] followed by [`UrlEncodedInputFormatter`].
    pub fn builtin() -> Self {
        Self::new()
            .with(JsonInputFormatter)
            .with(UrlEncodedInputFormatter)
    }

    /// Append a formatter, with lower priority than the ones already registered.
    pub fn with<F>(mut self, formatter: F) -> Self
    where
        F: InputFormatter + 'static,
    {
        self.push(formatter);
        self
    }

    /// Append a formatter, with lower priority than the ones already registered.
    pub fn push<F>(&mut self, formatter: F)
    where
        F: InputFormatter + 'static,
    {
        self.0.push(Arc::new(formatter));
    }

    /// Iterate over the formatters, in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn InputFormatter>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Arc<dyn InputFormatter>> for InputFormatters {
    fn from_iter<I: IntoIterator<Item = Arc<dyn InputFormatter>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::request::RequestContext;

    /// A POST request with the given `Content-Type` (if any) and body.
    pub(crate) fn request(content_type: Option<&'static str>, body: &'static str) -> RequestContext {
        let mut builder = http::Request::builder()
            .method(http::Method::POST)
            .uri("/orders");
        if let Some(content_type) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, content_type);
        }
        RequestContext::from_request(builder.body(body).unwrap())
    }
}
