//! The per-request collection of binding and validation errors.
use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// The default cap on the number of errors a [`ModelState`] will record.
pub const DEFAULT_MAX_MODEL_ERRORS: usize = 200;

#[derive(Debug, Clone)]
/// An error attached to a key of a [`ModelState`].
///
/// It's either a plain, user-facing message or an error raised while binding the model.
/// The two are kept distinct so that diagnostics can tell apart a value that was never
/// read (e.g. an unsupported content type) from a value that could not be read.
pub struct ModelError(Repr);

#[derive(Debug, Clone)]
enum Repr {
    Message(String),
    Exception(Arc<dyn std::error::Error + Send + Sync>),
}

impl ModelError {
    /// A plain error message.
    pub fn message(message: impl Into<String>) -> Self {
        Self(Repr::Message(message.into()))
    }

    /// An error raised while binding the model.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(Repr::Exception(Arc::new(error)))
    }

    /// The user-facing description of the error.
    pub fn error_message(&self) -> Cow<'_, str> {
        match &self.0 {
            Repr::Message(m) => Cow::Borrowed(m.as_str()),
            Repr::Exception(e) => Cow::Owned(e.to_string()),
        }
    }

    /// The underlying error, if this was created via [`ModelError::from_error`].
    pub fn exception(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.0 {
            Repr::Message(_) => None,
            Repr::Exception(e) => Some(e.as_ref()),
        }
    }
}

impl From<String> for ModelError {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

impl From<&str> for ModelError {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_message())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("The maximum number of allowed model errors ({max_allowed_errors}) has been reached.")]
#[non_exhaustive]
/// Recorded, under the empty key, when a [`ModelState`] reaches its error cap.
pub struct TooManyModelErrors {
    /// The cap that was reached.
    pub max_allowed_errors: usize,
}

#[derive(Debug)]
/// The errors recorded while binding a request, keyed by the name of the model (or property)
/// they refer to.
///
/// Keys are kept in insertion order.
/// The collection is append-only: errors can be added, never removed, until it is
/// [cleared](ModelState::clear) at the end of the request.
///
/// # Error cap
///
/// At most [`max_allowed_errors`](ModelState::max_allowed_errors) errors are recorded.
/// When the cap is about to be reached, a [`TooManyModelErrors`] error is recorded under the
/// empty key and every subsequent error is dropped.
pub struct ModelState {
    entries: IndexMap<String, SmallVec<[ModelError; 1]>>,
    error_count: usize,
    max_allowed_errors: usize,
    has_reached_max_errors: bool,
}

impl Default for ModelState {
    fn default() -> Self {
        Self::with_max_errors(DEFAULT_MAX_MODEL_ERRORS)
    }
}

impl ModelState {
    /// Create a new, empty [`ModelState`] using [`DEFAULT_MAX_MODEL_ERRORS`] as error cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, empty [`ModelState`] with a custom error cap.
    ///
    /// A cap of zero is treated as a cap of one: there is always room for the
    /// [`TooManyModelErrors`] marker.
    pub fn with_max_errors(max_allowed_errors: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            error_count: 0,
            max_allowed_errors: max_allowed_errors.max(1),
            has_reached_max_errors: false,
        }
    }

    pub fn max_allowed_errors(&self) -> usize {
        self.max_allowed_errors
    }

    /// Returns `true` if the error cap has been reached.
    pub fn has_reached_max_errors(&self) -> bool {
        self.has_reached_max_errors
    }

    /// Record an error under `key`.
    ///
    /// Errors beyond the cap are silently dropped: use [`try_add_model_error`] if
    /// you need to know whether the error was recorded.
    ///
    /// [`try_add_model_error`]: ModelState::try_add_model_error
    pub fn add_model_error<K, E>(&mut self, key: K, error: E)
    where
        K: Into<String>,
        E: Into<ModelError>,
    {
        self.try_add_model_error(key, error);
    }

    /// Record an error raised while binding the model identified by `key`.
    pub fn add_model_exception<K, E>(&mut self, key: K, error: E)
    where
        K: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.try_add_model_error(key, ModelError::from_error(error));
    }

    /// Record an error under `key`, returning `false` if it was dropped because the
    /// error cap has been reached.
    pub fn try_add_model_error<K, E>(&mut self, key: K, error: E) -> bool
    where
        K: Into<String>,
        E: Into<ModelError>,
    {
        if self.has_reached_max_errors {
            return false;
        }
        if self.error_count + 1 >= self.max_allowed_errors {
            self.has_reached_max_errors = true;
            let marker = TooManyModelErrors {
                max_allowed_errors: self.max_allowed_errors,
            };
            tracing::warn!(
                max_allowed_errors = self.max_allowed_errors,
                "The model state has reached its error cap, further errors will be dropped"
            );
            self.push(String::new(), ModelError::from_error(marker));
            return false;
        }
        self.push(key.into(), error.into());
        true
    }

    fn push(&mut self, key: String, error: ModelError) {
        self.entries.entry(key).or_default().push(error);
        self.error_count += 1;
    }

    /// Returns `true` if no errors have been recorded.
    pub fn is_valid(&self) -> bool {
        self.error_count == 0
    }

    /// The total number of errors recorded, across all keys.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// The errors recorded under `key`, if any.
    pub fn errors(&self, key: &str) -> Option<&[ModelError]> {
        self.entries.get(key).map(|errors| errors.as_slice())
    }

    /// Iterate over keys and their errors, in the order the keys were first used.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &[ModelError])> {
        self.entries
            .iter()
            .map(|(key, errors)| (key.as_str(), errors.as_slice()))
    }

    /// Discard every recorded error.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.error_count = 0;
        self.has_reached_max_errors = false;
    }

    /// Convert the recorded errors into a `400 Bad Request` response.
    ///
    /// The body is a JSON document that maps each key to the list of its error messages:
    ///
    /// ```json
    /// {
    ///   "title": "One or more validation errors occurred.",
    ///   "status": 400,
    ///   "errors": { "Order": ["unsupported content type: application/xml"] }
    /// }
    /// ```
    pub fn to_response(&self) -> http::Response<String> {
        let problem = ValidationProblem {
            title: "One or more validation errors occurred.",
            status: StatusCode::BAD_REQUEST.as_u16(),
            errors: self
                .entries
                .iter()
                .map(|(key, errors)| {
                    let messages = errors.iter().map(|e| e.error_message().into_owned());
                    (key.as_str(), messages.collect())
                })
                .collect(),
        };
        // String keys and string lists: serialization can't fail.
        let body = serde_json::to_string(&problem)
            .expect("Failed to serialize the validation problem as JSON");
        let mut response = http::Response::new(body);
        *response.status_mut() = StatusCode::BAD_REQUEST;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

#[derive(serde::Serialize)]
struct ValidationProblem<'a> {
    title: &'static str,
    status: u16,
    errors: IndexMap<&'a str, Vec<String>>,
}

impl Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "No model errors");
        }
        writeln!(f, "Something went wrong while binding the request:")?;
        for (key, errors) in self.iter() {
            for e in errors {
                writeln!(f, "- {key}: {e}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelError, ModelState};

    #[derive(Debug, thiserror::Error)]
    #[error("the payload is truncated")]
    struct Truncated;

    #[test]
    fn errors_are_grouped_by_key() {
        let mut state = ModelState::new();
        assert!(state.is_valid());

        state.add_model_error("Order", "first");
        state.add_model_error("Customer", "second");
        state.add_model_exception("Order", Truncated);

        assert!(!state.is_valid());
        assert_eq!(state.error_count(), 3);
        let order_errors = state.errors("Order").unwrap();
        assert_eq!(order_errors.len(), 2);
        assert_eq!(order_errors[0].error_message(), "first");
        assert!(order_errors[0].exception().is_none());
        assert_eq!(order_errors[1].error_message(), "the payload is truncated");
        assert!(order_errors[1].exception().is_some());

        let keys: Vec<_> = state.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["Order", "Customer"]);
    }

    #[test]
    fn the_error_cap_is_enforced() {
        let mut state = ModelState::with_max_errors(3);
        assert!(state.try_add_model_error("a", "1"));
        assert!(state.try_add_model_error("b", "2"));
        assert!(!state.try_add_model_error("c", "3"));
        assert!(!state.try_add_model_error("d", "4"));

        assert!(state.has_reached_max_errors());
        assert_eq!(state.error_count(), 3);
        assert!(state.errors("c").is_none());
        let marker = state.errors("").unwrap();
        insta::assert_snapshot!(marker[0], @"The maximum number of allowed model errors (3) has been reached.");
    }

    #[test]
    fn clearing_resets_the_cap() {
        let mut state = ModelState::with_max_errors(1);
        state.add_model_error("a", ModelError::message("1"));
        assert!(state.has_reached_max_errors());
        state.clear();
        assert!(state.is_valid());
        assert!(!state.has_reached_max_errors());
    }

    #[test]
    fn display() {
        let mut state = ModelState::new();
        insta::assert_snapshot!(state, @"No model errors");

        state.add_model_error("Order", "unsupported content type: application/xml");
        assert_eq!(
            state.to_string(),
            "Something went wrong while binding the request:\n\
             - Order: unsupported content type: application/xml\n"
        );
    }

    #[test]
    fn response_lists_every_error() {
        let mut state = ModelState::new();
        state.add_model_error("Order", "unsupported content type: application/xml");
        state.add_model_exception("Order", Truncated);

        let response = state.to_response();
        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/problem+json"
        );
        let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "title": "One or more validation errors occurred.",
                "status": 400,
                "errors": {
                    "Order": [
                        "unsupported content type: application/xml",
                        "the payload is truncated"
                    ]
                }
            })
        );
    }
}
