//! # modelbind
//!
//! Bind the body of incoming HTTP requests to strongly-typed models.
//!
//! The crate is organised as a _layered_ system:
//!
//! 1. [`request`] holds the ambient, request-scoped data: the [`RequestHead`](request::RequestHead)
//!    and the raw body, which is buffered lazily, at most once, within the configured limits.
//! 2. [`formatter`] contains the [`InputFormatter`](formatter::InputFormatter)s. Each of them knows
//!    how to turn a request body in a certain format (e.g. JSON) into a model.
//!    The ordered set of formatters registered for a request is searched with a first-match policy.
//! 3. [`binding`] routes a target parameter to the binder responsible for its
//!    [`BindingSource`](binding::BindingSource) and, for the body source, runs the
//!    [`BodyModelBinder`](binding::BodyModelBinder).
//!
//! Failures never escape the binder: they are recorded in a [`ModelState`](model_state::ModelState)
//! under the name of the model that was being bound.
pub mod binding;
pub mod config;
pub mod formatter;
pub mod model_state;
pub mod request;
pub mod scoped;
pub mod validation;

pub use binding::{BindingSource, ModelBindingContext, ModelBindingResult, ModelType};
pub use model_state::ModelState;
