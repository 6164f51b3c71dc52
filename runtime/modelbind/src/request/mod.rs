//! The ambient, request-scoped data that binders read from.
//!
//! [`RequestContext`] bundles the [`RequestHead`] with the [`RawIncomingBody`].
//! The body is buffered lazily, the first time an input formatter asks for it, and the
//! buffered bytes are then kept around for the rest of the request.
pub use context::RequestContext;
pub use limit::BodySizeLimit;
pub use raw_body::RawIncomingBody;
pub use request_head::RequestHead;

mod context;
pub mod errors;
mod limit;
mod raw_body;
mod request_head;
