//! Route target parameters to the binder responsible for them and run it.
//!
//! # Overview
//!
//! Every target parameter is tagged with the [`BindingSource`] it must be bound from.
//! Every [`ModelBinder`] declares the single source it is responsible for.
//! A binder asked to bind a parameter from a different source [declines](BindDecision::Declined),
//! leaving the host free to try another one; [`CompositeModelBinder`] implements
//! that search on behalf of the host.
//!
//! [`BodyModelBinder`] is the only binder for [`BindingSource::Body`].
pub use binder::{BindDecision, ModelBinder, SourceModelBinder};
pub use body::BodyModelBinder;
pub use composite::{CompositeModelBinder, NoModelBinderFound};
pub use context::ModelBindingContext;
pub use model_type::{BoundModel, Model, ModelDecoder, ModelKind, ModelType};
pub use result::ModelBindingResult;
pub use source::BindingSource;

mod binder;
mod body;
mod composite;
mod context;
mod model_type;
mod result;
mod source;
