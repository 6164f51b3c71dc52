use crate::model_state::{ModelError, ModelState};

use super::{BindingSource, BoundModel, Model, ModelType};

#[derive(Debug)]
/// The parameter (or model) a binder is asked to bind.
///
/// A [`ModelBindingContext`] is created by the host for a single binding attempt and is never
/// shared across attempts: every parameter of a request gets its own.
/// Errors are recorded in the request's [`ModelState`], keyed by
/// [`model_name`](Self::model_name).
pub struct ModelBindingContext<'a> {
    model_name: String,
    model_type: ModelType,
    binding_source: BindingSource,
    model_state: &'a mut ModelState,
    model: Option<Model>,
}

impl<'a> ModelBindingContext<'a> {
    pub fn new(
        model_name: impl Into<String>,
        model_type: ModelType,
        binding_source: BindingSource,
        model_state: &'a mut ModelState,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_type,
            binding_source,
            model_state,
            model: None,
        }
    }

    /// The name of the model, used as key for the errors recorded while binding it.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    /// The source the model must be bound from.
    pub fn binding_source(&self) -> BindingSource {
        self.binding_source
    }

    pub fn model_state(&self) -> &ModelState {
        &*self.model_state
    }

    pub fn model_state_mut(&mut self) -> &mut ModelState {
        &mut *self.model_state
    }

    /// Record an error for this model.
    pub fn add_model_error(&mut self, error: impl Into<ModelError>) {
        self.model_state
            .add_model_error(self.model_name.as_str(), error);
    }

    /// Record an error raised while binding this model.
    pub fn add_model_exception<E>(&mut self, error: E)
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.model_state
            .add_model_exception(self.model_name.as_str(), error);
    }

    /// The placeholder left behind by a failed binding attempt, if any.
    ///
    /// Binders set it to the [default value](ModelType::default_value) of the model type
    /// when they fail, so that code running after them never observes an undefined model.
    pub fn model(&self) -> Option<&dyn BoundModel> {
        self.model.as_deref()
    }

    pub fn set_model(&mut self, model: Option<Model>) {
        self.model = model;
    }

    pub fn take_model(&mut self) -> Option<Model> {
        self.model.take()
    }
}
