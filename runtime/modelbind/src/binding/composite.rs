use std::fmt;
use std::sync::Arc;

use super::{BindDecision, BindingSource, ModelBinder, ModelBindingContext, ModelBindingResult};

#[derive(Debug, thiserror::Error)]
#[error("There is no model binder for `{model_name}` that can bind from the `{binding_source}` source.")]
#[non_exhaustive]
/// None of the registered binders took responsibility for a model.
pub struct NoModelBinderFound {
    pub model_name: String,
    pub binding_source: BindingSource,
}

#[derive(Clone, Default)]
/// An ordered set of [`ModelBinder`]s.
///
/// [`bind_model`](Self::bind_model) hands the context over to the binders registered for its
/// [`BindingSource`], in registration order, until one of them takes responsibility for it.
pub struct CompositeModelBinder {
    binders: Vec<Arc<dyn ModelBinder>>,
}

impl CompositeModelBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binder, with lower priority than the ones already registered.
    pub fn with<B>(mut self, binder: B) -> Self
    where
        B: ModelBinder + 'static,
    {
        self.push(binder);
        self
    }

    /// Register a binder, with lower priority than the ones already registered.
    pub fn push<B>(&mut self, binder: B)
    where
        B: ModelBinder + 'static,
    {
        self.binders.push(Arc::new(binder));
    }

    /// Bind the model described by `context`.
    ///
    /// The first binder that doesn't decline determines the outcome, even if it fails to bind
    /// the model.
    pub async fn bind_model(
        &self,
        context: &mut ModelBindingContext<'_>,
    ) -> Result<ModelBindingResult, NoModelBinderFound> {
        let binding_source = context.binding_source();
        for binder in &self.binders {
            if binder.binding_source() != binding_source {
                continue;
            }
            match binder.try_bind(context).await {
                BindDecision::Declined => {
                    tracing::trace!(
                        model.name = context.model_name(),
                        binding.source = %binding_source,
                        "A model binder declined, moving on to the next one"
                    );
                }
                BindDecision::Bound(result) => return Ok(result),
            }
        }
        Err(NoModelBinderFound {
            model_name: context.model_name().to_owned(),
            binding_source,
        })
    }
}

impl fmt::Debug for CompositeModelBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.binders.iter().map(|b| b.binding_source()))
            .finish()
    }
}
