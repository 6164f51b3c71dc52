use super::{BindingSource, ModelBindingContext, ModelBindingResult};

#[derive(Debug)]
/// What a binder did with a [`ModelBindingContext`].
pub enum BindDecision {
    /// The binder is not responsible for the model.
    ///
    /// It left the context and its model state untouched: the host is free to ask
    /// another binder.
    Declined,
    /// The binder took responsibility for the model.
    ///
    /// Check [`ModelBindingResult::is_model_set`] to know if it managed to bind it.
    Bound(ModelBindingResult),
}

impl BindDecision {
    pub fn is_declined(&self) -> bool {
        matches!(self, BindDecision::Declined)
    }

    /// The binding result, if the binder didn't decline.
    pub fn into_result(self) -> Option<ModelBindingResult> {
        match self {
            BindDecision::Declined => None,
            BindDecision::Bound(result) => Some(result),
        }
    }
}

#[async_trait::async_trait]
/// A component that materializes a model from a single [`BindingSource`].
///
/// You'll rarely implement this trait directly: implement [`SourceModelBinder`] instead and
/// the source check comes for free.
pub trait ModelBinder: Send + Sync {
    /// The source this binder is responsible for.
    fn binding_source(&self) -> BindingSource;

    /// Try to bind the model described by `context`.
    async fn try_bind(&self, context: &mut ModelBindingContext<'_>) -> BindDecision;
}

#[async_trait::async_trait]
/// A binder scoped to a fixed [`BindingSource`].
///
/// Every [`SourceModelBinder`] is a [`ModelBinder`] which declines, without side effects,
/// any context whose [`binding_source`](ModelBindingContext::binding_source) is not
/// [`BINDING_SOURCE`](SourceModelBinder::BINDING_SOURCE).
/// [`bind_core`](SourceModelBinder::bind_core) is only invoked for matching contexts.
pub trait SourceModelBinder: Send + Sync {
    /// The source this binder is responsible for.
    const BINDING_SOURCE: BindingSource;

    /// Bind the model described by `context`.
    ///
    /// The context is guaranteed to require [`BINDING_SOURCE`](SourceModelBinder::BINDING_SOURCE).
    async fn bind_core(&self, context: &mut ModelBindingContext<'_>) -> ModelBindingResult;
}

#[async_trait::async_trait]
impl<B> ModelBinder for B
where
    B: SourceModelBinder,
{
    fn binding_source(&self) -> BindingSource {
        B::BINDING_SOURCE
    }

    async fn try_bind(&self, context: &mut ModelBindingContext<'_>) -> BindDecision {
        if context.binding_source() != B::BINDING_SOURCE {
            return BindDecision::Declined;
        }
        BindDecision::Bound(self.bind_core(context).await)
    }
}
