use std::sync::Arc;

use tracing::Instrument;
use tracing_log_error::log_error;

use super::{BindingSource, ModelBindingContext, ModelBindingResult, ModelType, SourceModelBinder};
use crate::formatter::{
    DefaultInputFormatterSelector, InputFormatterContext, InputFormatterSelector, InputFormatters,
    UnsupportedContentType,
};
use crate::request::RequestContext;
use crate::scoped::ScopedInstance;
use crate::validation::{NoExclusions, ValidationExcludeFilters};

/// Bind models from the request body, using the first input formatter that can read it.
///
/// It is the only binder for [`BindingSource::Body`]: it never declines a body-sourced model,
/// it either binds it or records why it couldn't.
///
/// # Outcomes
///
/// | Situation                          | Result                     | Key          | Model state        |
/// |------------------------------------|----------------------------|--------------|--------------------|
/// | No formatter can read the request  | failed                     | model name   | one error message  |
/// | The formatter produced a model     | success, model set         | `""`         | untouched          |
/// | The formatter produced no model    | success, model absent      | model name   | untouched          |
/// | The formatter failed               | failed                     | model name   | the read error     |
///
/// On failure the [placeholder model](ModelBindingContext::model) is set to the
/// [default value](ModelType::default_value) of the model type.
///
/// # Scoped dependencies
///
/// The request and the set of input formatters are request-scoped: the binder holds
/// [`ScopedInstance`] accessors and reads them at the start of each binding attempt.
pub struct BodyModelBinder {
    request: Arc<dyn ScopedInstance<RequestContext>>,
    input_formatters: Arc<dyn ScopedInstance<InputFormatters>>,
    selector: Arc<dyn InputFormatterSelector>,
    validation_exclude_filters: Arc<dyn ValidationExcludeFilters>,
    allow_empty_body: bool,
}

impl BodyModelBinder {
    /// Create a binder that selects formatters using the [`DefaultInputFormatterSelector`]
    /// and doesn't exclude any model from validation.
    pub fn new<R, F>(request: R, input_formatters: F) -> Self
    where
        R: ScopedInstance<RequestContext> + 'static,
        F: ScopedInstance<InputFormatters> + 'static,
    {
        Self {
            request: Arc::new(request),
            input_formatters: Arc::new(input_formatters),
            selector: Arc::new(DefaultInputFormatterSelector),
            validation_exclude_filters: Arc::new(NoExclusions),
            allow_empty_body: false,
        }
    }

    /// Use a custom strategy to pick the input formatter.
    pub fn selector<S>(mut self, selector: S) -> Self
    where
        S: InputFormatterSelector + 'static,
    {
        self.selector = Arc::new(selector);
        self
    }

    pub fn validation_exclude_filters<V>(mut self, filters: V) -> Self
    where
        V: ValidationExcludeFilters + 'static,
    {
        self.validation_exclude_filters = Arc::new(filters);
        self
    }

    /// If `true`, an empty body binds to the default value of the model type.
    /// If `false`, the default, an empty body is handed over to the formatter, which
    /// usually rejects it.
    pub fn allow_empty_body(mut self, allow: bool) -> Self {
        self.allow_empty_body = allow;
        self
    }

    /// `true` if models of type `model_type` must not be validated after binding.
    pub fn is_excluded_from_validation(&self, model_type: &ModelType) -> bool {
        self.validation_exclude_filters.is_excluded(model_type)
    }

    async fn bind_body(
        &self,
        request: &RequestContext,
        context: &mut ModelBindingContext<'_>,
    ) -> ModelBindingResult {
        let input_formatters = self.input_formatters.value();
        let model_type = context.model_type().clone();
        let formatter_context = InputFormatterContext::new(request, &model_type)
            .treat_empty_input_as_default(self.allow_empty_body);

        let Some(formatter) = self
            .selector
            .select_formatter(&input_formatters, &formatter_context)
        else {
            let error = UnsupportedContentType {
                content_type: request.content_type().map(ToOwned::to_owned),
            };
            tracing::debug!(
                n_formatters = input_formatters.len(),
                "None of the registered input formatters can read the request body"
            );
            context.add_model_error(error.to_string());
            return ModelBindingResult::failed(context.model_name());
        };

        match formatter.read(&formatter_context).await {
            Ok(model) => {
                // Errors are keyed by property when the root model is there.
                let key = match &model {
                    Some(_) => "",
                    None => context.model_name(),
                };
                let result = ModelBindingResult::success(model, key);
                tracing::debug!(
                    formatter = formatter.name(),
                    model.absent = result.model().is_none(),
                    "Bound the request body"
                );
                result
            }
            Err(e) => {
                log_error!(
                    e,
                    level: tracing::Level::WARN,
                    formatter = formatter.name(),
                    "Failed to read the request body"
                );
                context.set_model(model_type.default_value());
                context.add_model_exception(e);
                ModelBindingResult::failed(context.model_name())
            }
        }
    }
}

#[async_trait::async_trait]
impl SourceModelBinder for BodyModelBinder {
    const BINDING_SOURCE: BindingSource = BindingSource::Body;

    async fn bind_core(&self, context: &mut ModelBindingContext<'_>) -> ModelBindingResult {
        let request = self.request.value();
        let span = tracing::debug_span!(
            "Bind request body",
            model.name = context.model_name(),
            model.type_name = context.model_type().type_name(),
            http.request.content_type = request.content_type(),
        );
        self.bind_body(&request, context).instrument(span).await
    }
}
