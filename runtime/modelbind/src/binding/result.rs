use super::{BoundModel, Model};

#[derive(Debug)]
/// The outcome of a binding attempt that a binder took responsibility for.
///
/// There are two shapes:
///
/// - [`success`](Self::success): the binder determined the model, which might be absent
///   (e.g. a JSON `null` body). [`is_model_set`](Self::is_model_set) is `true`.
/// - [`failed`](Self::failed): the binder couldn't determine the model. The model is always
///   absent and the reason has been recorded in the model state under [`key`](Self::key).
///
/// # Key
///
/// The key is the prefix used to attach validation errors to the bound model.
/// It's empty when the root model has been bound successfully: validation errors are then
/// reported against the model properties.
pub struct ModelBindingResult {
    model: Option<Model>,
    key: String,
    is_model_set: bool,
}

impl ModelBindingResult {
    /// The binder determined the model.
    pub fn success(model: Option<Model>, key: impl Into<String>) -> Self {
        Self {
            model,
            key: key.into(),
            is_model_set: true,
        }
    }

    /// The binder was responsible for the model, but couldn't determine it.
    pub fn failed(key: impl Into<String>) -> Self {
        Self {
            model: None,
            key: key.into(),
            is_model_set: false,
        }
    }

    pub fn model(&self) -> Option<&dyn BoundModel> {
        self.model.as_deref()
    }

    pub fn into_model(self) -> Option<Model> {
        self.model
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `true` if the binder determined the model, even if absent.
    pub fn is_model_set(&self) -> bool {
        self.is_model_set
    }
}

#[cfg(test)]
mod tests {
    use super::ModelBindingResult;

    #[test]
    fn failures_never_carry_a_model() {
        let result = ModelBindingResult::failed("Order");
        assert!(!result.is_model_set());
        assert!(result.model().is_none());
        assert_eq!(result.key(), "Order");
    }

    #[test]
    fn successes_may_carry_an_absent_model() {
        let result = ModelBindingResult::success(None, "Order");
        assert!(result.is_model_set());
        assert!(result.model().is_none());

        let result = ModelBindingResult::success(Some(Box::new(42u64)), "");
        assert!(result.is_model_set());
        assert_eq!(result.key(), "");
        let model = result.into_model().unwrap();
        assert_eq!(model.downcast_ref::<u64>(), Some(&42));
    }
}
