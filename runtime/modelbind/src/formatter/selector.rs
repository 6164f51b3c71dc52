use std::sync::Arc;

use super::{InputFormatter, InputFormatterContext, InputFormatters};

/// Pick the formatter that is going to read the request body.
pub trait InputFormatterSelector: Send + Sync {
    /// Returns `None` if none of the `formatters` is suitable.
    fn select_formatter<'f>(
        &self,
        formatters: &'f InputFormatters,
        context: &InputFormatterContext<'_>,
    ) -> Option<&'f Arc<dyn InputFormatter>>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Select the first formatter, in registration order, that can read the request.
///
/// There is no scoring nor fallback: if two formatters can read the same request,
/// the one that was registered first always wins.
pub struct DefaultInputFormatterSelector;

impl InputFormatterSelector for DefaultInputFormatterSelector {
    fn select_formatter<'f>(
        &self,
        formatters: &'f InputFormatters,
        context: &InputFormatterContext<'_>,
    ) -> Option<&'f Arc<dyn InputFormatter>> {
        formatters
            .iter()
            .find(|formatter| formatter.can_read(context))
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultInputFormatterSelector, InputFormatterSelector};
    use crate::binding::{Model, ModelType};
    use crate::formatter::test_utils::request;
    use crate::formatter::{
        InputFormatter, InputFormatterContext, InputFormatterError, InputFormatters,
    };

    #[derive(Debug)]
    struct Stub {
        name: &'static str,
        accepts: &'static str,
    }

    #[async_trait::async_trait]
    impl InputFormatter for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_read(&self, context: &InputFormatterContext<'_>) -> bool {
            context.request().content_type() == Some(self.accepts)
        }

        async fn read(
            &self,
            _context: &InputFormatterContext<'_>,
        ) -> Result<Option<Model>, InputFormatterError> {
            Ok(None)
        }
    }

    fn formatters() -> InputFormatters {
        InputFormatters::new()
            .with(Stub {
                name: "first",
                accepts: "text/plain",
            })
            .with(Stub {
                name: "second",
                accepts: "text/plain",
            })
            .with(Stub {
                name: "third",
                accepts: "text/csv",
            })
    }

    #[test]
    fn the_first_capable_formatter_wins() {
        let model_type = ModelType::value::<String>();
        let formatters = formatters();

        let ctx = request(Some("text/plain"), "");
        let ctx = InputFormatterContext::new(&ctx, &model_type);
        for _ in 0..10 {
            let selected = DefaultInputFormatterSelector
                .select_formatter(&formatters, &ctx)
                .unwrap();
            assert_eq!(selected.name(), "first");
        }
    }

    #[test]
    fn later_formatters_are_considered() {
        let model_type = ModelType::value::<String>();
        let formatters = formatters();

        let ctx = request(Some("text/csv"), "");
        let ctx = InputFormatterContext::new(&ctx, &model_type);
        let selected = DefaultInputFormatterSelector
            .select_formatter(&formatters, &ctx)
            .unwrap();
        assert_eq!(selected.name(), "third");
    }

    #[test]
    fn none_if_no_formatter_can_read() {
        let model_type = ModelType::value::<String>();
        let formatters = formatters();

        let ctx = request(Some("application/xml"), "");
        let ctx = InputFormatterContext::new(&ctx, &model_type);
        assert!(
            DefaultInputFormatterSelector
                .select_formatter(&formatters, &ctx)
                .is_none()
        );
        assert!(
            DefaultInputFormatterSelector
                .select_formatter(&InputFormatters::new(), &ctx)
                .is_none()
        );
    }
}
