use crate::binding::Model;

use super::errors::{InputFormatterError, UrlEncodedDeserializationError};
use super::{InputFormatter, InputFormatterContext};

#[doc(alias = "Form")]
#[doc(alias = "FormBody")]
#[derive(Debug, Default, Clone, Copy)]
/// Read URL-encoded request bodies, such as web forms.
///
/// It accepts requests with a `Content-Type` set to `application/x-www-form-urlencoded`.
pub struct UrlEncodedInputFormatter;

#[async_trait::async_trait]
impl InputFormatter for UrlEncodedInputFormatter {
    fn name(&self) -> &'static str {
        "url_encoded"
    }

    fn can_read(&self, context: &InputFormatterContext<'_>) -> bool {
        let Some(mime) = context.content_type() else {
            return false;
        };
        mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED
    }

    async fn read(
        &self,
        context: &InputFormatterContext<'_>,
    ) -> Result<Option<Model>, InputFormatterError> {
        let body = context.request().buffered_body().await?;
        if let Some(model) = context.empty_input(body) {
            return Ok(model);
        }
        let model = context
            .model_type()
            .decoder()
            .decode_url_encoded(body)
            .map_err(|e| UrlEncodedDeserializationError { source: e })?;
        Ok(Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::UrlEncodedInputFormatter;
    use crate::binding::ModelType;
    use crate::formatter::test_utils::request;
    use crate::formatter::{InputFormatter, InputFormatterContext};

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct HomeListing {
        address: String,
        price: u64,
    }

    #[test]
    fn only_urlencoded_content_types() {
        let model_type = ModelType::reference::<HomeListing>();
        for (content_type, expected) in [
            (Some("application/x-www-form-urlencoded"), true),
            (Some("application/x-www-form-urlencoded; charset=utf-8"), true),
            (Some("application/json"), false),
            (Some("multipart/form-data"), false),
            (None, false),
        ] {
            let ctx = request(content_type, "");
            let can_read =
                UrlEncodedInputFormatter.can_read(&InputFormatterContext::new(&ctx, &model_type));
            assert_eq!(can_read, expected, "{content_type:?}");
        }
    }

    #[tokio::test]
    async fn well_formed_form() {
        let model_type = ModelType::reference::<HomeListing>();
        let ctx = request(
            Some("application/x-www-form-urlencoded"),
            "address=10+Downing+Street&price=1000",
        );
        let model = UrlEncodedInputFormatter
            .read(&InputFormatterContext::new(&ctx, &model_type))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            model.downcast_ref::<HomeListing>(),
            Some(&HomeListing {
                address: "10 Downing Street".into(),
                price: 1000,
            })
        );
    }

    #[tokio::test]
    async fn type_mismatch() {
        let model_type = ModelType::reference::<HomeListing>();
        let ctx = request(
            Some("application/x-www-form-urlencoded"),
            "address=10+Downing+Street&price=a+lot",
        );
        let err = UrlEncodedInputFormatter
            .read(&InputFormatterContext::new(&ctx, &model_type))
            .await
            .unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Failed to deserialize the body as a urlencoded form.\n")
        );
    }
}
