use crate::binding::Model;

use super::errors::{InputFormatterError, JsonDeserializationError};
use super::{InputFormatter, InputFormatterContext};

#[doc(alias = "Json")]
#[derive(Debug, Default, Clone, Copy)]
/// Read request bodies as JSON documents.
///
/// It accepts requests with a `Content-Type` set to `application/json`, or another
/// `application/*+json` MIME type.
///
/// A JSON `null` binds to an absent model if the target type allows it
/// (see [`ModelType::reference`](crate::binding::ModelType::reference)).
/// Deserialization errors include the path to the offending field.
pub struct JsonInputFormatter;

#[async_trait::async_trait]
impl InputFormatter for JsonInputFormatter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn can_read(&self, context: &InputFormatterContext<'_>) -> bool {
        let Some(mime) = context.content_type() else {
            return false;
        };
        mime.type_() == mime::APPLICATION
            && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
    }

    async fn read(
        &self,
        context: &InputFormatterContext<'_>,
    ) -> Result<Option<Model>, InputFormatterError> {
        let body = context.request().buffered_body().await?;
        if let Some(model) = context.empty_input(body) {
            return Ok(model);
        }
        let model_type = context.model_type();
        let model = model_type
            .decoder()
            .decode_json(body, model_type.is_nullable())
            .map_err(|e| JsonDeserializationError { source: e })?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonInputFormatter;
    use crate::binding::ModelType;
    use crate::formatter::test_utils::request;
    use crate::formatter::{InputFormatter, InputFormatterContext};

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct BodySchema {
        name: String,
        surname: String,
        age: u8,
    }

    fn can_read(content_type: Option<&'static str>) -> bool {
        let model_type = ModelType::reference::<BodySchema>();
        let ctx = request(content_type, "");
        JsonInputFormatter.can_read(&InputFormatterContext::new(&ctx, &model_type))
    }

    #[test]
    fn json_content_types() {
        assert!(can_read(Some("application/json")));
        assert!(can_read(Some("application/json; charset=utf-8")));
        assert!(can_read(Some("application/hal+json")));
    }

    #[test]
    fn other_content_types() {
        assert!(!can_read(None));
        assert!(!can_read(Some("hello world")));
        assert!(!can_read(Some("application/xml")));
        assert!(!can_read(Some("text/json")));
    }

    #[tokio::test]
    async fn well_formed_body() {
        let model_type = ModelType::reference::<BodySchema>();
        let ctx = request(
            Some("application/json"),
            r#"{"name": "John", "surname": "Doe", "age": 43}"#,
        );
        let model = JsonInputFormatter
            .read(&InputFormatterContext::new(&ctx, &model_type))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            model.downcast_ref::<BodySchema>(),
            Some(&BodySchema {
                name: "John".into(),
                surname: "Doe".into(),
                age: 43,
            })
        );
    }

    #[tokio::test]
    /// Let's check the error quality when the request body is missing
    /// a required field.
    async fn missing_json_field() {
        let model_type = ModelType::reference::<BodySchema>();
        let ctx = request(
            Some("application/json; charset=utf-8"),
            r#"{"name":"John Doe","age":43}"#,
        );
        let err = JsonInputFormatter
            .read(&InputFormatterContext::new(&ctx, &model_type))
            .await
            .unwrap_err();
        insta::assert_snapshot!(err, @r###"
        Failed to deserialize the body as a JSON document.
        missing field `surname` at line 1 column 28
        "###);
    }

    #[tokio::test]
    async fn empty_body_is_an_error_unless_allowed() {
        let model_type = ModelType::reference::<BodySchema>();

        let ctx = request(Some("application/json"), "");
        let outcome = JsonInputFormatter
            .read(&InputFormatterContext::new(&ctx, &model_type))
            .await;
        assert!(outcome.is_err());

        let ctx = request(Some("application/json"), "");
        let formatter_ctx =
            InputFormatterContext::new(&ctx, &model_type).treat_empty_input_as_default(true);
        let model = JsonInputFormatter.read(&formatter_ctx).await.unwrap();
        assert!(model.is_none());
    }
}
