use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// A model produced by a successful binding attempt.
pub type Model = Box<dyn BoundModel>;

/// A value that can be returned by a binder.
///
/// It is implemented for every `'static` type that is [`Debug`](fmt::Debug), [`Send`] and [`Sync`].
/// Use [`downcast_ref`](<dyn BoundModel>::downcast_ref) to recover the concrete type.
pub trait BoundModel: Any + fmt::Debug + Send + Sync {
    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
    #[doc(hidden)]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T> BoundModel for T
where
    T: Any + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn BoundModel {
    /// Returns `true` if the model is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Returns a reference to the model if it is of type `T`, `None` otherwise.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take ownership of the model as a `T`.
    ///
    /// The model is handed back, untouched, if it is not a `T`.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<dyn BoundModel>> {
        if self.is::<T>() {
            // The type check above guarantees that the downcast succeeds.
            Ok(self
                .into_any()
                .downcast::<T>()
                .unwrap_or_else(|_| unreachable!()))
        } else {
            Err(self)
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// How a model type represents "no value".
pub enum ModelKind {
    /// The type has no absent state: its default is the zero value returned by `zero`.
    ///
    /// Numbers, booleans and strings are the typical examples.
    Value {
        /// Build the zero value for the type.
        zero: fn() -> Model,
    },
    /// Absent is a legal model for the type.
    ///
    /// A JSON `null` binds successfully, as an absent model.
    Reference,
}

/// Decode raw payloads into instances of a specific model type.
///
/// Formatters are type-agnostic: they get hold of a [`ModelDecoder`] via
/// [`ModelType::decoder`] and ask it to materialize the model out of their wire format.
pub trait ModelDecoder: Send + Sync {
    /// Deserialize a JSON document.
    ///
    /// When `nullable` is `true`, a JSON `null` decodes to `None`.
    fn decode_json(
        &self,
        bytes: &[u8],
        nullable: bool,
    ) -> Result<Option<Model>, serde_path_to_error::Error<serde_json::Error>>;

    /// Deserialize a `application/x-www-form-urlencoded` payload.
    fn decode_url_encoded(&self, bytes: &[u8]) -> Result<Model, serde_html_form::de::Error>;
}

struct SerdeDecoder<T>(PhantomData<fn() -> T>);

impl<T> ModelDecoder for SerdeDecoder<T>
where
    T: DeserializeOwned + fmt::Debug + Send + Sync + 'static,
{
    fn decode_json(
        &self,
        bytes: &[u8],
        nullable: bool,
    ) -> Result<Option<Model>, serde_path_to_error::Error<serde_json::Error>> {
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        let mut track = serde_path_to_error::Track::new();
        let tracked = serde_path_to_error::Deserializer::new(&mut deserializer, &mut track);
        let deserialized = if nullable {
            Option::<T>::deserialize(tracked).map(|m| m.map(|m| Box::new(m) as Model))
        } else {
            T::deserialize(tracked).map(|m| Some(Box::new(m) as Model))
        };
        let model = match deserialized {
            Ok(model) => model,
            Err(e) => return Err(serde_path_to_error::Error::new(track.path(), e)),
        };
        // The document must span the whole body.
        if let Err(e) = deserializer.end() {
            return Err(serde_path_to_error::Error::new(track.path(), e));
        }
        Ok(model)
    }

    fn decode_url_encoded(&self, bytes: &[u8]) -> Result<Model, serde_html_form::de::Error> {
        let model: T = serde_html_form::from_bytes(bytes)?;
        Ok(Box::new(model))
    }
}

#[derive(Clone)]
/// A description of the type a binder must produce.
///
/// It carries the information the binding machinery needs without resorting to reflection:
/// a diagnostic name, the [`ModelKind`] (which determines the default value) and a
/// [`ModelDecoder`] for the type.
///
/// # Example
///
/// ```rust
/// use modelbind::ModelType;
///
/// #[derive(Debug, serde::Deserialize)]
/// pub struct Order {
///     id: u64,
/// }
///
/// let order = ModelType::reference::<Order>();
/// assert_eq!(order.name(), "Order");
/// assert!(order.default_value().is_none());
///
/// let quantity = ModelType::value::<u32>();
/// let zero = quantity.default_value().unwrap();
/// assert_eq!(zero.downcast_ref::<u32>(), Some(&0));
/// ```
pub struct ModelType {
    name: Cow<'static, str>,
    type_id: TypeId,
    type_name: &'static str,
    kind: ModelKind,
    decoder: Arc<dyn ModelDecoder>,
}

impl ModelType {
    /// Describe a type for which absent is a legal model.
    pub fn reference<T>() -> Self
    where
        T: DeserializeOwned + fmt::Debug + Send + Sync + 'static,
    {
        Self::new::<T>(ModelKind::Reference)
    }

    /// Describe a type that is never absent.
    ///
    /// Its default value is `T::default()`.
    pub fn value<T>() -> Self
    where
        T: DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static,
    {
        Self::new::<T>(ModelKind::Value {
            zero: || Box::new(T::default()) as Model,
        })
    }

    fn new<T>(kind: ModelKind) -> Self
    where
        T: DeserializeOwned + fmt::Debug + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        Self {
            name: Cow::Borrowed(short_type_name(type_name)),
            type_id: TypeId::of::<T>(),
            type_name,
            kind,
            decoder: Arc::new(SerdeDecoder::<T>(PhantomData)),
        }
    }

    /// Override the name used to refer to this type in diagnostics.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// The name used to refer to this type in diagnostics.
    ///
    /// It defaults to the unqualified name of the Rust type (e.g. `Order` for `shop::Order`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fully qualified name of the Rust type, as returned by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// `true` if absent is a legal model for this type.
    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, ModelKind::Reference)
    }

    /// `true` if this describes `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// The default value for the type: the zero value for value types, absent otherwise.
    pub fn default_value(&self) -> Option<Model> {
        match self.kind {
            ModelKind::Value { zero } => Some(zero()),
            ModelKind::Reference => None,
        }
    }

    pub fn decoder(&self) -> &dyn ModelDecoder {
        self.decoder.as_ref()
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("nullable", &self.is_nullable())
            .finish()
    }
}

/// Strip the module path and generic parameters from a fully qualified type name.
fn short_type_name(type_name: &'static str) -> &'static str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
