//! Configure the binding machinery and load that configuration from files and the environment.
//!
//! [`BindingConfig`] is the configuration type; [`ConfigLoader`] assembles it out of
//! YAML files and `MODELBIND_`-prefixed environment variables.
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::de::DeserializeOwned;
use ubyte::{ByteUnit, ToByteUnit};

use crate::binding::BodyModelBinder;
use crate::formatter::{InputFormatters, JsonInputFormatter, UrlEncodedInputFormatter};
use crate::model_state::{DEFAULT_MAX_MODEL_ERRORS, ModelState};
use crate::request::{BodySizeLimit, RawIncomingBody, RequestContext};
use crate::scoped::ScopedInstance;

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[non_exhaustive]
/// Configuration for request body binding.
///
/// Every field is optional: missing fields are set to their default value.
///
/// ```yaml
/// body:
///   max_size: 1 MiB
///   read_timeout: 5s
///   allow_empty: false
/// input_formatters: [json, url_encoded]
/// max_model_errors: 200
/// ```
pub struct BindingConfig {
    #[serde(default)]
    pub body: BodyConfig,
    /// The input formatters to register, in priority order.
    ///
    /// Defaults to `[json, url_encoded]`.
    #[serde(default = "default_input_formatters")]
    pub input_formatters: Vec<FormatterKind>,
    /// The maximum number of errors recorded for a single request.
    ///
    /// Defaults to [`DEFAULT_MAX_MODEL_ERRORS`].
    #[serde(default = "default_max_model_errors")]
    pub max_model_errors: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[non_exhaustive]
/// How the request body is read.
pub struct BodyConfig {
    /// The maximum size of a request body.
    ///
    /// Defaults to 2 MB. Set it to `null` to accept bodies of any size.
    #[serde(default = "default_max_size")]
    pub max_size: Option<ByteUnit>,
    /// How long to wait for the whole body to be received.
    ///
    /// No timeout is enforced by default.
    #[serde(default, with = "humantime_serde")]
    pub read_timeout: Option<Duration>,
    /// Bind an empty body to the default value of the model type, rather than rejecting it.
    #[serde(default)]
    pub allow_empty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// The built-in input formatters.
pub enum FormatterKind {
    /// [`JsonInputFormatter`]
    Json,
    /// [`UrlEncodedInputFormatter`]
    UrlEncoded,
}

fn default_input_formatters() -> Vec<FormatterKind> {
    vec![FormatterKind::Json, FormatterKind::UrlEncoded]
}

fn default_max_model_errors() -> usize {
    DEFAULT_MAX_MODEL_ERRORS
}

fn default_max_size() -> Option<ByteUnit> {
    Some(2.megabytes())
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig::default(),
            input_formatters: default_input_formatters(),
            max_model_errors: default_max_model_errors(),
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            read_timeout: None,
            allow_empty: false,
        }
    }
}

impl BodyConfig {
    pub fn body_size_limit(&self) -> BodySizeLimit {
        self.max_size.into()
    }
}

impl BindingConfig {
    /// The configured input formatters, in priority order.
    pub fn input_formatters(&self) -> InputFormatters {
        let mut formatters = InputFormatters::new();
        for kind in &self.input_formatters {
            match kind {
                FormatterKind::Json => formatters.push(JsonInputFormatter),
                FormatterKind::UrlEncoded => formatters.push(UrlEncodedInputFormatter),
            }
        }
        formatters
    }

    /// An empty [`ModelState`] with the configured error cap.
    pub fn model_state(&self) -> ModelState {
        ModelState::with_max_errors(self.max_model_errors)
    }

    /// Wrap an incoming request, enforcing the configured body size limit and read timeout.
    pub fn request_context<B>(&self, request: http::Request<B>) -> RequestContext
    where
        B: Into<RawIncomingBody>,
    {
        RequestContext::from_request(request)
            .body_size_limit(self.body.body_size_limit())
            .read_timeout(self.body.read_timeout)
    }

    /// A [`BodyModelBinder`] that honours the configured empty body policy.
    pub fn body_model_binder<R, F>(&self, request: R, input_formatters: F) -> BodyModelBinder
    where
        R: ScopedInstance<RequestContext> + 'static,
        F: ScopedInstance<InputFormatters> + 'static,
    {
        BodyModelBinder::new(request, input_formatters).allow_empty_body(self.body.allow_empty)
    }
}

/// The environment variable used to pick the configuration profile.
pub const PROFILE_ENV_VAR: &str = "MODELBIND_PROFILE";
const ENV_PREFIX: &str = "MODELBIND_";

#[derive(Clone, Debug, Default)]
/// Load configuration from YAML files and environment variables.
///
/// # Sources
///
/// Sources are merged in the following order, later sources overriding earlier ones:
///
/// 1. `{configuration_dir}/base.yml`
/// 2. `{configuration_dir}/{profile}.yml`, if a profile is set
/// 3. Environment variables prefixed with `MODELBIND_`
///
/// Missing files are skipped.
/// Nested fields are addressed using `__` as a separator in environment variables:
/// `MODELBIND_BODY__MAX_SIZE` sets `body.max_size`.
///
/// # Profile
///
/// The profile is taken from [`ConfigLoader::profile`] or, if unset, from the
/// `MODELBIND_PROFILE` environment variable.
pub struct ConfigLoader {
    configuration_dir: Option<PathBuf>,
    profile: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the profile-specific configuration file for `profile` (e.g. `prod.yml`).
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// The directory containing the configuration files.
    ///
    /// Defaults to `configuration`, relative to the working directory.
    pub fn configuration_dir<Dir>(mut self, dir: Dir) -> Self
    where
        Dir: Into<PathBuf>,
    {
        self.configuration_dir = Some(dir.into());
        self
    }

    pub fn load<Config>(self) -> Result<Config, errors::ConfigLoadError>
    where
        Config: DeserializeOwned,
    {
        let profile = match self.profile {
            Some(profile) => Some(profile),
            None => profile_from_env()?,
        };
        let configuration_dir = self
            .configuration_dir
            .unwrap_or_else(|| PathBuf::from("configuration"));
        let span = tracing::info_span!(
            "Loading configuration",
            configuration.directory = %configuration_dir.display(),
            configuration.profile = profile.as_deref(),
        );
        let _guard = span.enter();

        let mut figment = Figment::new().merge(Yaml::file(configuration_dir.join("base.yml")));
        if let Some(profile) = &profile {
            figment = figment.merge(Yaml::file(configuration_dir.join(format!("{profile}.yml"))));
        }
        // `MODELBIND_PROFILE` selects a file, it's not a configuration value.
        let env_source = Env::prefixed(ENV_PREFIX)
            .split("__")
            .ignore(&["PROFILE"]);
        figment
            .merge(env_source)
            .extract()
            .context("Failed to load hierarchical configuration")
            .map_err(errors::ConfigLoadError)
    }
}

fn profile_from_env() -> Result<Option<String>, errors::ConfigLoadError> {
    match std::env::var(PROFILE_ENV_VAR) {
        Ok(profile) => Ok(Some(profile)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(errors::ConfigLoadError(anyhow::Error::new(e).context(
            "Failed to load the configuration profile from the `MODELBIND_PROFILE` environment variable",
        ))),
    }
}

pub mod errors {
    #[derive(Debug, thiserror::Error)]
    #[error("Failed to load configuration")]
    pub struct ConfigLoadError(#[source] pub(super) anyhow::Error);
}
