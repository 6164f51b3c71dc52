//! Decide which bound models are skipped by validation.
use std::any::TypeId;
use std::collections::HashSet;

use crate::binding::ModelType;

/// A policy that excludes certain model types from validation.
///
/// Validation runs after binding; models of an excluded type are passed through as they are.
pub trait ValidationExcludeFilters: Send + Sync {
    /// `true` if models of type `model_type` must not be validated.
    fn is_excluded(&self, model_type: &ModelType) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
/// Validate every model.
pub struct NoExclusions;

impl ValidationExcludeFilters for NoExclusions {
    fn is_excluded(&self, _model_type: &ModelType) -> bool {
        false
    }
}

#[derive(Debug, Default, Clone)]
/// Exclude a fixed set of Rust types from validation.
///
/// ```rust
/// use modelbind::ModelType;
/// use modelbind::validation::{ExcludeTypes, ValidationExcludeFilters};
///
/// let filters = ExcludeTypes::new().exclude::<serde_json::Value>();
/// assert!(filters.is_excluded(&ModelType::reference::<serde_json::Value>()));
/// assert!(!filters.is_excluded(&ModelType::value::<u64>()));
/// ```
pub struct ExcludeTypes {
    type_ids: HashSet<TypeId>,
}

impl ExcludeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude `T` from validation.
    pub fn exclude<T: 'static>(mut self) -> Self {
        self.type_ids.insert(TypeId::of::<T>());
        self
    }
}

impl ValidationExcludeFilters for ExcludeTypes {
    fn is_excluded(&self, model_type: &ModelType) -> bool {
        self.type_ids.contains(&model_type.type_id())
    }
}

#[cfg(test)]
mod tests {
    use super::{ExcludeTypes, NoExclusions, ValidationExcludeFilters};
    use crate::binding::ModelType;

    #[test]
    fn nothing_is_excluded_by_default() {
        assert!(!NoExclusions.is_excluded(&ModelType::value::<u64>()));
        assert!(!ExcludeTypes::new().is_excluded(&ModelType::value::<u64>()));
    }

    #[test]
    fn exclusions_match_the_rust_type_not_the_name() {
        let filters = ExcludeTypes::new().exclude::<bytes::Bytes>();
        let renamed = ModelType::value::<String>().named("Bytes");
        assert!(!filters.is_excluded(&renamed));

        let filters = filters.exclude::<String>();
        assert!(filters.is_excluded(&renamed));
    }
}
