use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Where the value of a model comes from.
///
/// Binders declare the source they are responsible for, while each target parameter declares
/// the source it must be bound from.
/// The host compares the two to route a parameter to its binder.
///
/// The set of sources is closed: two [`BindingSource`]s are the same source if and only if
/// they are the same variant.
pub enum BindingSource {
    /// The body of the incoming request, decoded by an input formatter.
    Body,
    /// Fields of a form submitted in the request body.
    Form,
    /// A request header.
    Header,
    /// A path parameter, extracted from the matched route.
    Path,
    /// A query parameter.
    Query,
    /// A value provided by the host application, rather than by the request.
    Services,
}

impl BindingSource {
    /// The name used to refer to this source in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            BindingSource::Body => "Body",
            BindingSource::Form => "Form",
            BindingSource::Header => "Header",
            BindingSource::Path => "Path",
            BindingSource::Query => "Query",
            BindingSource::Services => "Services",
        }
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::BindingSource;

    #[test]
    fn sources_are_compared_by_identity() {
        assert_eq!(BindingSource::Body, BindingSource::Body);
        assert_ne!(BindingSource::Body, BindingSource::Form);
        assert_ne!(BindingSource::Query, BindingSource::Path);
    }

    #[test]
    fn display_uses_the_diagnostic_name() {
        assert_eq!(BindingSource::Body.to_string(), "Body");
        assert_eq!(BindingSource::Services.to_string(), "Services");
    }
}
