#![forbid(unsafe_code)]

//! Error taxonomy for the binding engine.
//!
//! Configuration errors surface at the fluent call that caused them or at
//! the first evaluation. Runtime guard errors come from propagation itself.
//! Failures inside signal-driven propagation have no caller to return to;
//! they are logged through `tracing::error!` instead.

/// Errors raised while configuring or running a binding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// A path segment names a member the type does not expose.
    #[error("type `{type_name}` has no bindable member `{member}`")]
    UnknownMember {
        type_name: &'static str,
        member: String,
    },

    /// A write reached a member that has no setter.
    #[error("member `{member}` of `{type_name}` is read-only")]
    ReadOnlyMember {
        type_name: &'static str,
        member: String,
    },

    /// `combine_by` was called twice on the same multi source.
    #[error("a value combiner is already set on this multi-binding")]
    CombinerAlreadySet,

    /// A multi source was read before a combiner was configured.
    #[error("multi-binding has no value combiner")]
    MissingCombiner,

    /// The combiner cannot split a value back into its sources.
    #[error("combiner `{0}` does not support dividing a value")]
    DivideUnsupported(&'static str),

    /// The combiner split a value into the wrong number of parts.
    #[error("combiner divided into {actual} values for {expected} sources")]
    DivideArity { expected: usize, actual: usize },

    /// A raw value that does not name a direction.
    #[error("`{value}` is not a valid {kind}")]
    InvalidDirection { kind: &'static str, value: String },

    #[error("binding has no source strategy")]
    MissingSource,

    #[error("binding has no destination strategy")]
    MissingDestination,

    /// Two-way bindings need both ends to accept writes.
    #[error("two-way binding requires a writable {0}")]
    TwoWayNotWritable(&'static str),

    /// A value could not be coerced into the requested type.
    #[error("expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Nested propagation exceeded the configured depth.
    #[error("propagation nested deeper than {max_depth} levels")]
    PropagationDepthExceeded { max_depth: usize },

    /// The binding was released and can no longer propagate.
    #[error("binding has been released")]
    Released,
}

/// Result alias used across the runtime crate.
pub type Result<T, E = BindingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = BindingError::UnknownMember {
            type_name: "Player",
            member: "scroe".into(),
        };
        assert_eq!(
            err.to_string(),
            "type `Player` has no bindable member `scroe`"
        );
        assert_eq!(
            BindingError::DivideArity {
                expected: 2,
                actual: 3
            }
            .to_string(),
            "combiner divided into 3 values for 2 sources"
        );
    }
}
