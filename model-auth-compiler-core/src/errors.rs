//! Error types for rule compilation.

use thiserror::Error;

use crate::model::DeclarativeOperation;

/// Result type alias for operations that can fail with [`CompileError`].
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors raised while normalizing declarative access rules.
///
/// Both variants are author-input errors: the declarative intent is ambiguous
/// or refers to something that does not exist, so the whole compilation run is
/// aborted rather than guessing. There is no recovery or retry path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A single rule's operation set mixes the aggregate `read` with one of
    /// the granular operations it expands to.
    #[error(
        "rule for role '{role}' lists '{granular}' alongside 'read'. Remove 'read' to restrict \
         the role to '{granular}' access only, or remove '{granular}' to keep both 'get' and \
         'list' access via 'read'"
    )]
    RuleConflict {
        /// Role whose rule is ambiguous.
        role: String,
        /// The granular operation (`get` or `list`) clashing with `read`.
        granular: &'static str,
    },

    /// A rule names a field that is not defined on the enclosing type.
    #[error("field '{field}' referenced by an access rule is not defined on type '{type_name}'")]
    InvalidFieldReference {
        /// The unknown field name.
        field: String,
        /// The type whose rule referenced it.
        type_name: String,
    },
}

impl CompileError {
    /// Build a [`CompileError::RuleConflict`] for a `read`-vs-granular clash.
    pub(crate) fn rule_conflict(role: &str, granular: DeclarativeOperation) -> Self {
        Self::RuleConflict {
            role: role.to_string(),
            granular: granular.as_str(),
        }
    }

    /// Build a [`CompileError::InvalidFieldReference`].
    pub(crate) fn invalid_field_reference(field: &str, type_name: &str) -> Self {
        Self::InvalidFieldReference {
            field: field.to_string(),
            type_name: type_name.to_string(),
        }
    }
}
