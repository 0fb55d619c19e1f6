//! Runtime authorization-check artifacts.
//!
//! An artifact is the declarative description of the guard protecting one
//! concrete, request-servable operation: the operation's API key plus the
//! ordered role clauses a downstream code-emission layer materializes into a
//! boolean-or predicate. The generator in [`engine`] derives artifacts from a
//! populated [`PermissionMatrix`](crate::matrix::PermissionMatrix); nothing
//! here produces executable code.

use schemars::JsonSchema;
use serde::Serialize;

use crate::model::{ConcreteOperation, Role};

pub(crate) mod engine;

pub use engine::Engine;

/// Granularity at which an artifact's clauses apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum CheckScope {
    /// One check for the whole type: every authorized role may touch every
    /// field for this operation.
    TypeLevel,
    /// Per-field permissions diverge across roles; clauses carry the fields
    /// they cover so the consumer can layer field-level pruning.
    FieldLevel,
}

/// One entry of an artifact's boolean-or predicate.
///
/// Runtime semantics, evaluated by the consumer: the request is authorized
/// iff any clause with `allowed = true` matches the requester's resolved
/// role.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleClause {
    /// The role this clause matches against.
    pub role: Role,
    /// Whether a match authorizes the request.
    pub allowed: bool,
    /// Fields the clause covers; present only on field-scoped clauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl RoleClause {
    /// Create a type-level clause.
    #[must_use]
    pub(crate) fn new(role: Role, allowed: bool) -> Self {
        Self {
            role,
            allowed,
            fields: None,
        }
    }

    /// Create a field-scoped clause.
    #[must_use]
    pub(crate) fn scoped(role: Role, allowed: bool, fields: Vec<String>) -> Self {
        Self {
            role,
            allowed,
            fields: Some(fields),
        }
    }
}

/// Declarative description of the runtime check guarding one servable
/// operation of a type.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheckArtifact {
    /// The concrete operation this artifact guards.
    pub operation: ConcreteOperation,
    /// The servable operation name the emitter materializes the check under
    /// (e.g. "getPost", "onCreatePost").
    pub operation_key: String,
    /// Whether the clauses apply type-level or per field.
    pub scope: CheckScope,
    /// Ordered role clauses; order follows first-grant order in the matrix.
    pub clauses: Vec<RoleClause>,
}
