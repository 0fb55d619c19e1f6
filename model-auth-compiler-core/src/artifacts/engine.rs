//! Artifact generation engine.
//!
//! Walks the concrete operation space for a compiled type and derives, per
//! operation, the ordered role clauses a code-emission layer turns into a
//! runtime guard. Subscription operations are never looked up directly in the
//! matrix: their visibility is inherited from the corresponding mutation
//! grant unioned with the role's `list` grant, so a role that can only `get`
//! single items never observes a subscription stream.

use convert_case::{Case, Casing};
use log::debug;

use super::{AuthCheckArtifact, CheckScope, RoleClause};
use crate::matrix::PermissionMatrix;
use crate::model::{ConcreteOperation, Role};

/// Artifact generation engine that converts a permission matrix into
/// authorization-check artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine;

impl Engine {
    /// Create a new artifact generation engine.
    pub fn new() -> Self {
        Self
    }

    /// Generate the ordered artifact sequence for a populated matrix.
    ///
    /// Operations are visited in the canonical [`ConcreteOperation::ALL`]
    /// order. An operation no role may perform produces no artifact: with
    /// nothing to match, the consumer's deny-by-default short-circuit
    /// applies.
    pub fn generate(&self, matrix: &PermissionMatrix) -> Vec<AuthCheckArtifact> {
        ConcreteOperation::ALL
            .iter()
            .filter_map(|operation| self.generate_for_operation(matrix, *operation))
            .collect()
    }

    /// Build the artifact for a single concrete operation, if any role is
    /// authorized for it.
    fn generate_for_operation(
        &self,
        matrix: &PermissionMatrix,
        operation: ConcreteOperation,
    ) -> Option<AuthCheckArtifact> {
        let authorized: Vec<(&Role, Vec<&str>)> = matrix
            .roles()
            .iter()
            .map(|role| (role, self.effective_fields(matrix, role, operation)))
            .filter(|(_, fields)| !fields.is_empty())
            .collect();

        if authorized.is_empty() {
            debug!(
                "no role may perform '{}' on type '{}'; operation stays deny-all",
                operation,
                matrix.type_name()
            );
            return None;
        }

        // Type-level check suffices only when every authorized role covers
        // the full field set; any divergence drops to field-scoped clauses.
        let uniform = authorized
            .iter()
            .all(|(_, fields)| fields.len() == matrix.fields().len());

        let (scope, clauses) = if uniform {
            (
                CheckScope::TypeLevel,
                authorized
                    .into_iter()
                    .map(|(role, _)| RoleClause::new(role.clone(), true))
                    .collect(),
            )
        } else {
            (
                CheckScope::FieldLevel,
                authorized
                    .into_iter()
                    .map(|(role, fields)| {
                        RoleClause::scoped(
                            role.clone(),
                            true,
                            fields.into_iter().map(String::from).collect(),
                        )
                    })
                    .collect(),
            )
        };

        let artifact = AuthCheckArtifact {
            operation,
            operation_key: operation_key(matrix.type_name(), operation),
            scope,
            clauses,
        };
        debug!(
            "generated {:?} check '{}' for type '{}'",
            artifact.scope,
            artifact.operation_key,
            matrix.type_name()
        );

        Some(artifact)
    }

    /// Fields on which `role` may observe `operation`, after subscription
    /// inheritance.
    ///
    /// For subscriptions the allowed set is the union of the source mutation
    /// grant and the `list` grant, per field; `get` alone is never
    /// sufficient. Field order follows the type's declaration order.
    fn effective_fields<'m>(
        &self,
        matrix: &'m PermissionMatrix,
        role: &Role,
        operation: ConcreteOperation,
    ) -> Vec<&'m str> {
        match operation.subscription_source() {
            Some(source) => matrix
                .fields()
                .iter()
                .filter(|field| {
                    matrix.is_allowed(role, field, source)
                        || matrix.is_allowed(role, field, ConcreteOperation::List)
                })
                .map(String::as_str)
                .collect(),
            None => matrix.allowed_fields(role, operation),
        }
    }
}

/// The servable operation name for `operation` on `type_name`, e.g.
/// `getPost`, `listPosts`, `onCreatePost`.
fn operation_key(type_name: &str, operation: ConcreteOperation) -> String {
    let pascal = type_name.to_case(Case::Pascal);
    match operation {
        ConcreteOperation::Get => format!("get{pascal}"),
        ConcreteOperation::List => format!("list{}", pluralize(&pascal)),
        ConcreteOperation::Create => format!("create{pascal}"),
        ConcreteOperation::Update => format!("update{pascal}"),
        ConcreteOperation::Delete => format!("delete{pascal}"),
        ConcreteOperation::OnCreate => format!("onCreate{pascal}"),
        ConcreteOperation::OnUpdate => format!("onUpdate{pascal}"),
        ConcreteOperation::OnDelete => format!("onDelete{pascal}"),
    }
}

fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else {
        format!("{name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclarativeOperation, Rule, TypeDescriptor};
    use crate::normalize::normalize;

    fn compile(rules: Vec<Rule>) -> Vec<AuthCheckArtifact> {
        let descriptor = TypeDescriptor::new("Test", vec!["id".to_string(), "name".to_string()])
            .with_rules(rules);
        let matrix = normalize(&descriptor).unwrap();
        Engine::new().generate(&matrix)
    }

    fn operations(artifacts: &[AuthCheckArtifact]) -> Vec<ConcreteOperation> {
        artifacts.iter().map(|artifact| artifact.operation).collect()
    }

    #[test]
    fn test_get_only_role_yields_get_artifact_alone() {
        let artifacts = compile(vec![Rule::new("public", vec![DeclarativeOperation::Get])]);

        assert_eq!(operations(&artifacts), vec![ConcreteOperation::Get]);
        assert_eq!(artifacts[0].operation_key, "getTest");
        assert_eq!(artifacts[0].scope, CheckScope::TypeLevel);
        assert_eq!(
            artifacts[0].clauses,
            vec![RoleClause::new(Role::from("public"), true)]
        );
    }

    #[test]
    fn test_list_only_role_yields_list_and_all_subscriptions() {
        let artifacts = compile(vec![Rule::new("public", vec![DeclarativeOperation::List])]);

        assert_eq!(
            operations(&artifacts),
            vec![
                ConcreteOperation::List,
                ConcreteOperation::OnCreate,
                ConcreteOperation::OnUpdate,
                ConcreteOperation::OnDelete,
            ]
        );
    }

    #[test]
    fn test_read_role_yields_all_five_observable_operations() {
        let artifacts = compile(vec![Rule::new("public", vec![DeclarativeOperation::Read])]);

        assert_eq!(
            operations(&artifacts),
            vec![
                ConcreteOperation::Get,
                ConcreteOperation::List,
                ConcreteOperation::OnCreate,
                ConcreteOperation::OnUpdate,
                ConcreteOperation::OnDelete,
            ]
        );
    }

    #[test]
    fn test_create_only_role_yields_create_and_on_create() {
        let artifacts = compile(vec![Rule::new(
            "owner",
            vec![DeclarativeOperation::Create],
        )]);

        assert_eq!(
            operations(&artifacts),
            vec![ConcreteOperation::Create, ConcreteOperation::OnCreate]
        );
    }

    #[test]
    fn test_no_rules_yields_no_artifacts() {
        let artifacts = compile(vec![]);
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_operation_keys() {
        let matrix = normalize(
            &TypeDescriptor::new("Post", vec!["id".to_string()]).with_rules(vec![Rule::new(
                "public",
                vec![
                    DeclarativeOperation::Read,
                    DeclarativeOperation::Create,
                    DeclarativeOperation::Update,
                    DeclarativeOperation::Delete,
                ],
            )]),
        )
        .unwrap();
        let artifacts = Engine::new().generate(&matrix);

        let keys: Vec<&str> = artifacts
            .iter()
            .map(|artifact| artifact.operation_key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "getPost",
                "listPosts",
                "createPost",
                "updatePost",
                "deletePost",
                "onCreatePost",
                "onUpdatePost",
                "onDeletePost",
            ]
        );
    }

    #[test]
    fn test_divergent_field_permissions_emit_field_scoped_clauses() {
        let artifacts = compile(vec![
            Rule::new("owner", vec![DeclarativeOperation::Update]),
            Rule::new("group:editors", vec![DeclarativeOperation::Update])
                .with_fields(vec!["name".to_string()]),
        ]);

        let update = artifacts
            .iter()
            .find(|artifact| artifact.operation == ConcreteOperation::Update)
            .unwrap();
        assert_eq!(update.scope, CheckScope::FieldLevel);
        assert_eq!(
            update.clauses,
            vec![
                RoleClause::scoped(
                    Role::from("owner"),
                    true,
                    vec!["id".to_string(), "name".to_string()],
                ),
                RoleClause::scoped(
                    Role::from("group:editors"),
                    true,
                    vec!["name".to_string()],
                ),
            ]
        );
    }

    #[test]
    fn test_uniform_roles_emit_single_type_level_check() {
        let artifacts = compile(vec![
            Rule::new("owner", vec![DeclarativeOperation::Read]),
            Rule::new("public", vec![DeclarativeOperation::Read]),
        ]);

        let get = artifacts
            .iter()
            .find(|artifact| artifact.operation == ConcreteOperation::Get)
            .unwrap();
        assert_eq!(get.scope, CheckScope::TypeLevel);
        assert_eq!(get.clauses.len(), 2);
        assert!(get.clauses.iter().all(|clause| clause.fields.is_none()));
    }

    #[test]
    fn test_subscription_inherits_field_scope_from_list_union() {
        // list on a subset only: the subscription artifacts must carry the
        // same subset, not the whole type.
        let artifacts = compile(vec![Rule::new("viewer", vec![DeclarativeOperation::List])
            .with_fields(vec!["name".to_string()])]);

        let on_create = artifacts
            .iter()
            .find(|artifact| artifact.operation == ConcreteOperation::OnCreate)
            .unwrap();
        assert_eq!(on_create.scope, CheckScope::FieldLevel);
        assert_eq!(
            on_create.clauses,
            vec![RoleClause::scoped(
                Role::from("viewer"),
                true,
                vec!["name".to_string()],
            )]
        );
    }

    #[test]
    fn test_clause_order_follows_rule_order() {
        let artifacts = compile(vec![
            Rule::new("owner", vec![DeclarativeOperation::Get]),
            Rule::new("public", vec![DeclarativeOperation::Get]),
        ]);

        let roles: Vec<&str> = artifacts[0]
            .clauses
            .iter()
            .map(|clause| clause.role.as_str())
            .collect();
        assert_eq!(roles, vec!["owner", "public"]);
    }

    #[test]
    fn test_pluralize_leaves_trailing_s_alone() {
        assert_eq!(pluralize("News"), "News");
        assert_eq!(pluralize("Post"), "Posts");
    }
}
