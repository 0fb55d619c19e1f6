//! Declarative-rule validation and expansion into permission-matrix grants.
//!
//! The normalizer owns all conflict detection (aggregate-vs-granular
//! operation clashes inside a single rule) and all operation-inheritance
//! logic at the declarative tier (`read` fans out to `get` + `list`). Any
//! validation failure aborts compilation for the whole schema run: the
//! authored intent is ambiguous and must be corrected, not guessed, and a
//! partially populated matrix must never escape.

use log::{debug, warn};

use crate::errors::{CompileError, Result};
use crate::matrix::PermissionMatrix;
use crate::model::{ConcreteOperation, DeclarativeOperation, Rule, TypeDescriptor};

/// Validate a type's authored rules and expand them into a populated
/// deny-by-default matrix.
///
/// Rules are processed in authored order. Later rules only add grants, never
/// override earlier ones, so ordering does not affect the final matrix; it
/// only fixes diagnostic and artifact clause ordering.
pub fn normalize(descriptor: &TypeDescriptor) -> Result<PermissionMatrix> {
    let mut matrix = PermissionMatrix::new(&descriptor.type_name, &descriptor.fields);

    if descriptor.rules.is_empty() {
        warn!(
            "type '{}' declares no access rules; every operation compiles to deny",
            descriptor.type_name
        );
        return Ok(matrix);
    }

    for rule in &descriptor.rules {
        validate_rule(rule, descriptor)?;

        let operations = expand_operations(&rule.operations);
        debug!(
            "granting [{}] to role '{}' on type '{}' ({})",
            operations
                .iter()
                .map(|operation| operation.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            rule.role,
            descriptor.type_name,
            rule.fields
                .as_ref()
                .map_or_else(|| "all fields".to_string(), |fields| fields.join(", ")),
        );

        matrix.grant(&rule.role, &operations, rule.fields.as_deref());
    }

    Ok(matrix)
}

/// Reject ambiguous operation sets and dangling field references.
///
/// The `read`-vs-granular check is per-rule, not cross-rule: two separate
/// rules, one granting `read` and another granting `get`, are legal.
fn validate_rule(rule: &Rule, descriptor: &TypeDescriptor) -> Result<()> {
    if rule.operations.contains(&DeclarativeOperation::Read) {
        for granular in [DeclarativeOperation::Get, DeclarativeOperation::List] {
            if rule.operations.contains(&granular) {
                return Err(CompileError::rule_conflict(rule.role.as_str(), granular));
            }
        }
    }

    if let Some(fields) = &rule.fields {
        for field in fields {
            if !descriptor.fields.contains(field) {
                return Err(CompileError::invalid_field_reference(
                    field,
                    &descriptor.type_name,
                ));
            }
        }
    }

    Ok(())
}

/// Map a rule's declared operation set onto the concrete tier, deduplicated
/// and in first-mention order.
fn expand_operations(operations: &[DeclarativeOperation]) -> Vec<ConcreteOperation> {
    let mut expanded = Vec::new();
    for operation in operations {
        for concrete in operation.expand() {
            if !expanded.contains(concrete) {
                expanded.push(*concrete);
            }
        }
    }
    expanded
}
