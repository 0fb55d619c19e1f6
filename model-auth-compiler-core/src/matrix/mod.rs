//! Deny-by-default permission table keyed by role, field, and concrete
//! operation.
//!
//! One matrix is allocated per compiled type, populated by the rule
//! normalizer in a single pass over the type's authored rules, then treated
//! as read-only input by the artifact generator and discarded. The table is
//! closed-world: every `(role, field, operation)` triple that was never
//! granted is denied, including roles the matrix has never seen.

use std::collections::HashMap;

use crate::model::{ConcreteOperation, Role};

/// Per-field grant columns for one role; one flag per concrete operation.
type FieldGrants = [bool; ConcreteOperation::COUNT];

/// The authoritative role × field × operation permission table for one type.
///
/// Grants follow union semantics: rules are addible, never subtractive, so no
/// operation on this type can flip an entry back to denied. Role enumeration
/// order is first-grant order, which keeps downstream artifact clause
/// ordering deterministic.
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    type_name: String,
    fields: Vec<String>,
    field_index: HashMap<String, usize>,
    roles: Vec<Role>,
    grants: HashMap<Role, Vec<FieldGrants>>,
}

impl PermissionMatrix {
    /// Allocate a deny-all matrix sized by the given field set and the full
    /// concrete operation enumeration.
    ///
    /// Partial operation instantiation is not expressible: every matrix
    /// carries all of [`ConcreteOperation::ALL`]. The field set comes from a
    /// well-formed schema type and is therefore non-empty.
    pub fn new(type_name: impl Into<String>, fields: &[String]) -> Self {
        debug_assert!(!fields.is_empty(), "a schema type always has fields");

        let field_index = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.clone(), index))
            .collect();

        Self {
            type_name: type_name.into(),
            fields: fields.to_vec(),
            field_index,
            roles: Vec::new(),
            grants: HashMap::new(),
        }
    }

    /// The schema type this matrix was compiled for.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The type's full field set, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Every role granted at least one operation, in first-grant order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Set every `(role, field, operation)` entry for the given operations and
    /// fields to allowed. `fields = None` targets the whole field set.
    ///
    /// Idempotent, and never clears existing grants. Total over its domain:
    /// field names not present on the type are skipped (the normalizer
    /// validates field references before granting).
    pub fn grant(
        &mut self,
        role: &Role,
        operations: &[ConcreteOperation],
        fields: Option<&[String]>,
    ) {
        let field_indices: Vec<usize> = match fields {
            Some(subset) => subset
                .iter()
                .filter_map(|field| self.field_index.get(field).copied())
                .collect(),
            None => (0..self.fields.len()).collect(),
        };

        if !self.grants.contains_key(role) {
            self.roles.push(role.clone());
        }
        let rows = self
            .grants
            .entry(role.clone())
            .or_insert_with(|| vec![[false; ConcreteOperation::COUNT]; self.fields.len()]);

        for field_position in field_indices {
            for operation in operations {
                rows[field_position][operation.index()] = true;
            }
        }
    }

    /// Pure lookup: may `role` perform `operation` on `field`?
    ///
    /// Returns `false` for any role, field, or operation never granted;
    /// absence is a valid, expected query outcome, never an error.
    pub fn is_allowed(&self, role: &Role, field: &str, operation: ConcreteOperation) -> bool {
        let Some(rows) = self.grants.get(role) else {
            return false;
        };
        let Some(field_position) = self.field_index.get(field) else {
            return false;
        };
        rows[*field_position][operation.index()]
    }

    /// Roles holding at least one grant on `field`, in first-grant order.
    pub fn roles_with_any_access(&self, field: &str) -> Vec<&Role> {
        self.roles
            .iter()
            .filter(|role| {
                ConcreteOperation::ALL
                    .iter()
                    .any(|operation| self.is_allowed(role, field, *operation))
            })
            .collect()
    }

    /// Fields on which `role` holds at least one grant, in declaration order.
    pub fn fields_with_any_access(&self, role: &Role) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| {
                ConcreteOperation::ALL
                    .iter()
                    .any(|operation| self.is_allowed(role, field, *operation))
            })
            .map(String::as_str)
            .collect()
    }

    /// Fields on which `role` may perform `operation`, in declaration order.
    ///
    /// This is the artifact generator's uniformity probe: an operation can be
    /// checked type-level exactly when this covers the full field set for
    /// every authorized role. Computed per call; nothing is cached.
    pub fn allowed_fields(&self, role: &Role, operation: ConcreteOperation) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| self.is_allowed(role, field, operation))
            .map(String::as_str)
            .collect()
    }
}
