//! Input model shared with the external schema parser.
//!
//! These types are the hand-off boundary: the schema parser produces
//! [`TypeDescriptor`] values (one per schema type, carrying the type's field
//! list and its authored [`Rule`]s) and the compiler consumes them as plain
//! data. Everything here derives `serde` and `schemars` so collaborators can
//! exchange the model as JSON without linking against compiler internals.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An authorization-strategy-scoped identity class evaluated at request time
/// (e.g. "public", "owner:username", "group:admins").
///
/// Roles are opaque to the compiler: they are compared by value equality only,
/// and their internal structure is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a role from its string identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The role's string identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An access verb as authored in a rule.
///
/// `Read` is an aggregate convenience over `Get` + `List`; mixing it with
/// either granular form inside a single rule is a compile error caught by the
/// normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeclarativeOperation {
    Create,
    Update,
    Delete,
    Read,
    Get,
    List,
}

impl DeclarativeOperation {
    /// Canonical lowercase name, as it appears in authored rules and
    /// diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Read => "read",
            Self::Get => "get",
            Self::List => "list",
        }
    }

    /// The concrete operations this verb expands to.
    ///
    /// `read` fans out to `get` + `list`; every other verb maps one-to-one.
    /// Subscription operations never appear here: they are derived by the
    /// artifact generator, not granted.
    pub(crate) fn expand(self) -> &'static [ConcreteOperation] {
        match self {
            Self::Create => &[ConcreteOperation::Create],
            Self::Update => &[ConcreteOperation::Update],
            Self::Delete => &[ConcreteOperation::Delete],
            Self::Read => &[ConcreteOperation::Get, ConcreteOperation::List],
            Self::Get => &[ConcreteOperation::Get],
            Self::List => &[ConcreteOperation::List],
        }
    }
}

impl fmt::Display for DeclarativeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A servable API action, including the derived subscription variants.
///
/// Subscription operations (`OnCreate`, `OnUpdate`, `OnDelete`) are never
/// authored directly; their permission is inherited from mutation and `list`
/// grants during artifact generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConcreteOperation {
    Get,
    List,
    Create,
    Update,
    Delete,
    OnCreate,
    OnUpdate,
    OnDelete,
}

impl ConcreteOperation {
    /// Number of concrete operations; the permission matrix is always sized
    /// by the full enumeration.
    pub(crate) const COUNT: usize = 8;

    /// The full concrete enumeration, in canonical generation order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Get,
        Self::List,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::OnCreate,
        Self::OnUpdate,
        Self::OnDelete,
    ];

    /// Canonical camelCase name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::OnCreate => "onCreate",
            Self::OnUpdate => "onUpdate",
            Self::OnDelete => "onDelete",
        }
    }

    /// Whether this is a derived subscription operation.
    pub fn is_subscription(self) -> bool {
        matches!(self, Self::OnCreate | Self::OnUpdate | Self::OnDelete)
    }

    /// The mutation whose grant a subscription inherits from (alongside
    /// `List`). `None` for non-subscription operations.
    pub(crate) fn subscription_source(self) -> Option<Self> {
        match self {
            Self::OnCreate => Some(Self::Create),
            Self::OnUpdate => Some(Self::Update),
            Self::OnDelete => Some(Self::Delete),
            _ => None,
        }
    }

    /// Position of this operation in [`Self::ALL`]; used as the matrix column
    /// index.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Get => 0,
            Self::List => 1,
            Self::Create => 2,
            Self::Update => 3,
            Self::Delete => 4,
            Self::OnCreate => 5,
            Self::OnUpdate => 6,
            Self::OnDelete => 7,
        }
    }
}

impl fmt::Display for ConcreteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declarative access rule attached to a schema type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// The role this rule grants access to.
    pub role: Role,
    /// The authored operation set, in authored order.
    pub operations: Vec<DeclarativeOperation>,
    /// Field subset the rule targets; absent means every field of the type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl Rule {
    /// Create a type-level rule covering every field.
    pub fn new(role: impl Into<Role>, operations: Vec<DeclarativeOperation>) -> Self {
        Self {
            role: role.into(),
            operations,
            fields: None,
        }
    }

    /// Restrict the rule to a field subset.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// The parsed shape of one schema type, as handed over by the schema parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Schema type name (e.g. "Post").
    pub type_name: String,
    /// The type's full field set, in declaration order. Never empty for a
    /// well-formed schema.
    pub fields: Vec<String>,
    /// Authored access rules, in authored order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl TypeDescriptor {
    /// Create a descriptor without rules (compiles to deny-everything).
    pub fn new(type_name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
            rules: Vec::new(),
        }
    }

    /// Attach authored rules.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }
}
