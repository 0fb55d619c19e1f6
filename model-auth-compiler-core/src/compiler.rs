//! Schema-level compilation front door.
//!
//! Per-type compilation is pure, synchronous, in-memory work with no
//! suspension points, so types fan out across a rayon pool; the only
//! synchronization is the final collect-and-sort-by-type-name barrier that
//! makes schema output order deterministic.

use rayon::prelude::*;

use crate::artifacts::{AuthCheckArtifact, Engine};
use crate::errors::Result;
use crate::matrix::PermissionMatrix;
use crate::model::TypeDescriptor;
use crate::normalize::normalize;

/// Fully compiled authorization output for one schema type.
#[derive(Debug, Clone)]
pub struct CompiledType {
    /// The populated permission matrix, queryable via
    /// [`PermissionMatrix::is_allowed`] by field-level filtering consumers.
    pub matrix: PermissionMatrix,
    /// Ordered authorization-check artifacts for the code-emission layer.
    pub artifacts: Vec<AuthCheckArtifact>,
}

impl CompiledType {
    /// The schema type this output belongs to.
    pub fn type_name(&self) -> &str {
        self.matrix.type_name()
    }
}

/// Compile one type: normalize its rules into a matrix, then derive the
/// artifact sequence.
pub fn compile_type(descriptor: &TypeDescriptor) -> Result<CompiledType> {
    let matrix = normalize(descriptor)?;
    let artifacts = Engine::new().generate(&matrix);
    Ok(CompiledType { matrix, artifacts })
}

/// Compile every type of a schema, in parallel, with deterministic output
/// order.
///
/// Types are independent (each gets its own matrix; no shared mutable
/// state), so they are compiled one rayon task per type. The first
/// normalization error aborts the whole run: authorization output must never
/// be silently partial.
pub fn compile_schema(descriptors: &[TypeDescriptor]) -> Result<Vec<CompiledType>> {
    let mut compiled = descriptors
        .par_iter()
        .map(compile_type)
        .collect::<Result<Vec<_>>>()?;

    compiled.sort_by(|a, b| a.type_name().cmp(b.type_name()));
    Ok(compiled)
}
