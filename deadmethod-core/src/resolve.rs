//! Target type resolution.
//!
//! Turns the user's `(package path, type name)` pair into a [`TypeIdentity`]
//! that is known to exist in the loaded program and to carry a method set.

use tracing::debug;

use crate::error::{DeadmethodError, DeadmethodResult};
use crate::program::{Object, Program, TypeDecl, TypeIdentity};

/// Resolve the target type and return its declaration alongside.
pub fn resolve_decl<'p>(
    program: &'p Program,
    package: &str,
    name: &str,
) -> DeadmethodResult<(TypeIdentity, &'p TypeDecl)> {
    let pkg = program
        .package(package)
        .ok_or_else(|| DeadmethodError::package_not_found(package))?;

    let object = pkg
        .lookup(name)
        .ok_or_else(|| DeadmethodError::type_not_found(package, name))?;

    match object {
        Object::Type(decl) if !decl.alias => {
            debug!(package, type_name = name, methods = decl.methods.len(), "resolved target type");
            Ok((TypeIdentity::new(package, name), decl))
        }
        other => Err(DeadmethodError::not_a_named_type(
            package,
            name,
            other.describe(),
        )),
    }
}

/// Resolve the target type's identity.
pub fn resolve_target(
    program: &Program,
    package: &str,
    name: &str,
) -> DeadmethodResult<TypeIdentity> {
    resolve_decl(program, package, name).map(|(id, _)| id)
}
