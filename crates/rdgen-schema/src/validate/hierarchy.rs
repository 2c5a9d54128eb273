use crate::prelude::*;
use std::collections::BTreeSet;

/// A base must be an abstract declaration of the same family.
pub(crate) fn validate_base(schema: &Schema, decl: &Declaration, errs: &mut ErrorTree) {
    let Some(base_name) = decl.base.as_deref() else {
        return;
    };

    match schema.get(base_name) {
        None => err!(errs, "base '{base_name}' not found"),
        Some(base) if !base.same_family(decl) => {
            err!(errs, "base '{base_name}' is not the same kind as '{}'", decl.name);
        }
        Some(base) if !base.is_abstract() => {
            err!(errs, "base '{base_name}' must be abstract");
        }
        Some(_) => {}
    }
}

/// Inheritance chains must terminate.
pub(crate) fn validate_acyclic(schema: &Schema, errs: &mut ErrorTree) {
    for decl in schema.declarations() {
        let mut seen = BTreeSet::from([decl.name.as_str()]);
        let mut next = decl.base.as_deref();

        while let Some(name) = next {
            if !seen.insert(name) {
                err!(errs, "inheritance cycle through '{}'", decl.name);
                break;
            }
            next = schema.get(name).and_then(|d| d.base.as_deref());
        }
    }
}

/// Every non-toplevel declaration belongs to exactly one toplevel.
pub(crate) fn validate_ownership(schema: &Schema, errs: &mut ErrorTree) {
    if let Err(e) = schema.root() {
        errs.add(e);
    }

    for decl in schema.declarations().filter(|d| !d.is_toplevel()) {
        let owners = schema
            .declarations()
            .filter_map(Declaration::as_toplevel)
            .filter(|t| t.declared_types.iter().any(|n| n == &decl.name))
            .count();

        match owners {
            1 => {}
            0 => err!(errs, "'{}' is not owned by any toplevel", decl.name),
            _ => err!(errs, "'{}' is owned by {owners} toplevels", decl.name),
        }
    }
}

///
/// TESTS
///
