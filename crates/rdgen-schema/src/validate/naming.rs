use crate::{MAX_NAME_LEN, prelude::*};
use convert_case::{Case, Casing};
use std::collections::BTreeMap;

/// Keywords that cannot be escaped as raw identifiers.
const UNESCAPABLE: [&str; 5] = ["_", "Self", "crate", "self", "super"];

/// Member identifiers taken by generated fields and methods.
const RESERVED_MEMBERS: [&str; 31] = [
    "as_any",
    "base",
    "bind",
    "bindable_base",
    "clone",
    "connect",
    "default",
    "eq",
    "eq_dyn",
    "fmt",
    "get_or_create_extension_of",
    "hash",
    "hash_code",
    "hash_code_dyn",
    "identify",
    "init",
    "initialize",
    "intern_roots",
    "new",
    "new_full",
    "rd_hash",
    "rd_type_id",
    "rdid",
    "read",
    "register_serializers",
    "serialization_context",
    "type_name",
    "unknown_bytes",
    "unknown_id",
    "write",
    "write_polymorphic",
];

/// Snake-case form used for fields and getters.
#[must_use]
pub fn member_ident(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Ensure an identifier is non-empty, ASCII, and within the maximum length.
pub(crate) fn validate_ident(ident: &str) -> Result<(), String> {
    if ident.is_empty() {
        return Err("ident is empty".to_string());
    }
    if ident.len() > MAX_NAME_LEN {
        return Err(format!("ident '{ident}' exceeds max length {MAX_NAME_LEN}"));
    }

    let mut chars = ident.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("ident '{ident}' is not a valid identifier"));
    }
    if UNESCAPABLE.contains(&ident) {
        return Err(format!("ident '{ident}' is a reserved keyword"));
    }

    Ok(())
}

/// Member identifiers must stay distinct once snake-cased and must not
/// shadow generated items.
pub(crate) fn validate_member_idents(schema: &Schema, decl: &Declaration, errs: &mut ErrorTree) {
    if decl.is_enum() {
        return;
    }

    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for member in schema.all_members(decl) {
        let ident = member_ident(member.name());
        if let Some(other) = seen.insert(ident.clone(), member.name()) {
            if other != member.name() {
                err!(
                    errs,
                    "members '{other}' and '{}' both map to '{ident}'",
                    member.name()
                );
            }
        }
    }

    for member in &decl.members {
        let ident = member_ident(member.name());
        if RESERVED_MEMBERS.contains(&ident.as_str()) || UNESCAPABLE.contains(&ident.as_str()) {
            err!(errs, "member name '{}' is reserved", member.name());
        }
    }
}

/// Member names must be unique across the declaration and all its bases.
pub(crate) fn validate_member_names(schema: &Schema, decl: &Declaration, errs: &mut ErrorTree) {
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

    for ancestor in schema.ancestors(decl) {
        for member in &ancestor.members {
            seen.insert(member.name(), ancestor.name.as_str());
        }
    }

    for member in &decl.members {
        if let Some(owner) = seen.insert(member.name(), decl.name.as_str()) {
            err!(
                errs,
                "member '{}' is already declared in '{owner}'",
                member.name()
            );
        }
    }
}

/// Type ids are name hashes, so every declaration name (including the
/// synthesized Unknown subtypes) must be unique.
pub(crate) fn validate_unique_names(schema: &Schema, errs: &mut ErrorTree) {
    for decl in schema.declarations() {
        if decl.is_abstract() {
            let unknown = decl.unknown_name();
            if schema.get(&unknown).is_some() {
                err!(
                    errs,
                    "'{unknown}' clashes with the fallback type synthesized for '{}'",
                    decl.name
                );
            }
        }
    }
}

///
/// TESTS
///
