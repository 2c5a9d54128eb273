//! Structural fingerprint of a protocol unit.
//!
//! Both ends of a connection embed the hash computed here; a mismatch means
//! the two processes were generated from different schemas. The fold covers
//! everything that shapes the wire (kinds, names, bases, member order and
//! types) and nothing that does not (documentation, settings, equality flags).

use crate::prelude::*;
use rdgen_primitives::IncrementalHash64;

/// Fingerprint of one toplevel (or any declaration) of the schema.
#[must_use]
pub fn serialization_hash(schema: &Schema, decl: &Declaration) -> i64 {
    hash_declaration(schema, decl, IncrementalHash64::default()).result()
}

fn hash_declaration(schema: &Schema, decl: &Declaration, h: IncrementalHash64) -> IncrementalHash64 {
    let mut h = h
        .mix_str(decl.kind.tag())
        .mix_str(&decl.name)
        .mix_str(decl.base.as_deref().unwrap_or_default());

    for scope in decl.intern_scopes() {
        h = h.mix_str(&scope.key_name);
    }

    h = h.mix_i64(i64::try_from(decl.members.len()).unwrap_or(i64::MAX));
    for member in &decl.members {
        h = hash_member(member, h);
    }

    if let Some(toplevel) = decl.as_toplevel() {
        if let ToplevelKind::Ext { pointcut, ext_name } = &toplevel.kind {
            h = h
                .mix_str(pointcut.as_deref().unwrap_or_default())
                .mix_str(ext_name.as_deref().unwrap_or_default());
        }

        for ty in schema.declared_types(decl) {
            h = hash_declaration(schema, ty, h);
        }

        if let ToplevelKind::Root { toplevels } = &toplevel.kind {
            let mut owned: Vec<&Declaration> =
                toplevels.iter().filter_map(|n| schema.get(n)).collect();
            owned.sort_by(|a, b| a.name.cmp(&b.name));

            for ext in owned {
                h = hash_declaration(schema, ext, h);
            }
        }
    }

    h
}

fn hash_member(member: &Member, h: IncrementalHash64) -> IncrementalHash64 {
    match member {
        Member::EnumConst(c) => h.mix_str("const").mix_str(&c.name),
        Member::Field(f) => h
            .mix_str("field")
            .mix_str(&f.name)
            .mix_str(&f.ty.to_string())
            .mix_bool(f.is_optional),
        Member::Reactive(r) => {
            let mut h = h.mix_str(r.kind.tag()).mix_str(&r.name);
            for ty in &r.generic_params {
                h = h.mix_str(&ty.to_string());
            }
            if let ReactiveKind::Extension { delegated_by } = &r.kind {
                h = h.mix_str(&delegated_by.to_string());
            }

            h
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::SchemaBuilder;

    fn point(fields: Vec<Field>) -> i64 {
        let mut decl = Declaration::class("Point");
        for f in fields {
            decl = decl.member(f);
        }
        let schema = SchemaBuilder::new(Declaration::root("Model"))
            .declare(decl)
            .build()
            .expect("valid schema");

        serialization_hash(&schema, schema.root().expect("root"))
    }

    fn xy() -> Vec<Field> {
        vec![Field::new("x", Type::INT), Field::new("y", Type::INT)]
    }

    #[test]
    fn identical_models_hash_identically() {
        assert_eq!(point(xy()), point(xy()));
    }

    #[test]
    fn hash_is_sensitive_to_shape() {
        let base = point(xy());

        let added = {
            let mut f = xy();
            f.push(Field::new("z", Type::INT));
            point(f)
        };
        let removed = point(vec![Field::new("x", Type::INT)]);
        let reordered = point(vec![Field::new("y", Type::INT), Field::new("x", Type::INT)]);
        let renamed = point(vec![Field::new("x", Type::INT), Field::new("w", Type::INT)]);
        let retyped = point(vec![Field::new("x", Type::INT), Field::new("y", Type::LONG)]);

        for (label, other) in [
            ("added", added),
            ("removed", removed),
            ("reordered", reordered),
            ("renamed", renamed),
            ("retyped", retyped),
        ] {
            assert_ne!(base, other, "{label} field must change the hash");
        }
    }

    #[test]
    fn documentation_does_not_participate() {
        let documented = point(vec![
            Field::new("x", Type::INT).doc("horizontal"),
            Field::new("y", Type::INT),
        ]);

        assert_eq!(point(xy()), documented);
    }

    #[test]
    fn root_hash_ignores_toplevel_insertion_order() {
        let build = |first: &str, second: &str| {
            let schema = SchemaBuilder::new(Declaration::root("Model"))
                .declare(Declaration::class("Session"))
                .toplevel(Declaration::ext(first, Some("Session")))
                .toplevel(Declaration::ext(second, Some("Session")))
                .build()
                .expect("valid schema");
            let ext_hash = serialization_hash(&schema, schema.try_get("A").unwrap());

            (serialization_hash(&schema, schema.root().unwrap()), ext_hash)
        };

        assert_eq!(build("A", "B"), build("B", "A"));
    }
}
