//! Queries over the schema shared by the emitters: scalarness,
//! default-constructibility and bindability of types and members.

use rdgen_schema::{
    node::{ClassKind, DeclKind, Declaration, Member, ReactiveKind, Schema},
    types::{PredefinedType, Type},
};
use std::collections::BTreeSet;

/// Whether values of `ty` compare and hash by value.
#[must_use]
pub fn is_scalar_type(schema: &Schema, ty: &Type) -> bool {
    scalar_type(schema, ty, &mut BTreeSet::new())
}

/// Structs, and concrete classes made only of scalar fields.
#[must_use]
pub fn is_scalar_decl(schema: &Schema, decl: &Declaration) -> bool {
    scalar_decl(schema, decl, &mut BTreeSet::new())
}

fn scalar_type<'a>(schema: &'a Schema, ty: &'a Type, visiting: &mut BTreeSet<&'a str>) -> bool {
    match ty {
        Type::Predefined(_) | Type::Enum(_) => true,
        Type::Declaration(name) => schema
            .get(name)
            .is_some_and(|decl| scalar_decl(schema, decl, visiting)),
        Type::Nullable(item) | Type::Array(item) | Type::ImmutableList(item) => {
            scalar_type(schema, item, visiting)
        }
        Type::Interned { item, .. } => scalar_type(schema, item, visiting),
    }
}

fn scalar_decl<'a>(
    schema: &'a Schema,
    decl: &'a Declaration,
    visiting: &mut BTreeSet<&'a str>,
) -> bool {
    match &decl.kind {
        DeclKind::Struct(_) => true,
        DeclKind::Class(ClassKind::Concrete { .. }) => {
            // a class reachable from itself is compared by identity
            if !visiting.insert(decl.name.as_str()) {
                return false;
            }
            let scalar = schema.all_members(decl).into_iter().all(|member| match member {
                Member::Field(field) => scalar_type(schema, &field.ty, visiting),
                _ => false,
            });
            visiting.remove(decl.name.as_str());

            scalar
        }
        _ => false,
    }
}

/// Whether a type holds bindable entities (classes, at any depth).
#[must_use]
pub fn is_bindable_type(schema: &Schema, ty: &Type) -> bool {
    let mut bindable = false;
    ty.walk(&mut |t| {
        if let Type::Declaration(name) = t {
            bindable |= schema.get(name).is_some_and(Declaration::is_class);
        }
    });

    bindable
}

/// Members bound to their owner and identified with it.
#[must_use]
pub fn is_bindable_member(schema: &Schema, member: &Member) -> bool {
    match member {
        Member::EnumConst(_) => false,
        Member::Field(field) => is_bindable_type(schema, &field.ty),
        Member::Reactive(_) => true,
    }
}

/// Reactive members holding values rather than nested entities are stored
/// inline.
#[must_use]
pub fn is_optimize_nested(schema: &Schema, member: &Member) -> bool {
    let Member::Reactive(reactive) = member else {
        return false;
    };

    matches!(
        reactive.kind,
        ReactiveKind::Property { .. } | ReactiveKind::List | ReactiveKind::Set | ReactiveKind::Map
    ) && !reactive
        .generic_params
        .iter()
        .any(|ty| is_bindable_type(schema, ty))
}

/// Members left out of the secondary constructor.
#[must_use]
pub fn is_empty_constructible(schema: &Schema, member: &Member) -> bool {
    match member {
        Member::EnumConst(_) => false,
        Member::Field(field) => {
            !field.empty_ctor_suppressed
                && empty_constructible_type(schema, &field.ty, &mut BTreeSet::new())
        }
        Member::Reactive(_) => true,
    }
}

fn empty_constructible_type<'a>(
    schema: &'a Schema,
    ty: &'a Type,
    visiting: &mut BTreeSet<&'a str>,
) -> bool {
    let Type::Declaration(name) = ty else {
        return false;
    };
    let Some(decl) = schema.get(name) else {
        return false;
    };
    if !matches!(decl.kind, DeclKind::Class(ClassKind::Concrete { .. })) {
        return false;
    }
    if !visiting.insert(decl.name.as_str()) {
        return false;
    }

    let all = schema.all_members(decl).into_iter().all(|member| match member {
        Member::Field(field) => {
            !field.empty_ctor_suppressed && empty_constructible_type(schema, &field.ty, visiting)
        }
        Member::Reactive(_) => true,
        Member::EnumConst(_) => false,
    });
    visiting.remove(decl.name.as_str());

    all
}

/// Whether every member of `decl` has a default, so `Default` is generated.
#[must_use]
pub fn is_defaultable_decl(schema: &Schema, decl: &Declaration) -> bool {
    defaultable_decl(schema, decl, &mut BTreeSet::new())
}

fn defaultable_decl<'a>(
    schema: &'a Schema,
    decl: &'a Declaration,
    visiting: &mut BTreeSet<&'a str>,
) -> bool {
    if decl.is_abstract() || decl.is_unknown() {
        return false;
    }
    if decl.is_enum() {
        return !decl.members.is_empty();
    }
    if !visiting.insert(decl.name.as_str()) {
        return false;
    }

    let all = schema
        .all_members(decl)
        .into_iter()
        .all(|member| defaultable_member(schema, member, visiting));
    visiting.remove(decl.name.as_str());

    all
}

fn defaultable_member<'a>(
    schema: &'a Schema,
    member: &'a Member,
    visiting: &mut BTreeSet<&'a str>,
) -> bool {
    match member {
        Member::EnumConst(_) => false,
        Member::Field(field) => field.default.is_some() || defaultable_type(schema, &field.ty, visiting),
        Member::Reactive(reactive) => match &reactive.kind {
            ReactiveKind::Extension { delegated_by } => {
                defaultable_type(schema, delegated_by, visiting)
            }
            _ => true,
        },
    }
}

fn defaultable_type<'a>(
    schema: &'a Schema,
    ty: &'a Type,
    visiting: &mut BTreeSet<&'a str>,
) -> bool {
    match ty {
        Type::Predefined(_) | Type::Nullable(_) | Type::Array(_) | Type::ImmutableList(_) => true,
        Type::Enum(name) | Type::Declaration(name) => schema
            .get(name)
            .is_some_and(|decl| defaultable_decl(schema, decl, visiting)),
        Type::Interned { item, .. } => defaultable_type(schema, item, visiting),
    }
}

/// Predefined types passed and returned by value.
#[must_use]
pub const fn is_copy_predefined(p: PredefinedType) -> bool {
    !matches!(
        p,
        PredefinedType::String | PredefinedType::Uri | PredefinedType::SecureString
    )
}

/// Whether a surface type is `Copy`.
#[must_use]
pub fn is_copy_type(ty: &Type) -> bool {
    match ty {
        Type::Predefined(p) => is_copy_predefined(*p),
        Type::Enum(_) => true,
        Type::Nullable(item) => is_copy_type(item),
        Type::Interned { item, .. } => is_copy_type(item),
        Type::Declaration(_) | Type::Array(_) | Type::ImmutableList(_) => false,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use rdgen_schema::{build::SchemaBuilder, node::*};

    fn schema() -> Schema {
        SchemaBuilder::new(Declaration::root("Model"))
            .declare(Declaration::enumeration("Color", &["Red"]))
            .declare(
                Declaration::class("Point")
                    .member(Field::new("x", Type::INT))
                    .member(Field::new("color", Type::enumeration("Color"))),
            )
            .declare(Declaration::class("Empty").member(Reactive::signal("ping", Type::VOID)))
            .declare(Declaration::abstract_class("Shape"))
            .declare(
                Declaration::class("Holder")
                    .member(Field::new("point", Type::decl("Point")))
                    .member(Field::new("empty", Type::decl("Empty")))
                    .member(Field::new("shape", Type::decl("Shape")))
                    .member(Reactive::property("count", Type::INT))
                    .member(Reactive::list("points", Type::decl("Point"))),
            )
            .build()
            .unwrap()
    }

    fn member<'a>(schema: &'a Schema, decl: &str, name: &str) -> &'a Member {
        schema
            .get(decl)
            .and_then(|d| d.members.iter().find(|m| m.name() == name))
            .unwrap()
    }

    #[test]
    fn classes_of_scalar_fields_are_scalar() {
        let schema = schema();

        assert!(is_scalar_decl(&schema, schema.get("Point").unwrap()));
        assert!(!is_scalar_decl(&schema, schema.get("Empty").unwrap()));
        assert!(!is_scalar_decl(&schema, schema.get("Holder").unwrap()));
        assert!(is_scalar_type(&schema, &Type::decl("Point").array()));
        assert!(!is_scalar_type(&schema, &Type::decl("Shape")));
    }

    #[test]
    fn empty_constructibility_follows_nested_classes() {
        let schema = schema();

        assert!(!is_empty_constructible(&schema, member(&schema, "Holder", "point")));
        assert!(is_empty_constructible(&schema, member(&schema, "Holder", "empty")));
        assert!(is_empty_constructible(&schema, member(&schema, "Holder", "count")));
    }

    #[test]
    fn stateful_members_of_plain_values_are_inlined() {
        let schema = schema();

        assert!(is_optimize_nested(&schema, member(&schema, "Holder", "count")));
        assert!(!is_optimize_nested(&schema, member(&schema, "Holder", "points")));
        assert!(!is_optimize_nested(&schema, member(&schema, "Empty", "ping")));
    }

    #[test]
    fn abstract_fields_prevent_default() {
        let schema = schema();

        assert!(is_defaultable_decl(&schema, schema.get("Point").unwrap()));
        assert!(!is_defaultable_decl(&schema, schema.get("Holder").unwrap()));
        assert!(is_bindable_member(&schema, member(&schema, "Holder", "shape")));
        assert!(!is_bindable_member(&schema, member(&schema, "Point", "x")));
    }
}
