use crate::prelude::*;

/// Every name a type mentions must resolve to a declaration of the right kind.
pub(crate) fn validate_type(schema: &Schema, ty: &Type, errs: &mut ErrorTree) {
    ty.walk(&mut |t| match t {
        Type::Enum(name) => match schema.get(name) {
            Some(d) if d.is_enum() => {}
            Some(_) => err!(errs, "'{name}' is not an enum"),
            None => err!(errs, "unresolved enum '{name}'"),
        },
        Type::Declaration(name) => match schema.get(name) {
            Some(d) if d.is_struct() || d.is_class() => {}
            Some(_) => err!(errs, "'{name}' is not a struct or class"),
            None => err!(errs, "unresolved declaration '{name}'"),
        },
        _ => {}
    });
}

/// An extension delegate must be a concrete class.
pub(crate) fn validate_delegate(schema: &Schema, ty: &Type, errs: &mut ErrorTree) {
    match ty {
        Type::Declaration(name) => match schema.get(name) {
            Some(d) if d.is_class() && d.is_concrete() => {}
            Some(_) => err!(errs, "extension delegate '{name}' must be a concrete class"),
            None => err!(errs, "unresolved extension delegate '{name}'"),
        },
        other => err!(errs, "extension delegate must be a declaration, found '{other}'"),
    }
}

/// Defaults must fit the member type.
pub(crate) fn validate_default(
    schema: &Schema,
    ty: &Type,
    default: &DefaultValue,
    errs: &mut ErrorTree,
) {
    let inner = match ty {
        Type::Nullable(item) => item.as_ref(),
        other => other,
    };

    let fits = match (inner, default) {
        (Type::Predefined(PredefinedType::Bool), DefaultValue::Bool(_))
        | (
            Type::Predefined(
                PredefinedType::Byte
                | PredefinedType::Short
                | PredefinedType::Int
                | PredefinedType::Long
                | PredefinedType::Char,
            ),
            DefaultValue::Long(_),
        )
        | (
            Type::Predefined(PredefinedType::Float | PredefinedType::Double),
            DefaultValue::Double(_) | DefaultValue::Long(_),
        )
        | (Type::Predefined(PredefinedType::String), DefaultValue::String(_)) => true,
        (Type::Enum(name), DefaultValue::Const(value)) => {
            let known = schema
                .get(name)
                .is_some_and(|d| d.members.iter().any(|m| m.name() == value.as_str()));
            if !known {
                err!(errs, "enum '{name}' has no constant '{value}'");
                return;
            }
            true
        }
        _ => false,
    };

    if !fits {
        err!(errs, "default {default:?} does not fit type '{ty}'");
    }
}

/// Ownership lists and pointcuts of a toplevel must resolve.
pub(crate) fn validate_toplevel(schema: &Schema, toplevel: &Toplevel, errs: &mut ErrorTree) {
    for name in &toplevel.declared_types {
        if schema.get(name).is_none() {
            err!(errs, "declared type '{name}' not found");
        }
    }

    match &toplevel.kind {
        ToplevelKind::Root { toplevels } => {
            for name in toplevels {
                match schema.get(name) {
                    Some(d) if d.is_ext() => {}
                    Some(_) => err!(errs, "owned toplevel '{name}' is not an ext"),
                    None => err!(errs, "owned toplevel '{name}' not found"),
                }
            }
        }
        ToplevelKind::Ext {
            pointcut: Some(pointcut),
            ..
        } => match schema.get(pointcut) {
            Some(d) if d.is_class() || d.is_toplevel() => {}
            Some(_) => err!(errs, "pointcut '{pointcut}' must be a class or toplevel"),
            None => err!(errs, "pointcut '{pointcut}' not found"),
        },
        ToplevelKind::Ext { pointcut: None, .. } => {}
    }
}
