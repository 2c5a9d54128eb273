//! Schema validation orchestration and shared helpers.

pub mod hierarchy;
pub mod naming;
pub mod reference;

use crate::prelude::*;

///
/// ValidateNode
///
/// Local invariants of one node, checked against the whole schema.
///

pub trait ValidateNode {
    fn validate(&self, _schema: &Schema) -> Result<(), ErrorTree> {
        Ok(())
    }
}

/// Run full schema validation in a staged, deterministic order.
pub(crate) fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    // Phase 1: validate each node (structural + local invariants).
    let mut errors = validate_nodes(schema);

    // Phase 2: enforce schema-wide invariants.
    validate_global(schema, &mut errors);

    errors.result()
}

// Validate every declaration, routing errors by declaration name.
fn validate_nodes(schema: &Schema) -> ErrorTree {
    let mut errs = ErrorTree::new();
    for decl in schema.declarations() {
        if let Err(e) = decl.validate(schema) {
            errs.merge_at(decl.name.clone(), e);
        }
    }

    errs
}

// Run global validation passes that require a full schema view.
fn validate_global(schema: &Schema, errs: &mut ErrorTree) {
    naming::validate_unique_names(schema, errs);
    hierarchy::validate_acyclic(schema, errs);
    hierarchy::validate_ownership(schema, errs);
}

impl ValidateNode for Declaration {
    fn validate(&self, schema: &Schema) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();
        errs.add_result(naming::validate_ident(&self.name));

        match &self.kind {
            DeclKind::Enum => {
                if self.base.is_some() {
                    err!(errs, "enums cannot have a base");
                }
            }
            DeclKind::Toplevel(toplevel) => {
                if self.base.is_some() {
                    err!(errs, "toplevels cannot have a base");
                }
                reference::validate_toplevel(schema, toplevel, &mut errs);
            }
            DeclKind::Struct(_) | DeclKind::Class(_) => {
                hierarchy::validate_base(schema, self, &mut errs);
            }
        }

        for member in &self.members {
            let mut member_errs = ErrorTree::new();
            validate_member_placement(self, member, &mut member_errs);
            member_errs.add_result(member.validate(schema));
            errs.merge_at(member.name().to_string(), member_errs);
        }

        naming::validate_member_names(schema, self, &mut errs);
        naming::validate_member_idents(schema, self, &mut errs);

        errs.result()
    }
}

// validate_member_placement
// which member kinds each declaration kind may own
fn validate_member_placement(decl: &Declaration, member: &Member, errs: &mut ErrorTree) {
    match (&decl.kind, member) {
        (DeclKind::Enum, Member::EnumConst(_))
        | (DeclKind::Struct(_), Member::Field(_))
        | (DeclKind::Class(_) | DeclKind::Toplevel(_), Member::Field(_) | Member::Reactive(_)) => {}
        (DeclKind::Enum, _) => err!(errs, "enums may only contain constants"),
        (_, Member::EnumConst(_)) => err!(errs, "constants are only allowed in enums"),
        (DeclKind::Struct(_), Member::Reactive(_)) => {
            err!(errs, "structs cannot contain reactive members");
        }
    }
}

impl ValidateNode for Member {
    fn validate(&self, schema: &Schema) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();
        errs.add_result(naming::validate_ident(self.name()));

        match self {
            Self::EnumConst(_) => {}
            Self::Field(field) => {
                reference::validate_type(schema, &field.ty, &mut errs);
                if field.is_optional && !field.ty.is_nullable() {
                    err!(errs, "optional field must have a nullable type, found '{}'", field.ty);
                }
                if let Some(default) = &field.default {
                    reference::validate_default(schema, &field.ty, default, &mut errs);
                }
            }
            Self::Reactive(reactive) => {
                let arity = reactive.kind.arity();
                if reactive.generic_params.len() != arity {
                    err!(
                        errs,
                        "{} expects {arity} generic parameter(s), found {}",
                        reactive.kind.tag(),
                        reactive.generic_params.len()
                    );
                }
                for ty in &reactive.generic_params {
                    reference::validate_type(schema, ty, &mut errs);
                }
                match &reactive.kind {
                    ReactiveKind::Extension { delegated_by } => {
                        reference::validate_delegate(schema, delegated_by, &mut errs);
                    }
                    ReactiveKind::Property {
                        default: Some(default),
                    } => {
                        if let Some(ty) = reactive.generic_params.first() {
                            reference::validate_default(schema, ty, default, &mut errs);
                        }
                    }
                    _ => {}
                }
            }
        }

        errs.result()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{Error, build::{BuildError, SchemaBuilder}, prelude::*};

    fn errors(builder: SchemaBuilder) -> Vec<(String, String)> {
        match builder.build() {
            Err(Error::BuildError(BuildError::Validation(tree))) => tree.flatten(),
            Ok(_) => panic!("expected validation to fail"),
            Err(e) => panic!("unexpected error {e}"),
        }
    }

    fn model() -> SchemaBuilder {
        SchemaBuilder::new(Declaration::root("Model"))
    }

    #[test]
    fn unresolved_field_type_is_reported_at_member_route() {
        let errs = errors(model().declare(
            Declaration::structure("Point").member(Field::new("other", Type::decl("Missing"))),
        ));

        assert!(
            errs.iter()
                .any(|(route, m)| route == "Point.other" && m.contains("'Missing'")),
            "got {errs:?}"
        );
    }

    #[test]
    fn enum_ref_must_point_at_enum() {
        let errs = errors(
            model()
                .declare(Declaration::structure("Point"))
                .declare(
                    Declaration::structure("Holder")
                        .member(Field::new("p", Type::enumeration("Point"))),
                ),
        );

        assert!(errs.iter().any(|(_, m)| m.contains("not an enum")), "got {errs:?}");
    }

    #[test]
    fn structs_cannot_hold_reactives() {
        let errs = errors(
            model().declare(
                Declaration::structure("Bad").member(Reactive::property("p", Type::INT)),
            ),
        );

        assert!(errs.iter().any(|(_, m)| m.contains("reactive")));
    }

    #[test]
    fn optional_field_needs_nullable_type() {
        let mut field = Field::new("x", Type::INT);
        field.is_optional = true;
        let errs = errors(model().declare(Declaration::structure("Bad").member(field)));

        assert!(errs.iter().any(|(_, m)| m.contains("nullable")));
    }

    #[test]
    fn reactive_arity_is_checked() {
        let bad = Reactive::new("m", ReactiveKind::Map, vec![Type::INT]);
        let errs = errors(model().declare(Declaration::class("Bad").member(bad)));

        assert!(errs.iter().any(|(_, m)| m.contains("expects 2")));
    }

    #[test]
    fn constants_only_in_enums() {
        let errs = errors(
            model().declare(Declaration::class("Bad").member(EnumConst::new("A"))),
        );

        assert!(errs.iter().any(|(_, m)| m.contains("only allowed in enums")));
    }

    #[test]
    fn enum_default_must_name_a_constant() {
        let errs = errors(
            model()
                .declare(Declaration::enumeration("Color", &["Red", "Green"]))
                .declare(Declaration::structure("Pixel").member(
                    Field::new("c", Type::enumeration("Color"))
                        .with_default(DefaultValue::Const("Blue".into())),
                )),
        );

        assert!(errs.iter().any(|(_, m)| m.contains("'Blue'")));
    }

    #[test]
    fn valid_model_passes() {
        let schema = model()
            .declare(Declaration::enumeration("Color", &["Red", "Green"]))
            .declare(
                Declaration::class("Pixel")
                    .member(Field::new("c", Type::enumeration("Color")))
                    .member(Field::new("label", Type::STRING).optional())
                    .member(Reactive::map("tags", Type::STRING, Type::INT)),
            )
            .build();

        assert!(schema.is_ok(), "{:?}", schema.err());
    }
}
