//! Emission of one declaration: enums, abstract traits with their Unknown
//! fallback, and concrete structs, classes and toplevels.

mod abstract_trait;
mod bindable;
mod concrete;
mod enumeration;
mod equality;
mod serialize;

pub use concrete::emit as emit_concrete;

use crate::{
    Generator,
    error::GenError,
    helper::ident,
    member::MemberPlan,
    model,
    resolve::CodecAliases,
};
use proc_macro2::TokenStream;
use quote::quote;
use rdgen_schema::node::Declaration;
use syn::Ident;

/// Tokens for a non-toplevel declaration.
pub fn emit(generator: &Generator, decl: &Declaration) -> Result<TokenStream, GenError> {
    if decl.is_enum() {
        return Ok(enumeration::emit(decl));
    }
    if decl.is_abstract() {
        return abstract_trait::emit(generator, decl);
    }

    let ctx = DeclContext::new(generator, decl, decl)?;

    concrete::emit(&ctx, quote!())
}

///
/// DeclContext
///
/// One declaration with its members planned in wire order. `scope` is the
/// declaration paths are resolved from; it differs from `decl` only for the
/// synthesized Unknown, which lives beside its abstract base.
///

pub struct DeclContext<'a> {
    pub generator: &'a Generator<'a>,
    pub decl: &'a Declaration,
    pub scope: &'a Declaration,
    pub ident: Ident,
    pub members: Vec<MemberPlan<'a>>,
    pub aliases: CodecAliases,
    inherited: usize,
}

impl<'a> DeclContext<'a> {
    pub fn new(
        generator: &'a Generator<'a>,
        decl: &'a Declaration,
        scope: &'a Declaration,
    ) -> Result<Self, GenError> {
        let schema = generator.schema();
        let mut aliases = CodecAliases::new(decl);

        let members = schema
            .all_members(decl)
            .into_iter()
            .map(|member| MemberPlan::new(generator, scope, member, &mut aliases))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            generator,
            decl,
            scope,
            ident: ident(&decl.name),
            members,
            aliases,
            inherited: schema.members_of_base_classes(decl).len(),
        })
    }

    /// Members declared on this declaration itself.
    #[must_use]
    pub fn own(&self) -> &[MemberPlan<'a>] {
        &self.members[self.inherited..]
    }

    /// Members passed to the primary constructor, in wire order.
    pub fn params(&self) -> impl Iterator<Item = &MemberPlan<'a>> {
        self.members.iter().filter(|plan| plan.is_serialized())
    }

    /// Members declared on `owner`, an ancestor of this declaration.
    pub fn declared_by<'s>(
        &'s self,
        owner: &'s Declaration,
    ) -> impl Iterator<Item = &'s MemberPlan<'a>> {
        self.members
            .iter()
            .filter(move |plan| owner.members.iter().any(|m| std::ptr::eq(m, plan.member)))
    }

    #[must_use]
    pub const fn is_bindable(&self) -> bool {
        self.decl.is_bindable()
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        model::is_scalar_decl(self.generator.schema(), self.decl)
    }

    /// A second constructor that leaves out every member able to start empty.
    #[must_use]
    pub fn has_secondary_ctor(&self) -> bool {
        (self.decl.is_toplevel() || self.decl.is_concrete())
            && !self.decl.is_unknown()
            && self.params().any(|plan| plan.empty_constructible)
    }

    /// Name of the constructor taking every member.
    #[must_use]
    pub fn primary_ctor(&self) -> Ident {
        if self.has_secondary_ctor() {
            quote::format_ident!("new_full")
        } else {
            quote::format_ident!("new")
        }
    }

    #[must_use]
    pub fn primary_ctor_vis(&self) -> TokenStream {
        let decl = self.decl;

        if decl.is_unknown() {
            quote!()
        } else if decl.settings.public_ctors() {
            quote!(pub)
        } else if self.has_secondary_ctor() {
            quote!()
        } else if decl.is_ext() {
            quote!(pub)
        } else if decl.is_root() {
            quote!()
        } else {
            quote!(pub)
        }
    }

    pub fn decl_path(&self, name: &str) -> Result<TokenStream, GenError> {
        self.generator.decl_path(name, self.scope)
    }
}

///
/// TESTS
///
