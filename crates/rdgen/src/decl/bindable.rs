use crate::{
    decl::DeclContext,
    helper::{Implementor, TraitKind},
};
use proc_macro2::TokenStream;
use quote::quote;

///
/// Binding
///
/// Identity and binding of classes and toplevels. Members are identified
/// under `<id>.<name>` and bound under their member name.
///

pub struct Binding {
    pub inherent: TokenStream,
    pub impls: TokenStream,
}

pub fn emit(ctx: &DeclContext) -> Binding {
    if !ctx.is_bindable() {
        return Binding {
            inherent: quote!(),
            impls: quote!(),
        };
    }

    let type_ident = &ctx.ident;
    let bindable: Vec<_> = ctx.members.iter().filter(|plan| plan.bindable).collect();
    let identify = bindable.iter().map(|plan| plan.identify_stmt());
    let bind = bindable.iter().map(|plan| plan.bind_stmt());

    let inherent = quote! {
        /// Bind every member under this entity.
        pub fn init(&self, lifetime: &::rdgen_runtime::lifetime::Lifetime) {
            self.base.init(lifetime);
            #(#bind)*
        }
    };

    let rd_bindable = Implementor::new(type_ident, TraitKind::RdBindable).set_tokens(quote! {
        fn identify(
            &self,
            identities: &::rdgen_runtime::id::Identities,
            id: ::rdgen_runtime::id::RdId,
        ) {
            self.base.identify(identities, id);
            #(#identify)*
        }

        fn bind(
            &self,
            lifetime: &::rdgen_runtime::lifetime::Lifetime,
            parent: &::rdgen_runtime::bindable::RdBindableBase,
            name: &str,
        ) {
            self.base.bind(lifetime, parent, name);
            self.init(lifetime);
        }
    });

    let rd_dynamic = Implementor::new(type_ident, TraitKind::RdDynamic).set_tokens(quote! {
        fn bindable_base(&self) -> &::rdgen_runtime::bindable::RdBindableBase {
            &self.base
        }
    });

    Binding {
        inherent,
        impls: quote!(#rd_bindable #rd_dynamic),
    }
}
