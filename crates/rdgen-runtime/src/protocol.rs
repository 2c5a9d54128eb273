use crate::{
    bindable::RdBindableBase,
    id::{IdKind, Identities},
    lifetime::Lifetime,
    serialization::{SerializationCtx, Serializers},
};
use std::rc::Rc;

///
/// Protocol
///
/// One side of a connection: id allocation, the polymorphic registry, and
/// the root every toplevel binds under.
///

#[derive(Debug)]
pub struct Protocol {
    name: String,
    identities: Identities,
    serializers: Rc<Serializers>,
    ctx: SerializationCtx,
    root: RdBindableBase,
    lifetime: Lifetime,
}

impl Protocol {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: IdKind, lifetime: &Lifetime) -> Self {
        let name = name.into();
        let serializers = Rc::new(Serializers::new());

        Self {
            root: RdBindableBase::root(name.clone()),
            name,
            identities: Identities::new(kind),
            ctx: SerializationCtx::new(Rc::clone(&serializers)),
            serializers,
            lifetime: lifetime.clone(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn identities(&self) -> &Identities {
        &self.identities
    }

    #[must_use]
    pub fn serializers(&self) -> &Serializers {
        &self.serializers
    }

    #[must_use]
    pub const fn serialization_ctx(&self) -> &SerializationCtx {
        &self.ctx
    }

    /// Parent of every toplevel bound on this protocol.
    #[must_use]
    pub const fn root(&self) -> &RdBindableBase {
        &self.root
    }

    #[must_use]
    pub const fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RdId;

    #[test]
    fn context_shares_the_protocol_registry() {
        let protocol = Protocol::new("test", IdKind::Client, &Lifetime::eternal());
        protocol
            .serializers()
            .register::<str>(RdId(1), |_, _| Ok(Rc::from("x")));

        assert!(
            protocol
                .serialization_ctx()
                .serializers()
                .is_registered::<str>(RdId(1))
        );
        assert_eq!(protocol.root().location(), "test");
    }
}
