use crate::{id::RdId, serialization::{InternRoot, Serializers}};
use std::{collections::BTreeMap, fmt, rc::Rc};

///
/// SerializationCtx
///
/// What a reader or writer needs beyond the buffer: the connection's
/// polymorphic registry and the intern roots visible at this point of the
/// entity tree. Cheap to clone.
///

#[derive(Clone, Default)]
pub struct SerializationCtx {
    serializers: Rc<Serializers>,
    intern_roots: Rc<BTreeMap<i64, Rc<InternRoot>>>,
}

impl SerializationCtx {
    #[must_use]
    pub fn new(serializers: Rc<Serializers>) -> Self {
        Self {
            serializers,
            intern_roots: Rc::default(),
        }
    }

    #[must_use]
    pub fn serializers(&self) -> &Serializers {
        &self.serializers
    }

    #[must_use]
    pub fn intern_root(&self, key: i64) -> Option<&InternRoot> {
        self.intern_roots.get(&key).map(AsRef::as_ref)
    }

    /// A context in which `owner` is the intern root for each scope key.
    /// Roots for other scopes stay visible.
    #[must_use]
    pub fn with_intern_roots_here(&self, owner: RdId, keys: &[i64]) -> Self {
        let mut roots = (*self.intern_roots).clone();
        for &key in keys {
            roots.insert(key, Rc::new(InternRoot::new(owner, key)));
        }

        Self {
            serializers: Rc::clone(&self.serializers),
            intern_roots: Rc::new(roots),
        }
    }
}

impl fmt::Debug for SerializationCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationCtx")
            .field("intern_scopes", &self.intern_roots.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
