//! Wire runtime for code generated by `rdgen`.
//!
//! Generated entities bind against this crate through absolute paths
//! (`::rdgen_runtime::...`). Everything here is single-threaded: entities
//! share state through `Rc` and mutate through `Cell`/`RefCell`.

pub mod bindable;
pub mod buffer;
pub mod error;
pub mod hash;
pub mod id;
pub mod lifetime;
pub mod protocol;
pub mod reactive;
pub mod serialization;
pub mod types;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        bindable::{RdBindable, RdBindableBase, RdDynamic, RdExtBase},
        buffer::Buffer,
        error::WireError,
        hash::RdHash,
        id::{Identities, IdKind, RdId},
        lifetime::{Lifetime, LifetimeDefinition},
        protocol::Protocol,
        reactive::{RdCall, RdEndpoint, RdList, RdMap, RdProperty, RdSet, RdSignal},
        serialization::{
            AbstractDeclaration, Codec, RdEnum, RdPolymorphic, RdSerializable,
            SerializationCtx, Serializers,
        },
        types::{DateTime, Guid, SecureString, Uri, Void},
    };
}
