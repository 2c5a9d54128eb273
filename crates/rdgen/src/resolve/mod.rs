//! Model type to Rust surface type and to wire codec.

pub mod codec;
pub mod ty;

pub use codec::{CodecAliases, codec};
pub use ty::surface;
