//! The demo protocol, generated into `OUT_DIR` by `build.rs`.
//!
//! Integration tests under `tests/` drive the generated types through the
//! runtime: wire round-trips, Unknown fallback, interning and binding.

include!(concat!(env!("OUT_DIR"), "/rdgen_model.rs"));
