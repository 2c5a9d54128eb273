#![allow(dead_code)]

use rdgen_runtime::prelude::*;
use rdgen_testing_fixtures::Demo;

/// A protocol with the demo serializers registered.
pub fn protocol(kind: IdKind) -> Protocol {
    let protocol = Protocol::new("client", kind, &Lifetime::eternal());
    Demo::register_serializers(protocol.serializers());

    protocol
}

pub fn encode<T: RdSerializable>(ctx: &SerializationCtx, value: &T) -> Vec<u8> {
    let mut buffer = Buffer::new();
    value.write(ctx, &mut buffer).unwrap();

    buffer.into_bytes()
}

pub fn decode<T: RdSerializable>(ctx: &SerializationCtx, bytes: Vec<u8>) -> T {
    let mut buffer = Buffer::from_bytes(bytes);
    let value = T::read(ctx, &mut buffer).unwrap();
    assert_eq!(buffer.remaining(), 0, "reader left bytes behind");

    value
}
