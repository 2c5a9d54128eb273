mod common;

use common::{decode, encode, protocol};
use proptest::prelude::*;
use rdgen_runtime::prelude::*;
use rdgen_testing_fixtures::*;
use std::rc::Rc;

#[test]
fn point_round_trips_and_compares_by_value() {
    let protocol = protocol(IdKind::Client);
    let ctx = protocol.serialization_ctx();

    let point = Point::new(1, 2);
    let back: Point = decode(ctx, encode(ctx, &point));

    assert_eq!(back, Point::new(1, 2));
    assert_ne!(Point::new(1, 2), Point::new(1, 3));
    assert_eq!(Point::new(1, 2).hash_code(), Point::new(1, 2).hash_code());
}

#[test]
fn classes_lead_with_their_id() {
    let protocol = protocol(IdKind::Client);
    let ctx = protocol.serialization_ctx();

    let point = Point::new(7, 9);
    point.identify(protocol.identities(), RdId::NULL.mix("point"));
    let bytes = encode(ctx, &point);

    assert_eq!(bytes.len(), 8 + 4 + 4);
    let back: Point = decode(ctx, bytes);
    assert_eq!(back.bindable_base().rdid(), point.bindable_base().rdid());
    assert_eq!((back.x(), back.y()), (7, 9));
}

#[test]
fn struct_equality_skips_excluded_fields() {
    let a = Span::new(1, 2, Some("first".to_string()));
    let b = Span::new(1, 2, None);

    assert_eq!(a, b);
    assert_eq!(a.hash_code(), b.hash_code());
    assert_ne!(a, Span::new(1, 3, None));
}

#[test]
fn struct_defaults_follow_the_schema() {
    let span = Span::default();

    assert_eq!(span.start(), 0);
    assert_eq!(span.end(), 0);
    assert_eq!(span.note(), &None);
}

#[test]
fn enums_default_to_their_first_constant() {
    assert_eq!(Color::default(), Color::Red);
    assert_eq!(Color::from_ordinal(2), Some(Color::Blue));
    assert_eq!(Color::from_ordinal(3), None);
    assert_eq!(Color::Green.ordinal(), 1);
}

#[test]
fn enum_fields_round_trip() {
    let protocol = protocol(IdKind::Client);
    let ctx = protocol.serialization_ctx();

    let rect = Rect::new("box".to_string(), 3, 4, Color::Blue);
    let back: Rect = decode(ctx, encode(ctx, &rect));

    assert_eq!(back.fill(), Color::Blue);
    assert_eq!(back.label(), "box");
    assert_eq!(back, rect);
}

#[test]
fn abstract_structs_compare_through_their_concrete_type() {
    let a: Rc<dyn Quantity> = Rc::new(Meters::new("m".to_string(), 1.5));
    let b: Rc<dyn Quantity> = Rc::new(Meters::new("m".to_string(), 1.5));
    let c: Rc<dyn Quantity> = Rc::new(Meters::new("m".to_string(), 2.0));

    assert!(*a == *b);
    assert!(*a != *c);
    assert_eq!(a.unit(), "m");
}

fn layer() -> Layer {
    Layer::new(
        Guid(0x00ff_1234),
        Some(0.5),
        Some(Span::new(3, 9, Some("visible".to_string()))),
        vec![1, -2, 3],
        vec!["front".to_string(), "back".to_string()],
        vec![Rc::new(Point::new(0, 0)), Rc::new(Point::new(4, 5))],
    )
}

#[test]
fn container_fields_round_trip() {
    let protocol = protocol(IdKind::Client);
    let ctx = protocol.serialization_ctx();

    let layer = layer();
    let back: Layer = decode(ctx, encode(ctx, &layer));

    assert_eq!(back.guid(), Guid(0x00ff_1234));
    assert_eq!(back.opacity(), Some(0.5));
    assert_eq!(back.bounds(), &Some(Span::new(3, 9, None)));
    let bounds = back.bounds().as_ref().unwrap();
    assert_eq!(bounds.note(), &Some("visible".to_string()));
    assert_eq!(back.weights(), &vec![1, -2, 3]);
    assert_eq!(back.labels(), layer.labels());
    assert_eq!(back.corners(), layer.corners());
    assert!(back.history().entries().is_empty());
}

#[test]
fn absent_nullable_fields_round_trip() {
    let protocol = protocol(IdKind::Client);
    let ctx = protocol.serialization_ctx();

    let layer = Layer::default();
    let back: Layer = decode(ctx, encode(ctx, &layer));

    assert_eq!(back.guid(), Guid::default());
    assert_eq!(back.opacity(), None);
    assert_eq!(back.bounds(), &None);
    assert!(back.weights().is_empty());
    assert!(back.corners().is_empty());
}

#[test]
fn root_properties_start_from_their_defaults() {
    let demo = Demo::new();

    assert_eq!(demo.title().get(), Some("untitled".to_string()));
    assert_eq!(demo.accent().get(), Some(Color::Blue));
    assert!(demo.points().is_master());
    assert!(demo.shapes().is_empty());
}

#[test]
fn embedded_fingerprints_match_the_schema() {
    let schema = rdgen_schema_demo::schema().unwrap();
    let hash = |name: &str| {
        rdgen_schema::fingerprint::serialization_hash(&schema, schema.get(name).unwrap())
    };

    assert_eq!(Demo::SERIALIZATION_HASH, hash("Demo"));
    assert_eq!(Tools::SERIALIZATION_HASH, hash("Tools"));
    assert_eq!(TARGET_NAME, "Demo");
}

proptest! {
    #[test]
    fn points_round_trip(x in any::<i32>(), y in any::<i32>()) {
        let protocol = protocol(IdKind::Server);
        let ctx = protocol.serialization_ctx();

        let point = Point::new(x, y);
        let back: Point = decode(ctx, encode(ctx, &point));

        prop_assert_eq!(back.hash_code(), point.hash_code());
        prop_assert_eq!(back, point);
    }
}
