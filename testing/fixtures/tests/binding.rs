use rdgen_runtime::prelude::*;
use rdgen_testing_fixtures::*;
use std::rc::Rc;

#[test]
fn connect_registers_identifies_and_binds() {
    let lifetime = LifetimeDefinition::new();
    let protocol = Protocol::new("client", IdKind::Client, lifetime.lifetime());
    let demo = Demo::new();

    demo.connect(lifetime.lifetime(), &protocol);

    let root_id = RdId::NULL.mix("Demo");
    assert_eq!(demo.bindable_base().rdid(), root_id);
    assert_eq!(demo.bindable_base().location(), "client.Demo");
    assert_eq!(demo.title().bindable_base().rdid(), root_id.mix(".title"));
    assert_eq!(demo.title().bindable_base().location(), "client.Demo.title");
    assert!(demo.log().bindable_base().is_bound());

    let serializers = protocol.serializers();
    assert!(serializers.is_registered::<Point>(RdId::from_type_name("Point")));
    assert!(serializers.is_registered::<dyn Shape>(RdId::from_type_name("Rect")));
    assert!(serializers.is_registered::<Brush>(RdId::from_type_name("Brush")));
    assert!(!serializers.is_registered::<ShapeUnknown>(RdId::from_type_name("ShapeUnknown")));
}

#[test]
fn terminating_the_lifetime_unbinds_members() {
    let lifetime = LifetimeDefinition::new();
    let protocol = Protocol::new("client", IdKind::Client, lifetime.lifetime());
    let demo = Demo::new();
    demo.connect(lifetime.lifetime(), &protocol);

    lifetime.terminate();

    assert!(!demo.bindable_base().is_bound());
    assert!(!demo.points().bindable_base().is_bound());
}

#[test]
fn extensions_are_created_once_per_pointcut() {
    let session = Session::new("alpha".to_string(), "localhost".to_string(), 8080);

    let tools = Tools::get_or_create_extension_of(&session).unwrap();
    let again = Tools::get_or_create_extension_of(&session).unwrap();

    assert!(Rc::ptr_eq(&tools, &again));
    assert_eq!(tools.zoom().get(), Some(1.0));
}

#[test]
fn extensions_follow_their_pointcut_into_the_protocol() {
    let lifetime = LifetimeDefinition::new();
    let protocol = Protocol::new("client", IdKind::Client, lifetime.lifetime());
    let session = Session::new("alpha".to_string(), "localhost".to_string(), 8080);
    let tools = Tools::get_or_create_extension_of(&session).unwrap();

    let session_id = RdId::NULL.mix("session");
    session.identify(protocol.identities(), session_id);
    session.bind(lifetime.lifetime(), protocol.root(), "session");

    assert_eq!(tools.bindable_base().rdid(), session_id.mix(".tools"));
    assert_eq!(tools.bindable_base().location(), "client.session.tools");
    assert_eq!(tools.zoom().bindable_base().location(), "client.session.tools.zoom");
}

#[test]
fn extensions_created_after_binding_bind_immediately() {
    let lifetime = LifetimeDefinition::new();
    let protocol = Protocol::new("client", IdKind::Client, lifetime.lifetime());
    let session = Session::new("alpha".to_string(), "localhost".to_string(), 8080);
    session.identify(protocol.identities(), RdId::NULL.mix("session"));
    session.bind(lifetime.lifetime(), protocol.root(), "session");

    let tools = Tools::get_or_create_extension_of(&session).unwrap();

    assert!(tools.bindable_base().is_bound());
    assert!(tools.brushes().bindable_base().is_bound());
}

#[test]
fn extension_members_bind_under_their_owner() {
    let lifetime = LifetimeDefinition::new();
    let protocol = Protocol::new("client", IdKind::Client, lifetime.lifetime());
    let layer = Layer::default();

    let layer_id = RdId::NULL.mix("layer");
    layer.identify(protocol.identities(), layer_id);
    layer.bind(lifetime.lifetime(), protocol.root(), "layer");

    let history = layer.history();
    assert_eq!(history.bindable_base().rdid(), layer_id.mix(".history"));
    assert_eq!(history.bindable_base().location(), "client.layer.history");
    assert_eq!(
        history.entries().bindable_base().location(),
        "client.layer.history.entries"
    );

    history.entries().add("drew a circle".to_string());
    assert_eq!(history.entries().to_vec(), ["drew a circle"]);
}
