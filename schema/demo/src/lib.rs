//! Demo protocol: a small drawing session.
//!
//! Covers every declaration kind the generator emits: an enum, value and
//! bindable classes, abstract hierarchies with Unknown fallbacks, an intern
//! root, and an extension toplevel living in its own namespace. `Layer`
//! carries the container field types and an extension member.

use rdgen_schema::{
    Error,
    build::SchemaBuilder,
    node::{Declaration, Field, Reactive, Schema, Settings},
    types::{DefaultValue, Type},
};

/// Name of the root toplevel.
pub const ROOT: &str = "Demo";

/// Intern scope shared by session strings.
pub const SESSION_SCOPE: &str = "Protocol";

pub fn schema() -> Result<Schema, Error> {
    SchemaBuilder::new(root())
        .declare(
            Declaration::enumeration("Color", &["Red", "Green", "Blue"])
                .doc("Fill colors understood by both sides."),
        )
        .declare(
            Declaration::class("Point")
                .doc("A point on the canvas.")
                .member(Field::new("x", Type::INT))
                .member(Field::new("y", Type::INT)),
        )
        .declare(
            Declaration::abstract_class("Shape")
                .member(Field::new("label", Type::STRING).doc("Caption shown next to the shape.")),
        )
        .declare(
            Declaration::class("Circle")
                .extends("Shape")
                .member(Field::new("radius", Type::DOUBLE)),
        )
        .declare(
            Declaration::class("Rect")
                .extends("Shape")
                .member(Field::new("width", Type::INT))
                .member(Field::new("height", Type::INT))
                .member(
                    Field::new("fill", Type::enumeration("Color"))
                        .with_default(DefaultValue::Const("Green".into())),
                ),
        )
        .declare(
            Declaration::abstract_struct("Quantity")
                .member(Field::new("unit", Type::STRING)),
        )
        .declare(
            Declaration::structure("Meters")
                .extends("Quantity")
                .member(Field::new("value", Type::DOUBLE)),
        )
        .declare(
            Declaration::structure("Span")
                .member(Field::new("start", Type::LONG))
                .member(Field::new("end", Type::LONG).with_default(DefaultValue::Long(0)))
                .member(Field::new("note", Type::STRING).optional().not_in_equals()),
        )
        .declare(
            Declaration::class("Session")
                .doc("One connected drawing session.")
                .intern_root(SESSION_SCOPE)
                .member(Field::new("name", Type::STRING.interned(SESSION_SCOPE)))
                .member(Field::new("host", Type::STRING.interned(SESSION_SCOPE)))
                .member(Field::new("port", Type::INT).with_default(DefaultValue::Long(8080))),
        )
        .declare(
            Declaration::class("History")
                .doc("Undo entries kept alongside a layer.")
                .member(Reactive::list("entries", Type::STRING)),
        )
        .declare(
            Declaration::class("Layer")
                .doc("A stack of shapes drawn together.")
                .member(Field::new("guid", Type::GUID))
                .member(Field::new("opacity", Type::DOUBLE.nullable()))
                .member(Field::new("bounds", Type::decl("Span").nullable()))
                .member(Field::new("weights", Type::INT.array()))
                .member(Field::new("labels", Type::STRING.array()))
                .member(Field::new("corners", Type::decl("Point").list()))
                .member(Reactive::extension("history", Type::decl("History"))),
        )
        .toplevel(tools())
        .declare_in(
            "Tools",
            Declaration::class("Brush").member(Field::new("size", Type::INT)),
        )
        .build()
}

fn root() -> Declaration {
    Declaration::root(ROOT)
        .doc("Demo protocol root.")
        .member(
            Reactive::property("title", Type::STRING)
                .with_default(DefaultValue::String("untitled".into()))
                .doc("Window title."),
        )
        .member(
            Reactive::property("accent", Type::enumeration("Color"))
                .with_default(DefaultValue::Const("Blue".into())),
        )
        .member(Reactive::signal("log", Type::STRING))
        .member(Reactive::call("ping", Type::INT, Type::INT))
        .member(Reactive::callback("shutdown", Type::VOID, Type::BOOL))
        .member(Reactive::map("points", Type::INT, Type::decl("Point")))
        .member(Reactive::list("shapes", Type::decl("Shape")))
        .member(Reactive::set("tags", Type::STRING))
}

fn tools() -> Declaration {
    Declaration::ext("Tools", Some("Session"))
        .doc("Per-session drawing tools.")
        .with_settings(Settings::default().with_namespace("tools"))
        .member(Reactive::property("zoom", Type::DOUBLE).with_default(DefaultValue::Double(1.0)))
        .member(Reactive::signal("refresh", Type::VOID))
        .member(Reactive::list("brushes", Type::decl("Brush")))
}

///
/// TESTS
///
