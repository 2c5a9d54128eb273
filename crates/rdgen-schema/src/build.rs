use crate::{Error, ThisError, node::Schema, prelude::*, validate::validate_schema};
use std::collections::BTreeMap;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("validation failed:\n{0}")]
    Validation(ErrorTree),
}

///
/// SchemaBuilder
///
/// Programmatic front end for the model. Declarations are attached to the
/// root or to a named `Ext` toplevel; `build` assembles and validates.
///

#[derive(Debug)]
pub struct SchemaBuilder {
    root: Declaration,
    toplevels: Vec<Declaration>,
    types: Vec<(Option<String>, Declaration)>,
}

impl SchemaBuilder {
    #[must_use]
    pub const fn new(root: Declaration) -> Self {
        Self {
            root,
            toplevels: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Declare a type owned by the root.
    #[must_use]
    pub fn declare(mut self, decl: Declaration) -> Self {
        self.types.push((None, decl));
        self
    }

    /// Add an `Ext` toplevel owned by the root.
    #[must_use]
    pub fn toplevel(mut self, toplevel: Declaration) -> Self {
        self.toplevels.push(toplevel);
        self
    }

    /// Declare a type owned by a previously added toplevel.
    #[must_use]
    pub fn declare_in(mut self, toplevel: &str, decl: Declaration) -> Self {
        self.types.push((Some(toplevel.to_string()), decl));
        self
    }

    pub fn build(self) -> Result<Schema, Error> {
        let schema = self.assemble().map_err(BuildError::Validation)?;
        validate_schema(&schema).map_err(BuildError::Validation)?;

        Ok(schema)
    }

    // assemble
    // wires ownership lists and rejects duplicate names
    fn assemble(self) -> Result<Schema, ErrorTree> {
        let mut errs = ErrorTree::new();
        let mut root = self.root;
        let root_name = root.name.clone();

        if !root.is_root() {
            err!(errs, "'{root_name}' is not a root toplevel");
        }

        let mut toplevels: BTreeMap<String, Declaration> = BTreeMap::new();
        let mut order = Vec::new();
        for toplevel in self.toplevels {
            if !toplevel.is_ext() {
                err!(errs, "toplevel '{}' must be an ext", toplevel.name);
            }
            order.push(toplevel.name.clone());
            if let Some(prev) = toplevels.insert(toplevel.name.clone(), toplevel) {
                err!(errs, "duplicate toplevel name '{}'", prev.name);
            }
        }

        let mut declarations: BTreeMap<String, Declaration> = BTreeMap::new();
        for (owner, decl) in self.types {
            let name = decl.name.clone();
            let target = match owner.as_deref() {
                None => root.as_toplevel_mut(),
                Some(owner) if owner == root_name => root.as_toplevel_mut(),
                Some(owner) => toplevels
                    .get_mut(owner)
                    .and_then(Declaration::as_toplevel_mut),
            };

            match target {
                Some(t) => t.declared_types.push(name.clone()),
                None => {
                    err!(
                        errs,
                        "'{name}' is declared in unknown toplevel '{}'",
                        owner.unwrap_or_default()
                    );
                    continue;
                }
            }

            if decl.is_toplevel() {
                err!(errs, "toplevel '{name}' cannot be declared as a type");
            }
            if declarations.insert(name.clone(), decl).is_some() {
                err!(errs, "duplicate declaration name '{name}'");
            }
        }

        if let DeclKind::Toplevel(Toplevel {
            kind: ToplevelKind::Root { toplevels: owned },
            ..
        }) = &mut root.kind
        {
            order.sort();
            owned.extend(order);
        }

        for (name, toplevel) in toplevels {
            if declarations.insert(name.clone(), toplevel).is_some() {
                err!(errs, "duplicate declaration name '{name}'");
            }
        }
        if declarations.insert(root_name.clone(), root).is_some() {
            err!(errs, "duplicate declaration name '{root_name}'");
        }

        errs.result()?;

        Ok(Schema::from_parts(root_name, declarations))
    }
}

///
/// TESTS
///
