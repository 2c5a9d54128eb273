mod declaration;
mod member;
mod settings;

pub use declaration::*;
pub use member::*;
pub use settings::*;

use crate::{Error, ThisError, build::BuildError, prelude::*, validate::validate_schema};
use std::collections::{BTreeMap, BTreeSet};

///
/// NodeError
///

#[derive(Debug, ThisError)]
pub enum NodeError {
    #[error("declaration '{name}' is not a {expected}")]
    IncorrectKind { name: String, expected: &'static str },

    #[error("root '{0}' is missing or is not a root toplevel")]
    MissingRoot(String),

    #[error("declaration '{0}' not found")]
    NotFound(String),
}

///
/// Schema
///
/// Every declaration of one protocol, keyed by name. Names are unique per
/// root because type ids are derived from them.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Schema {
    root: String,
    declarations: BTreeMap<String, Declaration>,
}

impl Schema {
    pub(crate) const fn from_parts(
        root: String,
        declarations: BTreeMap<String, Declaration>,
    ) -> Self {
        Self { root, declarations }
    }

    /// Validate a schema obtained outside the builder, e.g. from JSON.
    pub fn validated(self) -> Result<Self, Error> {
        validate_schema(&self).map_err(BuildError::Validation)?;

        Ok(self)
    }

    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn root(&self) -> Result<&Declaration, NodeError> {
        self.get(&self.root)
            .filter(|d| d.is_root())
            .ok_or_else(|| NodeError::MissingRoot(self.root.clone()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn try_get(&self, name: &str) -> Result<&Declaration, NodeError> {
        self.get(name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))
    }

    /// Look up a toplevel by name.
    pub fn try_get_toplevel(&self, name: &str) -> Result<(&Declaration, &Toplevel), NodeError> {
        let decl = self.try_get(name)?;
        let toplevel = decl.as_toplevel().ok_or_else(|| NodeError::IncorrectKind {
            name: name.to_string(),
            expected: "toplevel",
        })?;

        Ok((decl, toplevel))
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    /// The root and every toplevel it owns, ordered by name.
    #[must_use]
    pub fn toplevels(&self) -> Vec<&Declaration> {
        let mut out: Vec<&Declaration> =
            self.declarations.values().filter(|d| d.is_toplevel()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));

        out
    }

    /// The declarations a toplevel owns, in declaration order.
    #[must_use]
    pub fn declared_types(&self, toplevel: &Declaration) -> Vec<&Declaration> {
        toplevel
            .as_toplevel()
            .map(|t| {
                t.declared_types
                    .iter()
                    .filter_map(|name| self.get(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The toplevel that owns a declaration; a toplevel owns itself.
    #[must_use]
    pub fn owner_of(&self, name: &str) -> Option<&Declaration> {
        let decl = self.get(name)?;
        if decl.is_toplevel() {
            return Some(decl);
        }

        self.declarations.values().find(|d| {
            d.as_toplevel()
                .is_some_and(|t| t.declared_types.iter().any(|n| n == name))
        })
    }

    /// Strict ancestors, furthest first. Stops at unresolved bases and cycles.
    #[must_use]
    pub fn ancestors(&self, decl: &Declaration) -> Vec<&Declaration> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::from([decl.name.as_str()]);
        let mut next = decl.base.as_deref();

        while let Some(name) = next {
            let Some(base) = self.get(name) else { break };
            if !seen.insert(base.name.as_str()) {
                break;
            }
            chain.push(base);
            next = base.base.as_deref();
        }
        chain.reverse();

        chain
    }

    /// Members inherited from every ancestor, base-first.
    #[must_use]
    pub fn members_of_base_classes(&self, decl: &Declaration) -> Vec<&Member> {
        self.ancestors(decl)
            .into_iter()
            .flat_map(|d| d.members.iter())
            .collect()
    }

    /// Wire order: inherited members base-first, then own members.
    #[must_use]
    pub fn all_members<'a>(&'a self, decl: &'a Declaration) -> Vec<&'a Member> {
        let mut out = self.members_of_base_classes(decl);
        out.extend(decl.members.iter());

        out
    }

    /// Whether a name refers to an abstract struct or class.
    #[must_use]
    pub fn is_abstract(&self, name: &str) -> bool {
        self.get(name).is_some_and(Declaration::is_abstract)
    }
}

///
/// TESTS
///
