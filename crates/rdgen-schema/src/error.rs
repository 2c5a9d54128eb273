use std::{collections::BTreeMap, fmt};

///
/// ErrorTree
///
/// Aggregates validation messages by route so a single pass can report
/// every problem in the schema at once.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    messages: Vec<String>,
    children: BTreeMap<String, Self>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Record a message at this level of the tree.
    pub fn add(&mut self, message: impl ToString) {
        self.messages.push(message.to_string());
    }

    /// Merge the errors of a fallible check, if any.
    pub fn add_result<E: Into<Self>>(&mut self, result: Result<(), E>) {
        if let Err(e) = result {
            self.merge(e.into());
        }
    }

    /// Merge another tree into this one at the same level.
    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
        for (route, child) in other.children {
            self.children.entry(route).or_default().merge(child);
        }
    }

    /// Merge another tree under a named child route.
    pub fn merge_at(&mut self, route: impl Into<String>, other: Self) {
        if !other.is_empty() {
            self.children.entry(route.into()).or_default().merge(other);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Number of messages across the whole tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Flatten into `(route, message)` pairs, routes joined with `.`.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for message in &self.messages {
            out.push((prefix.to_string(), message.clone()));
        }
        for (route, child) in &self.children {
            let path = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix}.{route}")
            };
            child.flatten_into(&path, out);
        }
    }

    /// Convert into a `Result`, failing when any message was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<String> for ErrorTree {
    fn from(message: String) -> Self {
        let mut tree = Self::new();
        tree.add(message);

        tree
    }
}

impl From<&str> for ErrorTree {
    fn from(message: &str) -> Self {
        Self::from(message.to_string())
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (route, message)) in self.flatten().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if route.is_empty() {
                write!(f, "{message}")?;
            } else {
                write!(f, "{route}: {message}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

/// Push a formatted message onto an [`ErrorTree`].
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_is_ok() {
        assert!(ErrorTree::new().result().is_ok());
    }

    #[test]
    fn nested_routes_flatten_with_dots() {
        let mut child = ErrorTree::new();
        err!(child, "field '{}' is bad", "x");

        let mut root = ErrorTree::new();
        root.merge_at("Point", child);
        root.add("top");

        let flat = root.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0], (String::new(), "top".to_string()));
        assert_eq!(flat[1], ("Point".to_string(), "field 'x' is bad".to_string()));
        assert_eq!(root.to_string(), "top\nPoint: field 'x' is bad");
    }

    #[test]
    fn merging_empty_child_adds_nothing() {
        let mut root = ErrorTree::new();
        root.merge_at("Nothing", ErrorTree::new());

        assert!(root.is_empty(), "empty children must not make the tree fail");
        assert_eq!(root.len(), 0);
    }
}
