use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

type Action = Box<dyn FnOnce()>;

struct LifetimeState {
    alive: Cell<bool>,
    actions: RefCell<Vec<Action>>,
}

///
/// Lifetime
///
/// Read-only view of a scope; bound entities register their teardown here.
///

#[derive(Clone)]
pub struct Lifetime(Rc<LifetimeState>);

impl Lifetime {
    fn fresh() -> Self {
        Self(Rc::new(LifetimeState {
            alive: Cell::new(true),
            actions: RefCell::new(Vec::new()),
        }))
    }

    /// A lifetime that is never terminated.
    #[must_use]
    pub fn eternal() -> Self {
        Self::fresh()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.alive.get()
    }

    /// Run `action` when the lifetime terminates, or now if it already has.
    pub fn on_termination(&self, action: impl FnOnce() + 'static) {
        if self.is_alive() {
            self.0.actions.borrow_mut().push(Box::new(action));
        } else {
            action();
        }
    }

    /// A child scope terminated no later than this one.
    #[must_use]
    pub fn create_nested(&self) -> LifetimeDefinition {
        let nested = LifetimeDefinition::new();
        let child = nested.lifetime().clone();
        self.on_termination(move || terminate(&child));

        nested
    }
}

impl fmt::Debug for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifetime")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// terminate
// actions run in reverse registration order
fn terminate(lifetime: &Lifetime) {
    if !lifetime.0.alive.replace(false) {
        return;
    }

    let actions = std::mem::take(&mut *lifetime.0.actions.borrow_mut());
    for action in actions.into_iter().rev() {
        action();
    }
}

///
/// LifetimeDefinition
///
/// The owning side of a [`Lifetime`].
///

#[derive(Debug)]
pub struct LifetimeDefinition {
    lifetime: Lifetime,
}

impl LifetimeDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lifetime: Lifetime::fresh(),
        }
    }

    #[must_use]
    pub const fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lifetime.is_alive()
    }

    pub fn terminate(&self) {
        terminate(&self.lifetime);
    }
}

impl Default for LifetimeDefinition {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///
