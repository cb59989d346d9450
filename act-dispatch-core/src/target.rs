//! Dispatch targets for action creators

use std::fmt;
use std::rc::Rc;

use crate::action::Action;

/// Anything that can receive an action and report what was dispatched
///
/// Implemented by [`Store`](crate::Store) and by closures wrapped with
/// [`Target::func`].
pub trait Dispatch {
    fn dispatch(&self, action: Action) -> Action;
}

/// Adapter turning a closure into a [`Dispatch`] implementation
pub struct FnDispatch<F>(pub F);

impl<F> Dispatch for FnDispatch<F>
where
    F: Fn(Action) -> Action,
{
    fn dispatch(&self, action: Action) -> Action {
        (self.0)(action)
    }
}

impl<F> fmt::Debug for FnDispatch<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDispatch")
    }
}

/// Normalized dispatch destination: nothing, one receiver, or an ordered list
#[derive(Clone, Default)]
pub enum Target {
    #[default]
    None,
    One(Rc<dyn Dispatch>),
    Many(Vec<Rc<dyn Dispatch>>),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::None => f.write_str("Target::None"),
            Target::One(_) => f.write_str("Target::One"),
            Target::Many(list) => write!(f, "Target::Many({})", list.len()),
        }
    }
}

impl Target {
    pub fn none() -> Self {
        Target::None
    }

    /// Wrap a dispatch function
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(Action) -> Action + 'static,
    {
        Target::One(Rc::new(FnDispatch(f)))
    }

    pub fn is_none(&self) -> bool {
        match self {
            Target::None => true,
            Target::One(_) => false,
            Target::Many(list) => list.is_empty(),
        }
    }

    /// Send `action` to every receiver in order.
    pub fn send(&self, action: Action) -> Dispatched {
        match self {
            Target::None => Dispatched::Unsent(action),
            Target::One(receiver) => Dispatched::Sent(receiver.dispatch(action)),
            Target::Many(receivers) => Dispatched::Broadcast(
                receivers
                    .iter()
                    .map(|receiver| receiver.dispatch(action.clone()))
                    .collect(),
            ),
        }
    }

    fn receivers(self) -> Vec<Rc<dyn Dispatch>> {
        match self {
            Target::None => Vec::new(),
            Target::One(receiver) => vec![receiver],
            Target::Many(receivers) => receivers,
        }
    }
}

impl From<Rc<dyn Dispatch>> for Target {
    fn from(receiver: Rc<dyn Dispatch>) -> Self {
        Target::One(receiver)
    }
}

impl<T: Into<Target>> From<Vec<T>> for Target {
    fn from(list: Vec<T>) -> Self {
        Target::Many(
            list.into_iter()
                .flat_map(|item| item.into().receivers())
                .collect(),
        )
    }
}

impl<T: Into<Target>> From<Option<T>> for Target {
    fn from(target: Option<T>) -> Self {
        target.map(Into::into).unwrap_or_default()
    }
}

/// Result of invoking an action creator
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// No target configured; the action itself.
    Unsent(Action),
    /// What the single target returned.
    Sent(Action),
    /// Per-target results, in target order.
    Broadcast(Vec<Action>),
}

impl Dispatched {
    /// The first action in the result, if any
    pub fn action(&self) -> Option<&Action> {
        match self {
            Dispatched::Unsent(action) | Dispatched::Sent(action) => Some(action),
            Dispatched::Broadcast(actions) => actions.first(),
        }
    }

    /// Take the first action out of the result.
    ///
    /// A broadcast yields its first target's result; use
    /// [`Dispatched::into_vec`] to keep them all.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Dispatched::Unsent(action) | Dispatched::Sent(action) => Some(action),
            Dispatched::Broadcast(actions) => actions.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<Action> {
        match self {
            Dispatched::Unsent(action) | Dispatched::Sent(action) => vec![action],
            Dispatched::Broadcast(actions) => actions,
        }
    }

    /// Whether the action reached at least one target
    pub fn is_sent(&self) -> bool {
        !matches!(self, Dispatched::Unsent(_))
    }
}
