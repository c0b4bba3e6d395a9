//! Action representations and action spaces

use std::fmt::Debug;

/// Trait for actions in an RL environment
pub trait Action: Clone + Debug {
    /// Convert action to a vector representation
    fn to_vec(&self) -> Vec<f64>;
}

/// Trait for defining action spaces
///
/// Game action spaces are state dependent: the set of valid actions is
/// whatever is legal in the position the space is bound to.
pub trait ActionSpace {
    /// The type of actions in this space
    type Action: Action;

    /// Sample a legal action uniformly at random.
    ///
    /// Fails when the bound state has no legal action.
    fn sample(&self) -> crate::Result<Self::Action>;

    /// Every currently legal action, in enumeration order
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Check if an action is legal within this space
    fn contains(&self, action: &Self::Action) -> bool
    where
        Self::Action: PartialEq,
    {
        self.legal_actions().contains(action)
    }

    /// Get the dimensionality of a single action
    fn dim(&self) -> Option<usize>;
}
