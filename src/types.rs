//! Type-safe wrappers for abstract states and inputs.
//!
//! An abstraction enumerates its discretised states as `0..N` and its
//! discretised inputs as `0..M`. Both are plain [`AbsType`] integers underneath,
//! but mixing them up is the most common mistake when indexing the flattened
//! `state * M + input` arrays, so they get distinct newtypes here.
use std::fmt;

/// Raw abstract index type for states and inputs.
pub type AbsType = u32;

/// Offset type into the flat predecessor array of a transition function.
pub type AbsPtr = u32;

/// Reserved index meaning "losing" (in a winning domain) or "infinity" (in a value function).
///
/// This is an internal encoding: the public query API always returns `Option`.
pub const LOSING: AbsType = AbsType::MAX;

/// Maximum number of transitions a single transition function can hold.
pub const MAX_TRANSITIONS: usize = AbsPtr::MAX as usize;

/// An abstract state (0-indexed).
///
/// # Invariants
///
/// - The id is below the number of states of the transition function it is used with
/// - The id is never [`LOSING`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct State(AbsType);

impl State {
    /// Creates a new state with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id == LOSING`.
    pub fn new(id: AbsType) -> Self {
        assert_ne!(id, LOSING, "State id {} is reserved", LOSING);
        State(id)
    }

    /// Returns the raw state id.
    pub fn id(self) -> AbsType {
        self.0
    }

    /// Returns the state id as a `usize`, suitable for indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<State> for AbsType {
    fn from(state: State) -> Self {
        state.0
    }
}

impl From<AbsType> for State {
    fn from(id: AbsType) -> Self {
        State::new(id)
    }
}

/// An abstract input (0-indexed).
///
/// Inputs are the controller's moves. Like [`State`], the id [`LOSING`] is reserved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Input(AbsType);

impl Input {
    /// Creates a new input with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id == LOSING`.
    pub fn new(id: AbsType) -> Self {
        assert_ne!(id, LOSING, "Input id {} is reserved", LOSING);
        Input(id)
    }

    /// Returns the raw input id.
    pub fn id(self) -> AbsType {
        self.0
    }

    /// Returns the input id as a `usize`, suitable for indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

impl From<Input> for AbsType {
    fn from(input: Input) -> Self {
        input.0
    }
}

impl From<AbsType> for Input {
    fn from(id: AbsType) -> Self {
        Input::new(id)
    }
}
