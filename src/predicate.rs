//! Classifiers over abstract states.
//!
//! Game objectives are given as sets of states: the target and avoid sets of a
//! reachability game, the safe set of an invariance game. Anything that can
//! answer "is this state in the set?" implements [`StateSet`].

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;

use crate::bitset::BitSet;
use crate::types::{AbsType, State};

/// A set of abstract states, queried by membership only.
///
/// Implemented for closures, so `&|s: State| s.id() < 10` is a valid set.
pub trait StateSet {
    fn contains(&self, state: State) -> bool;
}

impl<F> StateSet for F
where
    F: Fn(State) -> bool,
{
    fn contains(&self, state: State) -> bool {
        self(state)
    }
}

/// The set of all states.
#[derive(Debug, Copy, Clone, Default)]
pub struct Everything;

impl StateSet for Everything {
    fn contains(&self, _state: State) -> bool {
        true
    }
}

/// The empty set of states.
#[derive(Debug, Copy, Clone, Default)]
pub struct Nothing;

impl StateSet for Nothing {
    fn contains(&self, _state: State) -> bool {
        false
    }
}

impl StateSet for BitSet {
    fn contains(&self, state: State) -> bool {
        BitSet::contains(self, state.index())
    }
}

impl StateSet for [State] {
    fn contains(&self, state: State) -> bool {
        <[State]>::contains(self, &state)
    }
}

impl StateSet for Vec<State> {
    fn contains(&self, state: State) -> bool {
        self.as_slice().contains(&state)
    }
}

impl StateSet for HashSet<State> {
    fn contains(&self, state: State) -> bool {
        HashSet::contains(self, &state)
    }
}

impl StateSet for BTreeSet<State> {
    fn contains(&self, state: State) -> bool {
        BTreeSet::contains(self, &state)
    }
}

impl StateSet for Range<AbsType> {
    fn contains(&self, state: State) -> bool {
        Range::contains(self, &state.id())
    }
}
