//! Sparse transition function of a finite abstraction.
//!
//! A transition `(pre, input, post)` means "applying `input` in `pre` may lead
//! to `post`". Both game solvers only ever walk the relation backwards, so the
//! store keeps just the inverse adjacency:
//!
//! ```text
//! pre:     [ p p p | p | p p | ... ]   flat array of predecessor states
//!            ^       ^   ^
//! pre_ptr:   offset of the group for each (post, input), row-major post * M + input
//! no_pre:    size of the group for each (post, input)
//! no_post:   number of successors for each (pre, input)
//! ```
//!
//! `no_post` lets the solvers know how many successors a `(pre, input)`
//! hyperedge has without ever enumerating them. Forward queries are available
//! through [`TransitionFunction::successors`] but are linear in the number of
//! states and meant for inspection only.
//!
//! The store is filled once, either through [`TransitionBuilder`] or through the
//! low-level [`allocate`][TransitionFunction::allocate] /
//! [`allocate_transitions`][TransitionFunction::allocate_transitions] /
//! `set_*` sequence, and is read-only afterwards.

use std::fmt::{Debug, Formatter};

use log::debug;

use crate::error::{try_alloc, Result, SynthError};
use crate::types::{AbsPtr, AbsType, Input, State, LOSING, MAX_TRANSITIONS};

/// Inverse-adjacency storage of a transition relation.
///
/// Owns its backing arrays. It is movable but deliberately not `Clone`: the
/// flat predecessor array can be very large and should never be duplicated
/// implicitly.
#[derive(Default)]
pub struct TransitionFunction {
    no_states: usize,
    no_inputs: usize,
    /// Predecessor states, grouped by `(post, input)`.
    pre: Vec<State>,
    /// Offset into `pre` of the group of each `(post, input)`.
    pre_ptr: Vec<AbsPtr>,
    /// Size of the group of each `(post, input)`.
    no_pre: Vec<AbsType>,
    /// Number of successors of each `(pre, input)`.
    no_post: Vec<AbsType>,
}

impl TransitionFunction {
    /// Creates an empty store without any states or inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the store and sizes the per-`(state, input)` arrays for
    /// `no_states` states and `no_inputs` inputs, all counts zero.
    pub fn allocate(&mut self, no_states: usize, no_inputs: usize) -> Result<()> {
        if no_states > LOSING as usize {
            return Err(SynthError::TooManyStates(no_states));
        }
        if no_inputs > LOSING as usize {
            return Err(SynthError::TooManyInputs(no_inputs));
        }
        let size = no_states
            .checked_mul(no_inputs)
            .ok_or(SynthError::CapacityOverflow { no_states, no_inputs })?;

        // Release the old arrays before reserving the new ones.
        *self = Self::default();

        self.no_pre = try_alloc("predecessor counts", size, 0)?;
        self.no_post = try_alloc("successor counts", size, 0)?;
        self.pre_ptr = try_alloc("predecessor offsets", size, 0)?;
        self.no_states = no_states;
        self.no_inputs = no_inputs;

        Ok(())
    }

    /// Reserves the flat predecessor array for `total` transitions.
    ///
    /// The caller must lay out the groups as a prefix sum over `(post, input)`
    /// via [`set_layout`][Self::set_layout] before writing predecessors.
    pub fn allocate_transitions(&mut self, total: usize) -> Result<()> {
        if total > MAX_TRANSITIONS {
            return Err(SynthError::TooManyTransitions {
                count: total,
                max: MAX_TRANSITIONS,
            });
        }
        self.pre = try_alloc("predecessor array", total, State::new(0))?;
        Ok(())
    }

    /// Declares that the predecessors of `(post, input)` occupy `count` slots starting at `offset`.
    pub fn set_layout(&mut self, post: State, input: Input, offset: AbsPtr, count: AbsType) {
        let idx = self.idx(post, input);
        self.pre_ptr[idx] = offset;
        self.no_pre[idx] = count;
    }

    /// Writes predecessor `pre` into slot `slot` of the flat array.
    pub fn set_predecessor(&mut self, slot: usize, pre: State) {
        self.pre[slot] = pre;
    }

    /// Records that `(pre, input)` has `count` successors.
    pub fn set_successor_count(&mut self, pre: State, input: Input, count: AbsType) {
        let idx = self.idx(pre, input);
        self.no_post[idx] = count;
    }

    #[inline]
    fn idx(&self, state: State, input: Input) -> usize {
        debug_assert!(state.index() < self.no_states, "{} out of range", state);
        debug_assert!(input.index() < self.no_inputs, "{} out of range", input);
        state.index() * self.no_inputs + input.index()
    }

    pub fn no_states(&self) -> usize {
        self.no_states
    }
    pub fn no_inputs(&self) -> usize {
        self.no_inputs
    }

    /// Total number of stored transitions.
    pub fn transition_count(&self) -> usize {
        self.pre.len()
    }

    /// Returns true if no transitions were loaded.
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty()
    }

    /// States with a transition to `post` under `input`.
    pub fn predecessors(&self, post: State, input: Input) -> Result<&[State]> {
        if self.is_empty() {
            return Err(SynthError::EmptyRelation);
        }
        Ok(self.pre_slice(post, input))
    }

    /// Unchecked variant of [`predecessors`][Self::predecessors] for the solvers' hot loops.
    #[inline]
    pub(crate) fn pre_slice(&self, post: State, input: Input) -> &[State] {
        let idx = self.idx(post, input);
        let start = self.pre_ptr[idx] as usize;
        let len = self.no_pre[idx] as usize;
        &self.pre[start..start + len]
    }

    /// Number of states reachable from `pre` under `input`. Zero means `input` is not applicable at `pre`.
    #[inline]
    pub fn successor_count(&self, pre: State, input: Input) -> AbsType {
        self.no_post[self.idx(pre, input)]
    }

    /// States reachable from `pre` under `input`, in increasing order.
    ///
    /// Scans the predecessor groups of every state, so this is slow on large
    /// abstractions.
    pub fn successors(&self, pre: State, input: Input) -> Vec<State> {
        let expected = self.successor_count(pre, input) as usize;
        let mut posts = Vec::with_capacity(expected);
        for post in self.states() {
            if posts.len() == expected {
                break;
            }
            if self.pre_slice(post, input).contains(&pre) {
                posts.push(post);
            }
        }
        posts
    }

    /// All states `0..no_states`.
    pub fn states(&self) -> impl DoubleEndedIterator<Item = State> {
        (0..self.no_states as AbsType).map(State::new)
    }

    /// All inputs `0..no_inputs`.
    pub fn inputs(&self) -> impl DoubleEndedIterator<Item = Input> {
        (0..self.no_inputs as AbsType).map(Input::new)
    }
}

impl Debug for TransitionFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionFunction")
            .field("no_states", &self.no_states)
            .field("no_inputs", &self.no_inputs)
            .field("transitions", &self.transition_count())
            .finish()
    }
}

/// Collects transitions and lays them out into a [`TransitionFunction`].
///
/// Duplicate transitions are dropped. Within each `(post, input)` group the
/// predecessors end up sorted by state index.
///
/// ```
/// use synth_rs::transition::TransitionBuilder;
/// use synth_rs::types::{Input, State};
///
/// let mut builder = TransitionBuilder::new(2, 1);
/// builder.add(State::new(0), Input::new(0), State::new(1))?;
/// builder.add(State::new(1), Input::new(0), State::new(1))?;
/// let tf = builder.build()?;
///
/// assert_eq!(tf.transition_count(), 2);
/// assert_eq!(tf.predecessors(State::new(1), Input::new(0))?, &[State::new(0), State::new(1)]);
/// # Ok::<(), synth_rs::error::SynthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TransitionBuilder {
    no_states: usize,
    no_inputs: usize,
    /// Stored as `(post, input, pre)` so that sorting yields the prefix-sum layout.
    transitions: Vec<(State, Input, State)>,
}

impl TransitionBuilder {
    pub fn new(no_states: usize, no_inputs: usize) -> Self {
        Self {
            no_states,
            no_inputs,
            transitions: Vec::new(),
        }
    }

    /// Adds the transition `pre --input--> post`.
    pub fn add(&mut self, pre: State, input: Input, post: State) -> Result<&mut Self> {
        for state in [pre, post] {
            if state.index() >= self.no_states {
                return Err(SynthError::StateOutOfRange {
                    state,
                    no_states: self.no_states,
                });
            }
        }
        if input.index() >= self.no_inputs {
            return Err(SynthError::InputOutOfRange {
                input,
                no_inputs: self.no_inputs,
            });
        }
        self.transitions.push((post, input, pre));
        Ok(self)
    }

    /// Adds every `(pre, input, post)` triple, given as raw indices.
    pub fn add_all<I>(&mut self, transitions: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (AbsType, AbsType, AbsType)>,
    {
        for (pre, input, post) in transitions {
            self.add(State::new(pre), Input::new(input), State::new(post))?;
        }
        Ok(self)
    }

    /// Number of transitions added so far, duplicates included.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn build(mut self) -> Result<TransitionFunction> {
        self.transitions.sort_unstable();
        self.transitions.dedup();

        let mut tf = TransitionFunction::new();
        tf.allocate(self.no_states, self.no_inputs)?;
        tf.allocate_transitions(self.transitions.len())?;

        let mut no_post = try_alloc("successor counts", self.no_states * self.no_inputs, 0 as AbsType)?;

        let mut start = 0;
        while start < self.transitions.len() {
            let (post, input, _) = self.transitions[start];
            let end = start
                + self.transitions[start..]
                    .iter()
                    .take_while(|&&(p, j, _)| p == post && j == input)
                    .count();

            tf.set_layout(post, input, start as AbsPtr, (end - start) as AbsType);
            for (slot, &(_, _, pre)) in self.transitions.iter().enumerate().take(end).skip(start) {
                tf.set_predecessor(slot, pre);
                no_post[pre.index() * self.no_inputs + input.index()] += 1;
            }

            start = end;
        }

        for pre in 0..self.no_states {
            for input in 0..self.no_inputs {
                let count = no_post[pre * self.no_inputs + input];
                if count > 0 {
                    tf.set_successor_count(State::new(pre as AbsType), Input::new(input as AbsType), count);
                }
            }
        }

        debug!(
            "Built transition function: {} states, {} inputs, {} transitions",
            tf.no_states(),
            tf.no_inputs(),
            tf.transition_count()
        );

        Ok(tf)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn s(i: AbsType) -> State {
        State::new(i)
    }
    fn u(j: AbsType) -> Input {
        Input::new(j)
    }

    /// 0 -a-> 1, 0 -a-> 2, 1 -a-> 2, 2 -b-> 0, 2 -b-> 2
    fn sample() -> TransitionFunction {
        let mut builder = TransitionBuilder::new(3, 2);
        builder
            .add_all([(0, 0, 1), (0, 0, 2), (1, 0, 2), (2, 1, 0), (2, 1, 2)])
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_empty_store() {
        let tf = TransitionFunction::new();
        assert_eq!(tf.no_states(), 0);
        assert_eq!(tf.transition_count(), 0);
        assert!(tf.is_empty());
    }

    #[test]
    fn test_predecessors_on_empty_relation() {
        let mut tf = TransitionFunction::new();
        tf.allocate(2, 2).unwrap();
        let err = tf.predecessors(s(0), u(0)).unwrap_err();
        assert!(matches!(err, SynthError::EmptyRelation));
    }

    #[test]
    fn test_predecessors() {
        let tf = sample();
        assert_eq!(tf.transition_count(), 5);
        assert!(tf.predecessors(s(0), u(0)).unwrap().is_empty());
        assert_eq!(tf.predecessors(s(1), u(0)).unwrap(), &[s(0)]);
        assert_eq!(tf.predecessors(s(2), u(0)).unwrap(), &[s(0), s(1)]);
        assert_eq!(tf.predecessors(s(0), u(1)).unwrap(), &[s(2)]);
        assert_eq!(tf.predecessors(s(2), u(1)).unwrap(), &[s(2)]);
    }

    #[test]
    fn test_successor_count() {
        let tf = sample();
        assert_eq!(tf.successor_count(s(0), u(0)), 2);
        assert_eq!(tf.successor_count(s(0), u(1)), 0);
        assert_eq!(tf.successor_count(s(1), u(0)), 1);
        assert_eq!(tf.successor_count(s(2), u(0)), 0);
        assert_eq!(tf.successor_count(s(2), u(1)), 2);
    }

    #[test]
    fn test_successors() {
        let tf = sample();
        assert_eq!(tf.successors(s(0), u(0)), vec![s(1), s(2)]);
        assert_eq!(tf.successors(s(2), u(1)), vec![s(0), s(2)]);
        assert!(tf.successors(s(1), u(1)).is_empty());
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut builder = TransitionBuilder::new(2, 1);
        builder.add_all([(0, 0, 1), (0, 0, 1), (1, 0, 1)]).unwrap();
        assert_eq!(builder.len(), 3);
        let tf = builder.build().unwrap();
        assert_eq!(tf.transition_count(), 2);
        assert_eq!(tf.successor_count(s(0), u(0)), 1);
        assert_eq!(tf.predecessors(s(1), u(0)).unwrap(), &[s(0), s(1)]);
    }

    #[test]
    fn test_builder_bounds() {
        let mut builder = TransitionBuilder::new(2, 1);
        assert!(matches!(
            builder.add(s(0), u(0), s(2)),
            Err(SynthError::StateOutOfRange { no_states: 2, .. })
        ));
        assert!(matches!(
            builder.add(s(0), u(1), s(1)),
            Err(SynthError::InputOutOfRange { no_inputs: 1, .. })
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_manual_layout() {
        // 0 -> 1 and 1 -> 1 under the single input, laid out by hand.
        let mut tf = TransitionFunction::new();
        tf.allocate(2, 1).unwrap();
        tf.allocate_transitions(2).unwrap();
        tf.set_layout(s(1), u(0), 0, 2);
        tf.set_predecessor(0, s(0));
        tf.set_predecessor(1, s(1));
        tf.set_successor_count(s(0), u(0), 1);
        tf.set_successor_count(s(1), u(0), 1);

        assert_eq!(tf.predecessors(s(1), u(0)).unwrap(), &[s(0), s(1)]);
        assert!(tf.predecessors(s(0), u(0)).unwrap().is_empty());
        assert_eq!(tf.successors(s(0), u(0)), vec![s(1)]);
    }

    #[test]
    fn test_allocate_resets() {
        let mut tf = sample();
        tf.allocate(4, 1).unwrap();
        assert!(tf.is_empty());
        assert_eq!(tf.no_states(), 4);
        assert_eq!(tf.successor_count(s(0), u(0)), 0);
    }

    #[test]
    fn test_too_many_transitions() {
        let mut tf = TransitionFunction::new();
        tf.allocate(1, 1).unwrap();
        let err = tf.allocate_transitions(MAX_TRANSITIONS + 1).unwrap_err();
        assert!(matches!(err, SynthError::TooManyTransitions { .. }));
    }

    #[test]
    fn test_capacity_overflow() {
        let mut tf = TransitionFunction::new();
        let err = tf.allocate(LOSING as usize, LOSING as usize).unwrap_err();
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(err, SynthError::Allocation { .. }));
        #[cfg(not(target_pointer_width = "64"))]
        assert!(matches!(err, SynthError::CapacityOverflow { .. }));
    }

    #[test]
    fn test_too_many_states() {
        let mut tf = TransitionFunction::new();
        let err = tf.allocate(LOSING as usize + 1, 1).unwrap_err();
        assert!(matches!(err, SynthError::TooManyStates(_)));
    }

    #[test]
    fn test_debug() {
        let tf = sample();
        assert_eq!(
            format!("{:?}", tf),
            "TransitionFunction { no_states: 3, no_inputs: 2, transitions: 5 }"
        );
    }
}
