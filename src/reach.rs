//! Reachability games.
//!
//! The controller wants to force the system into a target set while never
//! visiting an avoid set, no matter which successor the environment picks.
//!
//! # Algorithm
//!
//! Backward breadth-first propagation over the hypergraph whose hyperedges are
//! the `(state, input)` pairs. A hyperedge *completes* once every one of its
//! successors has been shown winning; the state then wins with that input and
//! a value one larger than the worst of those successors.
//!
//! 1. Target states outside the avoid set get value 0 and are queued.
//! 2. For a dequeued state `q`, every predecessor `i` of `(q, j)` that is not
//!    avoided decrements the remaining-successor counter of `(i, j)` and raises
//!    the hyperedge value to `value[q] + 1`. When the counter hits zero and the
//!    hyperedge value beats `value[i]`, `i` wins with input `j` and is queued.
//! 3. The queue runs dry; everything never reached stays losing.
//!
//! States are dequeued in non-decreasing value order, so the first completing
//! hyperedge of a state already carries its minimal value. When several inputs
//! complete while the same state is being expanded, the lowest input index
//! wins. This ordering is an artifact of iteration order, not a guarantee of
//! the game semantics.

use std::cmp::max;
use std::collections::VecDeque;

use log::{debug, trace};

use crate::bitset::BitSet;
use crate::domain::WinningDomain;
use crate::error::{try_alloc, Result};
use crate::predicate::StateSet;
use crate::transition::TransitionFunction;
use crate::types::{AbsType, State, LOSING};
use crate::value::ValueFunction;

/// Solution of a reachability game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    pub domain: WinningDomain,
    pub value: ValueFunction,
}

/// Reach-avoid game over a transition function.
///
/// ```
/// use synth_rs::reach::ReachabilityGame;
/// use synth_rs::transition::TransitionBuilder;
/// use synth_rs::types::{Input, State};
///
/// // 0 -> 1 -> 2 and 0 -> 3 -> 2; state 1 must be avoided.
/// let mut builder = TransitionBuilder::new(4, 2);
/// builder.add_all([(0, 0, 1), (1, 0, 2), (0, 1, 3), (3, 0, 2)])?;
/// let tf = builder.build()?;
///
/// let result = ReachabilityGame::new(&tf)
///     .avoid(&[State::new(1)][..])
///     .solve(&[State::new(2)][..])?;
///
/// assert_eq!(result.domain.witness(State::new(0)), Some(Input::new(1)));
/// assert_eq!(result.value.get(State::new(0)), Some(2));
/// assert!(!result.domain.is_winning(State::new(1)));
/// # Ok::<(), synth_rs::error::SynthError>(())
/// ```
pub struct ReachabilityGame<'a> {
    tf: &'a TransitionFunction,
    avoid: Option<BitSet>,
}

impl<'a> ReachabilityGame<'a> {
    pub fn new(tf: &'a TransitionFunction) -> Self {
        Self { tf, avoid: None }
    }

    /// Sets the states that must never be visited.
    pub fn avoid<A>(mut self, avoid: &A) -> Self
    where
        A: StateSet + ?Sized,
    {
        self.avoid = Some(BitSet::from_states(self.tf.no_states(), avoid));
        self
    }

    /// Computes the winning domain and value function for reaching `target`.
    pub fn solve<T>(&self, target: &T) -> Result<Reachability>
    where
        T: StateSet + ?Sized,
    {
        let tf = self.tf;
        let n = tf.no_states();
        let m = tf.no_inputs();
        WinningDomain::check_alphabet(m)?;

        debug!(
            "Solving reachability game: {} states, {} inputs, {} transitions",
            n,
            m,
            tf.transition_count()
        );

        let no_avoid = BitSet::default();
        let avoid = self.avoid.as_ref().unwrap_or(&no_avoid);

        let mut value = try_alloc("value function", n, LOSING)?;
        let mut winning = try_alloc("winning domain", n, LOSING)?;
        // Successors of (i, j) not yet shown winning.
        let mut remaining = try_alloc("successor counters", n * m, 0 as AbsType)?;
        // Largest successor value seen so far for (i, j), plus one.
        let mut edge_value = try_alloc("hyperedge values", n * m, 0 as AbsType)?;
        let mut expanded = BitSet::new(n);
        let mut queue = VecDeque::new();

        for i in tf.states() {
            for j in tf.inputs() {
                remaining[i.index() * m + j.index()] = tf.successor_count(i, j);
            }
            if target.contains(i) && !avoid.contains(i.index()) {
                value[i.index()] = 0;
                winning[i.index()] = target_witness(tf, i);
                queue.push_back(i);
            }
        }
        debug!("Target: {} states", queue.len());

        while let Some(q) = queue.pop_front() {
            // Each state contributes to its predecessors' counters once.
            if !expanded.insert(q.index()) {
                continue;
            }
            let candidate = value[q.index()] + 1;

            for j in tf.inputs() {
                for &i in tf.pre_slice(q, j) {
                    if avoid.contains(i.index()) {
                        continue;
                    }
                    let e = i.index() * m + j.index();
                    remaining[e] -= 1;
                    edge_value[e] = max(edge_value[e], candidate);

                    if remaining[e] == 0 && value[i.index()] > edge_value[e] {
                        trace!("{} wins with {} in {} steps", i, j, edge_value[e]);
                        value[i.index()] = edge_value[e];
                        winning[i.index()] = j.id();
                        queue.push_back(i);
                    }
                }
            }
        }

        let domain = WinningDomain::from_witnesses(n, m, winning);
        let value = ValueFunction::from_raw(value);
        debug!(
            "Reachability game solved: {} winning states, {} layers",
            domain.len(),
            value.max_finite().map_or(0, |v| v + 1)
        );

        Ok(Reachability { domain, value })
    }
}

/// Input reported for a target state: it has already won, so any input will
/// do. Prefer the lowest one that is actually applicable.
fn target_witness(tf: &TransitionFunction, state: State) -> AbsType {
    tf.inputs()
        .find(|&j| tf.successor_count(state, j) > 0)
        .or_else(|| tf.inputs().next())
        .map_or(LOSING, |j| j.id())
}

/// Solves the reachability game for `target` without an avoid set.
pub fn solve_reachability_game<T>(tf: &TransitionFunction, target: &T) -> Result<Reachability>
where
    T: StateSet + ?Sized,
{
    ReachabilityGame::new(tf).solve(target)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::error::SynthError;
    use crate::predicate::Nothing;
    use crate::transition::TransitionBuilder;
    use crate::types::Input;

    fn s(i: AbsType) -> State {
        State::new(i)
    }
    fn u(j: AbsType) -> Input {
        Input::new(j)
    }

    fn build(no_states: usize, no_inputs: usize, transitions: &[(AbsType, AbsType, AbsType)]) -> TransitionFunction {
        let mut builder = TransitionBuilder::new(no_states, no_inputs);
        builder.add_all(transitions.iter().copied()).unwrap();
        builder.build().unwrap()
    }

    /// 0 -> 1 -> 2 -> 3 -> 3
    fn chain() -> TransitionFunction {
        build(4, 1, &[(0, 0, 1), (1, 0, 2), (2, 0, 3), (3, 0, 3)])
    }

    #[test]
    fn test_chain() {
        let tf = chain();
        let result = solve_reachability_game(&tf, &[s(3)][..]).unwrap();

        assert_eq!(result.value.to_f64_vec(), vec![3.0, 2.0, 1.0, 0.0]);
        for i in 0..4 {
            assert!(result.domain.is_winning(s(i)));
            assert_eq!(result.domain.witness(s(i)), Some(u(0)));
        }
        assert!(!result.domain.has_input_matrix());
    }

    #[test]
    fn test_empty_target() {
        let tf = chain();
        let result = solve_reachability_game(&tf, &Nothing).unwrap();
        assert!(result.domain.is_empty());
        assert!(result.value.iter().all(|(_, v)| v.is_none()));
    }

    #[test]
    fn test_nondeterminism_requires_all_successors() {
        // 0 -u0-> {1, 2}; 1 -> 3 (target); 2 is a dead end.
        let tf = build(4, 1, &[(0, 0, 1), (0, 0, 2), (1, 0, 3)]);
        let result = solve_reachability_game(&tf, &[s(3)][..]).unwrap();
        assert!(result.domain.is_winning(s(1)));
        assert!(!result.domain.is_winning(s(2)));
        assert!(!result.domain.is_winning(s(0)));
        assert_eq!(result.value.get(s(0)), None);
    }

    #[test]
    fn test_value_is_worst_case_over_successors() {
        // 0 -u0-> {1, 3}; 1 -> 2 -> 3 (target).
        let tf = build(4, 1, &[(0, 0, 1), (0, 0, 3), (1, 0, 2), (2, 0, 3)]);
        let result = solve_reachability_game(&tf, &[s(3)][..]).unwrap();
        assert_eq!(result.value.get(s(0)), Some(3));
        assert_eq!(result.value.get(s(1)), Some(2));
    }

    #[test]
    fn test_avoid() {
        // Two routes from 0 to 3: via 1 (input 0) or via 2 (input 1).
        let tf = build(4, 2, &[(0, 0, 1), (0, 1, 2), (1, 0, 3), (2, 0, 3)]);

        let result = solve_reachability_game(&tf, &[s(3)][..]).unwrap();
        assert_eq!(result.domain.witness(s(0)), Some(u(0)));

        let result = ReachabilityGame::new(&tf)
            .avoid(&[s(1)][..])
            .solve(&[s(3)][..])
            .unwrap();
        assert_eq!(result.domain.witness(s(0)), Some(u(1)));
        assert!(!result.domain.is_winning(s(1)));
        assert_eq!(result.value.get(s(1)), None);
        assert_eq!(result.value.get(s(0)), Some(2));
    }

    #[test]
    fn test_avoided_target_is_losing() {
        let tf = chain();
        let target = [s(3)];
        let result = ReachabilityGame::new(&tf).avoid(&target[..]).solve(&target[..]).unwrap();
        assert!(result.domain.is_empty());
    }

    #[test]
    fn test_target_keeps_value_zero() {
        // 1 is a target but also sits on the path 0 -> 1 -> 2 (target).
        let tf = build(3, 1, &[(0, 0, 1), (1, 0, 2), (2, 0, 2)]);
        let result = solve_reachability_game(&tf, &[s(1), s(2)][..]).unwrap();
        assert_eq!(result.value.get(s(1)), Some(0));
        assert_eq!(result.value.get(s(2)), Some(0));
        assert_eq!(result.value.get(s(0)), Some(1));
    }

    #[test]
    fn test_target_witness() {
        // Target 1 only has input 1 applicable; target 2 has no applicable input.
        let tf = build(3, 2, &[(0, 0, 1), (1, 1, 2)]);
        let result = solve_reachability_game(&tf, &[s(1), s(2)][..]).unwrap();
        assert_eq!(result.domain.witness(s(1)), Some(u(1)));
        assert_eq!(result.domain.witness(s(2)), Some(u(0)));
    }

    #[test]
    fn test_tie_break_lowest_input() {
        // Both inputs lead straight to the target.
        let tf = build(2, 2, &[(0, 0, 1), (0, 1, 1)]);
        let result = solve_reachability_game(&tf, &[s(1)][..]).unwrap();
        assert_eq!(result.domain.witness(s(0)), Some(u(0)));
    }

    #[test]
    fn test_shorter_input_wins() {
        // Input 0 takes the long way 0 -> 1 -> 2, input 1 goes 0 -> 2 directly.
        let tf = build(3, 2, &[(0, 0, 1), (1, 0, 2), (0, 1, 2)]);
        let result = solve_reachability_game(&tf, &[s(2)][..]).unwrap();
        assert_eq!(result.domain.witness(s(0)), Some(u(1)));
        assert_eq!(result.value.get(s(0)), Some(1));
    }

    #[test]
    fn test_empty_relation() {
        let mut tf = TransitionFunction::new();
        tf.allocate(3, 1).unwrap();
        let result = solve_reachability_game(&tf, &[s(0)][..]).unwrap();
        assert!(result.domain.is_winning(s(0)));
        assert!(!result.domain.is_winning(s(1)));
        assert_eq!(result.domain.len(), 1);
    }

    #[test]
    fn test_input_alphabet_too_large() {
        let mut tf = TransitionFunction::new();
        tf.allocate(0, LOSING as usize - 1).unwrap();
        let err = solve_reachability_game(&tf, &Nothing).unwrap_err();
        assert!(matches!(err, SynthError::InputAlphabetTooLarge { .. }));
    }

    #[test]
    fn test_idempotent() {
        let tf = build(5, 2, &[(0, 0, 1), (0, 1, 4), (1, 0, 2), (1, 1, 0), (2, 0, 3), (4, 0, 3), (4, 1, 4)]);
        let target = |st: State| st.id() == 3;
        let first = solve_reachability_game(&tf, &target).unwrap();
        let second = solve_reachability_game(&tf, &target).unwrap();
        assert_eq!(first, second);
    }
}
