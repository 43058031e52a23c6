//! Invariance (safety) games.
//!
//! The controller wants to keep the system inside a safe set forever. The
//! winning domain is the largest set `W` of safe states such that every state
//! of `W` has an input all of whose successors stay in `W`.
//!
//! # Algorithm
//!
//! Greatest fixed point by peeling losing states off from the outside:
//!
//! 1. Every input with at least one successor is valid at a safe state.
//!    States without valid inputs, unsafe ones included, are queued as losing.
//! 2. For a dequeued losing state `k`, every predecessor `i` of `(k, j)` loses
//!    input `j`. When `i` runs out of valid inputs it is queued as losing.
//! 3. Once the queue is empty the surviving valid inputs form the controller.
//!
//! Each `(state, input)` pair is invalidated at most once, so the loop performs
//! at most `no_states * no_inputs` invalidations.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::bitset::BitSet;
use crate::domain::WinningDomain;
use crate::error::{try_alloc, Result};
use crate::predicate::StateSet;
use crate::transition::TransitionFunction;
use crate::types::AbsType;

/// Computes the maximal invariant winning domain inside `safe`.
///
/// The returned domain carries the full validity matrix: every input listed by
/// [`WinningDomain::inputs`] keeps the system in the winning domain.
pub fn solve_invariance_game<S>(tf: &TransitionFunction, safe: &S) -> Result<WinningDomain>
where
    S: StateSet + ?Sized,
{
    let n = tf.no_states();
    let m = tf.no_inputs();
    WinningDomain::check_alphabet(m)?;

    debug!(
        "Solving invariance game: {} states, {} inputs, {} transitions",
        n,
        m,
        tf.transition_count()
    );

    let mut valid = BitSet::try_new(n * m)?;
    let mut no_valid = try_alloc("valid input counters", n, 0 as AbsType)?;
    let mut enqueued = BitSet::new(n);
    let mut queue = VecDeque::new();

    for i in tf.states() {
        if safe.contains(i) {
            for j in tf.inputs() {
                if tf.successor_count(i, j) > 0 {
                    valid.insert(i.index() * m + j.index());
                    no_valid[i.index()] += 1;
                }
            }
        }
        if no_valid[i.index()] == 0 {
            enqueued.insert(i.index());
            queue.push_back(i);
        }
    }
    debug!("Initially losing: {} states", queue.len());

    let mut invalidated = 0usize;
    while let Some(k) = queue.pop_front() {
        for j in tf.inputs() {
            for &i in tf.pre_slice(k, j) {
                if !valid.remove(i.index() * m + j.index()) {
                    continue;
                }
                invalidated += 1;
                no_valid[i.index()] -= 1;

                if no_valid[i.index()] == 0 && enqueued.insert(i.index()) {
                    trace!("{} loses its last input {} via {}", i, j, k);
                    queue.push_back(i);
                }
            }
        }
    }

    let domain = WinningDomain::from_matrix(n, m, valid);
    debug!(
        "Invariance game solved: {} winning states, {} inputs invalidated",
        domain.len(),
        invalidated
    );

    Ok(domain)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::error::SynthError;
    use crate::predicate::{Everything, Nothing};
    use crate::transition::TransitionBuilder;
    use crate::types::{Input, State, LOSING};

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

    #[test]
    fn test_chain_with_self_loop() {
        let tf = build(4, 1, &[(0, 0, 1), (1, 0, 2), (2, 0, 3), (3, 0, 3)]);
        let domain = solve_invariance_game(&tf, &Everything).unwrap();
        assert!(domain.has_input_matrix());
        assert_eq!(domain.len(), 4);
        for i in 0..4 {
            assert_eq!(domain.inputs(s(i)), vec![u(0)]);
        }
    }

    #[test]
    fn test_chain_without_self_loop() {
        let tf = build(4, 1, &[(0, 0, 1), (1, 0, 2), (2, 0, 3)]);
        let domain = solve_invariance_game(&tf, &Everything).unwrap();
        assert!(domain.is_empty());
        for i in 0..4 {
            assert!(domain.inputs(s(i)).is_empty());
        }
    }

    #[test]
    fn test_unsafe_successor_invalidates_input() {
        // State 0 can stay (u0) or jump to unsafe 1 (u1).
        let tf = build(2, 2, &[(0, 0, 0), (0, 1, 1), (1, 0, 1)]);
        let domain = solve_invariance_game(&tf, &[s(0)][..]).unwrap();
        assert!(domain.is_winning(s(0)));
        assert!(!domain.is_winning(s(1)));
        assert_eq!(domain.inputs(s(0)), vec![u(0)]);
        assert!(!domain.is_valid(s(0), u(1)));
    }

    #[test]
    fn test_nondeterministic_escape() {
        // 0 -u0-> {0, 1}, 1 unsafe: u0 is not enough to stay safe.
        let tf = build(2, 1, &[(0, 0, 0), (0, 0, 1), (1, 0, 1)]);
        let domain = solve_invariance_game(&tf, &[s(0)][..]).unwrap();
        assert!(domain.is_empty());
    }

    #[test]
    fn test_multiple_valid_inputs() {
        // Two self-loops at state 0 plus a third input to a dead end.
        let tf = build(2, 3, &[(0, 0, 0), (0, 1, 0), (0, 2, 1)]);
        let domain = solve_invariance_game(&tf, &Everything).unwrap();
        assert_eq!(domain.inputs(s(0)), vec![u(0), u(1)]);
        assert_eq!(domain.witness(s(0)), Some(u(0)));
        assert!(!domain.is_winning(s(1)));
    }

    #[test]
    fn test_nothing_safe() {
        let tf = build(2, 1, &[(0, 0, 0), (1, 0, 1)]);
        let domain = solve_invariance_game(&tf, &Nothing).unwrap();
        assert!(domain.is_empty());
    }

    #[test]
    fn test_empty_relation() {
        let mut tf = TransitionFunction::new();
        tf.allocate(3, 2).unwrap();
        let domain = solve_invariance_game(&tf, &Everything).unwrap();
        assert!(domain.is_empty());
    }

    #[test]
    fn test_input_alphabet_too_large() {
        let mut tf = TransitionFunction::new();
        tf.allocate(0, LOSING as usize).unwrap();
        let err = solve_invariance_game(&tf, &Everything).unwrap_err();
        assert!(matches!(err, SynthError::InputAlphabetTooLarge { .. }));
    }
}
