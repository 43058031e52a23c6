//! Winning domain: the result of solving a game.
//!
//! For every state the domain records whether the controller wins from it and,
//! if so, a witness input. Invariance games additionally record the full
//! `state x input` validity matrix, since any surviving input keeps the system
//! safe; reachability games only record the single input that was found to
//! make progress towards the target.

use num_bigint::BigUint;

use crate::bitset::BitSet;
use crate::error::{Result, SynthError};
use crate::types::{AbsType, Input, State, LOSING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningDomain {
    no_states: usize,
    no_inputs: usize,
    /// Witness input per state, [`LOSING`] for losing states.
    winning: Vec<AbsType>,
    /// Bit `state * no_inputs + input` is set iff `input` is valid at `state`.
    valid: Option<BitSet>,
}

impl WinningDomain {
    /// Fails if input indices could collide with the [`LOSING`] sentinel.
    pub(crate) fn check_alphabet(no_inputs: usize) -> Result<()> {
        if no_inputs >= LOSING as usize - 1 {
            return Err(SynthError::InputAlphabetTooLarge {
                no_inputs,
                sentinel: LOSING,
            });
        }
        Ok(())
    }

    /// Domain with a single witness per state (reachability).
    pub(crate) fn from_witnesses(no_states: usize, no_inputs: usize, winning: Vec<AbsType>) -> Self {
        debug_assert_eq!(winning.len(), no_states);
        Self {
            no_states,
            no_inputs,
            winning,
            valid: None,
        }
    }

    /// Domain with a full validity matrix (invariance). The witness of each
    /// state is its lowest valid input.
    pub(crate) fn from_matrix(no_states: usize, no_inputs: usize, valid: BitSet) -> Self {
        let winning = (0..no_states)
            .map(|i| {
                (0..no_inputs)
                    .find(|&j| valid.contains(i * no_inputs + j))
                    .map_or(LOSING, |j| j as AbsType)
            })
            .collect();
        Self {
            no_states,
            no_inputs,
            winning,
            valid: Some(valid),
        }
    }

    pub fn no_states(&self) -> usize {
        self.no_states
    }
    pub fn no_inputs(&self) -> usize {
        self.no_inputs
    }

    /// Returns true if the full validity matrix is available.
    pub fn has_input_matrix(&self) -> bool {
        self.valid.is_some()
    }

    pub fn is_winning(&self, state: State) -> bool {
        self.winning[state.index()] != LOSING
    }

    /// Witness input of `state`, or `None` if the state is losing.
    pub fn witness(&self, state: State) -> Option<Input> {
        match self.winning[state.index()] {
            LOSING => None,
            j => Some(Input::new(j)),
        }
    }

    /// Returns true if `input` may be applied at `state` under the synthesized controller.
    pub fn is_valid(&self, state: State, input: Input) -> bool {
        match &self.valid {
            Some(valid) => valid.contains(state.index() * self.no_inputs + input.index()),
            None => self.witness(state) == Some(input),
        }
    }

    /// All valid inputs of `state`, in increasing order. Empty for losing states.
    pub fn inputs(&self, state: State) -> Vec<Input> {
        match &self.valid {
            Some(valid) => {
                let row = state.index() * self.no_inputs;
                (0..self.no_inputs)
                    .filter(|&j| valid.contains(row + j))
                    .map(|j| Input::new(j as AbsType))
                    .collect()
            }
            None => self.witness(state).into_iter().collect(),
        }
    }

    /// Winning states in increasing order.
    pub fn winning_states(&self) -> impl Iterator<Item = State> + '_ {
        self.winning
            .iter()
            .enumerate()
            .filter(|&(_, &j)| j != LOSING)
            .map(|(i, _)| State::new(i as AbsType))
    }

    /// Winning states paired with their witness input.
    pub fn witnesses(&self) -> impl Iterator<Item = (State, Input)> + '_ {
        self.winning
            .iter()
            .enumerate()
            .filter(|&(_, &j)| j != LOSING)
            .map(|(i, &j)| (State::new(i as AbsType), Input::new(j)))
    }

    /// Number of winning states.
    pub fn len(&self) -> usize {
        self.winning.iter().filter(|&&j| j != LOSING).count()
    }

    /// Returns true if no state is winning.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct memoryless controllers the domain admits.
    ///
    /// This is the product of the number of valid inputs over all winning
    /// states. A domain without winning states admits exactly one (empty)
    /// controller.
    pub fn count_controllers(&self) -> BigUint {
        if self.valid.is_none() {
            // One witness per winning state.
            return BigUint::from(1u32);
        }
        self.winning_states()
            .map(|state| BigUint::from(self.inputs(state).len()))
            .product()
    }
}
