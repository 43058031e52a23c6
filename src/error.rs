use std::collections::TryReserveError;

use thiserror::Error;

use crate::types::{AbsType, Input, State};

/// The result of a transition-function or solver operation.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Error returned when building a transition function or solving a game failed.
///
/// A state that is not winning is *not* an error: it is reported through
/// [`WinningDomain`][crate::domain::WinningDomain].
#[derive(Debug, Error)]
pub enum SynthError {
    /// The number of states does not fit the abstract index range.
    #[error("{0} states do not fit the abstract index range")]
    TooManyStates(usize),

    /// The number of inputs does not fit the abstract index range.
    #[error("{0} inputs do not fit the abstract index range")]
    TooManyInputs(usize),

    /// `no_states * no_inputs` is not addressable.
    #[error("{no_states} states x {no_inputs} inputs overflow the addressable range")]
    CapacityOverflow { no_states: usize, no_inputs: usize },

    /// More transitions than a flat predecessor array can address.
    #[error("{count} transitions exceed the maximum of {max}")]
    TooManyTransitions { count: usize, max: usize },

    /// Backing storage could not be allocated.
    #[error("allocation of {what} failed: {source}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// The transition function holds no transitions.
    #[error("the transition relation is empty")]
    EmptyRelation,

    /// The input alphabet collides with the reserved losing index.
    #[error("{no_inputs} inputs collide with the reserved losing index {sentinel}")]
    InputAlphabetTooLarge { no_inputs: usize, sentinel: AbsType },

    /// A transition refers to a state outside `0..no_states`.
    #[error("state {state} is out of range (no_states={no_states})")]
    StateOutOfRange { state: State, no_states: usize },

    /// A transition refers to an input outside `0..no_inputs`.
    #[error("input {input} is out of range (no_inputs={no_inputs})")]
    InputOutOfRange { input: Input, no_inputs: usize },
}

/// Reserves exactly `len` elements in `vec`, mapping failure to [`SynthError::Allocation`].
pub(crate) fn try_alloc<T: Clone>(what: &'static str, len: usize, fill: T) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|source| SynthError::Allocation { what, source })?;
    vec.resize(len, fill);
    Ok(vec)
}
