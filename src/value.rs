//! Value function of a reachability game.

use std::fmt;

use crate::types::{AbsType, State, LOSING};

/// Number of steps within which the synthesized controller reaches the target, per state.
///
/// Stored densely with [`LOSING`] encoding "+infinity"; the accessors return
/// `None` for such states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFunction {
    values: Vec<AbsType>,
}

impl ValueFunction {
    /// All states at infinity.
    pub(crate) fn infinite(no_states: usize) -> Self {
        Self {
            values: vec![LOSING; no_states],
        }
    }

    pub(crate) fn from_raw(values: Vec<AbsType>) -> Self {
        Self { values }
    }

    /// Number of states covered.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Step bound of `state`, or `None` if the target cannot be forced from it.
    pub fn get(&self, state: State) -> Option<AbsType> {
        match self.values[state.index()] {
            LOSING => None,
            v => Some(v),
        }
    }

    pub fn is_finite(&self, state: State) -> bool {
        self.values[state.index()] != LOSING
    }

    /// Value as a float, with `f64::INFINITY` for unreachable states.
    pub fn as_f64(&self, state: State) -> f64 {
        self.get(state).map_or(f64::INFINITY, f64::from)
    }

    /// Iterates over `(state, value)` for every state.
    pub fn iter(&self) -> impl Iterator<Item = (State, Option<AbsType>)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (State::new(i as AbsType), (v != LOSING).then_some(v)))
    }

    /// The largest finite value, i.e. the number of fixed-point layers.
    pub fn max_finite(&self) -> Option<AbsType> {
        self.values.iter().copied().filter(|&v| v != LOSING).max()
    }

    /// All values as floats, `f64::INFINITY` marking unreachable states.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|&v| if v == LOSING { f64::INFINITY } else { f64::from(v) })
            .collect()
    }
}

impl fmt::Display for ValueFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, &v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if v == LOSING {
                write!(f, "inf")?;
            } else {
                write!(f, "{}", v)?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let value = ValueFunction::from_raw(vec![2, LOSING, 0]);
        assert_eq!(value.len(), 3);
        assert_eq!(value.get(State::new(0)), Some(2));
        assert_eq!(value.get(State::new(1)), None);
        assert!(value.is_finite(State::new(2)));
        assert!(!value.is_finite(State::new(1)));
        assert_eq!(value.as_f64(State::new(1)), f64::INFINITY);
        assert_eq!(value.max_finite(), Some(2));
        assert_eq!(value.to_f64_vec(), vec![2.0, f64::INFINITY, 0.0]);
        assert_eq!(value.to_string(), "[2, inf, 0]");
    }

    #[test]
    fn test_infinite() {
        let value = ValueFunction::infinite(2);
        assert_eq!(value.max_finite(), None);
        assert!(value.iter().all(|(_, v)| v.is_none()));
    }
}
