//! # synth-rs: Explicit game solvers for controller synthesis
//!
//! **`synth-rs`** computes controllers for finite abstractions of cyber-physical systems.
//! Given a transition function over abstract states and inputs, it solves two kinds of
//! two-player games, where the controller picks inputs and the environment picks among
//! the (possibly many) successors:
//!
//! - **Reachability**: reach a target set, optionally while avoiding some states.
//!   The result also carries a value function bounding the number of steps.
//! - **Invariance**: stay inside a safe set forever.
//!
//! ## Key Features
//!
//! - **Backward-only sparse storage**: [`TransitionFunction`][crate::transition::TransitionFunction]
//!   keeps only the inverse adjacency plus successor counts, which is all the solvers need.
//! - **Linear-time fixed points**: both solvers touch every transition a bounded number of times.
//! - **Type-safe indices**: [`State`][crate::types::State] and [`Input`][crate::types::Input]
//!   cannot be mixed up.
//! - **Flexible objectives**: any [`StateSet`][crate::predicate::StateSet] (closures, slices,
//!   hash sets, bit sets, ranges) can serve as a target, avoid, or safe set.
//!
//! ## Basic Usage
//!
//! ```rust
//! use synth_rs::reach::solve_reachability_game;
//! use synth_rs::transition::TransitionBuilder;
//! use synth_rs::types::{Input, State};
//!
//! // 1. Describe the abstraction: 4 states, 1 input, 0 -> 1 -> 2 -> 3 -> 3
//! let mut builder = TransitionBuilder::new(4, 1);
//! builder.add_all([(0, 0, 1), (1, 0, 2), (2, 0, 3), (3, 0, 3)])?;
//! let tf = builder.build()?;
//!
//! // 2. Solve: reach state 3
//! let result = solve_reachability_game(&tf, &|s: State| s.id() == 3)?;
//!
//! // 3. Query the controller
//! assert!(result.domain.is_winning(State::new(0)));
//! assert_eq!(result.domain.witness(State::new(0)), Some(Input::new(0)));
//! assert_eq!(result.value.get(State::new(0)), Some(3));
//! # Ok::<(), synth_rs::error::SynthError>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`transition`]**: sparse transition storage and its builder.
//! - **[`reach`]** and **[`invariance`]**: the game solvers.
//! - **[`domain`]**: the winning domain returned by the solvers.
//! - **[`dot`]**: Graphviz export for inspection.

pub mod bitset;
pub mod domain;
pub mod dot;
pub mod error;
pub mod invariance;
pub mod predicate;
pub mod reach;
pub mod transition;
pub mod types;
pub mod value;
