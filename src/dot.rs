//! Transition function to DOT (Graphviz) conversion.
//!
//! Meant for eyeballing small abstractions and the controllers synthesized on
//! them. The generated digraph follows these conventions:
//! - **States** are nodes labelled `s<i>`; winning states are filled
//! - **Transitions** are edges labelled with their input `u<j>`
//! - **Witness edges** (the input a winning domain picks at a state) are bold
//!
//! # Examples
//!
//! ```
//! use synth_rs::invariance::solve_invariance_game;
//! use synth_rs::predicate::Everything;
//! use synth_rs::transition::TransitionBuilder;
//!
//! let mut builder = TransitionBuilder::new(2, 1);
//! builder.add_all([(0, 0, 1), (1, 0, 1)])?;
//! let tf = builder.build()?;
//! let domain = solve_invariance_game(&tf, &Everything)?;
//!
//! let dot = tf.to_dot(Some(&domain)).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! # Ok::<(), synth_rs::error::SynthError>(())
//! ```

use std::fmt::Write as _;

use crate::domain::WinningDomain;
use crate::transition::TransitionFunction;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for state nodes (default: "circle")
    pub node_shape: &'static str,
    /// Fill color for winning states (default: "palegreen")
    pub winning_color: &'static str,
    /// Fill color for losing states, when a domain is given (default: "lightpink")
    pub losing_color: &'static str,
    /// Style for witness edges (default: "bold")
    pub witness_edge_style: &'static str,
    /// Style for all other edges (default: "solid")
    pub edge_style: &'static str,
    /// Graph layout direction (default: "LR")
    pub rankdir: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            winning_color: "palegreen",
            losing_color: "lightpink",
            witness_edge_style: "bold",
            edge_style: "solid",
            rankdir: "LR",
        }
    }
}

impl TransitionFunction {
    /// Converts the transition function to DOT format, highlighting `domain` if given.
    pub fn to_dot(&self, domain: Option<&WinningDomain>) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(domain, &DotConfig::default())
    }

    /// Converts the transition function to DOT format with custom configuration.
    ///
    /// Edges are emitted grouped by target state, since that is how the
    /// relation is stored.
    pub fn to_dot_with_config(
        &self,
        domain: Option<&WinningDomain>,
        config: &DotConfig,
    ) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir={};", config.rankdir)?;
        writeln!(dot, "node [shape={}];", config.node_shape)?;

        for state in self.states() {
            match domain {
                Some(domain) => {
                    let color = if domain.is_winning(state) {
                        config.winning_color
                    } else {
                        config.losing_color
                    };
                    writeln!(
                        dot,
                        "{} [label=\"{}\", style=filled, fillcolor={}];",
                        state.id(),
                        state,
                        color
                    )?;
                }
                None => writeln!(dot, "{} [label=\"{}\"];", state.id(), state)?,
            }
        }

        for post in self.states() {
            for input in self.inputs() {
                for &pre in self.pre_slice(post, input) {
                    let style = match domain {
                        Some(domain) if domain.witness(pre) == Some(input) => config.witness_edge_style,
                        _ => config.edge_style,
                    };
                    writeln!(
                        dot,
                        "{} -> {} [label=\"{}\", style={}];",
                        pre.id(),
                        post.id(),
                        input,
                        style
                    )?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
