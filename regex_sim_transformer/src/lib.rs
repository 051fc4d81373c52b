//! Compiles regular expressions into explicit finite automata.
//!
//! The pipeline is [`to_regex`] (parse), [`to_nfa`] (Thompson construction),
//! [`to_dfa`] (subset construction) and [`format_automaton`] (rendering).
//! [`compile_regex`] runs all of it under a default [`Budget`].
//! [`AutomatonDefinition`] reads a rendered or hand-written automaton back in,
//! so it can be simulated like a compiled one.
//!
//! ```
//! let compiled = regex_sim_transformer::compile_regex("(a|b)*abb").unwrap();
//! assert_eq!(compiled.dfa.states(), "q0, q1, q2, q3, q4");
//! assert_eq!(compiled.dfa.accepting_states(), "q4");
//! ```

use log::debug;

mod automata;
mod budget;
mod definition;
mod dfa;
mod display;
mod error;
pub mod regex;
mod simulate;

pub use crate::automata::{to_nfa, to_nfa_bounded, Automaton, Nfa, StateId, StateSet, TransitionRow};
pub use crate::budget::Budget;
pub use crate::definition::{preset, AutomatonDefinition, PRESETS};
pub use crate::dfa::{to_dfa, to_dfa_bounded, Dfa, DfaState};
pub use crate::display::{format_automaton, DisplayRecord};
pub use crate::error::{
    CompileError, CompileResult, Construct, DefinitionError, Resource, SyntaxError, SyntaxErrorKind,
};
pub use crate::regex::Ast;
pub use crate::simulate::{Move, Simulation};

/// Display records for both automata of one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRegex {
    pub nfa: DisplayRecord,
    pub dfa: DisplayRecord,
}

/// Both automata of one pattern.
#[derive(Debug, Clone)]
pub struct Automata {
    pub nfa: Nfa,
    pub dfa: Dfa,
}

pub fn to_regex(pattern: &str) -> CompileResult<Ast> {
    crate::regex::parse_regex(pattern)
}

/// Builds the NFA and DFA for `regex`.
pub fn to_automata(regex: Ast) -> Automata {
    let nfa = to_nfa(regex);
    let dfa = to_dfa(&nfa);
    Automata { nfa, dfa }
}

/// Parses, builds and determinizes `pattern`, enforcing `budget`.
pub fn build_automata(pattern: &str, budget: &Budget) -> CompileResult<Automata> {
    budget.check(Resource::PatternLength, pattern.chars().count())?;
    let regex = to_regex(pattern)?;
    debug!("parsed {pattern:?} as {regex}");

    let nfa = to_nfa_bounded(&regex, budget)?;
    debug!("built NFA with {} states", nfa.state_count());

    let dfa = to_dfa_bounded(&nfa, budget)?;
    Ok(Automata { nfa, dfa })
}

pub fn compile_regex(pattern: &str) -> CompileResult<CompiledRegex> {
    compile_regex_with(pattern, &Budget::default())
}

pub fn compile_regex_with(pattern: &str, budget: &Budget) -> CompileResult<CompiledRegex> {
    let Automata { nfa, dfa } = build_automata(pattern, budget)?;
    Ok(CompiledRegex {
        nfa: format_automaton(&nfa),
        dfa: format_automaton(&dfa),
    })
}
