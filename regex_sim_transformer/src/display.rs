use crate::automata::{Automaton, StateId};
use crate::regex::EPSILON;
use derive_getters::Getters;
use itertools::Itertools;
use std::fmt::{Display, Formatter};


/// Printable description of an automaton. Built once by [`format_automaton`] and never changed.
///
/// Symbols are single characters, so `,` is a valid symbol: an alphabet may read
/// `a, ,` and a transition `q0,, → q1`. Split on the first `,` after the state
/// name, not on every comma. `ε` never appears in an alphabet and always means an
/// epsilon move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
pub struct DisplayRecord {
    states: String,
    alphabet: String,
    initial_state: String,
    accepting_states: String,
    /// One `q<src>,<symbol> → q<dst>` line per source and symbol, `\n` separated.
    transitions: String,
}

impl Display for DisplayRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "States: {}", self.states)?;
        writeln!(f, "Alphabet: {}", self.alphabet)?;
        writeln!(f, "Initial_State: {}", self.initial_state)?;
        writeln!(f, "Accepting_States: {}", self.accepting_states)?;
        write!(f, "Transitions:")?;
        for line in self.transitions.lines() {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

fn state_name(id: StateId) -> String {
    format!("q{id}")
}

fn state_list(ids: impl IntoIterator<Item = StateId>) -> String {
    ids.into_iter().map(state_name).join(", ")
}

/// Renders `automaton`. States are listed by ascending id, symbols in the order
/// they were introduced; epsilon moves appear as `ε` ahead of other symbols.
pub fn format_automaton<A: Automaton + ?Sized>(automaton: &A) -> DisplayRecord {
    let transitions = automaton
        .transition_rows()
        .into_iter()
        .map(|row| {
            format!(
                "{},{} → {}",
                state_name(row.from),
                row.symbol.unwrap_or(EPSILON),
                state_list(row.to)
            )
        })
        .join("\n");

    DisplayRecord {
        states: state_list(0..automaton.state_count()),
        alphabet: automaton.alphabet().iter().join(", "),
        initial_state: state_name(automaton.initial()),
        accepting_states: state_list(automaton.accepting_states()),
        transitions,
    }
}
