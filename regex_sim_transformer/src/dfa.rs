//! Subset construction.

use crate::automata::{Automaton, Nfa, StateId, StateSet, TransitionRow};
use crate::budget::Budget;
use crate::error::{CompileResult, Resource};
use derive_getters::Getters;
use indexmap::IndexSet;
use log::{debug, trace};

/// One DFA state and the NFA states it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct DfaState {
    subset: StateSet,
    accepting: bool,
    /// Outgoing transitions in alphabet order. Symbols with no target are absent.
    transitions: Vec<(char, StateId)>,
}

/// Deterministic automaton produced by [`to_dfa`].
///
/// State `0` is the initial state and ids follow discovery order. The
/// transition function is partial: a missing entry rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<DfaState>,
    alphabet: Vec<char>,
}

impl Dfa {
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.states[state]
            .transitions
            .iter()
            .find(|(c, _)| *c == symbol)
            .map(|&(_, ns)| ns)
    }
}

impl Automaton for Dfa {
    fn state_count(&self) -> usize {
        self.states.len()
    }

    fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn initial(&self) -> StateId {
        0
    }

    fn is_accepting(&self, state: StateId) -> bool {
        self.states[state].accepting
    }

    fn start(&self) -> StateSet {
        StateSet::from([0])
    }

    fn step(&self, from: &StateSet, symbol: char) -> StateSet {
        from.iter()
            .filter_map(|&s| self.transition(s, symbol))
            .collect()
    }

    fn transition_rows(&self) -> Vec<TransitionRow> {
        self.states
            .iter()
            .enumerate()
            .flat_map(|(from, state)| {
                state.transitions.iter().map(move |&(c, ns)| TransitionRow {
                    from,
                    symbol: Some(c),
                    to: vec![ns],
                })
            })
            .collect()
    }
}

/// Determinizes `nfa` with no limit on the number of states.
pub fn to_dfa(nfa: &Nfa) -> Dfa {
    match to_dfa_bounded(nfa, &Budget::unlimited()) {
        Ok(dfa) => dfa,
        Err(e) => unreachable!("unbounded subset construction failed: {e}"),
    }
}

/// Determinizes `nfa`, failing once more than `budget.dfa_state_limit()`
/// distinct subsets have been discovered.
pub fn to_dfa_bounded(nfa: &Nfa, budget: &Budget) -> CompileResult<Dfa> {
    // Index in the set is the DFA state id
    let mut subsets: IndexSet<StateSet> = IndexSet::new();
    let mut transitions: Vec<Vec<(char, StateId)>> = Vec::new();

    subsets.insert(nfa.start());
    budget.check(Resource::DfaStates, subsets.len())?;

    let mut next = 0;
    while next < subsets.len() {
        let targets: Vec<(char, StateSet)> = nfa
            .alphabet()
            .iter()
            .map(|&symbol| (symbol, nfa.step(&subsets[next], symbol)))
            .filter(|(_, target)| !target.is_empty())
            .collect();

        let mut row = Vec::with_capacity(targets.len());
        for (symbol, target) in targets {
            let (id, added) = subsets.insert_full(target);
            if added {
                budget.check(Resource::DfaStates, subsets.len())?;
                trace!("subset {id} = {:?}", subsets[id]);
            }
            row.push((symbol, id));
        }
        transitions.push(row);
        next += 1;
    }

    let accept = nfa.accepting();
    let states: Vec<DfaState> = subsets
        .into_iter()
        .zip(transitions)
        .map(|(subset, transitions)| DfaState {
            accepting: subset.contains(&accept),
            subset,
            transitions,
        })
        .collect();
    debug!("determinized {} NFA states into {} DFA states", nfa.state_count(), states.len());

    Ok(Dfa {
        states,
        alphabet: nfa.alphabet().to_vec(),
    })
}
