use crate::budget::Budget;
use crate::error::{CompileResult, Resource};
use crate::regex::Ast;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

pub type StateId = usize;

/// A set of states kept in ascending order, so equal sets compare and hash equal.
pub type StateSet = BTreeSet<StateId>;

/// All transitions leaving `from` on `symbol` (`None` is epsilon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRow {
    pub from: StateId,
    pub symbol: Option<char>,
    pub to: Vec<StateId>,
}

/// Behaviour shared by [`Nfa`] and [`Dfa`](crate::Dfa).
///
/// States are numbered `0..state_count()`.
pub trait Automaton {
    fn state_count(&self) -> usize;

    /// Input symbols in the order they were introduced. Never contains epsilon.
    fn alphabet(&self) -> &[char];

    fn initial(&self) -> StateId;

    fn is_accepting(&self, state: StateId) -> bool;

    /// Set of states live before any input is read.
    fn start(&self) -> StateSet;

    /// Set of states live after reading `symbol` from `from`.
    fn step(&self, from: &StateSet, symbol: char) -> StateSet;

    /// Rows ordered by source state, then epsilon, then symbols in alphabet order.
    fn transition_rows(&self) -> Vec<TransitionRow>;

    fn accepting_states(&self) -> Vec<StateId> {
        (0..self.state_count())
            .filter(|&s| self.is_accepting(s))
            .collect()
    }

    /// Whether the whole of `input` is in the language.
    fn accepts(&self, input: &str) -> bool {
        let mut current = self.start();
        for c in input.chars() {
            if current.is_empty() {
                return false;
            }
            current = self.step(&current, c);
        }
        current.iter().any(|&s| self.is_accepting(s))
    }
}

#[derive(Default, Clone)]
pub(crate) struct NfaState {
    transitions: Vec<(Option<char>, StateId)>,
}

impl NfaState {
    pub(crate) fn add_transition(&mut self, t: Option<char>, d: StateId) {
        self.transitions.push((t, d))
    }
}

impl Debug for NfaState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (t, ns) in &self.transitions {
            if let Some(c) = t {
                writeln!(f, "    {c:?} -> {ns}")?;
            }
            else {
                writeln!(f, "    ε -> {ns}")?;
            }
        }

        Ok(())
    }
}

/// Smallest superset of `seed` closed under the epsilon edges of `states`.
pub(crate) fn closure(states: &[NfaState], seed: &StateSet) -> StateSet {
    let mut closure = seed.clone();
    let mut stack: Vec<StateId> = seed.iter().copied().collect();

    while let Some(s) = stack.pop() {
        for &(t, ns) in &states[s].transitions {
            if t.is_none() && closure.insert(ns) {
                stack.push(ns);
            }
        }
    }

    closure
}

pub(crate) fn move_on(states: &[NfaState], from: &StateSet, symbol: char) -> StateSet {
    from.iter()
        .flat_map(|&s| states[s].transitions.iter())
        .filter(|(t, _)| *t == Some(symbol))
        .map(|&(_, ns)| ns)
        .collect()
}

/// Groups the edges of `states` by source, then epsilon, then `alphabet` order.
pub(crate) fn rows(states: &[NfaState], alphabet: &[char]) -> Vec<TransitionRow> {
    let symbols: Vec<Option<char>> = std::iter::once(None)
        .chain(alphabet.iter().copied().map(Some))
        .collect();

    let mut rows = Vec::new();
    for (from, state) in states.iter().enumerate() {
        for &symbol in &symbols {
            let to: Vec<StateId> = state
                .transitions
                .iter()
                .filter(|(t, _)| *t == symbol)
                .map(|&(_, ns)| ns)
                .collect();
            if !to.is_empty() {
                rows.push(TransitionRow { from, symbol, to });
            }
        }
    }
    rows
}

/// Nondeterministic automaton with epsilon transitions, built by [`to_nfa`].
///
/// Has exactly one initial and one accepting state.
#[derive(Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    alphabet: Vec<char>,
    initial: StateId,
    accepting: StateId,
}

impl Debug for Nfa {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start {} accept {}", self.initial, self.accepting)?;
        for (i, s) in self.states.iter().enumerate() {
            writeln!(f, "{i}:")?;
            write!(f, "{s:?}")?;
        }

        Ok(())
    }
}

impl Nfa {
    /// The single accepting state.
    pub fn accepting(&self) -> StateId {
        self.accepting
    }

    /// Smallest superset of `states` closed under epsilon transitions.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        closure(&self.states, states)
    }

    /// States reached from `states` by exactly one `symbol` transition.
    /// The result is not epsilon-closed.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: char) -> StateSet {
        move_on(&self.states, states, symbol)
    }

    /// Outgoing transitions of `state` in insertion order.
    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = (Option<char>, StateId)> + '_ {
        self.states[state].transitions.iter().copied()
    }
}

impl Automaton for Nfa {
    fn state_count(&self) -> usize {
        self.states.len()
    }

    fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn initial(&self) -> StateId {
        self.initial
    }

    fn is_accepting(&self, state: StateId) -> bool {
        state == self.accepting
    }

    fn start(&self) -> StateSet {
        self.epsilon_closure(&StateSet::from([self.initial]))
    }

    fn step(&self, from: &StateSet, symbol: char) -> StateSet {
        self.epsilon_closure(&self.move_on_symbol(from, symbol))
    }

    fn transition_rows(&self) -> Vec<TransitionRow> {
        rows(&self.states, &self.alphabet)
    }
}

/// Entry and exit of a partially built automaton.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    entry: StateId,
    exit: StateId,
}

struct NfaBuilder {
    states: Vec<NfaState>,
    alphabet: Vec<char>,
    budget: Budget,
}

impl NfaBuilder {
    fn new(budget: Budget) -> Self {
        Self { states: Vec::new(), alphabet: Vec::new(), budget }
    }

    // Checked per state: `+` copies its operand, so nesting grows the NFA exponentially
    fn add_state(&mut self) -> CompileResult<StateId> {
        self.budget.check(Resource::NfaStates, self.states.len() + 1)?;
        self.states.push(NfaState::default());
        Ok(self.states.len() - 1)
    }

    fn epsilon_edge(&mut self, from: StateId, to: StateId) {
        self.states[from].add_transition(None, to);
    }

    fn fragment(&mut self, ast: &Ast) -> CompileResult<Fragment> {
        match ast {
            Ast::Literal(c) => self.literal(*c),
            Ast::Concat(l, r) => {
                let l = self.fragment(l)?;
                let r = self.fragment(r)?;
                Ok(self.concat(l, r))
            }
            Ast::Union(l, r) => {
                let entry = self.add_state()?;
                let l = self.fragment(l)?;
                let r = self.fragment(r)?;
                self.union(entry, l, r)
            }
            Ast::Star(x) => {
                let entry = self.add_state()?;
                let inner = self.fragment(x)?;
                self.star(entry, inner)
            }
            Ast::Plus(x) => {
                let once = self.fragment(x)?;
                let entry = self.add_state()?;
                let inner = self.fragment(x)?;
                let more = self.star(entry, inner)?;
                Ok(self.concat(once, more))
            }
            Ast::Optional(x) => {
                let entry = self.add_state()?;
                let inner = self.fragment(x)?;
                let empty = self.epsilon()?;
                self.union(entry, inner, empty)
            }
            Ast::Epsilon => self.epsilon(),
            Ast::Group(x) => self.fragment(x),
        }
    }

    fn literal(&mut self, c: char) -> CompileResult<Fragment> {
        if !self.alphabet.contains(&c) {
            self.alphabet.push(c);
        }
        let entry = self.add_state()?;
        let exit = self.add_state()?;
        self.states[entry].add_transition(Some(c), exit);
        Ok(Fragment { entry, exit })
    }

    fn epsilon(&mut self) -> CompileResult<Fragment> {
        let entry = self.add_state()?;
        let exit = self.add_state()?;
        self.epsilon_edge(entry, exit);
        Ok(Fragment { entry, exit })
    }

    fn concat(&mut self, l: Fragment, r: Fragment) -> Fragment {
        self.epsilon_edge(l.exit, r.entry);
        Fragment { entry: l.entry, exit: r.exit }
    }

    fn union(&mut self, entry: StateId, l: Fragment, r: Fragment) -> CompileResult<Fragment> {
        let exit = self.add_state()?;
        self.epsilon_edge(entry, l.entry);
        self.epsilon_edge(entry, r.entry);
        self.epsilon_edge(l.exit, exit);
        self.epsilon_edge(r.exit, exit);
        Ok(Fragment { entry, exit })
    }

    fn star(&mut self, entry: StateId, inner: Fragment) -> CompileResult<Fragment> {
        let exit = self.add_state()?;
        self.epsilon_edge(entry, inner.entry);
        self.epsilon_edge(entry, exit);
        self.epsilon_edge(inner.exit, inner.entry);
        self.epsilon_edge(inner.exit, exit);
        Ok(Fragment { entry, exit })
    }
}

/// Compiles `regex` into an NFA by Thompson construction, with no limit on
/// the number of states.
///
/// Every sub-expression gets fresh entry and exit states; ids are never reused.
pub fn to_nfa(regex: Ast) -> Nfa {
    match to_nfa_bounded(&regex, &Budget::unlimited()) {
        Ok(nfa) => nfa,
        Err(e) => unreachable!("unbounded Thompson construction failed: {e}"),
    }
}

/// Like [`to_nfa`], but stops as soon as more than
/// `budget.nfa_state_limit()` states would be allocated.
pub fn to_nfa_bounded(regex: &Ast, budget: &Budget) -> CompileResult<Nfa> {
    let mut builder = NfaBuilder::new(*budget);
    let Fragment { entry, exit } = builder.fragment(regex)?;
    debug_assert!(entry < builder.states.len() && exit < builder.states.len());

    Ok(Nfa {
        states: builder.states,
        alphabet: builder.alphabet,
        initial: entry,
        accepting: exit,
    })
}
