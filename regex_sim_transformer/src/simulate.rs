use crate::automata::{Automaton, StateId, StateSet};

/// A transition observed while simulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: StateId,
    pub symbol: char,
    pub to: StateId,
}

/// Runs an automaton over an input one symbol at a time, keeping the live
/// state set after every step.
#[derive(Debug)]
pub struct Simulation<'a, A: Automaton + ?Sized> {
    automaton: &'a A,
    input: Vec<char>,
    position: usize,
    history: Vec<StateSet>,
    last_move: Option<Move>,
    complete: bool,
    accepted: bool,
}

impl<'a, A: Automaton + ?Sized> Simulation<'a, A> {
    pub fn new(automaton: &'a A, input: &str) -> Self {
        Self {
            automaton,
            input: input.chars().collect(),
            position: 0,
            history: vec![automaton.start()],
            last_move: None,
            complete: false,
            accepted: false,
        }
    }

    /// Number of symbols consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> &StateSet {
        // history always holds the start set
        &self.history[self.history.len() - 1]
    }

    /// State sets after each step, starting with the start set.
    pub fn history(&self) -> &[StateSet] {
        &self.history
    }

    /// Last symbol transition taken, from the lowest live source to its lowest target.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Only meaningful once [`is_complete`](Self::is_complete) is true.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Consumes one symbol. Returns `false` once the simulation is complete.
    ///
    /// The simulation completes when the input is exhausted or no state is
    /// live any more.
    pub fn step(&mut self) -> bool {
        if self.complete {
            return false;
        }

        let Some(&symbol) = self.input.get(self.position) else {
            self.finish();
            return false;
        };

        let current = self.current().clone();
        let next = self.automaton.step(&current, symbol);
        self.last_move = current.iter().find_map(|&from| {
            let to = self.automaton.step(&StateSet::from([from]), symbol);
            to.first().map(|&to| Move { from, symbol, to })
        });
        self.position += 1;
        self.history.push(next);

        if self.current().is_empty() || self.position == self.input.len() {
            self.finish();
        }
        true
    }

    /// Steps until complete and returns whether the input was accepted.
    pub fn run(&mut self) -> bool {
        while self.step() {}
        self.accepted
    }

    fn finish(&mut self) {
        self.complete = true;
        self.accepted = self.position == self.input.len()
            && self.current().iter().any(|&s| self.automaton.is_accepting(s));
    }
}
