//! Automata written by hand in the layout [`DisplayRecord`] prints.

use crate::automata::{closure, move_on, rows, Automaton, NfaState, StateId, StateSet, TransitionRow};
use crate::display::DisplayRecord;
use crate::error::{CompileError, CompileResult, DefinitionError};
use crate::regex::EPSILON;
use itertools::Itertools;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::char as cchar;
use nom::character::complete::{anychar, space0};
use nom::combinator::peek;
use nom::error::Error;
use nom::multi::{separated_list0, separated_list1};
use nom::sequence::{delimited, preceded, terminated};
use nom::IResult;
use std::str::FromStr;

type NResult<'a, T> = IResult<&'a str, T, Error<&'a str>>;

/// Ready-made definitions as `(name, text)` pairs.
pub const PRESETS: [(&str, &str); 4] = [
    (
        "cycle",
        "States: q0, q1, q2\n\
         Alphabet: 0, 1\n\
         Initial_State: q1\n\
         Accepting_States: q1\n\
         Transitions:\n\
         q0,0 → q2\n\
         q0,1 → q0\n\
         q1,0 → q1\n\
         q1,1 → q2\n\
         q2,0 → q0\n\
         q2,1 → q1",
    ),
    (
        "ends-in-01",
        "States: q0, q1, q2\n\
         Alphabet: 0, 1\n\
         Initial_State: q0\n\
         Accepting_States: q2\n\
         Transitions:\n\
         q0,0 → q0, q1\n\
         q0,1 → q0\n\
         q1,1 → q2",
    ),
    (
        "divisible-by-three",
        "States: r0, r1, r2\n\
         Alphabet: 0, 1\n\
         Initial_State: r0\n\
         Accepting_States: r0\n\
         Transitions:\n\
         r0,0 → r0\n\
         r0,1 → r1\n\
         r1,0 → r2\n\
         r1,1 → r0\n\
         r2,0 → r1\n\
         r2,1 → r2",
    ),
    (
        "even-zeros",
        "States: even, odd\n\
         Alphabet: 0, 1\n\
         Initial_State: even\n\
         Accepting_States: even\n\
         Transitions:\n\
         even,0 → odd\n\
         even,1 → even\n\
         odd,0 → even\n\
         odd,1 → odd",
    ),
];

/// Text of the preset called `name`.
pub fn preset(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, text)| text)
}

/// An automaton with named states and any number of accepting states.
///
/// Transitions may be nondeterministic and may use `ε` for epsilon moves.
/// State ids follow the order of the `States` list.
#[derive(Debug, Clone)]
pub struct AutomatonDefinition {
    names: Vec<String>,
    alphabet: Vec<char>,
    initial: StateId,
    accepting: Vec<bool>,
    states: Vec<NfaState>,
}

impl AutomatonDefinition {
    /// Builds a definition from its five fields, each written the way
    /// [`format_automaton`](crate::format_automaton) writes it.
    ///
    /// Transition lines read `state,symbol → target, target`; `->` is accepted
    /// in place of `→`.
    pub fn from_fields(
        states: &str,
        alphabet: &str,
        initial: &str,
        accepting_states: &str,
        transitions: &str,
    ) -> CompileResult<Self> {
        let names = state_names(states)?;
        let alphabet = symbols(alphabet)?;
        let lookup = |name: &str| {
            names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| DefinitionError::UnknownState(name.to_string()))
        };

        let initial = match initial.trim() {
            "" => return Err(DefinitionError::MissingField("Initial_State").into()),
            name => lookup(name)?,
        };

        let mut accepting = vec![false; names.len()];
        for name in list(accepting_states) {
            accepting[lookup(name)?] = true;
        }

        let mut edges = vec![NfaState::default(); names.len()];
        for (i, line) in transitions.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Ok(("", (from, symbol, targets))) = transition_line(line) else {
                return Err(DefinitionError::MalformedTransition(i + 1).into());
            };

            let from = lookup(from)?;
            let symbol = if symbol == EPSILON {
                None
            }
            else if alphabet.contains(&symbol) {
                Some(symbol)
            }
            else {
                return Err(DefinitionError::UnknownSymbol(symbol).into());
            };
            for target in targets {
                edges[from].add_transition(symbol, lookup(target)?);
            }
        }

        Ok(Self {
            names,
            alphabet,
            initial,
            accepting,
            states: edges,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, state: StateId) -> &str {
        &self.names[state]
    }

    /// No epsilon moves and at most one target per state and symbol.
    pub fn is_deterministic(&self) -> bool {
        self.transition_rows()
            .iter()
            .all(|row| row.symbol.is_some() && row.to.len() == 1)
    }
}

impl Automaton for AutomatonDefinition {
    fn state_count(&self) -> usize {
        self.names.len()
    }

    fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn initial(&self) -> StateId {
        self.initial
    }

    fn is_accepting(&self, state: StateId) -> bool {
        self.accepting[state]
    }

    fn start(&self) -> StateSet {
        closure(&self.states, &StateSet::from([self.initial]))
    }

    fn step(&self, from: &StateSet, symbol: char) -> StateSet {
        closure(&self.states, &move_on(&self.states, from, symbol))
    }

    fn transition_rows(&self) -> Vec<TransitionRow> {
        rows(&self.states, &self.alphabet)
    }
}

/// Parses the labelled text printed by `Display for DisplayRecord`.
impl FromStr for AutomatonDefinition {
    type Err = CompileError;

    fn from_str(text: &str) -> CompileResult<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let states = field(&mut lines, "States:")?;
        let alphabet = field(&mut lines, "Alphabet:")?;
        let initial = field(&mut lines, "Initial_State:")?;
        let accepting = field(&mut lines, "Accepting_States:")?;
        let inline = field(&mut lines, "Transitions:")?;

        let transitions = std::iter::once(inline)
            .filter(|l| !l.trim().is_empty())
            .chain(lines)
            .join("\n");
        Self::from_fields(states, alphabet, initial, accepting, &transitions)
    }
}

impl TryFrom<&DisplayRecord> for AutomatonDefinition {
    type Error = CompileError;

    fn try_from(record: &DisplayRecord) -> CompileResult<Self> {
        Self::from_fields(
            record.states(),
            record.alphabet(),
            record.initial_state(),
            record.accepting_states(),
            record.transitions(),
        )
    }
}

fn field<'a>(lines: &mut impl Iterator<Item = &'a str>, label: &'static str) -> CompileResult<&'a str> {
    lines
        .next()
        .and_then(|line| line.trim_start().strip_prefix(label))
        .ok_or_else(|| DefinitionError::MissingField(label).into())
}

fn list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn state_names(text: &str) -> CompileResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for name in list(text) {
        if !matches!(state_name(name), Ok(("", _))) {
            return Err(DefinitionError::InvalidStateName(name.to_string()).into());
        }
        if names.iter().any(|n| n == name) {
            return Err(DefinitionError::DuplicateState(name.to_string()).into());
        }
        names.push(name.to_string());
    }

    if names.is_empty() {
        return Err(DefinitionError::NoStates.into());
    }
    Ok(names)
}

fn symbols(text: &str) -> CompileResult<Vec<char>> {
    let parsed: NResult<'_, Vec<char>> = separated_list0(separator, anychar)(text.trim());
    let Ok(("", listed)) = parsed else {
        return Err(DefinitionError::MalformedAlphabet.into());
    };

    let mut alphabet = Vec::with_capacity(listed.len());
    for c in listed {
        if c == EPSILON || c.is_control() || c.is_whitespace() {
            return Err(DefinitionError::InvalidSymbol(c).into());
        }
        if !alphabet.contains(&c) {
            alphabet.push(c);
        }
    }
    Ok(alphabet)
}

fn state_name(input: &str) -> NResult<'_, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn arrow(input: &str) -> NResult<'_, &str> {
    alt((tag("→"), tag("->")))(input)
}

fn separator(input: &str) -> NResult<'_, char> {
    delimited(space0, cchar(','), space0)(input)
}

fn transition_line(input: &str) -> NResult<'_, (&str, char, Vec<&str>)> {
    let (r, from) = preceded(space0, state_name)(input)?;
    let (r, _) = preceded(space0, cchar(','))(r)?;
    // The symbol directly after the comma wins if an arrow follows it, so `,` and
    // `-` still work as symbols
    let (r, symbol) = alt((
        terminated(anychar, peek(preceded(space0, arrow))),
        preceded(space0, anychar),
    ))(r)?;
    let (r, _) = delimited(space0, arrow, space0)(r)?;
    let (r, targets) = separated_list1(separator, state_name)(r)?;
    let (r, _) = space0(r)?;

    Ok((r, (from, symbol, targets)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::to_nfa;
    use crate::dfa::to_dfa;
    use crate::display::format_automaton;
    use crate::regex::parse_regex;
    use crate::simulate::Simulation;

    fn load(name: &str) -> AutomatonDefinition {
        preset(name).unwrap().parse().unwrap()
    }

    fn definition_error(text: &str) -> DefinitionError {
        match text.parse::<AutomatonDefinition>() {
            Err(CompileError::Definition(e)) => e,
            other => panic!("expected a definition error, got {other:?}"),
        }
    }

    const TWO_STATES: &str = "States: s, t\nAlphabet: a\nInitial_State: s\nAccepting_States: t\nTransitions:\n";

    #[test]
    fn presets_parse() {
        for (name, _) in PRESETS {
            assert!(load(name).state_count() > 0, "{name}");
        }
        assert!(preset("missing").is_none());
        assert!(load("cycle").is_deterministic());
        assert!(!load("ends-in-01").is_deterministic());
    }

    #[test]
    fn divisible_by_three() {
        let dfa = load("divisible-by-three");
        for accepted in ["", "0", "11", "110", "1001"] {
            assert!(dfa.accepts(accepted), "{accepted:?}");
        }
        for rejected in ["1", "10", "111", "2"] {
            assert!(!dfa.accepts(rejected), "{rejected:?}");
        }
    }

    #[test]
    fn named_states_keep_their_order() {
        let dfa = load("even-zeros");
        assert_eq!(dfa.names(), &["even", "odd"]);
        assert_eq!(dfa.name(dfa.initial()), "even");
        assert!(dfa.accepts("0101"));
        assert!(!dfa.accepts("0"));
    }

    #[test]
    fn nondeterministic_preset_simulates() {
        let nfa = load("ends-in-01");
        let mut sim = Simulation::new(&nfa, "1101");
        assert!(sim.run());
        assert_eq!(sim.history()[1], StateSet::from([0]));
        assert_eq!(sim.history()[3], StateSet::from([0, 1]));
        assert!(!Simulation::new(&nfa, "10").run());
    }

    #[test]
    fn cycle_starts_in_the_middle() {
        let dfa = load("cycle");
        assert_eq!(dfa.initial(), 1);
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("11"));
        assert!(!dfa.accepts("1"));
    }

    #[test]
    fn records_read_back_unchanged() {
        for pattern in ["(a|b)*abb", "a|", "a,b*", "(ab|b)*a?", "()"] {
            let nfa = to_nfa(parse_regex(pattern).unwrap());
            let dfa = to_dfa(&nfa);
            for record in [format_automaton(&nfa), format_automaton(&dfa)] {
                let from_record = AutomatonDefinition::try_from(&record).unwrap();
                assert_eq!(format_automaton(&from_record), record, "{pattern:?}");
                let from_text: AutomatonDefinition = record.to_string().parse().unwrap();
                assert_eq!(format_automaton(&from_text), record, "{pattern:?}");
            }

            let reread = AutomatonDefinition::try_from(&format_automaton(&nfa)).unwrap();
            for input in ["", "a", "ab", "abb", "babb", "a,", "a,bb", "ba"] {
                assert_eq!(reread.accepts(input), nfa.accepts(input), "{pattern:?} on {input:?}");
            }
        }
    }

    #[test]
    fn epsilon_moves_and_ascii_arrows() {
        let text = "States: s, t, u\nAlphabet: a\nInitial_State: s\nAccepting_States: u\n\
                    Transitions:\n  s , ε -> t\n  t,a->u";
        let nfa: AutomatonDefinition = text.parse().unwrap();
        assert!(!nfa.is_deterministic());
        assert_eq!(nfa.start(), StateSet::from([0, 1]));
        assert!(nfa.accepts("a"));
        assert!(!nfa.accepts(""));
    }

    #[test]
    fn symbols_that_look_like_punctuation() {
        let text = "States: s, t\nAlphabet: -, ,\nInitial_State: s\nAccepting_States: t\n\
                    Transitions:\ns,- -> t\nt,, → s";
        let nfa: AutomatonDefinition = text.parse().unwrap();
        assert_eq!(nfa.alphabet(), &['-', ',']);
        assert!(nfa.accepts("-,-"));
    }

    #[test]
    fn rejected_definitions() {
        assert_eq!(definition_error("Alphabet: a"), DefinitionError::MissingField("States:"));
        assert_eq!(
            definition_error(&format!("{TWO_STATES}s,a → x")),
            DefinitionError::UnknownState("x".to_string())
        );
        assert_eq!(
            definition_error(&format!("{TWO_STATES}s,b → t")),
            DefinitionError::UnknownSymbol('b')
        );
        assert_eq!(
            definition_error(&format!("{TWO_STATES}s,a → t\ns a t")),
            DefinitionError::MalformedTransition(2)
        );
        assert_eq!(
            definition_error(&TWO_STATES.replace("s, t", "s, s")),
            DefinitionError::DuplicateState("s".to_string())
        );
        assert_eq!(
            definition_error(&TWO_STATES.replace("s, t", "s, t!")),
            DefinitionError::InvalidStateName("t!".to_string())
        );
        assert_eq!(
            definition_error(&TWO_STATES.replace("Alphabet: a", "Alphabet: a, ε")),
            DefinitionError::InvalidSymbol('ε')
        );
        assert_eq!(
            definition_error(&TWO_STATES.replace("Alphabet: a", "Alphabet: ab")),
            DefinitionError::MalformedAlphabet
        );
        assert_eq!(
            AutomatonDefinition::from_fields("", "a", "q0", "", "").unwrap_err(),
            CompileError::Definition(DefinitionError::NoStates)
        );
    }
}
