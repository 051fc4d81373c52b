use crate::error::{CompileError, CompileResult, Resource};

/// Limits on how much work a single compilation may do.
///
/// Subset construction is exponential in the worst case, so untrusted patterns
/// should always be compiled under some budget.
///
/// ```
/// use regex_sim_transformer::Budget;
///
/// let budget = Budget::default().dfa_states(64);
/// assert_eq!(budget.dfa_state_limit(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pattern_len: usize,
    nfa_states: usize,
    dfa_states: usize,
}

impl Budget {
    pub const DEFAULT_PATTERN_LEN: usize = 1_000;
    pub const DEFAULT_NFA_STATES: usize = 10_000;
    pub const DEFAULT_DFA_STATES: usize = 10_000;

    pub fn unlimited() -> Self {
        Self {
            pattern_len: usize::MAX,
            nfa_states: usize::MAX,
            dfa_states: usize::MAX,
        }
    }

    /// Maximum pattern length, in characters.
    pub fn pattern_len(mut self, limit: usize) -> Self {
        self.pattern_len = limit;
        self
    }

    pub fn nfa_states(mut self, limit: usize) -> Self {
        self.nfa_states = limit;
        self
    }

    pub fn dfa_states(mut self, limit: usize) -> Self {
        self.dfa_states = limit;
        self
    }

    pub fn pattern_len_limit(&self) -> usize {
        self.pattern_len
    }

    pub fn nfa_state_limit(&self) -> usize {
        self.nfa_states
    }

    pub fn dfa_state_limit(&self) -> usize {
        self.dfa_states
    }

    pub(crate) fn check(&self, resource: Resource, used: usize) -> CompileResult<()> {
        let limit = match resource {
            Resource::PatternLength => self.pattern_len,
            Resource::NfaStates => self.nfa_states,
            Resource::DfaStates => self.dfa_states,
        };
        if used > limit {
            return Err(CompileError::ResourceExhausted { resource, limit });
        }
        Ok(())
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            pattern_len: Self::DEFAULT_PATTERN_LEN,
            nfa_states: Self::DEFAULT_NFA_STATES,
            dfa_states: Self::DEFAULT_DFA_STATES,
        }
    }
}
