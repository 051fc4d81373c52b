use std::fmt::{Display, Formatter};

pub type CompileResult<T> = Result<T, CompileError>;

/// What made a pattern malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    EmptyPattern,
    UnmatchedOpenParen,
    UnmatchedCloseParen,
    /// A repetition operator with nothing before it to repeat
    DanglingRepetition(char),
    /// A repetition operator applied directly to another repetition (`a**`)
    StackedRepetition(char),
    InvalidSymbol(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    kind: SyntaxErrorKind,
    offset: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    pub fn kind(&self) -> SyntaxErrorKind {
        self.kind
    }

    /// Byte offset of the offending character in the pattern.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SyntaxErrorKind::EmptyPattern => write!(f, "pattern is empty"),
            SyntaxErrorKind::UnmatchedOpenParen => {
                write!(f, "unmatched '(' at offset {}", self.offset)
            }
            SyntaxErrorKind::UnmatchedCloseParen => {
                write!(f, "unmatched ')' at offset {}", self.offset)
            }
            SyntaxErrorKind::DanglingRepetition(c) => {
                write!(f, "'{c}' at offset {} has nothing to repeat", self.offset)
            }
            SyntaxErrorKind::StackedRepetition(c) => {
                write!(f, "'{c}' at offset {} repeats a repetition", self.offset)
            }
            SyntaxErrorKind::InvalidSymbol(c) => {
                write!(f, "symbol {c:?} at offset {} is not allowed", self.offset)
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Regex features that look valid but are not compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    CharacterClass,
    CountedRepetition,
    Escape,
    Wildcard,
    Anchor,
}

impl Construct {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '[' | ']' => Some(Construct::CharacterClass),
            '{' | '}' => Some(Construct::CountedRepetition),
            '\\' => Some(Construct::Escape),
            '.' => Some(Construct::Wildcard),
            '^' | '$' => Some(Construct::Anchor),
            _ => None,
        }
    }
}

impl Display for Construct {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Construct::CharacterClass => "character classes",
            Construct::CountedRepetition => "counted repetition",
            Construct::Escape => "escape sequences",
            Construct::Wildcard => "the '.' wildcard",
            Construct::Anchor => "anchors",
        };
        f.write_str(name)
    }
}

/// A limit from [`Budget`](crate::Budget).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    PatternLength,
    NfaStates,
    DfaStates,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::PatternLength => "pattern length",
            Resource::NfaStates => "NFA state count",
            Resource::DfaStates => "DFA state count",
        };
        f.write_str(name)
    }
}

/// What is wrong with a hand-written automaton definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// A labelled line such as `States:` is absent
    MissingField(&'static str),
    NoStates,
    InvalidStateName(String),
    DuplicateState(String),
    UnknownState(String),
    InvalidSymbol(char),
    /// The alphabet is not a comma separated list of single characters
    MalformedAlphabet,
    /// A transition uses a symbol that is not in the alphabet
    UnknownSymbol(char),
    /// 1-based line number within the transitions
    MalformedTransition(usize),
}

impl Display for DefinitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionError::MissingField(label) => write!(f, "missing field {label:?}"),
            DefinitionError::NoStates => write!(f, "no states defined"),
            DefinitionError::InvalidStateName(name) => write!(f, "invalid state name {name:?}"),
            DefinitionError::DuplicateState(name) => write!(f, "state {name:?} is defined twice"),
            DefinitionError::UnknownState(name) => write!(f, "state {name:?} is not in the states list"),
            DefinitionError::InvalidSymbol(c) => write!(f, "symbol {c:?} is not allowed"),
            DefinitionError::MalformedAlphabet => {
                write!(f, "alphabet must list single characters separated by ','")
            }
            DefinitionError::UnknownSymbol(c) => write!(f, "symbol {c:?} is not in the alphabet"),
            DefinitionError::MalformedTransition(line) => {
                write!(f, "transition line {line} is not of the form `state,symbol → target`")
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Syntax(SyntaxError),
    Unsupported { construct: Construct, offset: usize },
    ResourceExhausted { resource: Resource, limit: usize },
    Definition(DefinitionError),
}

impl CompileError {
    /// Every variant is caused by the pattern itself, never by a fault in the compiler.
    pub fn is_client_error(&self) -> bool {
        match self {
            CompileError::Syntax(_)
            | CompileError::Unsupported { .. }
            | CompileError::ResourceExhausted { .. }
            | CompileError::Definition(_) => true,
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Syntax(e) => write!(f, "syntax error: {e}"),
            CompileError::Unsupported { construct, offset } => {
                write!(f, "unsupported pattern: {construct} (offset {offset})")
            }
            CompileError::ResourceExhausted { resource, limit } => {
                write!(f, "resource exhausted: {resource} exceeds {limit}")
            }
            CompileError::Definition(e) => write!(f, "invalid automaton: {e}"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Syntax(e) => Some(e),
            CompileError::Definition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(e: SyntaxError) -> Self {
        CompileError::Syntax(e)
    }
}

impl From<DefinitionError> for CompileError {
    fn from(e: DefinitionError) -> Self {
        CompileError::Definition(e)
    }
}
