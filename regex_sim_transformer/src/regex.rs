use crate::error::{CompileError, CompileResult, Construct, SyntaxError, SyntaxErrorKind};
use nom::character::complete::char as cchar;
use nom::character::complete::{anychar, one_of};
use nom::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const EPSILON: char = 'ε';

type PResult<'a, T> = CompileResult<(&'a str, T)>;

/// Parsed regular expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Literal(char),
    Concat(Box<Ast>, Box<Ast>),
    Union(Box<Ast>, Box<Ast>),
    Star(Box<Ast>),
    /// One or more; compiled as `Concat(inner, Star(inner))`
    Plus(Box<Ast>),
    /// Zero or one; compiled as `Union(inner, Epsilon)`
    Optional(Box<Ast>),
    Epsilon,
    /// Parenthesised sub-expression. Transparent to compilation.
    Group(Box<Ast>),
}

impl Ast {
    pub fn concat(left: Ast, right: Ast) -> Ast {
        Ast::Concat(Box::new(left), Box::new(right))
    }

    pub fn union(left: Ast, right: Ast) -> Ast {
        Ast::Union(Box::new(left), Box::new(right))
    }

    pub fn star(inner: Ast) -> Ast {
        Ast::Star(Box::new(inner))
    }

    pub fn plus(inner: Ast) -> Ast {
        Ast::Plus(Box::new(inner))
    }

    pub fn optional(inner: Ast) -> Ast {
        Ast::Optional(Box::new(inner))
    }

    pub fn group(inner: Ast) -> Ast {
        Ast::Group(Box::new(inner))
    }

    fn is_repetition(&self) -> bool {
        matches!(self, Ast::Star(_) | Ast::Plus(_) | Ast::Optional(_))
    }

    /// Binding strength when rendered: union < concatenation < postfix < atom.
    fn precedence(&self) -> u8 {
        match self {
            Ast::Union(_, _) => 0,
            Ast::Concat(_, _) => 1,
            Ast::Star(_) | Ast::Plus(_) | Ast::Optional(_) => 2,
            Ast::Literal(_) | Ast::Epsilon | Ast::Group(_) => 3,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min: u8) -> std::fmt::Result {
        // An empty operand under a postfix operator would read as a dangling one
        let needs_parens = self.precedence() < min || (min == 3 && *self == Ast::Epsilon);
        if needs_parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ast::Literal(c) => write!(f, "{c}"),
            Ast::Concat(l, r) => {
                l.fmt_operand(f, 1)?;
                r.fmt_operand(f, 2)
            }
            Ast::Union(l, r) => {
                l.fmt_operand(f, 0)?;
                f.write_str("|")?;
                r.fmt_operand(f, 1)
            }
            Ast::Star(x) => {
                x.fmt_operand(f, 3)?;
                f.write_str("*")
            }
            Ast::Plus(x) => {
                x.fmt_operand(f, 3)?;
                f.write_str("+")
            }
            Ast::Optional(x) => {
                x.fmt_operand(f, 3)?;
                f.write_str("?")
            }
            Ast::Epsilon => Ok(()),
            Ast::Group(x) => write!(f, "({x})"),
        }
    }
}

/// Parses `pattern` into an [`Ast`].
///
/// Precedence from loosest to tightest: `|`, implicit concatenation, the postfix
/// operators `*`, `+` and `?`. Alternation and concatenation associate to the left.
pub fn parse_regex(pattern: &str) -> CompileResult<Ast> {
    if pattern.is_empty() {
        return Err(SyntaxError::new(SyntaxErrorKind::EmptyPattern, 0).into());
    }

    let parser = Parser { pattern };
    let (rest, ast) = parser.alternation(pattern)?;

    // alternation only stops early at a ')' it did not open
    if let Ok((_, _)) = cchar::<_, Error<_>>(')')(rest) {
        return Err(parser.syntax(SyntaxErrorKind::UnmatchedCloseParen, rest));
    }
    debug_assert!(rest.is_empty());

    Ok(ast)
}

struct Parser<'a> {
    pattern: &'a str,
}

impl<'a> Parser<'a> {
    fn offset(&self, rest: &str) -> usize {
        self.pattern.len() - rest.len()
    }

    fn syntax(&self, kind: SyntaxErrorKind, rest: &str) -> CompileError {
        SyntaxError::new(kind, self.offset(rest)).into()
    }

    fn alternation(&self, input: &'a str) -> PResult<'a, Ast> {
        let (mut rm, mut ast) = self.concatenation(input)?;

        while let Ok((r, _)) = cchar::<_, Error<_>>('|')(rm) {
            let (r, rhs) = self.concatenation(r)?;
            ast = Ast::union(ast, rhs);
            rm = r;
        }

        Ok((rm, ast))
    }

    fn concatenation(&self, input: &'a str) -> PResult<'a, Ast> {
        let mut rm = input;
        let mut ast: Option<Ast> = None;

        loop {
            match rm.chars().next() {
                None | Some('|') | Some(')') => break,
                Some(_) => {
                    let (r, next) = self.repetition(rm)?;
                    rm = r;
                    ast = Some(match ast {
                        Some(prev) => Ast::concat(prev, next),
                        None => next,
                    });
                }
            }
        }

        Ok((rm, ast.unwrap_or(Ast::Epsilon)))
    }

    fn repetition(&self, input: &'a str) -> PResult<'a, Ast> {
        let (mut rm, mut ast) = self.atom(input)?;

        if let Ok((r, op)) = one_of::<_, _, Error<_>>("*+?")(rm) {
            ast = match op {
                '*' => Ast::star(ast),
                '+' => Ast::plus(ast),
                _ => Ast::optional(ast),
            };
            rm = r;

            if let Ok((_, again)) = one_of::<_, _, Error<_>>("*+?")(rm) {
                debug_assert!(ast.is_repetition());
                return Err(self.syntax(SyntaxErrorKind::StackedRepetition(again), rm));
            }
        }

        Ok((rm, ast))
    }

    fn atom(&self, input: &'a str) -> PResult<'a, Ast> {
        let Ok((r, base_char)) = anychar::<_, Error<_>>(input) else {
            unreachable!("atom is only called on non-empty input");
        };

        match base_char {
            '(' => {
                let (r, inner) = self.alternation(r)?;
                match cchar::<_, Error<_>>(')')(r) {
                    Ok((r, _)) => Ok((r, Ast::group(inner))),
                    Err(_) => Err(self.syntax(SyntaxErrorKind::UnmatchedOpenParen, input)),
                }
            }
            '*' | '+' | '?' => Err(self.syntax(SyntaxErrorKind::DanglingRepetition(base_char), input)),
            // ε marks epsilon moves in rendered automata
            c if c.is_control() || c == EPSILON => Err(self.syntax(SyntaxErrorKind::InvalidSymbol(c), input)),
            c => match Construct::from_char(c) {
                Some(construct) => Err(CompileError::Unsupported {
                    construct,
                    offset: self.offset(input),
                }),
                None => Ok((r, Ast::Literal(c))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Ast {
        Ast::Literal(c)
    }

    fn syntax_kind(pattern: &str) -> SyntaxErrorKind {
        match parse_regex(pattern) {
            Err(CompileError::Syntax(e)) => e.kind(),
            other => panic!("expected a syntax error for {pattern:?}, got {other:?}"),
        }
    }

    #[test]
    fn concatenation_is_left_associative() {
        assert_eq!(
            parse_regex("abc").unwrap(),
            Ast::concat(Ast::concat(lit('a'), lit('b')), lit('c'))
        );
    }

    #[test]
    fn alternation_binds_loosest() {
        assert_eq!(
            parse_regex("ab|c|d").unwrap(),
            Ast::union(
                Ast::union(Ast::concat(lit('a'), lit('b')), lit('c')),
                lit('d')
            )
        );
    }

    #[test]
    fn postfix_binds_tightest() {
        assert_eq!(
            parse_regex("ab*").unwrap(),
            Ast::concat(lit('a'), Ast::star(lit('b')))
        );
        assert_eq!(
            parse_regex("a+|b?").unwrap(),
            Ast::union(Ast::plus(lit('a')), Ast::optional(lit('b')))
        );
    }

    #[test]
    fn groups_are_kept() {
        assert_eq!(
            parse_regex("(a|b)*abb").unwrap(),
            Ast::concat(
                Ast::concat(
                    Ast::concat(
                        Ast::star(Ast::group(Ast::union(lit('a'), lit('b')))),
                        lit('a')
                    ),
                    lit('b')
                ),
                lit('b')
            )
        );
    }

    #[test]
    fn empty_branches_are_epsilon() {
        assert_eq!(parse_regex("a|").unwrap(), Ast::union(lit('a'), Ast::Epsilon));
        assert_eq!(parse_regex("()").unwrap(), Ast::group(Ast::Epsilon));
    }

    #[test]
    fn malformed_patterns() {
        assert_eq!(syntax_kind(""), SyntaxErrorKind::EmptyPattern);
        assert_eq!(syntax_kind("("), SyntaxErrorKind::UnmatchedOpenParen);
        assert_eq!(syntax_kind("(a(b)"), SyntaxErrorKind::UnmatchedOpenParen);
        assert_eq!(syntax_kind("a)"), SyntaxErrorKind::UnmatchedCloseParen);
        assert_eq!(syntax_kind("*a"), SyntaxErrorKind::DanglingRepetition('*'));
        assert_eq!(syntax_kind("a|+"), SyntaxErrorKind::DanglingRepetition('+'));
        assert_eq!(syntax_kind("(?)"), SyntaxErrorKind::DanglingRepetition('?'));
        assert_eq!(syntax_kind("a**"), SyntaxErrorKind::StackedRepetition('*'));
        assert_eq!(syntax_kind("a\tb"), SyntaxErrorKind::InvalidSymbol('\t'));
        assert_eq!(syntax_kind("aε"), SyntaxErrorKind::InvalidSymbol('ε'));
    }

    #[test]
    fn repetition_cannot_follow_repetition() {
        assert_eq!(syntax_kind("a+?"), SyntaxErrorKind::StackedRepetition('?'));
        assert_eq!(syntax_kind("a?*"), SyntaxErrorKind::StackedRepetition('*'));
        assert_eq!(syntax_kind("a*+"), SyntaxErrorKind::StackedRepetition('+'));
        let Err(CompileError::Syntax(e)) = parse_regex("(a)**") else { panic!() };
        assert_eq!(e.kind(), SyntaxErrorKind::StackedRepetition('*'));
        assert_eq!(e.offset(), 4);
    }

    #[test]
    fn repetition_of_a_group_is_allowed() {
        assert_eq!(
            parse_regex("(a*)*").unwrap(),
            Ast::star(Ast::group(Ast::star(lit('a'))))
        );
        assert_eq!(
            parse_regex("(a+)?").unwrap(),
            Ast::optional(Ast::group(Ast::plus(lit('a'))))
        );
    }

    #[test]
    fn error_offsets_point_at_the_culprit() {
        let Err(CompileError::Syntax(e)) = parse_regex("ab(c") else { panic!() };
        assert_eq!(e.offset(), 2);
        let Err(CompileError::Syntax(e)) = parse_regex("ab)") else { panic!() };
        assert_eq!(e.offset(), 2);
        let Err(CompileError::Syntax(e)) = parse_regex("é**") else { panic!() };
        assert_eq!(e.offset(), 3);
    }

    #[test]
    fn unsupported_constructs() {
        assert_eq!(
            parse_regex("a[bc]"),
            Err(CompileError::Unsupported { construct: Construct::CharacterClass, offset: 1 })
        );
        assert_eq!(
            parse_regex("a{2}"),
            Err(CompileError::Unsupported { construct: Construct::CountedRepetition, offset: 1 })
        );
        assert_eq!(
            parse_regex("\\d"),
            Err(CompileError::Unsupported { construct: Construct::Escape, offset: 0 })
        );
        assert_eq!(
            parse_regex("^a$"),
            Err(CompileError::Unsupported { construct: Construct::Anchor, offset: 0 })
        );
    }

    #[test]
    fn any_other_character_is_a_literal() {
        assert_eq!(parse_regex("é").unwrap(), lit('é'));
        assert_eq!(parse_regex(" ").unwrap(), lit(' '));
    }

    #[test]
    fn display_reparses_to_same_tree() {
        for pattern in ["(a|b)*abb", "a+b?|c", "(ab)*", "a|", "()", "(a|b|c)+"] {
            let ast = parse_regex(pattern).unwrap();
            assert_eq!(ast.to_string(), pattern);
            assert_eq!(parse_regex(&ast.to_string()).unwrap(), ast);
        }
    }

    #[test]
    fn display_adds_parentheses_where_needed() {
        let ast = Ast::star(Ast::union(lit('a'), lit('b')));
        assert_eq!(ast.to_string(), "(a|b)*");
        let ast = Ast::concat(lit('a'), Ast::union(lit('b'), lit('c')));
        assert_eq!(ast.to_string(), "a(b|c)");
        assert_eq!(Ast::star(Ast::Epsilon).to_string(), "()*");
    }
}
