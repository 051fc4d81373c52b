//! Runtime support for automata generated by `proc_regex_sim::automaton!`.
//!
//! Everything here is `const`, so generated matchers can be evaluated at
//! compile time.

#[inline(always)]
const fn code_point_len(marker: u8) -> usize {
    if marker >> 7 == 0 {
        1
    }
    else if marker >> 5 == 0b110 {
        2
    }
    else if marker >> 4 == 0b1110 {
        3
    }
    else if marker >> 3 == 0b11110 {
        4
    }
    else {
        panic!("Malformed UTF-8 codepoint");
    }
}

/// Byte offset of the code point after the one starting at `start`.
#[inline(always)]
pub const fn find_next_code_point(s: &str, start: usize) -> usize {
    start + code_point_len(s.as_bytes()[start])
}

/// Decodes the code point starting at byte `pos`, returning its scalar value and
/// the offset of the next one.
#[inline(always)]
pub const fn next_char(s: &str, pos: usize) -> (u32, usize) {
    let next = find_next_code_point(s, pos);
    let bs = s.as_bytes();
    let scalar = match next - pos {
        1 => bs[pos] as u32,
        2 => ((bs[pos] as u32 & 0x1F) << 6) | (bs[pos + 1] as u32 & 0x3F),
        3 => {
            ((bs[pos] as u32 & 0x0F) << 12)
                | ((bs[pos + 1] as u32 & 0x3F) << 6)
                | (bs[pos + 2] as u32 & 0x3F)
        }
        4 => {
            ((bs[pos] as u32 & 0x07) << 18)
                | ((bs[pos + 1] as u32 & 0x3F) << 12)
                | ((bs[pos + 2] as u32 & 0x3F) << 6)
                | (bs[pos + 3] as u32 & 0x3F)
        }
        _ => unreachable!()
    };
    (scalar, next)
}

/// Cursor over the characters of a string usable from `const fn`.
#[derive(Debug, Clone, Copy)]
pub struct CharSlice<'a> {
    offset: usize,
    base: &'a str,
}

impl<'a> CharSlice<'a> {
    #[inline(always)]
    pub const fn new(s: &'a str) -> Self {
        Self { offset: 0, base: s }
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool { self.offset == self.base.len() }

    /// Next scalar value and the slice after it. Must not be called when empty.
    #[inline(always)]
    pub const fn get_advance(&self) -> (u32, CharSlice<'a>) {
        let (c, next_offset) = next_char(self.base, self.offset);
        (c, CharSlice { offset: next_offset, base: self.base })
    }
}

/// A compiled DFA laid out as static tables.
///
/// `transitions[s]` lists `(scalar value, target)` pairs for state `s`; a
/// symbol missing from the list rejects.
#[derive(Debug, Clone, Copy)]
pub struct DfaTable {
    pub initial: usize,
    pub accepting: &'static [bool],
    pub transitions: &'static [&'static [(u32, usize)]],
}

impl DfaTable {
    pub const fn state_count(&self) -> usize {
        self.accepting.len()
    }

    /// Target of `state` on `symbol`, if any.
    pub const fn next_state(&self, state: usize, symbol: u32) -> Option<usize> {
        let row = self.transitions[state];
        let mut i = 0;
        while i < row.len() {
            if row[i].0 == symbol {
                return Some(row[i].1);
            }
            i += 1;
        }
        None
    }

    /// Whether the whole of `s` is accepted.
    pub const fn test(&self, s: &str) -> bool {
        let mut state = self.initial;
        let mut remaining = CharSlice::new(s);
        while !remaining.is_empty() {
            let (c, rest) = remaining.get_advance();
            match self.next_state(state, c) {
                Some(next) => state = next,
                None => return false,
            }
            remaining = rest;
        }
        self.accepting[state]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // (a|b)*abb
    const CLASSIC: DfaTable = DfaTable {
        initial: 0,
        accepting: &[false, false, false, false, true],
        transitions: &[
            &[('a' as u32, 1), ('b' as u32, 2)],
            &[('a' as u32, 1), ('b' as u32, 3)],
            &[('a' as u32, 1), ('b' as u32, 2)],
            &[('a' as u32, 1), ('b' as u32, 4)],
            &[('a' as u32, 1), ('b' as u32, 2)],
        ],
    };

    #[test]
    fn decodes_every_width() {
        let s = "a€é𝄞";
        let mut offset = 0;
        let mut decoded = Vec::new();
        while offset < s.len() {
            let (c, next) = next_char(s, offset);
            decoded.push(char::from_u32(c).unwrap());
            offset = next;
        }
        assert_eq!(decoded, s.chars().collect::<Vec<_>>());
    }

    #[test]
    fn char_slice_walks_to_the_end() {
        let mut slice = CharSlice::new("é1");
        let (c, rest) = slice.get_advance();
        assert_eq!(c, 'é' as u32);
        slice = rest;
        let (c, rest) = slice.get_advance();
        assert_eq!(c, '1' as u32);
        assert!(rest.is_empty());
    }

    #[test]
    fn table_matches_whole_input() {
        assert!(CLASSIC.test("abb"));
        assert!(CLASSIC.test("babb"));
        assert!(!CLASSIC.test("abbb"));
        assert!(!CLASSIC.test("abc"));
        assert!(!CLASSIC.test(""));
        assert_eq!(CLASSIC.state_count(), 5);
    }

    #[test]
    fn evaluates_at_compile_time() {
        const ACCEPTED: bool = CLASSIC.test("aabb");
        const REJECTED: bool = CLASSIC.test("abba");
        assert!(ACCEPTED);
        assert!(!REJECTED);
    }
}
