//! Module implementing the phase-based tokenizer.
//!
//! The lexer runs a sequence of phases over the raw source text, each phase
//! claiming byte ranges for one token family and skipping everything already
//! claimed by an earlier phase: strings and line comments first (so nothing
//! inside them is ever matched as code), then the keyword families, brackets,
//! separators, numbers, operators and finally identifiers. The resulting
//! token list is sorted by start offset and comments are dropped.

use crate::token::{Bracket, Extension, Master, Op, Token, TokenKind, TypeKeyword};

#[inline(always)]
const fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[inline(always)]
const fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

/// A digit, a decimal point or the `F` float suffix.
#[inline(always)]
const fn is_numberish(c: u8) -> bool {
    c.is_ascii_digit() || c == b'.' || c == b'F'
}

struct Tokenizer<'s> {
    src: &'s [u8],
    claimed: Vec<bool>,
    tokens: Vec<Token>,
}

impl<'s> Tokenizer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            src: source.as_bytes(),
            claimed: vec![false; source.len()],
            tokens: Vec::new(),
        }
    }

    fn claim(&mut self, start: usize, end: usize, kind: TokenKind) {
        self.tokens.push(Token::new(start, end, kind));
        for slot in &mut self.claimed[start..end] {
            *slot = true;
        }
    }

    /// Is `pos` the start of the whole word `word`, on word boundaries both sides?
    fn word_at(&self, pos: usize, word: &str) -> bool {
        let word = word.as_bytes();
        let end = pos + word.len();
        if end > self.src.len() || &self.src[pos..end] != word {
            return false;
        }
        if pos > 0 && is_word_char(self.src[pos - 1]) {
            return false;
        }
        end == self.src.len() || !is_word_char(self.src[end])
    }

    /// Strings and line comments. A quote only opens or closes a string when
    /// the run of backslashes before it has even length.
    fn scan_strings_and_comments(&mut self) {
        let len = self.src.len();
        let mut quote: Option<(u8, usize)> = None;
        let mut escapes = 0usize;
        let mut i = 0;
        while i < len {
            let c = self.src[i];
            match quote {
                None => {
                    if (c == b'"' || c == b'\'') && escapes % 2 == 0 {
                        quote = Some((c, i));
                    } else if c == b'/' && i + 1 < len && self.src[i + 1] == b'/' {
                        let mut j = i;
                        while j < len && self.src[j] != b'\n' {
                            j += 1;
                        }
                        self.claim(i, j, TokenKind::Comment);
                        i = j;
                    }
                }
                Some((q, start)) => {
                    if c == q && escapes % 2 == 0 {
                        self.claim(start, i + 1, TokenKind::Str);
                        quote = None;
                    }
                }
            }
            if c == b'\\' {
                escapes += 1;
            } else {
                escapes = 0;
            }
            i += 1;
        }
        // an unterminated string claims nothing; the parser reports whatever
        // the remaining phases make of its contents
    }

    fn scan_words<T: Copy>(
        &mut self,
        table: &[(&'static str, T)],
        wrap: impl Fn(T) -> TokenKind,
    ) {
        let mut i = 0;
        while i < self.src.len() {
            if self.claimed[i] {
                i += 1;
                continue;
            }
            let mut matched = false;
            for &(word, value) in table {
                if self.word_at(i, word) {
                    self.claim(i, i + word.len(), wrap(value));
                    i += word.len();
                    matched = true;
                    break;
                }
            }
            if !matched {
                i += 1;
            }
        }
    }

    /// Brackets carry their shape and a nesting tier. A closer that does not
    /// match the innermost open shape is recorded with tier -1 and the open
    /// bracket stays on the stack.
    fn scan_brackets(&mut self) {
        let mut stack: Vec<Bracket> = Vec::new();
        let mut i = 0;
        while i < self.src.len() {
            if self.claimed[i] {
                i += 1;
                continue;
            }
            if let Some((shape, open)) = Bracket::of_char(self.src[i] as char) {
                if open {
                    stack.push(shape);
                    let tier = stack.len() as i32;
                    self.claim(i, i + 1, TokenKind::Bracket { shape, tier, open: true });
                } else {
                    let tier = match stack.last() {
                        Some(&top) if top == shape => {
                            let tier = stack.len() as i32;
                            stack.pop();
                            tier
                        }
                        _ => -1,
                    };
                    self.claim(i, i + 1, TokenKind::Bracket { shape, tier, open: false });
                }
            }
            i += 1;
        }
    }

    fn scan_separators(&mut self) {
        let mut i = 0;
        while i < self.src.len() {
            if !self.claimed[i] && self.src[i] == b';' {
                self.claim(i, i + 1, TokenKind::Separator);
            }
            i += 1;
        }
    }

    /// Numbers: an optional leading `.`, digits with at most one `.`, and an
    /// optional `F` suffix. A digit run glued to the tail of an identifier is
    /// not a number; the identifier phase absorbs it.
    fn scan_numbers(&mut self) {
        let len = self.src.len();
        let mut i = 0;
        while i < len {
            if self.claimed[i] {
                i += 1;
                continue;
            }
            let c = self.src[i];
            let starts_number = c.is_ascii_digit()
                || (c == b'.' && i + 1 < len && self.src[i + 1].is_ascii_digit());
            if !starts_number {
                i += 1;
                continue;
            }
            let run_end = {
                let mut j = i;
                while j < len && !self.claimed[j] && is_numberish(self.src[j]) {
                    j += 1;
                }
                j
            };
            if i > 0 && is_name_char(self.src[i - 1]) {
                i = run_end;
                continue;
            }
            let mut j = i;
            let mut seen_dot = false;
            while j < run_end {
                if self.src[j] == b'.' {
                    if seen_dot {
                        break;
                    }
                    seen_dot = true;
                }
                j += 1;
            }
            self.claim(i, j, TokenKind::Number);
            i = j;
        }
    }

    fn scan_operators(&mut self) {
        let len = self.src.len();
        let mut i = 0;
        while i < len {
            if self.claimed[i] {
                i += 1;
                continue;
            }
            let mut two = None;
            if i + 2 <= len && !self.claimed[i + 1] {
                let pair = &self.src[i..i + 2];
                two = Op::TWO_CHAR
                    .iter()
                    .find(|(s, _)| s.as_bytes() == pair)
                    .map(|&(_, op)| op);
            }
            if let Some(op) = two {
                self.claim(i, i + 2, TokenKind::Operator(op));
                i += 2;
                continue;
            }
            let c = self.src[i] as char;
            if let Some(&(_, op)) = Op::ONE_CHAR.iter().find(|&&(s, _)| s == c) {
                self.claim(i, i + 1, TokenKind::Operator(op));
            }
            i += 1;
        }
    }

    fn scan_identifiers(&mut self) {
        let len = self.src.len();
        let mut i = 0;
        while i < len {
            if self.claimed[i] || !is_word_char(self.src[i]) {
                i += 1;
                continue;
            }
            let mut j = i;
            while j < len && !self.claimed[j] && is_word_char(self.src[j]) {
                j += 1;
            }
            self.claim(i, j, TokenKind::Identifier);
            i = j;
        }
    }
}

/// Tokenize a source text into a stream sorted by start offset, with
/// comments stripped.
///
/// Re-tokenizing the same input always yields an identical stream; every
/// matched bracket opener has a closer carrying the same shape and tier.
///
/// # Example
///
/// ```
/// use dosato::{tokenize, TokenKind, Master};
///
/// let tokens = tokenize("DO SAY(42);");
/// assert_eq!(tokens[0].kind, TokenKind::Master(Master::Do));
/// assert_eq!(tokens.len(), 6);
/// ```
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut t = Tokenizer::new(source);
    t.scan_strings_and_comments();
    t.scan_words(&Master::ALL, TokenKind::Master);
    t.scan_words(&TypeKeyword::ALL, TokenKind::VarType);
    t.scan_words(&Extension::ALL, TokenKind::Extension);
    t.scan_brackets();
    t.scan_separators();
    t.scan_numbers();
    t.scan_operators();
    t.scan_identifiers();

    let mut tokens = t.tokens;
    tokens.sort_by_key(|t| t.start);
    tokens.retain(|t| t.kind != TokenKind::Comment);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_are_whole_words() {
        // DOABLE must not lex as DO + ABLE
        let t = tokenize("DOABLE DO");
        assert_eq!(t[0].kind, TokenKind::Identifier);
        assert_eq!(t[1].kind, TokenKind::Master(Master::Do));
    }

    #[test]
    fn strings_shield_their_contents() {
        let t = tokenize(r#"DO SAY("DO ; // not a comment");"#);
        assert_eq!(
            t.iter().filter(|t| t.kind == TokenKind::Str).count(),
            1
        );
        assert_eq!(
            t.iter().filter(|t| t.kind == TokenKind::Separator).count(),
            1
        );
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        let t = tokenize(r#""a\"b""#);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].kind, TokenKind::Str);
        assert_eq!(t[0].end - t[0].start, 6);
    }

    #[test]
    fn comments_are_stripped() {
        let t = tokenize("// a comment\nDO SAY(1);");
        assert_eq!(t[0].kind, TokenKind::Master(Master::Do));
    }

    #[test]
    fn bracket_tiers_match() {
        let t = tokenize("([{}])");
        let tiers: Vec<i32> = t
            .iter()
            .map(|t| match t.kind {
                TokenKind::Bracket { tier, .. } => tier,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(tiers, [1, 2, 3, 3, 2, 1]);
    }

    #[test]
    fn mismatched_closer_carries_minus_one() {
        let t = tokenize("(]");
        assert_eq!(
            t[1].kind,
            TokenKind::Bracket { shape: Bracket::Square, tier: -1, open: false }
        );
    }

    #[test]
    fn numbers_and_suffixes() {
        let src = "12 12.5 12.5F .5 x2";
        let t = tokenize(src);
        let texts: Vec<&str> = t.iter().map(|t| t.text(src)).collect();
        assert_eq!(texts, ["12", "12.5", "12.5F", ".5", "x2"]);
        assert_eq!(t[4].kind, TokenKind::Identifier);
    }

    #[test]
    fn two_char_operators_win() {
        assert_eq!(
            kinds("a += b"),
            [
                TokenKind::Identifier,
                TokenKind::Operator(Op::AddAssign),
                TokenKind::Identifier
            ]
        );
        assert_eq!(
            kinds("a<=b"),
            [
                TokenKind::Identifier,
                TokenKind::Operator(Op::LessEqual),
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn retokenizing_is_stable() {
        let src = r#"MAKE INT x = 1; DO SAY(x + 2) WHEN (x > 0); // trailing"#;
        assert_eq!(tokenize(src), tokenize(src));
    }
}
