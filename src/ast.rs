//! Module defining the AST: a flat node arena owned by an [`Ast`] container.
//!
//! Nodes live in one arena (`Vec<Node>`) and children are arena indices,
//! which keeps the tree strictly downward with explicit lengths and no
//! back-pointers.

use serde::Serialize;

use crate::error_parsing::ParseError;
use crate::lexer::tokenize;
use crate::parse::Parser;
use crate::token::{Token, TokenKind};
use crate::StaticVec;

/// Index of a [`Node`] inside its [`Ast`] arena.
pub type NodeId = usize;

/// The closed set of node kinds the parser produces.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum NodeKind {
    Program,
    Block,
    FunctionCall,
    MakeVar,
    SetVar,
    FunctionDeclaration,
    ArrayDeclaration,
    Expression,
    UnaryExpression,
    ArrayExpression,
    Literal,
    Identifier,
    Operator,
    TypeIdentifier,
    FunctionIdentifier,
    Arguments,
    FunctionDeclarationArguments,
    FunctionDeclarationArgument,
    When,
    While,
    Else,
    Catch,
    Into,
    Then,
    /// Explicit tag for a node that failed to parse; the evaluator refuses
    /// it with `InvalidExpression`.
    Invalid,
}

/// One AST node: a token range (inclusive on both ends), a kind, and the
/// ordered child list.
#[derive(Debug, Clone)]
pub struct Node {
    pub start: usize,
    pub end: usize,
    pub kind: NodeKind,
    pub children: StaticVec<NodeId>,
}

impl Node {
    #[inline(always)]
    #[must_use]
    pub fn new(start: usize, end: usize, kind: NodeKind) -> Self {
        Self { start, end, kind, children: StaticVec::new() }
    }
}

/// A compiled program: the source text, its token stream and the node arena.
#[derive(Debug, Clone)]
pub struct Ast {
    source: String,
    tokens: Vec<Token>,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Tokenize and parse a source text into an [`Ast`].
    ///
    /// Parsing is total over valid programs; an invalid program yields
    /// exactly one [`ParseError`] at the first offending position.
    ///
    /// # Example
    ///
    /// ```
    /// use dosato::Ast;
    ///
    /// let ast = Ast::compile("DO SAY(40 + 2);").unwrap();
    /// assert!(Ast::compile("SAY(40 + 2);").is_err()); // no master keyword
    /// ```
    pub fn compile(source: impl Into<String>) -> Result<Self, ParseError> {
        let source = source.into();
        let tokens = tokenize(&source);
        let mut parser = Parser::new(&source, &tokens);
        let root = parser.parse_program()?;
        let nodes = parser.into_nodes();
        Ok(Self { source, tokens, nodes, root })
    }

    /// The root [`NodeKind::Program`] node.
    #[inline(always)]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline(always)]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline(always)]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline(always)]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The token at `index`, or `None` past the end of the stream.
    #[inline(always)]
    #[must_use]
    pub fn token(&self, index: usize) -> Option<Token> {
        self.tokens.get(index).copied()
    }

    /// Byte offset of the token at `index` (end of source when past the end).
    #[inline]
    #[must_use]
    pub fn token_offset(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .map_or(self.source.len(), |t| t.start)
    }

    /// The source text spanned by a node's token range.
    #[must_use]
    pub fn node_text(&self, id: NodeId) -> &str {
        let node = &self.nodes[id];
        match (self.tokens.get(node.start), self.tokens.get(node.end)) {
            (Some(first), Some(last)) => &self.source[first.start..last.end],
            _ => "",
        }
    }

    /// Render the token table, one line per token, for the debug dump.
    #[must_use]
    pub fn dump_tokens(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        if self.tokens.is_empty() {
            out.push_str("No tokens.\n");
            return out;
        }
        for (i, t) in self.tokens.iter().enumerate() {
            let _ = writeln!(
                out,
                "Token {}. start: {}, end: {}, kind: {:?}, text: {:?}",
                i,
                t.start,
                t.end,
                t.kind,
                t.text(&self.source)
            );
        }
        out
    }

    /// Render the tree as a JSON value for the debug dump.
    #[must_use]
    pub fn dump_json(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct DumpNode<'a> {
            kind: NodeKind,
            text: &'a str,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            children: Vec<DumpNode<'a>>,
        }

        fn dump<'a>(ast: &'a Ast, id: NodeId) -> DumpNode<'a> {
            let node = ast.node(id);
            DumpNode {
                kind: node.kind,
                text: ast.node_text(id),
                children: node.children.iter().map(|&c| dump(ast, c)).collect(),
            }
        }

        serde_json::to_value(dump(self, self.root)).unwrap_or(serde_json::Value::Null)
    }
}

/// Token-stream scanning helpers shared by the parser and the statement
/// splitter. All indices are token indices.
pub(crate) mod scan {
    use super::*;
    use crate::token::{Bracket, Op};

    /// Index of the `;` ending the statement starting at `start`, skipping
    /// over balanced bracket groups. Falls back to the last token.
    pub fn full_line(tokens: &[Token], start: usize) -> usize {
        let mut i = start;
        while i < tokens.len() {
            if let TokenKind::Bracket { open: true, .. } = tokens[i].kind {
                i = matching_bracket(tokens, i);
            }
            if tokens[i].kind == TokenKind::Separator {
                return i;
            }
            i += 1;
        }
        tokens.len().saturating_sub(1)
    }

    /// Index of the closer matching the opener at `start` (same shape and
    /// tier). Falls back to the last token for an unmatched opener.
    pub fn matching_bracket(tokens: &[Token], start: usize) -> usize {
        let (shape, tier) = match tokens[start].kind {
            TokenKind::Bracket { shape, tier, .. } => (shape, tier),
            _ => return start,
        };
        for (off, t) in tokens[start + 1..].iter().enumerate() {
            if let TokenKind::Bracket { shape: s, tier: c, open: false } = t.kind {
                if s == shape && c == tier {
                    return start + 1 + off;
                }
            }
        }
        tokens.len().saturating_sub(1)
    }

    /// Index of the opener matching the closer at `start`, scanning backward.
    pub fn matching_bracket_rev(tokens: &[Token], start: usize) -> usize {
        let (shape, tier) = match tokens[start].kind {
            TokenKind::Bracket { shape, tier, .. } => (shape, tier),
            _ => return start,
        };
        for i in (0..start).rev() {
            if let TokenKind::Bracket { shape: s, tier: c, open: true } = tokens[i].kind {
                if s == shape && c == tier {
                    return i;
                }
            }
        }
        start
    }

    /// Last token of the expression starting at `start`: everything up to
    /// the next structural token (separator, non-round bracket, master or
    /// extension keyword). Returns `None` for an empty expression.
    pub fn expression_end(tokens: &[Token], start: usize) -> Option<usize> {
        for (i, t) in tokens.iter().enumerate().skip(start) {
            let structural = match t.kind {
                TokenKind::Separator
                | TokenKind::Master(_)
                | TokenKind::Extension(_) => true,
                TokenKind::Bracket { shape, .. } => shape != Bracket::Round,
                _ => false,
            };
            if structural {
                return if i > start { Some(i - 1) } else { None };
            }
        }
        None
    }

    /// Last token of a `SET` target expression: like [`expression_end`] but
    /// also stopping at commas and assignment operators.
    pub fn set_expression_end(tokens: &[Token], start: usize) -> Option<usize> {
        for (i, t) in tokens.iter().enumerate().skip(start) {
            let structural = match t.kind {
                TokenKind::Separator
                | TokenKind::Master(_)
                | TokenKind::Extension(_) => true,
                TokenKind::Bracket { shape, .. } => shape != Bracket::Round,
                TokenKind::Operator(Op::Comma) => true,
                TokenKind::Operator(op) => op.is_assignment(),
                _ => false,
            };
            if structural {
                return if i > start { Some(i - 1) } else { None };
            }
        }
        None
    }

}
