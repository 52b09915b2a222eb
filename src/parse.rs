//! Module implementing the recursive-descent parser.
//!
//! Parsing is keyed on the target node kind, exactly as the language is
//! shaped: a program is a list of master-keyword statements, a `DO`
//! statement is a call chain with extensions, `MAKE` declares variables,
//! arrays or functions depending on its leading type keyword, and `SET`
//! assigns through a reference expression. Binary expressions are parsed by
//! a backwards precedence scan that splits at the loosest operator first.
//!
//! Every violation is a fatal [`ParseError`] carrying the source position of
//! the first offending token.

use crate::ast::{scan, Node, NodeId, NodeKind};
use crate::error::ErrorKind;
use crate::error_parsing::ParseError;
use crate::token::{Bracket, Extension, ExtensionArg, Master, Op, Token, TokenKind, TypeKeyword};
use crate::StaticVec;

/// Does this token end an operand when scanning an expression backwards?
#[inline]
fn ends_operand(t: &Token) -> bool {
    matches!(
        t.kind,
        TokenKind::Identifier
            | TokenKind::Str
            | TokenKind::Number
            | TokenKind::Bracket { shape: Bracket::Round, open: false, .. }
            | TokenKind::Bracket { shape: Bracket::Square, open: false, .. }
    )
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    nodes: Vec<Node>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Self { source, tokens, nodes: Vec::new() }
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    fn err(&self, kind: ErrorKind, token_index: usize) -> ParseError {
        let offset = self
            .tokens
            .get(token_index)
            .map_or(self.source.len(), |t| t.start);
        ParseError::new(kind, offset, self.source)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn push_with(
        &mut self,
        start: usize,
        end: usize,
        kind: NodeKind,
        children: StaticVec<NodeId>,
    ) -> NodeId {
        let mut node = Node::new(start, end, kind);
        node.children = children;
        self.push(node)
    }

    fn leaf(&mut self, index: usize, kind: NodeKind) -> NodeId {
        self.push(Node::new(index, index, kind))
    }

    #[inline]
    fn tok(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// The whole program: master-keyword statements up to the end of the
    /// token stream.
    pub fn parse_program(&mut self) -> Result<NodeId, ParseError> {
        let end = self.tokens.len();
        let children = self.parse_statements(0, end)?;
        Ok(self.push_with(0, end.saturating_sub(1), NodeKind::Program, children))
    }

    /// Statements in the token range `[start, end)`. Every statement begins
    /// with a master keyword and runs through its terminating `;`.
    fn parse_statements(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<StaticVec<NodeId>, ParseError> {
        let mut children = StaticVec::new();
        let mut i = start;
        while i < end {
            let t = &self.tokens[i];
            match t.kind {
                TokenKind::Separator => i += 1,
                TokenKind::Master(master) => {
                    let line = scan::full_line(self.tokens, i);
                    if line >= end || self.tokens[line].kind != TokenKind::Separator {
                        return Err(self.err(ErrorKind::ExpectedSeparator, end - 1));
                    }
                    let stmt = match master {
                        Master::Do => self.parse_function_call(i + 1, line)?,
                        Master::Make => self.parse_make_var(i + 1, line)?,
                        Master::Set => self.parse_set_var(i + 1, line)?,
                    };
                    children.push(stmt);
                    i = line + 1;
                }
                _ => return Err(self.err(ErrorKind::ExpectedMaster, i)),
            }
        }
        Ok(children)
    }

    /// A `{ ... }` block: the node spans the braces, its children are the
    /// statements inside.
    fn parse_block(&mut self, open: usize, close: usize) -> Result<NodeId, ParseError> {
        let children = self.parse_statements(open + 1, close)?;
        Ok(self.push_with(open, close, NodeKind::Block, children))
    }

    /// A call chain: a first callable (function identifier or block)
    /// followed by extensions, each with its own payload. `end` is the index
    /// of the terminating separator.
    fn parse_function_call(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let mut children = StaticVec::new();
        let mut got_callable = false;
        let mut i = start;
        while i < end {
            let t = self.tokens[i];
            match t.kind {
                TokenKind::Identifier => {
                    if got_callable {
                        return Err(self.err(ErrorKind::ExpectedExtension, i));
                    }
                    let (node, last) = self.parse_function_identifier(i)?;
                    children.push(node);
                    i = last + 1;
                    got_callable = true;
                }
                TokenKind::Bracket { shape: Bracket::Curly, open: true, .. } => {
                    if got_callable {
                        return Err(self.err(ErrorKind::ExpectedExtension, i));
                    }
                    let close = scan::matching_bracket(self.tokens, i);
                    children.push(self.parse_block(i, close)?);
                    i = close + 1;
                    got_callable = true;
                }
                TokenKind::Extension(ext) => {
                    let (node, last) = self.parse_extension(ext, i, end)?;
                    children.push(node);
                    i = last + 1;
                    got_callable = false;
                }
                _ => return Err(self.err(ErrorKind::ExpectedExtension, i)),
            }
        }
        Ok(self.push_with(start, end, NodeKind::FunctionCall, children))
    }

    /// One extension keyword plus its payload. Returns the extension node
    /// and the index of its last token.
    fn parse_extension(
        &mut self,
        ext: Extension,
        i: usize,
        end: usize,
    ) -> Result<(NodeId, usize), ParseError> {
        let kind = match ext {
            Extension::When => NodeKind::When,
            Extension::While => NodeKind::While,
            Extension::Else => NodeKind::Else,
            Extension::Catch => NodeKind::Catch,
            Extension::Into => NodeKind::Into,
            Extension::Then => NodeKind::Then,
        };
        let (payload, last) = match ext.expects() {
            ExtensionArg::Function => match self.tok(i + 1).map(|t| t.kind) {
                Some(TokenKind::Identifier) => self.parse_function_identifier(i + 1)?,
                Some(TokenKind::Bracket { shape: Bracket::Curly, open: true, .. }) => {
                    let close = scan::matching_bracket(self.tokens, i + 1);
                    (self.parse_block(i + 1, close)?, close)
                }
                _ => return Err(self.err(ErrorKind::ExpectedBlock, i + 1)),
            },
            ExtensionArg::Expression => {
                let last = scan::expression_end(self.tokens, i + 1)
                    .filter(|&last| last < end)
                    .ok_or_else(|| self.err(ErrorKind::ExpectedExpression, i + 1))?;
                (self.parse_expression(i + 1, last)?, last)
            }
            ExtensionArg::Identifier => match self.tok(i + 1).map(|t| t.kind) {
                Some(TokenKind::Identifier) => {
                    (self.leaf(i + 1, NodeKind::Identifier), i + 1)
                }
                _ => return Err(self.err(ErrorKind::ExpectedIdentifier, i + 1)),
            },
        };
        let node = self.push_with(i, last, kind, smallvec::smallvec![payload]);
        Ok((node, last))
    }

    /// `identifier ( arguments )`. Returns the node and the index of the
    /// closing bracket.
    fn parse_function_identifier(&mut self, start: usize) -> Result<(NodeId, usize), ParseError> {
        if self.tokens[start].kind != TokenKind::Identifier {
            return Err(self.err(ErrorKind::ExpectedIdentifier, start));
        }
        match self.tok(start + 1).map(|t| t.kind) {
            Some(TokenKind::Bracket { shape: Bracket::Round, open: true, .. }) => {}
            Some(TokenKind::Bracket { .. }) => {
                return Err(self.err(ErrorKind::WrongBracketRound, start + 1));
            }
            _ => return Err(self.err(ErrorKind::ExpectedArguments, start + 1)),
        }
        let close = scan::matching_bracket(self.tokens, start + 1);
        let args = self.parse_comma_list(start + 1, close, NodeKind::Arguments)?;
        let ident = self.leaf(start, NodeKind::Identifier);
        let node = self.push_with(
            start,
            close,
            NodeKind::FunctionIdentifier,
            smallvec::smallvec![ident, args],
        );
        Ok((node, close))
    }

    /// `MAKE` with a leading scalar type, or re-routed to a function /
    /// array declaration for `FUNC` / `ARRAY`.
    fn parse_make_var(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let keyword = match self.tok(start).map(|t| t.kind) {
            Some(TokenKind::VarType(k)) => k,
            _ => return Err(self.err(ErrorKind::ExpectedType, start)),
        };
        match keyword {
            TypeKeyword::Func => self.parse_function_declaration(start, end),
            TypeKeyword::Array => self.parse_array_declaration(start, end),
            _ => {
                let ty = self.leaf(start, NodeKind::TypeIdentifier);
                if self.tok(start + 1).map(|t| t.kind) != Some(TokenKind::Identifier) {
                    return Err(self.err(ErrorKind::ExpectedIdentifier, start + 1));
                }
                let ident = self.leaf(start + 1, NodeKind::Identifier);
                if self.tok(start + 2).and_then(Token::operator) != Some(Op::Assign) {
                    return Err(self.err(ErrorKind::ExpectedAssignOperator, start + 2));
                }
                if start + 3 > end - 1 {
                    return Err(self.err(ErrorKind::ExpectedExpression, start + 3));
                }
                let expr = self.parse_expression(start + 3, end - 1)?;
                Ok(self.push_with(
                    start,
                    end,
                    NodeKind::MakeVar,
                    smallvec::smallvec![ty, ident, expr],
                ))
            }
        }
    }

    /// `MAKE FUNC [ARRAY]* TYPE name ( params ) { body };`
    fn parse_function_declaration(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let type_end = self.scan_type_keywords(start + 1)?;
        let ty = self.push(Node::new(start + 1, type_end, NodeKind::TypeIdentifier));

        let name = type_end + 1;
        if self.tok(name).map(|t| t.kind) != Some(TokenKind::Identifier) {
            return Err(self.err(ErrorKind::ExpectedIdentifier, name));
        }
        let ident = self.leaf(name, NodeKind::Identifier);

        match self.tok(name + 1).map(|t| t.kind) {
            Some(TokenKind::Bracket { shape: Bracket::Round, open: true, .. }) => {}
            _ => return Err(self.err(ErrorKind::ExpectedArguments, name + 1)),
        }
        let args_end = scan::matching_bracket(self.tokens, name + 1);
        let args = self.parse_fn_decl_arguments(name + 1, args_end)?;

        match self.tok(args_end + 1).map(|t| t.kind) {
            Some(TokenKind::Bracket { shape: Bracket::Curly, open: true, .. }) => {}
            _ => return Err(self.err(ErrorKind::ExpectedBlock, args_end + 1)),
        }
        let block_end = scan::matching_bracket(self.tokens, args_end + 1);
        if block_end + 1 != end {
            return Err(self.err(ErrorKind::ExpectedSeparator, block_end + 1));
        }
        if block_end <= args_end + 2 {
            return Err(self.err(ErrorKind::EmptyBlock, args_end + 1));
        }
        let block = self.parse_block(args_end + 1, block_end)?;

        Ok(self.push_with(
            start,
            end,
            NodeKind::FunctionDeclaration,
            smallvec::smallvec![ty, ident, args, block],
        ))
    }

    /// `MAKE ARRAY [ARRAY]* TYPE name = expression;`
    fn parse_array_declaration(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let type_end = self.scan_type_keywords(start)?;
        let ty = self.push(Node::new(start, type_end, NodeKind::TypeIdentifier));

        let name = type_end + 1;
        if self.tok(name).map(|t| t.kind) != Some(TokenKind::Identifier) {
            return Err(self.err(ErrorKind::ExpectedIdentifier, name));
        }
        let ident = self.leaf(name, NodeKind::Identifier);
        if self.tok(name + 1).and_then(Token::operator) != Some(Op::Assign) {
            return Err(self.err(ErrorKind::ExpectedAssignOperator, name + 1));
        }
        if name + 2 > end - 1 {
            return Err(self.err(ErrorKind::ExpectedExpression, name + 2));
        }
        let expr = self.parse_expression(name + 2, end - 1)?;
        Ok(self.push_with(
            start,
            end,
            NodeKind::ArrayDeclaration,
            smallvec::smallvec![ty, ident, expr],
        ))
    }

    /// Scan `[ARRAY]* TYPE` starting at `start`; returns the index of the
    /// final scalar type keyword.
    fn scan_type_keywords(&self, start: usize) -> Result<usize, ParseError> {
        let mut i = start;
        while self.tok(i).map(|t| t.kind) == Some(TokenKind::VarType(TypeKeyword::Array)) {
            i += 1;
        }
        match self.tok(i).map(|t| t.kind) {
            Some(TokenKind::VarType(k))
                if k != TypeKeyword::Array && k != TypeKeyword::Func =>
            {
                Ok(i)
            }
            _ => Err(self.err(ErrorKind::ExpectedType, i)),
        }
    }

    /// `SET target op expression;` — the target runs up to the first
    /// assignment operator at the current bracket depth.
    fn parse_set_var(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let t_end = scan::set_expression_end(self.tokens, start)
            .filter(|&last| last < end)
            .ok_or_else(|| self.err(ErrorKind::ExpectedIdentifier, start))?;
        let target = self.parse_expression(start, t_end)?;

        let op = match self.tok(t_end + 1).and_then(Token::operator) {
            Some(op) if op.is_assignment() => op,
            Some(_) | None => {
                return Err(self.err(ErrorKind::ExpectedAssignOperator, t_end + 1));
            }
        };
        let op_node = self.leaf(t_end + 1, NodeKind::Operator);

        if self.tokens[end].kind != TokenKind::Separator {
            return Err(self.err(ErrorKind::ExpectedSeparator, end));
        }
        let children = if matches!(op, Op::Increment | Op::Decrement | Op::NotNot) {
            if t_end + 2 != end {
                return Err(self.err(ErrorKind::ExpectedSeparator, t_end + 2));
            }
            smallvec::smallvec![target, op_node]
        } else {
            if t_end + 2 > end - 1 {
                return Err(self.err(ErrorKind::ExpectedExpression, t_end + 2));
            }
            let value = self.parse_expression(t_end + 2, end - 1)?;
            smallvec::smallvec![target, op_node, value]
        };
        Ok(self.push_with(start, end, NodeKind::SetVar, children))
    }

    /// Comma-separated expressions inside a bracket pair, skipping balanced
    /// nested groups when looking for the commas.
    fn parse_comma_list(
        &mut self,
        open: usize,
        close: usize,
        kind: NodeKind,
    ) -> Result<NodeId, ParseError> {
        let ranges = self.comma_ranges(open, close)?;
        let mut children = StaticVec::new();
        for (s, e) in ranges {
            children.push(self.parse_expression(s, e)?);
        }
        Ok(self.push_with(open, close, kind, children))
    }

    fn comma_ranges(&self, open: usize, close: usize) -> Result<Vec<(usize, usize)>, ParseError> {
        let mut ranges = Vec::new();
        if open + 1 >= close {
            return Ok(ranges);
        }
        let mut item_start = open + 1;
        let mut i = open + 1;
        while i < close {
            match self.tokens[i].kind {
                TokenKind::Bracket { open: true, .. } => {
                    i = scan::matching_bracket(self.tokens, i);
                }
                TokenKind::Operator(Op::Comma) => {
                    ranges.push((item_start, i - 1));
                    item_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        if item_start > close - 1 {
            return Err(self.err(ErrorKind::ExpectedArgument, item_start));
        }
        ranges.push((item_start, close - 1));
        Ok(ranges)
    }

    /// Function declaration parameters: `[ARRAY]* TYPE name [= default]`.
    fn parse_fn_decl_arguments(&mut self, open: usize, close: usize) -> Result<NodeId, ParseError> {
        let ranges = self.comma_ranges(open, close)?;
        let mut children = StaticVec::new();
        for (s, e) in ranges {
            children.push(self.parse_fn_decl_argument(s, e)?);
        }
        Ok(self.push_with(open, close, NodeKind::FunctionDeclarationArguments, children))
    }

    fn parse_fn_decl_argument(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        if end < start {
            return Err(self.err(ErrorKind::InvalidFunctionDeclarationArgument, start));
        }
        let type_end = self.scan_type_keywords(start)?;
        let ty = self.push(Node::new(start, type_end, NodeKind::TypeIdentifier));

        let name = type_end + 1;
        if name > end || self.tokens[name].kind != TokenKind::Identifier {
            return Err(self.err(ErrorKind::ExpectedIdentifier, name));
        }
        let ident = self.leaf(name, NodeKind::Identifier);

        let children = if name == end {
            smallvec::smallvec![ty, ident]
        } else {
            if self.tok(name + 1).and_then(Token::operator) != Some(Op::Assign) {
                return Err(self.err(ErrorKind::ExpectedAssignOperator, name + 1));
            }
            let op_node = self.leaf(name + 1, NodeKind::Operator);
            if name + 2 > end {
                return Err(self.err(ErrorKind::ExpectedExpression, name + 2));
            }
            let default = self.parse_expression(name + 2, end)?;
            smallvec::smallvec![ty, ident, op_node, default]
        };
        Ok(self.push_with(start, end, NodeKind::FunctionDeclarationArgument, children))
    }

    /// Binary expressions by backwards precedence scan: for each priority
    /// from loosest to tightest, scan right-to-left at the current bracket
    /// depth and split at the first binary operator found. Right-to-left
    /// scanning makes equal priorities associate left-to-right. An operator
    /// whose left neighbour does not end an operand is in unary position and
    /// is skipped.
    fn parse_expression(&mut self, start: usize, end: usize) -> Result<NodeId, ParseError> {
        if end >= self.tokens.len() || start > end {
            return Err(self.err(ErrorKind::ExpectedExpression, start));
        }
        if start == end {
            return match self.tokens[start].kind {
                TokenKind::Identifier => Ok(self.leaf(start, NodeKind::Identifier)),
                TokenKind::Number | TokenKind::Str => Ok(self.leaf(start, NodeKind::Literal)),
                _ => Err(self.err(ErrorKind::ExpectedIdentifier, start)),
            };
        }

        for priority in (1..=15u8).rev() {
            let mut i = end + 1;
            while i > start {
                i -= 1;
                let t = self.tokens[i];
                if matches!(
                    t.kind,
                    TokenKind::Bracket {
                        shape: Bracket::Round | Bracket::Square,
                        open: false,
                        ..
                    }
                ) {
                    let opener = scan::matching_bracket_rev(self.tokens, i);
                    if opener <= start {
                        break;
                    }
                    i = opener;
                    continue;
                }
                if let Some(op) = t.operator() {
                    if op.precedence() == priority
                        && i > start
                        && ends_operand(&self.tokens[i - 1])
                    {
                        let left = self.parse_expression(start, i - 1)?;
                        let op_node = self.leaf(i, NodeKind::Operator);
                        let right = self.parse_expression(i + 1, end)?;
                        return Ok(self.push_with(
                            start,
                            end,
                            NodeKind::Expression,
                            smallvec::smallvec![left, op_node, right],
                        ));
                    }
                }
            }
        }

        // no binary operator at this depth: structured forms
        let first = self.tokens[start];
        if first.is_open_bracket(Bracket::Square)
            && scan::matching_bracket(self.tokens, start) == end
        {
            return self.parse_comma_list(start, end, NodeKind::ArrayExpression);
        }
        if first.is_open_bracket(Bracket::Round) {
            if scan::matching_bracket(self.tokens, start) == end {
                return self.parse_expression(start + 1, end - 1);
            }
            // (TYPE) expression - a cast
            if let Some(TokenKind::VarType(_)) = self.tok(start + 1).map(|t| t.kind) {
                if scan::matching_bracket(self.tokens, start) == start + 2 {
                    let ty = self.leaf(start + 1, NodeKind::TypeIdentifier);
                    let inner = self.parse_expression(start + 3, end)?;
                    return Ok(self.push_with(
                        start,
                        end,
                        NodeKind::UnaryExpression,
                        smallvec::smallvec![ty, inner],
                    ));
                }
            }
        }
        if let Some(op) = first.operator() {
            if !matches!(op, Op::Subtract | Op::Not | Op::BitNot) {
                return Err(self.err(ErrorKind::OperatorNotUnary, start));
            }
            let op_node = self.leaf(start, NodeKind::Operator);
            let inner = self.parse_expression(start + 1, end)?;
            return Ok(self.push_with(
                start,
                end,
                NodeKind::UnaryExpression,
                smallvec::smallvec![op_node, inner],
            ));
        }
        if first.kind == TokenKind::Identifier {
            if let Some(TokenKind::Bracket { shape: Bracket::Round, open: true, .. }) =
                self.tok(start + 1).map(|t| t.kind)
            {
                if scan::matching_bracket(self.tokens, start + 1) == end {
                    let (node, _) = self.parse_function_identifier(start)?;
                    return Ok(node);
                }
            }
        }
        Err(self.err(ErrorKind::InvalidExpression, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;

    fn compile(src: &str) -> Ast {
        Ast::compile(src).expect("should parse")
    }

    fn text_of<'a>(ast: &'a Ast, node: &Node) -> &'a str {
        match (ast.tokens().get(node.start), ast.tokens().get(node.end)) {
            (Some(a), Some(b)) => &ast.source()[a.start..b.end],
            _ => "",
        }
    }

    fn first_statement(ast: &Ast) -> &Node {
        let root = ast.node(ast.root());
        ast.node(root.children[0])
    }

    #[test]
    fn statement_must_begin_with_master() {
        let err = Ast::compile("SAY(1);").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedMaster);
    }

    #[test]
    fn precedence_splits_loosest_last() {
        // 2 + 3 * 4 must parse as 2 + (3 * 4)
        let ast = compile("MAKE INT x = 2 + 3 * 4;");
        let make = first_statement(&ast);
        let expr = ast.node(make.children[2]);
        assert_eq!(expr.kind, NodeKind::Expression);
        let op = ast.node(expr.children[1]);
        assert_eq!(text_of(&ast, op), "+");
        let right = ast.node(expr.children[2]);
        assert_eq!(right.kind, NodeKind::Expression);
    }

    #[test]
    fn equal_precedence_associates_left() {
        // 1 - 2 - 3 must parse as (1 - 2) - 3
        let ast = compile("MAKE INT x = 1 - 2 - 3;");
        let make = first_statement(&ast);
        let expr = ast.node(make.children[2]);
        let left = ast.node(expr.children[0]);
        let right = ast.node(expr.children[2]);
        assert_eq!(left.kind, NodeKind::Expression);
        assert_eq!(right.kind, NodeKind::Literal);
    }

    #[test]
    fn hash_with_unary_index() {
        // a#-1: the '-' is unary, the '#' is the split point
        let ast = compile("DO SAY(a#-1);");
        let call = first_statement(&ast);
        let fn_ident = ast.node(call.children[0]);
        assert_eq!(fn_ident.kind, NodeKind::FunctionIdentifier);
        let args = ast.node(fn_ident.children[1]);
        let arg = ast.node(args.children[0]);
        assert_eq!(arg.kind, NodeKind::Expression);
        let op = ast.node(arg.children[1]);
        assert_eq!(text_of(&ast, op), "#");
        let idx = ast.node(arg.children[2]);
        assert_eq!(idx.kind, NodeKind::UnaryExpression);
    }

    #[test]
    fn array_literals_as_binary_operands() {
        let ast = compile("MAKE ARRAY INT a = [1, 2] + [3];");
        let decl = first_statement(&ast);
        assert_eq!(decl.kind, NodeKind::ArrayDeclaration);
        let expr = ast.node(decl.children[2]);
        assert_eq!(expr.kind, NodeKind::Expression);
        assert_eq!(ast.node(expr.children[0]).kind, NodeKind::ArrayExpression);
        assert_eq!(ast.node(expr.children[2]).kind, NodeKind::ArrayExpression);
    }

    #[test]
    fn nested_array_literals_split_on_outer_commas_only() {
        let ast = compile("MAKE ARRAY ARRAY INT a = [[1, 2], [3]];");
        let decl = first_statement(&ast);
        let outer = ast.node(decl.children[2]);
        assert_eq!(outer.kind, NodeKind::ArrayExpression);
        assert_eq!(outer.children.len(), 2);
    }

    #[test]
    fn square_brackets_around_unary_operators() {
        let ast = compile("MAKE ARRAY INT a = [-1, ~2, !0];");
        let decl = first_statement(&ast);
        let arr = ast.node(decl.children[2]);
        assert_eq!(arr.children.len(), 3);
        for &c in &arr.children {
            assert_eq!(ast.node(c).kind, NodeKind::UnaryExpression);
        }
    }

    #[test]
    fn while_chain_shape() {
        let ast = compile("DO { SET i = i + 1; } WHILE (i < 3);");
        let call = first_statement(&ast);
        assert_eq!(call.kind, NodeKind::FunctionCall);
        assert_eq!(ast.node(call.children[0]).kind, NodeKind::Block);
        let whilst = ast.node(call.children[1]);
        assert_eq!(whilst.kind, NodeKind::While);
        assert_eq!(whilst.children.len(), 1);
    }

    #[test]
    fn when_else_chain_shape() {
        let ast = compile("DO f() WHEN (x > 0) ELSE g();");
        let call = first_statement(&ast);
        let kinds: Vec<NodeKind> =
            call.children.iter().map(|&c| ast.node(c).kind).collect();
        assert_eq!(
            kinds,
            [NodeKind::FunctionIdentifier, NodeKind::When, NodeKind::Else]
        );
    }

    #[test]
    fn function_declaration_shape() {
        let ast = compile("MAKE FUNC INT add(INT x, INT y) { DO RETURN(x + y); };");
        let decl = first_statement(&ast);
        assert_eq!(decl.kind, NodeKind::FunctionDeclaration);
        assert_eq!(decl.children.len(), 4);
        let args = ast.node(decl.children[2]);
        assert_eq!(args.kind, NodeKind::FunctionDeclarationArguments);
        assert_eq!(args.children.len(), 2);
    }

    #[test]
    fn function_declaration_default_argument() {
        let ast = compile("MAKE FUNC INT inc(INT x, INT by = 1) { DO RETURN(x + by); };");
        let decl = first_statement(&ast);
        let args = ast.node(decl.children[2]);
        let second = ast.node(args.children[1]);
        assert_eq!(second.children.len(), 4);
    }

    #[test]
    fn function_declaration_requires_body() {
        let err = Ast::compile("MAKE FUNC INT f() { };").unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyBlock);
    }

    #[test]
    fn while_condition_required() {
        let err = Ast::compile("DO { SET i = i + 1; } WHILE ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedExpression);
    }

    #[test]
    fn set_requires_assignment_operator() {
        let err = Ast::compile("SET x == 1;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpectedAssignOperator);
    }

    #[test]
    fn set_increment_takes_no_value() {
        let ast = compile("SET x ++;");
        let set = first_statement(&ast);
        assert_eq!(set.kind, NodeKind::SetVar);
        assert_eq!(set.children.len(), 2);
    }

    #[test]
    fn cast_expression_shape() {
        let ast = compile("MAKE INT x = (INT) 3.5;");
        let make = first_statement(&ast);
        let unary = ast.node(make.children[2]);
        assert_eq!(unary.kind, NodeKind::UnaryExpression);
        assert_eq!(ast.node(unary.children[0]).kind, NodeKind::TypeIdentifier);
    }

    #[test]
    fn question_mark_is_not_unary() {
        let err = Ast::compile("MAKE INT x = ? 1;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperatorNotUnary);
    }
}
