//! # Dosato - a small imperative scripting language
//!
//! Dosato is a keyword-prefixed scripting language: every statement begins
//! with one of the master keywords `DO`, `MAKE` or `SET`, and trailing
//! extension keywords (`WHEN`, `WHILE`, `ELSE`, `CATCH`, `INTO`, `THEN`)
//! attach modifiers to the call in front of them.
//!
//! This crate contains the language core: the lexer, the recursive-descent
//! parser, the runtime value system with C-style numeric casting, the
//! operator kernel, the scope chain and the tree-walking interpreter, plus
//! the standard library the interpreter dispatches to.
//!
//! # A Quick Example
//!
//! ```
//! use dosato::{Ast, Process, Value};
//!
//! fn main() -> Result<(), dosato::ParseError> {
//!     let ast = Ast::compile("MAKE INT x = 2 + 3 * 4;")?;
//!     let mut process = Process::new(ast);
//!
//!     assert_eq!(process.run(), 0);
//!     assert_eq!(
//!         process.get_variable("x").expect("x should exist").value,
//!         Value::Int(14)
//!     );
//!     Ok(())
//! }
//! ```

mod ast;
mod engine;
mod error;
mod error_parsing;
mod fn_builtin;
mod fn_call;
mod lexer;
pub mod packages;
mod parse;
mod scope;
mod token;
mod variable;

pub use ast::{Ast, Node, NodeId, NodeKind};
pub use engine::Process;
pub use error::{ErrorKind, RuntimeError};
pub use error_parsing::ParseError;
pub use lexer::tokenize;
pub use scope::{FnArg, Function, Scope, ScopeChain, ScopeKind, Terminate};
pub use token::{
    Bracket, Extension, ExtensionArg, Master, Op, Position, Token, TokenKind, TypeKeyword,
};
pub use variable::{DataType, Type, Value, Variable};

/// An identifier in Dosato. [`SmartString`](https://crates.io/crates/smartstring)
/// is used because identifiers are ASCII and short, so they can be stored inline.
pub(crate) type Identifier = SmartString;

pub(crate) type SmartString = smartstring::SmartString<smartstring::Compact>;

/// Alias to [`smallvec::SmallVec<[T; 4]>`](https://crates.io/crates/smallvec),
/// a [`Vec`] backed by a small, inline, fixed-size array when there are ≤ 4
/// items stored. Most nodes have fewer than five children and most calls have
/// fewer than five arguments, so the inline storage usually suffices.
pub(crate) type StaticVec<T> = smallvec::SmallVec<[T; 4]>;
