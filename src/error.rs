//! Module containing error definitions for parsing and evaluation.
//!
//! Errors are *kinds*, not payload-carrying types: each kind has a stable
//! numeric code (the value `CATCH` stores into `_`) and a human-readable
//! message. The same code space covers lex/parse, runtime, control-flow and
//! environment failures, exactly as the process reports them.

use std::error::Error;
use std::fmt;

/// Every error the lexer, parser or interpreter can raise.
///
/// The discriminant is the numeric error code observable from script code
/// through `CATCH` and `_`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(i32)]
#[non_exhaustive]
pub enum ErrorKind {
    // lex / parse
    ExpectedMaster = 1,
    ExpectedIdentifier,
    ExpectedType,
    ExpectedBlock,
    ExpectedArguments,
    ExpectedArgument,
    ExpectedSeparator,
    ExpectedExpression,
    ExpectedExtension,
    ExpectedElse,
    ExpectedAssignOperator,
    ExpectedArray,
    InvalidExpression,
    InvalidFunctionDeclarationArgument,
    EmptyBlock,
    WrongBracketRound,
    WrongBracketSquare,
    WrongBracketCurly,
    OperatorNotUnary,
    WhileNotLast,
    ExtensionNotFinal,

    // runtime
    UndefinedVariable = 101,
    VariableAlreadyExists,
    FunctionAlreadyExists,
    FunctionNotFound,
    TypeMismatch,
    InvalidOperator,
    CantUseTypeInAddition,
    CantUseTypeInModulo,
    CantUseTypeInBitwiseExpression,
    CantConvertToString,
    ArrayOutOfBounds,
    NumberCannotBeNegative,
    InvalidLiteral,
    InvalidChar,
    InvalidNumber,
    CannotModifyConstant,
    MathDomainError,
    IdentifierInvalid,
    InvalidReferenceExpression,

    // control flow
    BreakOutsideOfLoop = 201,
    ContinueOutsideOfLoop,
    ReturnOutsideOfFunction,
    TooFewArguments,
    TooManyArguments,

    // environment
    FileNotFound = 301,
    PermissionDenied,
    SayError,
    SystemCommandFailed,
    ProcessNotRunning,
    Internal,
}

impl ErrorKind {
    /// The numeric code for this kind, as stored into `_` by `CATCH`.
    #[inline(always)]
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// The human-readable message for this kind.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ExpectedMaster => "Expected a master keyword (DO, MAKE or SET)",
            Self::ExpectedIdentifier => "Expected an identifier",
            Self::ExpectedType => "Expected a type keyword",
            Self::ExpectedBlock => "Expected a block",
            Self::ExpectedArguments => "Expected an argument list",
            Self::ExpectedArgument => "Expected an argument",
            Self::ExpectedSeparator => "Expected a semicolon",
            Self::ExpectedExpression => "Expected an expression",
            Self::ExpectedExtension => "Expected an extension keyword",
            Self::ExpectedElse => "Expected ELSE after a guarded call",
            Self::ExpectedAssignOperator => "Expected an assignment operator",
            Self::ExpectedArray => "Expected an array type",
            Self::InvalidExpression => "Invalid expression",
            Self::InvalidFunctionDeclarationArgument => {
                "Invalid argument in function declaration"
            }
            Self::EmptyBlock => "Block cannot be empty",
            Self::WrongBracketRound => "Expected round brackets",
            Self::WrongBracketSquare => "Expected square brackets",
            Self::WrongBracketCurly => "Expected curly brackets",
            Self::OperatorNotUnary => "Operator cannot be used as a unary operator",
            Self::WhileNotLast => "WHILE must be the last extension",
            Self::ExtensionNotFinal => "CATCH and INTO must end the call chain",

            Self::UndefinedVariable => "Undefined variable",
            Self::VariableAlreadyExists => "Variable already exists",
            Self::FunctionAlreadyExists => "Function already exists",
            Self::FunctionNotFound => "Function not found",
            Self::TypeMismatch => "Type mismatch",
            Self::InvalidOperator => "Invalid operator in expression",
            Self::CantUseTypeInAddition => "Type cannot be used in an addition",
            Self::CantUseTypeInModulo => "Type cannot be used in a modulo",
            Self::CantUseTypeInBitwiseExpression => {
                "Type cannot be used in a bitwise expression"
            }
            Self::CantConvertToString => "Value cannot be converted to a string",
            Self::ArrayOutOfBounds => "Array index out of bounds",
            Self::NumberCannotBeNegative => "Number cannot be negative or zero",
            Self::InvalidLiteral => "Invalid literal",
            Self::InvalidChar => "Invalid character literal",
            Self::InvalidNumber => "Invalid number literal",
            Self::CannotModifyConstant => "Cannot modify a constant",
            Self::MathDomainError => "Math domain error",
            Self::IdentifierInvalid => "Invalid identifier",
            Self::InvalidReferenceExpression => {
                "Expression cannot be assigned to"
            }

            Self::BreakOutsideOfLoop => "BREAK outside of a loop",
            Self::ContinueOutsideOfLoop => "CONTINUE outside of a loop",
            Self::ReturnOutsideOfFunction => "RETURN outside of a function",
            Self::TooFewArguments => "Too few arguments",
            Self::TooManyArguments => "Too many arguments",

            Self::FileNotFound => "File not found",
            Self::PermissionDenied => "Permission denied",
            Self::SayError => "Could not write output",
            Self::SystemCommandFailed => "System command failed",
            Self::ProcessNotRunning => "Process is not running",
            Self::Internal => "Internal interpreter error",
        }
    }
}

impl fmt::Display for ErrorKind {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for ErrorKind {}

/// A located runtime error: the kind plus where it happened.
///
/// `ast_index` selects the AST inside the process; `token_index` is the
/// first token of the offending node, from which the source position is
/// recovered for the report.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub ast_index: usize,
    pub token_index: usize,
}

impl RuntimeError {
    #[inline(always)]
    #[must_use]
    pub const fn new(kind: ErrorKind, ast_index: usize, token_index: usize) -> Self {
        Self { kind, ast_index, token_index }
    }

    /// The numeric code, which doubles as the process exit code.
    #[inline(always)]
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.kind)
    }
}

impl Error for RuntimeError {}
