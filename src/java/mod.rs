#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Structural facts recovered from a token stream.
pub mod extract;
/// The Java tokenizer.
pub mod lexer;
/// Structural matching of configured expressions against source tokens.
pub mod matcher;
/// Token-level grammars for declarations, parameters and catch clauses.
pub mod parsers;
/// Variable scope tracking.
pub mod scope;
/// Bracket balance and statement termination checks.
pub mod syntax;

pub use extract::{
    CaughtException, ControlStructure, MethodSignature, OperatorUse, StructuralFacts, extract,
};
pub use lexer::{Lexed, Token, TokenKind, cleaned_source, tokenize};
pub use matcher::{ExpressionMatch, ExpressionPattern};
pub use scope::{ScopeViolation, Variable, VariableRole};
pub use syntax::{SemicolonSeverity, SyntaxError, SyntaxErrorKind, SyntaxReport};
