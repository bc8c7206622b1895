#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// The rule evaluator.
pub mod evaluate;
/// Analysis results and violation types.
pub mod result;

pub use evaluate::{Analyzer, AnalyzerOptions};
pub use result::{
    AnalysisResult, Category, DisallowedOperator, DomainViolation, ExceptionViolation,
    MissingMathFunction, MissingMethod, NamingTarget, NamingViolation, PatternViolation,
};
