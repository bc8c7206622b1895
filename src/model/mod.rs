#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Assessments: weighted collections of exercises.
pub mod assessment;
/// Exercise configurations and their rule sets.
pub mod exercise;

pub use assessment::{AssessmentConfig, AssessmentExercise};
pub use exercise::{
    CompiledRules, ComparisonCheck, ComparisonValue, CustomPattern, DomainCheck,
    ExceptionHandling, ExerciseConfig, GradingCriterion, MathFunctionCheck, NamingConvention,
    PatternCheck, RequiredMethod, RuleSet, Subcriterion,
};
