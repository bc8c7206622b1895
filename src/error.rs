#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Reasons an exercise or assessment configuration is rejected at load time.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("Could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The configuration has no id.
    #[error("Configuration id must not be empty.")]
    EmptyId,
    /// A required method has no name.
    #[error("Required method #{0} has no name.")]
    UnnamedMethod(usize),
    /// A regular expression does not compile.
    #[error("`{field}` contains an invalid regular expression `{pattern}`: {source}")]
    InvalidPattern {
        /// where the pattern was configured
        field:   String,
        /// the pattern as written
        pattern: String,
        /// the compilation error
        source:  regex::Error,
    },
    /// A naming convention name is not known.
    #[error(
        "Unknown naming convention `{0}` (expected camelCase, PascalCase, snake_case or \
         UPPER_SNAKE_CASE)."
    )]
    UnknownConvention(String),
    /// A control structure name is not known.
    #[error(
        "Unknown control structure `{0}` (expected one of if, for, while, switch, do, try)."
    )]
    UnknownControlStructure(String),
    /// An allowed operator is not a Java operator.
    #[error("`{0}` is not a Java operator.")]
    InvalidOperator(String),
    /// A domain comparison uses something other than a comparison operator.
    #[error("Domain check on `{variable}` uses `{operator}`, which is not a comparison operator.")]
    InvalidComparison {
        /// the variable being compared
        variable: String,
        /// the offending operator
        operator: String,
    },
    /// An `in` domain check lists no values.
    #[error("Domain check `{0} in ...` lists no values (expected `a, b, c` or `low..high`).")]
    EmptyDomainSet(String),
    /// A math function expression or domain condition does not tokenize.
    #[error("Math function `{name}` has an invalid {part}: {message}")]
    InvalidExpression {
        /// the math function
        name:    String,
        /// `expression` or `domain condition`
        part:    &'static str,
        /// what went wrong
        message: String,
    },
    /// An exercise is worth a negative number of points.
    #[error("Exercise `{exercise}` cannot be worth {points} points.")]
    NegativePoints {
        /// the exercise id
        exercise: String,
        /// the configured points
        points:   f64,
    },
    /// An assessment lists the same exercise twice.
    #[error("Exercise `{0}` appears more than once in the assessment.")]
    DuplicateExercise(String),
}

/// Reasons a single analysis call is rejected. A rejected call means the
/// exercise could not be evaluated, which is distinct from a failed evaluation.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// The source has no non-whitespace content.
    #[error("The submitted source is empty.")]
    EmptySource,
    /// The source exceeds the configured size limit.
    #[error("The submitted source is {size} bytes, over the {limit} byte limit.")]
    SourceTooLarge {
        /// size of the source
        size:  usize,
        /// configured limit
        limit: usize,
    },
    /// The exercise configuration is malformed.
    #[error("Invalid exercise configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The source file could not be read as UTF-8 text.
    #[error("The submitted source could not be read: {0}")]
    Unreadable(String),
}

/// Lookups that found nothing.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// No exercise configuration with this id.
    #[error("No exercise configuration with id `{0}`.")]
    ExerciseNotFound(String),
    /// No assessment configuration with this id.
    #[error("No assessment configuration with id `{0}`.")]
    AssessmentNotFound(String),
}
