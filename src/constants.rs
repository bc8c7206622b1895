#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use once_cell::sync::Lazy;
use regex::Regex;

/// Default cap on the size of a single source file, in bytes.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024;

/// Directory (under a store root) holding exercise configurations.
pub const EXERCISES_DIR: &str = "configs";

/// Directory (under a store root) holding assessment configurations.
pub const ASSESSMENTS_DIR: &str = "assessments";

/// Default maximum points for a newly created exercise.
pub const DEFAULT_EXERCISE_POINTS: f64 = 10.0;

/// Separators that may appear in `allowedOperators` even though they are never
/// reported as used operators.
pub const STRUCTURAL_OPERATORS: &[&str] = &["=", "?", ":", "->", "::"];

/// Comparison operators accepted by the comparison form of a domain check.
pub const COMPARISON_OPERATORS: &[&str] = &["<", "<=", ">", ">=", "==", "!="];

/// Membership operator of a domain check: the value is `a, b, c` or `low..high`.
pub const MEMBERSHIP_OPERATOR: &str = "in";

/// `lowerCamelCase`
pub static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("camelCase regex is valid"));

/// `UpperCamelCase`
pub static PASCAL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z0-9]*$").expect("PascalCase regex is valid"));

/// `lower_snake_case`
pub static SNAKE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").expect("snake_case regex is valid"));

/// `UPPER_SNAKE_CASE`
pub static UPPER_SNAKE_CASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$").expect("UPPER_SNAKE_CASE regex is valid")
});

/// Anything that is not a word character or `-` in an exercise id.
pub static ID_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w-]+").expect("id noise regex is valid"));

/// Runs of `-` and `_` in an exercise id.
pub static ID_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-_]+").expect("id separator regex is valid"));

/// Numeric ordering prefixes such as `01-`.
pub static ID_NUMERIC_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+-").expect("id prefix regex is valid"));
