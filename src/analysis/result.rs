#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::java::{ControlStructure, ScopeViolation, SyntaxError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A required method that no declaration matches.
pub struct MissingMethod {
    /// required name
    pub name:            String,
    /// required return type
    pub expected_return: String,
    /// required parameter types
    pub expected_params: Vec<String>,
    /// declared methods with the same signature but another name
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar:         Vec<String>,
}

impl Display for MissingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing method `{} {}({})`",
            self.expected_return,
            self.name,
            self.expected_params.join(", ")
        )?;
        if !self.similar.is_empty() {
            write!(f, " (found `{}` with the same signature)", self.similar.join("`, `"))?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// An operator outside the allowed set, reported once per lexeme.
pub struct DisallowedOperator {
    /// the operator lexeme
    pub operator:    String,
    /// line of its first use
    pub line:        u32,
    /// how many times it is used
    pub occurrences: usize,
}

impl Display for DisallowedOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operator `{}` is not allowed (line {}, used {} time{})",
            self.operator,
            self.line,
            self.occurrences,
            if self.occurrences == 1 { "" } else { "s" }
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// What kind of declaration a naming check looked at.
pub enum NamingTarget {
    /// a field, parameter, local or loop variable
    #[default]
    Variable,
    /// a method name
    Method,
}

impl Display for NamingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NamingTarget::Variable => "Variable",
            NamingTarget::Method => "Method",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A variable or method whose name follows none of the configured conventions.
pub struct NamingViolation {
    /// the declared name
    pub name:     String,
    /// line of the declaration
    pub line:     u32,
    /// what was declared
    #[serde(default)]
    pub kind:     NamingTarget,
    /// the conventions it was checked against
    pub expected: Vec<String>,
}

impl Display for NamingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` on line {} does not follow {}",
            self.kind,
            self.name,
            self.line,
            self.expected.join(" or ")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A failed custom pattern.
pub struct PatternViolation {
    /// the pattern's description
    pub description: String,
    /// the configured message, or a generated one
    pub message:     String,
    /// for a negative pattern, the forbidden text that was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched:     Option<String>,
    /// for a negative pattern, the line of the forbidden text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line:        Option<u32>,
}

impl Display for PatternViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let (Some(matched), Some(line)) = (&self.matched, self.line) {
            write!(f, " (line {line}: `{matched}`)")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A domain check with no matching text.
pub struct DomainViolation {
    /// what was checked, e.g. `age >= 18`
    pub check:   String,
    /// the configured message, or a generated one
    pub message: String,
}

impl Display for DomainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A math function whose expression, or guard, is absent.
pub struct MissingMathFunction {
    /// function name
    pub name:                     String,
    /// the expected expression
    pub expression:               String,
    /// the guard that is missing, when the expression itself was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_domain_condition: Option<String>,
    /// the configured message, or a generated one
    pub message:                  String,
}

impl Display for MissingMathFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// A failed exception handling requirement.
pub enum ExceptionViolation {
    /// no catch clause anywhere
    MissingTryCatch,
    /// a required exception type is never caught
    MissingSpecificException {
        /// the required type
        exception: String,
    },
}

impl Display for ExceptionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionViolation::MissingTryCatch => f.write_str("No try/catch block found"),
            ExceptionViolation::MissingSpecificException { exception } => {
                write!(f, "Exception `{exception}` is never caught")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// The violation categories of an [`AnalysisResult`].
pub enum Category {
    /// bracket, literal and statement problems
    Syntax,
    /// required methods
    Methods,
    /// allowed operators
    Operators,
    /// required control structures
    ControlStructures,
    /// naming conventions
    Naming,
    /// variable scope
    Scope,
    /// custom patterns
    Patterns,
    /// domain checks
    Domain,
    /// math functions
    MathFunctions,
    /// exception handling
    Exceptions,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 10] = [
        Category::Syntax,
        Category::Methods,
        Category::Operators,
        Category::ControlStructures,
        Category::Naming,
        Category::Scope,
        Category::Patterns,
        Category::Domain,
        Category::MathFunctions,
        Category::Exceptions,
    ];

    /// Heading used in reports.
    pub fn title(self) -> &'static str {
        match self {
            Category::Syntax => "Syntax",
            Category::Methods => "Required methods",
            Category::Operators => "Operators",
            Category::ControlStructures => "Control structures",
            Category::Naming => "Naming conventions",
            Category::Scope => "Variable scope",
            Category::Patterns => "Patterns",
            Category::Domain => "Domain checks",
            Category::MathFunctions => "Math functions",
            Category::Exceptions => "Exception handling",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The complete outcome of analyzing one source unit against one exercise.
///
/// Every category is computed independently. `is_valid` holds exactly when
/// every category is empty; `syntax_warnings` is advisory and never counts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// whether no category reports anything
    pub is_valid:                   bool,
    /// syntax errors
    pub syntax_errors:              Vec<SyntaxError>,
    /// required methods not declared
    pub missing_methods:            Vec<MissingMethod>,
    /// operators outside the allowed set
    pub disallowed_operators:       Vec<DisallowedOperator>,
    /// required control structures not used
    pub missing_control_structures: Vec<ControlStructure>,
    /// badly named variables
    pub naming_violations:          Vec<NamingViolation>,
    /// variables used out of scope
    pub scope_violations:           Vec<ScopeViolation>,
    /// failed custom patterns
    pub pattern_violations:         Vec<PatternViolation>,
    /// failed domain checks
    pub domain_violations:          Vec<DomainViolation>,
    /// absent math functions
    pub missing_math_functions:     Vec<MissingMathFunction>,
    /// failed exception handling requirements
    pub exception_violations:       Vec<ExceptionViolation>,
    /// advisory findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syntax_warnings:            Vec<SyntaxError>,
}

impl AnalysisResult {
    /// Number of violations in one category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Syntax => self.syntax_errors.len(),
            Category::Methods => self.missing_methods.len(),
            Category::Operators => self.disallowed_operators.len(),
            Category::ControlStructures => self.missing_control_structures.len(),
            Category::Naming => self.naming_violations.len(),
            Category::Scope => self.scope_violations.len(),
            Category::Patterns => self.pattern_violations.len(),
            Category::Domain => self.domain_violations.len(),
            Category::MathFunctions => self.missing_math_functions.len(),
            Category::Exceptions => self.exception_violations.len(),
        }
    }

    /// Total number of violations.
    pub fn violation_count(&self) -> usize {
        Category::ALL.into_iter().map(|c| self.count(c)).sum()
    }

    /// Recomputes `is_valid` from the categories.
    pub(crate) fn seal(mut self) -> Self {
        self.is_valid = self.violation_count() == 0;
        self
    }

    /// Human-readable messages for one category, in report order.
    pub fn messages(&self, category: Category) -> Vec<String> {
        /// Renders every item with `Display`.
        fn all<T: Display>(items: &[T]) -> Vec<String> {
            items.iter().map(ToString::to_string).collect()
        }

        match category {
            Category::Syntax => all(&self.syntax_errors),
            Category::Methods => all(&self.missing_methods),
            Category::Operators => all(&self.disallowed_operators),
            Category::ControlStructures => self
                .missing_control_structures
                .iter()
                .map(|c| format!("Missing control structure `{c}`"))
                .collect(),
            Category::Naming => all(&self.naming_violations),
            Category::Scope => all(&self.scope_violations),
            Category::Patterns => all(&self.pattern_violations),
            Category::Domain => all(&self.domain_violations),
            Category::MathFunctions => all(&self.missing_math_functions),
            Category::Exceptions => all(&self.exception_violations),
        }
    }

    /// Every violation message, grouped by category.
    pub fn all_messages(&self) -> Vec<(Category, String)> {
        Category::ALL
            .into_iter()
            .flat_map(|c| self.messages(c).into_iter().map(move |m| (c, m)))
            .collect()
    }
}
